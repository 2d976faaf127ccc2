use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::models::CustomerEvent;

const GRID_DAYS: i64 = 42;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day_of_month: u32,
    pub in_current_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub has_events: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    pub days: Vec<CalendarDay>,
    pub selected: Option<NaiveDate>,
    pub selected_events: Vec<CustomerEvent>,
}

/// Six Sunday-first weeks covering the month, flagged against `events`.
/// Returns `None` for a month that does not exist.
pub fn month_grid(
    year: i32,
    month: u32,
    today: NaiveDate,
    selected: Option<NaiveDate>,
    events: &[CustomerEvent],
) -> Option<CalendarMonth> {
    let first_day = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last_day = next_month.pred_opt()?;

    let start = first_day - Duration::days(i64::from(first_day.weekday().num_days_from_sunday()));

    let days = (0..GRID_DAYS)
        .map(|offset| {
            let date = start + Duration::days(offset);
            CalendarDay {
                date,
                day_of_month: date.day(),
                in_current_month: date.month() == month,
                is_today: date == today,
                is_selected: Some(date) == selected,
                has_events: events.iter().any(|e| e.date == date),
            }
        })
        .collect();

    let selected_events = selected
        .map(|day| events.iter().filter(|e| e.date == day).cloned().collect())
        .unwrap_or_default();

    Some(CalendarMonth {
        year,
        month,
        label: first_day.format("%B %Y").to_string(),
        first_day,
        last_day,
        days,
        selected,
        selected_events,
    })
}

/// Start and end of a slot such as "9:00 AM - 11:00 AM" or "9 AM - 12 PM".
pub fn parse_time_slot(slot: &str) -> Option<(NaiveTime, NaiveTime)> {
    let (start, end) = slot.split_once('-')?;
    Some((parse_clock(start)?, parse_clock(end)?))
}

fn parse_clock(s: &str) -> Option<NaiveTime> {
    let s = s.trim().to_uppercase();
    let normalized = if s.contains(':') {
        s
    } else {
        let (hour, meridiem) = s.split_once(' ')?;
        format!("{hour}:00 {meridiem}")
    };
    NaiveTime::parse_from_str(&normalized, "%I:%M %p").ok()
}

/// Escapes a TEXT property value (RFC 5545 section 3.3.11).
fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn generate_ics(event: &CustomerEvent, business_name: &str) -> String {
    let dtstamp = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
    let uid = format!("{}@telecom-assistant", event.id);

    let timing = match event.time.as_deref().and_then(parse_time_slot) {
        Some((start, end)) => format!(
            "DTSTART:{}\r\nDTEND:{}\r\n",
            event.date.and_time(start).format("%Y%m%dT%H%M%S"),
            event.date.and_time(end).format("%Y%m%dT%H%M%S"),
        ),
        None => format!(
            "DTSTART;VALUE=DATE:{}\r\nDTEND;VALUE=DATE:{}\r\n",
            event.date.format("%Y%m%d"),
            (event.date + Duration::days(1)).format("%Y%m%d"),
        ),
    };

    let summary = escape_text(&format!("{} ({})", event.title, business_name));
    let description = if event.description.is_empty() {
        "No additional notes".to_string()
    } else {
        escape_text(&event.description)
    };

    format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Telecom Assistant//Customer Events//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:{uid}\r\n\
         DTSTAMP:{dtstamp}\r\n\
         {timing}\
         SUMMARY:{summary}\r\n\
         DESCRIPTION:{description}\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n"
    )
}
