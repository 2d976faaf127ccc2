use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

pub const SLOT_TIMES: [&str; 3] = ["9:00 AM - 11:00 AM", "1:00 PM - 3:00 PM", "4:00 PM - 6:00 PM"];

/// First day offered is this many days after today.
const LEAD_DAYS: i64 = 10;
const MAX_SLOTS: usize = 5;
const MAX_DAYS_CHECKED: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailableSlot {
    pub date: NaiveDate,
    pub times: Vec<String>,
}

/// Soonest bookable days starting `LEAD_DAYS` out. Sundays and days that already
/// hold a customer event are skipped.
pub fn soonest_slots(today: NaiveDate, taken: &[NaiveDate]) -> Vec<AvailableSlot> {
    let mut slots = Vec::with_capacity(MAX_SLOTS);

    for offset in 0..MAX_DAYS_CHECKED {
        if slots.len() >= MAX_SLOTS {
            break;
        }
        let date = today + Duration::days(LEAD_DAYS + offset);
        if date.weekday() == Weekday::Sun || taken.contains(&date) {
            continue;
        }
        slots.push(AvailableSlot {
            date,
            times: SLOT_TIMES.iter().map(|t| t.to_string()).collect(),
        });
    }

    slots
}
