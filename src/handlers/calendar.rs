use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;

use crate::errors::AppError;
use crate::services::calendar::{generate_ics, month_grid, CalendarMonth};
use crate::state::AppState;

const BUSINESS_NAME: &str = "Telecom";

#[derive(Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub selected: Option<NaiveDate>,
}

// GET /api/calendar?year=&month=&selected=
pub async fn get_calendar(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarMonth>, AppError> {
    let today = Utc::now().date_naive();
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());

    let snapshot = state.snapshot();
    month_grid(year, month, today, query.selected, &snapshot.events)
        .map(Json)
        .ok_or_else(|| AppError::BadRequest(format!("invalid month {year}-{month}")))
}

// GET /calendar/:event_id
pub async fn download_ics(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let event_id = raw_id.strip_suffix(".ics").unwrap_or(&raw_id);

    let snapshot = state.snapshot();
    let event = snapshot
        .events
        .iter()
        .find(|e| e.id == event_id)
        .ok_or_else(|| AppError::NotFound(format!("event {event_id}")))?;

    let ics = generate_ics(event, BUSINESS_NAME);
    let filename = format!("event-{event_id}.ics");

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        ics,
    )
        .into_response())
}
