use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, Sse};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use tokio_stream::wrappers::{IntervalStream, WatchStream};
use tokio_stream::StreamExt;

use crate::errors::AppError;
use crate::models::SessionSnapshot;
use crate::state::{AppState, Gesture};

type SnapshotResult = Result<Json<SessionSnapshot>, AppError>;

// GET /api/session
pub async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.snapshot())
}

// GET /api/session/stream: SSE of snapshots, starting with the current one
pub async fn session_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let updates = WatchStream::new(state.snapshots.clone()).map(|snapshot| {
        let data = serde_json::to_string(&snapshot).unwrap_or_default();
        Ok::<_, Infallible>(Event::default().data(data).event("snapshot"))
    });

    let keepalive = IntervalStream::new(tokio::time::interval(Duration::from_secs(30)))
        .map(|_| Ok::<_, Infallible>(Event::default().comment("keepalive")));

    Sse::new(updates.merge(keepalive))
}

#[derive(Deserialize)]
pub struct SendMessage {
    pub text: String,
}

// POST /api/messages
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SendMessage>,
) -> SnapshotResult {
    state.run(Gesture::SendMessage(payload.text)).await.map(Json)
}

// POST /api/events/:id/reschedule
pub async fn begin_reschedule(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> SnapshotResult {
    state.run(Gesture::BeginReschedule(event_id)).await.map(Json)
}

#[derive(Deserialize)]
pub struct SlotSelection {
    pub date: NaiveDate,
    pub time: String,
}

// POST /api/reschedule/slot
pub async fn select_slot(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SlotSelection>,
) -> SnapshotResult {
    state
        .run(Gesture::SelectSlot {
            date: payload.date,
            time: payload.time,
        })
        .await
        .map(Json)
}

// POST /api/reschedule/confirm
pub async fn confirm_reschedule(State(state): State<Arc<AppState>>) -> SnapshotResult {
    state.run(Gesture::ConfirmReschedule).await.map(Json)
}

// POST /api/reschedule/cancel
pub async fn cancel_reschedule(State(state): State<Arc<AppState>>) -> SnapshotResult {
    state.run(Gesture::CancelReschedule).await.map(Json)
}

// POST /api/events/:id/reminder
pub async fn offer_reminder(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> SnapshotResult {
    state.run(Gesture::OfferReminder(event_id)).await.map(Json)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSelection {
    pub event_id: String,
    pub value: String,
}

// POST /api/reminder/select
pub async fn select_reminder(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ReminderSelection>,
) -> SnapshotResult {
    state
        .run(Gesture::SelectReminder {
            event_id: payload.event_id,
            value: payload.value,
        })
        .await
        .map(Json)
}

// POST /api/events/:id/reminder/cancel
pub async fn cancel_reminder(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> SnapshotResult {
    state.run(Gesture::CancelReminder(event_id)).await.map(Json)
}

// POST /api/view/toggle
pub async fn toggle_view(State(state): State<Arc<AppState>>) -> SnapshotResult {
    state.run(Gesture::ToggleView).await.map(Json)
}
