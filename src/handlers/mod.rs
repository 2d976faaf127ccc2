pub mod calendar;
pub mod chat;
pub mod health;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/session", get(chat::get_session))
        .route("/api/session/stream", get(chat::session_stream))
        .route("/api/messages", post(chat::send_message))
        .route("/api/events/:id/reschedule", post(chat::begin_reschedule))
        .route("/api/events/:id/reminder", post(chat::offer_reminder))
        .route("/api/events/:id/reminder/cancel", post(chat::cancel_reminder))
        .route("/api/reschedule/slot", post(chat::select_slot))
        .route("/api/reschedule/confirm", post(chat::confirm_reschedule))
        .route("/api/reschedule/cancel", post(chat::cancel_reschedule))
        .route("/api/reminder/select", post(chat::select_reminder))
        .route("/api/view/toggle", post(chat::toggle_view))
        .route("/api/calendar", get(calendar::get_calendar))
        .route("/calendar/:event_id", get(calendar::download_ics))
        .with_state(state)
}
