use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::{watch, Mutex};

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::SessionSnapshot;
use crate::services::dispatch::Dispatcher;
use crate::services::session::Session;

/// One user action against the session.
#[derive(Debug, Clone)]
pub enum Gesture {
    SendMessage(String),
    BeginReschedule(String),
    SelectSlot { date: NaiveDate, time: String },
    ConfirmReschedule,
    CancelReschedule,
    OfferReminder(String),
    SelectReminder { event_id: String, value: String },
    CancelReminder(String),
    ToggleView,
}

pub struct AppState {
    pub config: AppConfig,
    pub dispatcher: Dispatcher,
    pub session: Arc<Mutex<Session>>,
    pub snapshots: watch::Receiver<SessionSnapshot>,
}

impl AppState {
    pub fn new(config: AppConfig, dispatcher: Dispatcher, session: Session) -> Self {
        let snapshots = session.subscribe();
        Self {
            config,
            dispatcher,
            session: Arc::new(Mutex::new(session)),
            snapshots,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Runs a gesture to completion on its own task and returns the resulting
    /// snapshot. Gestures are handled one at a time; a second one while the
    /// first is still running is refused rather than queued. The task owns
    /// the session lock, so a caller that goes away mid-gesture does not cut
    /// the gesture short.
    pub async fn run(self: &Arc<Self>, gesture: Gesture) -> Result<SessionSnapshot, AppError> {
        let mut session = Arc::clone(&self.session)
            .try_lock_owned()
            .map_err(|_| AppError::Busy)?;
        let state = Arc::clone(self);

        tokio::spawn(async move {
            state.apply(&mut session, gesture).await?;
            Ok::<_, AppError>(session.snapshot())
        })
        .await?
    }

    async fn apply(&self, session: &mut Session, gesture: Gesture) -> Result<(), AppError> {
        match gesture {
            Gesture::SendMessage(text) => self.dispatcher.send_user_message(session, &text).await,
            Gesture::BeginReschedule(event_id) => {
                self.dispatcher.begin_reschedule(session, &event_id).await
            }
            Gesture::SelectSlot { date, time } => {
                if !session.select_slot(date, &time) {
                    tracing::info!(%date, "slot selection ignored");
                }
            }
            Gesture::ConfirmReschedule => {
                if !self.dispatcher.confirm_reschedule(session).await {
                    return Err(AppError::BadRequest(
                        "no reschedule awaiting confirmation".to_string(),
                    ));
                }
            }
            Gesture::CancelReschedule => {
                if !session.cancel_reschedule() {
                    return Err(AppError::BadRequest(
                        "no reschedule awaiting confirmation".to_string(),
                    ));
                }
            }
            Gesture::OfferReminder(event_id) => session.offer_reminder(&event_id),
            Gesture::SelectReminder { event_id, value } => {
                self.dispatcher
                    .select_reminder_option(session, &event_id, &value)
                    .await
            }
            Gesture::CancelReminder(event_id) => {
                self.dispatcher
                    .request_reminder_cancellation(session, &event_id)
                    .await
            }
            Gesture::ToggleView => {
                let view = session.toggle_view();
                tracing::debug!(?view, "view toggled");
            }
        }
        Ok(())
    }
}
