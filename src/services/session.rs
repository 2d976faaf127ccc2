use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::watch;

use crate::models::{
    ChatMessage, ConfirmationData, CustomerEvent, MessageBody, MessageKind, ReminderOptionSet,
    RescheduleState, SessionSnapshot, Transcript, ViewMode,
};
use crate::services::ai::{ChatSession, LlmProvider};

pub const RESCHEDULE_CANCELLED: &str =
    "Okay, the rescheduling has been cancelled. Your appointment is unchanged.";

/// Everything one customer conversation owns. Mutations publish a fresh
/// [`SessionSnapshot`] to subscribers.
pub struct Session {
    transcript: Transcript,
    events: Vec<CustomerEvent>,
    view: ViewMode,
    loading: bool,
    reschedule: RescheduleState,
    chat: Option<ChatSession>,
    updates: watch::Sender<SessionSnapshot>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let (updates, _) = watch::channel(SessionSnapshot::default());
        Self {
            transcript: Transcript::new(),
            events: Vec::new(),
            view: ViewMode::Chat,
            loading: false,
            reschedule: RescheduleState::Idle,
            chat: None,
            updates,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            transcript: self.transcript.snapshot(),
            events: self.events.clone(),
            view: self.view,
            loading: self.loading,
            reschedule: self.reschedule.clone(),
        }
    }

    fn publish(&self) {
        self.updates.send_replace(self.snapshot());
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn events(&self) -> &[CustomerEvent] {
        &self.events
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn reschedule(&self) -> &RescheduleState {
        &self.reschedule
    }

    pub fn pending_target(&self) -> Option<&str> {
        self.reschedule.pending_target()
    }

    /// The model conversation, started on first use and kept for the session's life.
    pub fn chat(&mut self, llm: &Arc<dyn LlmProvider>) -> &mut ChatSession {
        self.chat
            .get_or_insert_with(|| ChatSession::start(Arc::clone(llm)))
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.view = view;
        self.publish();
    }

    pub fn toggle_view(&mut self) -> ViewMode {
        self.set_view(self.view.toggled());
        self.view
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.publish();
    }

    pub(crate) fn set_reschedule(&mut self, state: RescheduleState) {
        tracing::debug!(from = self.reschedule.as_str(), to = state.as_str(), "reschedule transition");
        self.reschedule = state;
        self.publish();
    }

    pub(crate) fn append(&mut self, message: ChatMessage) {
        self.transcript.push(message);
        self.publish();
    }

    pub(crate) fn remove_message(&mut self, id: &str) {
        if self.transcript.remove_id(id) {
            self.publish();
        }
    }

    pub(crate) fn remove_kind(&mut self, kind: MessageKind) {
        if self.transcript.remove_kind(kind) {
            self.publish();
        }
    }

    pub(crate) fn set_events(&mut self, events: Vec<CustomerEvent>) {
        self.events = events;
        self.publish();
    }

    pub(crate) fn replace_event(&mut self, updated: CustomerEvent) {
        self.events = self
            .events
            .iter()
            .map(|e| if e.id == updated.id { updated.clone() } else { e.clone() })
            .collect();
        self.publish();
    }

    /// Picks a (date, time) for the pending reschedule and asks the user to
    /// confirm it. Returns false, changing nothing, when there is no pending
    /// target or it names an event this session has never seen.
    pub fn select_slot(&mut self, date: NaiveDate, time: &str) -> bool {
        let Some(target) = self.pending_target().map(str::to_owned) else {
            tracing::debug!("slot selected with no reschedule pending");
            return false;
        };

        let old_event = self
            .events
            .iter()
            .find(|e| e.id == target)
            .or_else(|| self.transcript.find_listed_event(&target))
            .cloned();
        let Some(old_event) = old_event else {
            tracing::warn!(event_id = %target, "pending reschedule target not found");
            return false;
        };

        let confirmation = ConfirmationData {
            old_event,
            new_date: date,
            new_time: time.to_string(),
        };
        self.remove_kind(MessageKind::DateOptions);
        self.append(ChatMessage::bot(MessageBody::Confirmation {
            confirmation: confirmation.clone(),
        }));
        self.set_reschedule(RescheduleState::AwaitingConfirmation { confirmation });
        true
    }

    pub fn cancel_reschedule(&mut self) -> bool {
        if !matches!(self.reschedule, RescheduleState::AwaitingConfirmation { .. }) {
            return false;
        }
        self.remove_kind(MessageKind::Confirmation);
        self.append(ChatMessage::bot_text(RESCHEDULE_CANCELLED));
        self.set_reschedule(RescheduleState::Idle);
        true
    }

    pub fn offer_reminder(&mut self, event_id: &str) {
        self.set_view(ViewMode::Chat);
        self.append(ChatMessage::bot(MessageBody::ReminderOptions {
            reminder: ReminderOptionSet::standard(event_id),
        }));
    }
}
