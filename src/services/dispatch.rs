use std::sync::Arc;

use serde::Serialize;

use crate::models::{
    AvailableSlot, ChatMessage, CustomerEvent, MessageBody, MessageKind, RescheduleState,
    StoreResult, ViewMode,
};
use crate::services::ai::{FunctionCall, LlmProvider, ToolCall};
use crate::services::event_store::EventStore;
use crate::services::session::Session;

pub const CONNECTION_APOLOGY: &str =
    "Sorry, I'm having trouble connecting right now. Please try again later.";
pub const SLOTS_INTRO: &str = "Here are the soonest available slots.";
pub const RESCHEDULED: &str = "Great! Your appointment has been successfully rescheduled.";
pub const RESCHEDULE_FAILED: &str =
    "Sorry, I was unable to update your appointment. Please try again.";
pub const REMINDER_SET: &str = "Your reminder has been set.";
pub const REMINDER_CANCELLED: &str = "Okay, I've cancelled the reminder.";
pub const RESCHEDULE_REQUEST: &str =
    "I'd like to reschedule my appointment. Can you show me available dates?";

/// Result of executing one function call, reported back to the model.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ToolResponse {
    Events { events: Vec<CustomerEvent> },
    Slots { slots: Vec<AvailableSlot> },
    Result { result: StoreResult },
}

#[derive(Serialize)]
struct ToolResultEnvelope<'a> {
    #[serde(rename = "toolResponse")]
    tool_response: &'a ToolResponse,
}

/// Reminder outcomes: a failure is logged but leaves the chat untouched.
fn post_updated_event(session: &mut Session, result: &StoreResult, notice: &str, event_id: &str) {
    match result.clone().into_updated() {
        Some(updated) => {
            session.replace_event(updated.clone());
            session.append(ChatMessage::bot_text(notice));
            session.append(ChatMessage::bot(MessageBody::EventList {
                events: vec![updated],
            }));
        }
        None => tracing::warn!(event_id, "reminder change rejected by event store"),
    }
}

/// Drives one session: forwards user turns to the model, executes the
/// function it asks for against the event store, and posts the results.
pub struct Dispatcher {
    llm: Arc<dyn LlmProvider>,
    store: Arc<dyn EventStore>,
}

impl Dispatcher {
    pub fn new(llm: Arc<dyn LlmProvider>, store: Arc<dyn EventStore>) -> Self {
        Self { llm, store }
    }

    /// Opens the model conversation, greets the customer by name and loads
    /// their events.
    pub async fn start_session(&self) -> anyhow::Result<Session> {
        let mut session = Session::new();
        session.set_loading(true);
        session.chat(&self.llm);

        let name = self.store.fetch_customer_name().await?;
        session.append(ChatMessage::bot_text(format!(
            "Hi, {name}! I'm your Telecom Assistant. How can I help you today? You can ask about your appointments or billing."
        )));

        let events = self.store.fetch_events().await?;
        session.set_events(events);
        session.set_loading(false);

        tracing::info!(customer = %name, "session started");
        Ok(session)
    }

    pub async fn send_user_message(&self, session: &mut Session, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        session.append(ChatMessage::user_text(text));
        let placeholder = ChatMessage::bot(MessageBody::Loading);
        let loading_id = placeholder.id.clone();
        session.set_loading(true);
        session.append(placeholder);

        if let Err(e) = self.converse(session, text, &loading_id).await {
            tracing::error!(error = %e, "error sending message");
            session.remove_message(&loading_id);
            session.append(ChatMessage::bot_text(CONNECTION_APOLOGY));
        }

        session.set_loading(false);
    }

    async fn converse(&self, session: &mut Session, text: &str, loading_id: &str) -> anyhow::Result<()> {
        let reply = session.chat(&self.llm).send_message(text).await?;

        match reply.function_calls.split_first() {
            Some((call, rest)) => {
                if !rest.is_empty() {
                    tracing::warn!(
                        honored = %call.name,
                        dropped = rest.len(),
                        "model returned several function calls, only the first is executed"
                    );
                }
                self.handle_function_call(session, call, loading_id).await
            }
            None => {
                session.remove_message(loading_id);
                session.append(ChatMessage::bot_text(reply.text));
                Ok(())
            }
        }
    }

    async fn handle_function_call(
        &self,
        session: &mut Session,
        call: &FunctionCall,
        loading_id: &str,
    ) -> anyhow::Result<()> {
        session.remove_message(loading_id);

        let tool_call = match ToolCall::try_from(call) {
            Ok(tool_call) => tool_call,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring function call");
                return Ok(());
            }
        };
        tracing::info!(function = tool_call.name(), "executing function call");

        let response = match &tool_call {
            ToolCall::GetCustomerEvents => {
                let events = self.store.fetch_events().await?;
                session.set_events(events.clone());
                session.append(ChatMessage::bot(MessageBody::EventList {
                    events: events.clone(),
                }));
                ToolResponse::Events { events }
            }
            ToolCall::GetAvailableDates => {
                let slots = self.store.fetch_available_slots().await?;
                session.append(ChatMessage::bot_text(SLOTS_INTRO));
                session.append(ChatMessage::bot(MessageBody::DateOptions {
                    slots: slots.clone(),
                }));
                ToolResponse::Slots { slots }
            }
            ToolCall::UpdateEventDate(args) => {
                let result = self
                    .store
                    .update_event_date(&args.event_id, &args.new_date, &args.new_time)
                    .await;
                session.set_reschedule(RescheduleState::Idle);
                let result = result?;

                match result.clone().into_updated() {
                    Some(updated) => {
                        session.replace_event(updated.clone());
                        session.append(ChatMessage::bot_text(RESCHEDULED));
                        session.append(ChatMessage::bot(MessageBody::EventList {
                            events: vec![updated],
                        }));
                    }
                    None => {
                        tracing::warn!(event_id = %args.event_id, "event date update rejected");
                        session.append(ChatMessage::bot_text(RESCHEDULE_FAILED));
                    }
                }
                ToolResponse::Result { result }
            }
            ToolCall::SetReminder(args) => {
                let result = self
                    .store
                    .set_reminder(&args.event_id, &args.reminder_time)
                    .await?;
                post_updated_event(session, &result, REMINDER_SET, &args.event_id);
                ToolResponse::Result { result }
            }
            ToolCall::CancelReminder(args) => {
                let result = self.store.cancel_reminder(&args.event_id).await?;
                post_updated_event(session, &result, REMINDER_CANCELLED, &args.event_id);
                ToolResponse::Result { result }
            }
        };

        self.send_tool_result(session, &tool_call, &response).await
    }

    async fn send_tool_result(
        &self,
        session: &mut Session,
        tool_call: &ToolCall,
        response: &ToolResponse,
    ) -> anyhow::Result<()> {
        let envelope = serde_json::to_value(ToolResultEnvelope {
            tool_response: response,
        })?;
        let reply = session
            .chat(&self.llm)
            .send_function_result(tool_call.name(), envelope)
            .await?;

        if !reply.function_calls.is_empty() {
            tracing::debug!(
                count = reply.function_calls.len(),
                "ignoring function calls in tool follow-up"
            );
        }

        let text = reply.text.trim();
        if !text.is_empty() && !tool_call.suppresses_follow_up() {
            session.append(ChatMessage::bot_text(text));
        }
        Ok(())
    }

    // ── Gestures ──

    pub async fn begin_reschedule(&self, session: &mut Session, event_id: &str) {
        if let Some(previous) = session.pending_target() {
            tracing::info!(previous, event_id, "replacing pending reschedule target");
        }
        session.set_view(ViewMode::Chat);
        session.set_reschedule(RescheduleState::AwaitingDateSelection {
            event_id: event_id.to_string(),
        });
        self.send_user_message(session, RESCHEDULE_REQUEST).await;
    }

    pub async fn confirm_reschedule(&self, session: &mut Session) -> bool {
        let RescheduleState::AwaitingConfirmation { confirmation } = session.reschedule().clone() else {
            return false;
        };

        session.remove_kind(MessageKind::Confirmation);
        session.set_reschedule(RescheduleState::Submitted {
            event_id: confirmation.old_event.id.clone(),
        });

        let message = format!(
            "Please reschedule event {} to {} at {}.",
            confirmation.old_event.id,
            confirmation.new_date.format("%Y-%m-%d"),
            confirmation.new_time
        );
        self.send_user_message(session, &message).await;
        true
    }

    pub async fn select_reminder_option(&self, session: &mut Session, event_id: &str, value: &str) {
        session.remove_kind(MessageKind::ReminderOptions);
        let message = format!("Set a reminder for event {event_id} {}.", value.replace('_', " "));
        self.send_user_message(session, &message).await;
    }

    pub async fn request_reminder_cancellation(&self, session: &mut Session, event_id: &str) {
        session.set_view(ViewMode::Chat);
        let message = format!("Please cancel the reminder for event {event_id}.");
        self.send_user_message(session, &message).await;
    }
}
