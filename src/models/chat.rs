use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{AvailableSlot, CustomerEvent};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationData {
    pub old_event: CustomerEvent,
    pub new_date: NaiveDate,
    pub new_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReminderOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReminderOptionSet {
    pub event_id: String,
    pub options: Vec<ReminderOption>,
}

impl ReminderOptionSet {
    pub fn standard(event_id: &str) -> Self {
        let options = [
            ("1 day before", "1_day_before"),
            ("2 days before", "2_days_before"),
            ("1 hour before", "1_hour_before"),
        ]
        .into_iter()
        .map(|(label, value)| ReminderOption {
            label: label.to_string(),
            value: value.to_string(),
        })
        .collect();

        Self {
            event_id: event_id.to_string(),
            options,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    EventList,
    DateOptions,
    Loading,
    Confirmation,
    ReminderOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageBody {
    Text { content: String },
    EventList { events: Vec<CustomerEvent> },
    DateOptions { slots: Vec<AvailableSlot> },
    Loading,
    Confirmation { confirmation: ConfirmationData },
    ReminderOptions { reminder: ReminderOptionSet },
}

impl MessageBody {
    pub fn kind(&self) -> MessageKind {
        match self {
            MessageBody::Text { .. } => MessageKind::Text,
            MessageBody::EventList { .. } => MessageKind::EventList,
            MessageBody::DateOptions { .. } => MessageKind::DateOptions,
            MessageBody::Loading => MessageKind::Loading,
            MessageBody::Confirmation { .. } => MessageKind::Confirmation,
            MessageBody::ReminderOptions { .. } => MessageKind::ReminderOptions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub sender: Sender,
    #[serde(flatten)]
    pub body: MessageBody,
}

impl ChatMessage {
    pub fn new(sender: Sender, body: MessageBody) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender,
            body,
        }
    }

    pub fn user_text(content: impl Into<String>) -> Self {
        Self::new(Sender::User, MessageBody::Text { content: content.into() })
    }

    pub fn bot_text(content: impl Into<String>) -> Self {
        Self::new(Sender::Bot, MessageBody::Text { content: content.into() })
    }

    pub fn bot(body: MessageBody) -> Self {
        Self::new(Sender::Bot, body)
    }

    pub fn kind(&self) -> MessageKind {
        self.body.kind()
    }

    pub fn text(&self) -> Option<&str> {
        match &self.body {
            MessageBody::Text { content } => Some(content),
            _ => None,
        }
    }
}

/// Ordered chat log. Every change swaps in a new backing vector, so a snapshot
/// handed out earlier never changes underneath its holder.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Arc<Vec<ChatMessage>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn snapshot(&self) -> Arc<Vec<ChatMessage>> {
        Arc::clone(&self.messages)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push(&mut self, message: ChatMessage) {
        let mut next = Vec::with_capacity(self.messages.len() + 1);
        next.extend(self.messages.iter().cloned());
        next.push(message);
        self.messages = Arc::new(next);
    }

    pub fn remove_id(&mut self, id: &str) -> bool {
        self.retain(|m| m.id != id)
    }

    pub fn remove_kind(&mut self, kind: MessageKind) -> bool {
        self.retain(|m| m.kind() != kind)
    }

    pub fn count_kind(&self, kind: MessageKind) -> usize {
        self.messages.iter().filter(|m| m.kind() == kind).count()
    }

    /// Looks an event up among everything ever shown in an event list, oldest first.
    pub fn find_listed_event(&self, event_id: &str) -> Option<&CustomerEvent> {
        self.messages
            .iter()
            .filter_map(|m| match &m.body {
                MessageBody::EventList { events } => Some(events),
                _ => None,
            })
            .flatten()
            .find(|e| e.id == event_id)
    }

    fn retain(&mut self, keep: impl Fn(&ChatMessage) -> bool) -> bool {
        if self.messages.iter().all(&keep) {
            return false;
        }
        let next: Vec<ChatMessage> = self.messages.iter().filter(|&m| keep(m)).cloned().collect();
        self.messages = Arc::new(next);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str) -> CustomerEvent {
        CustomerEvent {
            id: id.to_string(),
            title: "Fiber WiFi Installation".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            time: None,
            description: String::new(),
            reminder_set: None,
        }
    }

    #[test]
    fn test_snapshot_is_not_affected_by_later_pushes() {
        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::user_text("hi"));
        let before = transcript.snapshot();

        transcript.push(ChatMessage::bot_text("hello"));

        assert_eq!(before.len(), 1);
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn test_remove_kind_only_drops_that_kind() {
        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::user_text("hi"));
        transcript.push(ChatMessage::bot(MessageBody::Loading));
        transcript.push(ChatMessage::bot_text("hello"));

        assert!(transcript.remove_kind(MessageKind::Loading));
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.count_kind(MessageKind::Loading), 0);
        assert!(!transcript.remove_kind(MessageKind::Loading));
    }

    #[test]
    fn test_remove_id() {
        let mut transcript = Transcript::new();
        let loading = ChatMessage::bot(MessageBody::Loading);
        let id = loading.id.clone();
        transcript.push(loading);
        transcript.push(ChatMessage::bot(MessageBody::Loading));

        assert!(transcript.remove_id(&id));
        assert_eq!(transcript.count_kind(MessageKind::Loading), 1);
    }

    #[test]
    fn test_find_listed_event_searches_history() {
        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::bot(MessageBody::EventList {
            events: vec![event("evt_1"), event("evt_2")],
        }));
        transcript.push(ChatMessage::bot_text("anything else?"));

        assert_eq!(transcript.find_listed_event("evt_2").map(|e| e.id.as_str()), Some("evt_2"));
        assert!(transcript.find_listed_event("evt_3").is_none());
    }

    #[test]
    fn test_message_wire_format() {
        let msg = ChatMessage::bot(MessageBody::ReminderOptions {
            reminder: ReminderOptionSet::standard("evt_1"),
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["sender"], "bot");
        assert_eq!(json["kind"], "reminder_options");
        assert_eq!(json["reminder"]["eventId"], "evt_1");
        assert_eq!(json["reminder"]["options"][2]["value"], "1_hour_before");

        let loading = serde_json::to_value(ChatMessage::bot(MessageBody::Loading)).unwrap();
        assert_eq!(loading["kind"], "loading");
    }
}
