pub mod availability;
pub mod chat;
pub mod conversation;
pub mod event;

pub use availability::AvailableSlot;
pub use chat::{
    ChatMessage, ConfirmationData, MessageBody, MessageKind, ReminderOption, ReminderOptionSet,
    Sender, Transcript,
};
pub use conversation::{RescheduleState, SessionSnapshot, ViewMode};
pub use event::{CustomerEvent, StoreResult};
