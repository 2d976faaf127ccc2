use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{ChatMessage, ConfirmationData, CustomerEvent};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Chat,
    Calendar,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Chat => ViewMode::Calendar,
            ViewMode::Calendar => ViewMode::Chat,
        }
    }
}

/// Where the reschedule negotiation stands. Every state except `Idle` carries
/// the pending target event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RescheduleState {
    #[default]
    Idle,
    AwaitingDateSelection {
        event_id: String,
    },
    AwaitingConfirmation {
        confirmation: ConfirmationData,
    },
    /// Confirmed by the user, waiting for the model to issue the update.
    Submitted {
        event_id: String,
    },
}

impl RescheduleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RescheduleState::Idle => "idle",
            RescheduleState::AwaitingDateSelection { .. } => "awaiting_date_selection",
            RescheduleState::AwaitingConfirmation { .. } => "awaiting_confirmation",
            RescheduleState::Submitted { .. } => "submitted",
        }
    }

    pub fn pending_target(&self) -> Option<&str> {
        match self {
            RescheduleState::Idle => None,
            RescheduleState::AwaitingDateSelection { event_id }
            | RescheduleState::Submitted { event_id } => Some(event_id),
            RescheduleState::AwaitingConfirmation { confirmation } => {
                Some(&confirmation.old_event.id)
            }
        }
    }
}

/// Read-only view of a session, published after every change.
#[derive(Debug, Clone, Serialize, Default)]
pub struct SessionSnapshot {
    pub transcript: Arc<Vec<ChatMessage>>,
    pub events: Vec<CustomerEvent>,
    pub view: ViewMode,
    pub loading: bool,
    pub reschedule: RescheduleState,
}
