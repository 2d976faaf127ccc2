use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerEvent {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_set: Option<String>,
}

/// Outcome of a mutating event store call, in the shape handed back to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreResult {
    pub success: bool,
    pub updated_event: Option<CustomerEvent>,
}

impl StoreResult {
    pub fn updated(event: CustomerEvent) -> Self {
        Self {
            success: true,
            updated_event: Some(event),
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            updated_event: None,
        }
    }

    /// The updated event, only when the call succeeded.
    pub fn into_updated(self) -> Option<CustomerEvent> {
        if self.success {
            self.updated_event
        } else {
            None
        }
    }
}
