use serde::{Deserialize, Serialize};
use serde_json::json;

use super::FunctionCall;

pub const GET_CUSTOMER_EVENTS: &str = "get_customer_events";
pub const GET_AVAILABLE_DATES: &str = "get_available_dates";
pub const UPDATE_EVENT_DATE: &str = "update_event_date";
pub const SET_REMINDER: &str = "set_reminder";
pub const CANCEL_REMINDER: &str = "cancel_reminder";

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDeclaration {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON schema of the arguments object.
    pub parameters: serde_json::Value,
}

/// The five operations offered to the model, fixed for the life of a session.
pub fn declarations() -> Vec<FunctionDeclaration> {
    vec![
        FunctionDeclaration {
            name: GET_CUSTOMER_EVENTS,
            description: "Get the list of important upcoming events for the customer, like installation and billing dates.",
            parameters: json!({ "type": "object", "properties": {} }),
        },
        FunctionDeclaration {
            name: GET_AVAILABLE_DATES,
            description: "Get a list of available dates and times for rescheduling an event.",
            parameters: json!({ "type": "object", "properties": {} }),
        },
        FunctionDeclaration {
            name: UPDATE_EVENT_DATE,
            description: "Update the date and time of an event for the customer.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "eventId": { "type": "string", "description": "The ID of the event to update." },
                    "newDate": { "type": "string", "description": "The new date for the event, in YYYY-MM-DD format." },
                    "newTime": { "type": "string", "description": "The new time slot for the event, e.g., \"9:00 AM - 11:00 AM\"." }
                },
                "required": ["eventId", "newDate", "newTime"]
            }),
        },
        FunctionDeclaration {
            name: SET_REMINDER,
            description: "Set a reminder for an upcoming event.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "eventId": { "type": "string", "description": "The ID of the event for which to set a reminder." },
                    "reminderTime": { "type": "string", "description": "When to send the reminder, e.g., \"1_day_before\", \"2_days_before\"." }
                },
                "required": ["eventId", "reminderTime"]
            }),
        },
        FunctionDeclaration {
            name: CANCEL_REMINDER,
            description: "Cancel a previously set reminder for an event.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "eventId": { "type": "string", "description": "The ID of the event whose reminder should be cancelled." }
                },
                "required": ["eventId"]
            }),
        },
    ]
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventDateArgs {
    pub event_id: String,
    pub new_date: String,
    pub new_time: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetReminderArgs {
    pub event_id: String,
    pub reminder_time: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CancelReminderArgs {
    pub event_id: String,
}

/// A model function call decoded into one of the supported operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    GetCustomerEvents,
    GetAvailableDates,
    UpdateEventDate(UpdateEventDateArgs),
    SetReminder(SetReminderArgs),
    CancelReminder(CancelReminderArgs),
}

#[derive(Debug, thiserror::Error)]
pub enum ToolCallError {
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("invalid arguments for {name}: {source}")]
    InvalidArguments {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ToolCall {
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::GetCustomerEvents => GET_CUSTOMER_EVENTS,
            ToolCall::GetAvailableDates => GET_AVAILABLE_DATES,
            ToolCall::UpdateEventDate(_) => UPDATE_EVENT_DATE,
            ToolCall::SetReminder(_) => SET_REMINDER,
            ToolCall::CancelReminder(_) => CANCEL_REMINDER,
        }
    }

    /// Calls that already post their own chat messages, so the model's
    /// follow-up text would only repeat them.
    pub fn suppresses_follow_up(&self) -> bool {
        matches!(
            self,
            ToolCall::GetCustomerEvents | ToolCall::GetAvailableDates | ToolCall::UpdateEventDate(_)
        )
    }
}

fn decode_args<T: serde::de::DeserializeOwned>(
    name: &'static str,
    args: &serde_json::Value,
) -> Result<T, ToolCallError> {
    // Some providers send `null` instead of an empty object.
    let args = if args.is_null() { json!({}) } else { args.clone() };
    serde_json::from_value(args).map_err(|source| ToolCallError::InvalidArguments { name, source })
}

impl TryFrom<&FunctionCall> for ToolCall {
    type Error = ToolCallError;

    fn try_from(call: &FunctionCall) -> Result<Self, Self::Error> {
        match call.name.as_str() {
            GET_CUSTOMER_EVENTS => Ok(ToolCall::GetCustomerEvents),
            GET_AVAILABLE_DATES => Ok(ToolCall::GetAvailableDates),
            UPDATE_EVENT_DATE => Ok(ToolCall::UpdateEventDate(decode_args(
                UPDATE_EVENT_DATE,
                &call.args,
            )?)),
            SET_REMINDER => Ok(ToolCall::SetReminder(decode_args(SET_REMINDER, &call.args)?)),
            CANCEL_REMINDER => Ok(ToolCall::CancelReminder(decode_args(
                CANCEL_REMINDER,
                &call.args,
            )?)),
            other => Err(ToolCallError::UnknownFunction(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: serde_json::Value) -> FunctionCall {
        FunctionCall {
            name: name.to_string(),
            args,
        }
    }

    #[test]
    fn test_declarations_cover_every_call() {
        let names: Vec<&str> = declarations().iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec![GET_CUSTOMER_EVENTS, GET_AVAILABLE_DATES, UPDATE_EVENT_DATE, SET_REMINDER, CANCEL_REMINDER]
        );
    }

    #[test]
    fn test_decode_update_event_date() {
        let decoded = ToolCall::try_from(&call(
            UPDATE_EVENT_DATE,
            json!({"eventId": "evt_1", "newDate": "2024-02-01", "newTime": "9:00 AM - 11:00 AM"}),
        ))
        .unwrap();

        assert_eq!(
            decoded,
            ToolCall::UpdateEventDate(UpdateEventDateArgs {
                event_id: "evt_1".to_string(),
                new_date: "2024-02-01".to_string(),
                new_time: "9:00 AM - 11:00 AM".to_string(),
            })
        );
        assert!(decoded.suppresses_follow_up());
    }

    #[test]
    fn test_decode_argumentless_calls_accept_null_or_empty() {
        assert_eq!(
            ToolCall::try_from(&call(GET_CUSTOMER_EVENTS, serde_json::Value::Null)).unwrap(),
            ToolCall::GetCustomerEvents
        );
        assert_eq!(
            ToolCall::try_from(&call(GET_AVAILABLE_DATES, json!({}))).unwrap(),
            ToolCall::GetAvailableDates
        );
    }

    #[test]
    fn test_decode_missing_argument() {
        let err = ToolCall::try_from(&call(SET_REMINDER, json!({"eventId": "evt_1"}))).unwrap_err();
        assert!(matches!(err, ToolCallError::InvalidArguments { name: SET_REMINDER, .. }));
    }

    #[test]
    fn test_decode_unknown_function() {
        let err = ToolCall::try_from(&call("delete_account", json!({}))).unwrap_err();
        assert!(matches!(err, ToolCallError::UnknownFunction(ref n) if n == "delete_account"));
    }

    #[test]
    fn test_reminder_calls_keep_follow_up() {
        let set = ToolCall::try_from(&call(
            SET_REMINDER,
            json!({"eventId": "evt_1", "reminderTime": "1_day_before"}),
        ))
        .unwrap();
        let cancel = ToolCall::try_from(&call(CANCEL_REMINDER, json!({"eventId": "evt_1"}))).unwrap();

        assert!(!set.suppresses_follow_up());
        assert!(!cancel.suppresses_follow_up());
        assert_eq!(cancel.name(), CANCEL_REMINDER);
    }
}
