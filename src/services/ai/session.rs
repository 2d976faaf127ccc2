use std::sync::Arc;

use super::tools::{self, FunctionDeclaration};
use super::{LlmProvider, Message, ModelReply};

pub const SYSTEM_PROMPT: &str = "You are a friendly and helpful assistant for a major telecom company. \
Your goal is to help customers manage their appointments and events. You can also set and cancel reminders. \
Be concise and clear. When a user wants to change a date, first get the available dates before asking them to choose one. \
When updating an event, you must provide the event ID, the new date, and the new time slot.";

/// One running conversation with the model: a fixed prompt and tool set plus
/// the turns exchanged so far.
pub struct ChatSession {
    llm: Arc<dyn LlmProvider>,
    tools: Vec<FunctionDeclaration>,
    history: Vec<Message>,
}

impl ChatSession {
    pub fn start(llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            llm,
            tools: tools::declarations(),
            history: Vec::new(),
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Sends one turn. A failed turn is not kept in the history.
    pub async fn send_message(&mut self, text: &str) -> anyhow::Result<ModelReply> {
        self.send(Message::user(text)).await
    }

    /// Reports the result of the function the model asked for.
    pub async fn send_function_result(
        &mut self,
        name: &str,
        response: serde_json::Value,
    ) -> anyhow::Result<ModelReply> {
        self.send(Message::function_result(name, response)).await
    }

    async fn send(&mut self, message: Message) -> anyhow::Result<ModelReply> {
        self.history.push(message);

        match self.llm.chat(SYSTEM_PROMPT, &self.history, &self.tools).await {
            Ok(reply) => {
                self.history.push(Message::assistant(&reply));
                Ok(reply)
            }
            Err(e) => {
                self.history.pop();
                Err(e)
            }
        }
    }
}
