pub mod gemini;
pub mod ollama;
pub mod session;
pub mod tools;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::errors::AppError;

pub use session::ChatSession;
pub use tools::{FunctionDeclaration, ToolCall};

/// A structured action requested by the model, before it is decoded into a [`ToolCall`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

/// The outcome of a function call, returned to the model on the next turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionResponse {
    pub name: String,
    pub response: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub function_calls: Vec<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
}

impl Message {
    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
            function_calls: Vec::new(),
            function_response: None,
        }
    }

    /// A user turn carrying a function result. `content` holds the same
    /// result as JSON text for providers without a structured form.
    pub fn function_result(name: &str, response: serde_json::Value) -> Self {
        Self {
            role: "user".to_string(),
            content: response.to_string(),
            function_calls: Vec::new(),
            function_response: Some(FunctionResponse {
                name: name.to_string(),
                response,
            }),
        }
    }

    pub fn assistant(reply: &ModelReply) -> Self {
        Self {
            role: "assistant".to_string(),
            content: reply.text.clone(),
            function_calls: reply.function_calls.clone(),
            function_response: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ModelReply {
    pub text: String,
    #[serde(default)]
    pub function_calls: Vec<FunctionCall>,
}

impl ModelReply {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            function_calls: Vec::new(),
        }
    }

    pub fn call(name: &str, args: serde_json::Value) -> Self {
        Self {
            text: String::new(),
            function_calls: vec![FunctionCall {
                name: name.to_string(),
                args,
            }],
        }
    }
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn chat(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[FunctionDeclaration],
    ) -> anyhow::Result<ModelReply>;
}

/// Picks the provider named by `LLM_PROVIDER`.
pub fn provider_from_config(config: &AppConfig) -> Result<Arc<dyn LlmProvider>, AppError> {
    match config.llm_provider.as_str() {
        "gemini" => {
            if config.gemini_api_key.is_empty() {
                return Err(AppError::Config(
                    "GEMINI_API_KEY must be set when LLM_PROVIDER=gemini".to_string(),
                ));
            }
            tracing::info!(model = %config.gemini_model, "using Gemini LLM provider");
            Ok(Arc::new(gemini::GeminiProvider::new(
                config.gemini_api_key.clone(),
                config.gemini_model.clone(),
            )))
        }
        "ollama" => {
            tracing::info!(url = %config.ollama_url, model = %config.ollama_model, "using Ollama LLM provider");
            Ok(Arc::new(ollama::OllamaProvider::new(
                config.ollama_url.clone(),
                config.ollama_model.clone(),
            )))
        }
        other => Err(AppError::Config(format!("unknown LLM_PROVIDER: {other}"))),
    }
}
