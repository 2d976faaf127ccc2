use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use super::{FunctionCall, FunctionDeclaration, LlmProvider, Message, ModelReply};

pub struct OllamaProvider {
    url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(url: String, model: String) -> Self {
        Self {
            url,
            model,
            client: reqwest::Client::new(),
        }
    }
}

fn to_message(msg: &Message) -> serde_json::Value {
    if let Some(result) = &msg.function_response {
        return json!({
            "role": "tool",
            "tool_name": result.name,
            "content": msg.content,
        });
    }

    let mut value = json!({
        "role": msg.role,
        "content": msg.content,
    });
    if !msg.function_calls.is_empty() {
        value["tool_calls"] = msg
            .function_calls
            .iter()
            .map(|call| json!({ "function": { "name": call.name, "arguments": call.args } }))
            .collect();
    }
    value
}

fn parse_reply(data: &serde_json::Value) -> anyhow::Result<ModelReply> {
    let message = data
        .get("message")
        .ok_or_else(|| anyhow::anyhow!("missing message in Ollama response"))?;

    let function_calls = message["tool_calls"]
        .as_array()
        .map(|calls| {
            calls
                .iter()
                .filter_map(|call| {
                    let function = call.get("function")?;
                    Some(FunctionCall {
                        name: function["name"].as_str()?.to_string(),
                        args: function.get("arguments").cloned().unwrap_or_default(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(ModelReply {
        text: message["content"].as_str().unwrap_or_default().to_string(),
        function_calls,
    })
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn chat(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[FunctionDeclaration],
    ) -> anyhow::Result<ModelReply> {
        let mut ollama_messages = vec![json!({
            "role": "system",
            "content": system_prompt,
        })];
        ollama_messages.extend(messages.iter().map(to_message));

        let ollama_tools: Vec<serde_json::Value> = tools
            .iter()
            .map(|tool| json!({ "type": "function", "function": tool }))
            .collect();

        let body = json!({
            "model": self.model,
            "messages": ollama_messages,
            "tools": ollama_tools,
            "stream": false,
        });

        let resp = self
            .client
            .post(format!("{}/api/chat", self.url))
            .json(&body)
            .send()
            .await
            .context("failed to call Ollama API")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse Ollama response")?;

        if !status.is_success() {
            anyhow::bail!("Ollama API error ({}): {}", status, data);
        }

        parse_reply(&data)
    }
}
