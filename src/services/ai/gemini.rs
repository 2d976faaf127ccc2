use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use super::{FunctionCall, FunctionDeclaration, LlmProvider, Message, ModelReply};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }
}

/// Gemini spells schema types in upper case (`OBJECT`, `STRING`).
fn gemini_schema(schema: &serde_json::Value) -> serde_json::Value {
    match schema {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(key, value)| {
                let value = match (key.as_str(), value) {
                    ("type", serde_json::Value::String(t)) => json!(t.to_uppercase()),
                    _ => gemini_schema(value),
                };
                (key.clone(), value)
            })
            .collect::<serde_json::Map<_, _>>()
            .into(),
        serde_json::Value::Array(items) => items.iter().map(gemini_schema).collect(),
        other => other.clone(),
    }
}

fn to_content(msg: &Message) -> serde_json::Value {
    if let Some(result) = &msg.function_response {
        return json!({
            "role": "user",
            "parts": [{ "functionResponse": { "name": result.name, "response": result.response } }],
        });
    }

    let role = if msg.role == "assistant" { "model" } else { "user" };

    let mut parts = Vec::new();
    if !msg.content.is_empty() {
        parts.push(json!({ "text": msg.content }));
    }
    for call in &msg.function_calls {
        parts.push(json!({ "functionCall": { "name": call.name, "args": call.args } }));
    }
    if parts.is_empty() {
        parts.push(json!({ "text": "" }));
    }

    json!({ "role": role, "parts": parts })
}

fn parse_reply(data: &serde_json::Value) -> anyhow::Result<ModelReply> {
    let parts = data["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| anyhow::anyhow!("missing content parts in Gemini response"))?;

    let mut reply = ModelReply::default();
    for part in parts {
        if let Some(text) = part["text"].as_str() {
            reply.text.push_str(text);
        }
        if let Some(call) = part.get("functionCall") {
            let call: FunctionCall = serde_json::from_value(call.clone())
                .context("malformed functionCall part in Gemini response")?;
            reply.function_calls.push(call);
        }
    }
    Ok(reply)
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn chat(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[FunctionDeclaration],
    ) -> anyhow::Result<ModelReply> {
        let declarations: Vec<serde_json::Value> = tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": gemini_schema(&tool.parameters),
                })
            })
            .collect();

        let body = json!({
            "systemInstruction": { "parts": [{ "text": system_prompt }] },
            "contents": messages.iter().map(to_content).collect::<Vec<_>>(),
            "tools": [{ "functionDeclarations": declarations }],
        });

        let resp = self
            .client
            .post(format!("{API_BASE}/models/{}:generateContent", self.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("failed to call Gemini API")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse Gemini response")?;

        if !status.is_success() {
            anyhow::bail!("Gemini API error ({}): {}", status, data);
        }

        parse_reply(&data)
    }
}
