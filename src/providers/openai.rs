//! OpenAI chat completions provider.
//!
//! Speaks the `/chat/completions` endpoint with a `json_schema` response
//! format so the model is constrained to emit exactly one step object per
//! call. Works against any OpenAI-compatible base URL.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::scrub::api_error;
use super::traits::StepProvider;
use crate::agent::history::Message;
use crate::agent::protocol;

// ─────────────────────────────── Provider ───────────────────────────────

pub struct OpenAiProvider {
    cached_auth_header: String,
    endpoint: String,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        Self {
            cached_auth_header: format!("Bearer {api_key}"),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn build_request(messages: &[Message], model: &str, temperature: f64) -> ChatRequest {
        ChatRequest {
            model: model.to_string(),
            messages: messages
                .iter()
                .map(|m| WireMessage { role: m.role.as_str(), content: m.content.clone() })
                .collect(),
            temperature,
            response_format: ResponseFormat {
                r#type: "json_schema",
                json_schema: SchemaSpec {
                    name: "reasoning_step",
                    strict: true,
                    schema: protocol::step_schema(),
                },
            },
        }
    }

    async fn call_api(&self, request: &ChatRequest) -> anyhow::Result<ChatResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", &self.cached_auth_header)
            .json(request)
            .send()
            .await
            .context("OpenAI request failed")?;

        if !response.status().is_success() {
            return Err(api_error("OpenAI", response).await);
        }

        response
            .json::<ChatResponse>()
            .await
            .context("OpenAI response JSON decode failed")
    }

    fn extract_text(response: ChatResponse) -> anyhow::Result<String> {
        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("No response from OpenAI"))
    }
}

#[async_trait]
impl StepProvider for OpenAiProvider {
    async fn next_step(
        &self,
        messages: &[Message],
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String> {
        let request = Self::build_request(messages, model, temperature);
        let response = self.call_api(&request).await?;
        if let Some(usage) = &response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "chat completion usage"
            );
        }
        Self::extract_text(response)
    }
}

// ─────────────────────────────── Wire types ───────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f64,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: &'static str,
    json_schema: SchemaSpec,
}

#[derive(Debug, Serialize)]
struct SchemaSpec {
    name: &'static str,
    strict: bool,
    schema: Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

// ─────────────────────────────── Tests ───────────────────────────────
