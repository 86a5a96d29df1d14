use super::{calculate_tokens, log_performance};
use super::{Provider, LLM};
use crate::error::XmlAnalystError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Instant;

/// OpenAI Responses API backend.
pub struct OpenAI {
    api_key: String,
    client: Client,
    url: String,
}

impl OpenAI {
    pub fn new(api_key: &str, url: &str) -> Self {
        OpenAI {
            api_key: api_key.to_string(),
            client: Client::new(),
            url: url.trim_end_matches('/').to_string(),
        }
    }

    pub fn model_name(&self, model: &str) -> String {
        format!("OpenAI ({})", model)
    }
}

#[async_trait]
impl LLM for OpenAI {
    async fn generate_text(&self, prompt: &str, model: &str) -> Result<String, XmlAnalystError> {
        let start_time = Instant::now();
        let input_tokens = calculate_tokens(prompt);

        let response = self
            .client
            .post(format!("{}/responses", self.url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": model,
                "input": prompt,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(XmlAnalystError::LlmError(format!(
                "openai call failed with status {}: {}",
                status, body
            )));
        }

        let body: Value = response.json().await?;
        let output = extract_output_text(&body).ok_or_else(|| {
            XmlAnalystError::LlmError("openai response missing text content".to_string())
        })?;
        let output_tokens = calculate_tokens(&output);

        log_performance(&self.model_name(model), start_time, input_tokens, output_tokens);

        Ok(output)
    }

    fn provider(&self) -> Provider {
        Provider::OpenAI
    }
}

/// Returns the aggregated `output_text`, or joins the `output_text` parts of
/// every message item when the field is absent.
pub fn extract_output_text(body: &Value) -> Option<String> {
    if let Some(text) = body.get("output_text").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let output = body.get("output").and_then(Value::as_array)?;
    let mut found = false;
    let mut text = String::new();
    for item in output {
        let Some(content) = item.get("content").and_then(Value::as_array) else {
            continue;
        };
        for part in content {
            if part.get("type").and_then(Value::as_str) != Some("output_text") {
                continue;
            }
            if let Some(chunk) = part.get("text").and_then(Value::as_str) {
                text.push_str(chunk);
                found = true;
            }
        }
    }

    found.then_some(text)
}
