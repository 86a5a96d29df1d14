use super::{calculate_tokens, log_performance};
use super::{Provider, LLM};
use crate::error::XmlAnalystError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Instant;

pub const MAX_OUTPUT_TOKENS: u32 = 2048;
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API backend.
pub struct Anthropic {
    api_key: String,
    client: Client,
    url: String,
}

/// A typed block from a Messages API response. Anything that is not text
/// (images, tool use, thinking) lands in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

impl Anthropic {
    pub fn new(api_key: &str, url: &str) -> Self {
        Anthropic {
            api_key: api_key.to_string(),
            client: Client::new(),
            url: url.trim_end_matches('/').to_string(),
        }
    }

    pub fn model_name(&self, model: &str) -> String {
        format!("Anthropic ({})", model)
    }
}

#[async_trait]
impl LLM for Anthropic {
    async fn generate_text(&self, prompt: &str, model: &str) -> Result<String, XmlAnalystError> {
        let start_time = Instant::now();
        let input_tokens = calculate_tokens(prompt);

        let response = self
            .client
            .post(format!("{}/messages", self.url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&json!({
                "model": model,
                "max_tokens": MAX_OUTPUT_TOKENS,
                "messages": [
                    {"role": "user", "content": prompt}
                ]
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(XmlAnalystError::LlmError(format!(
                "anthropic call failed with status {}: {}",
                status, body
            )));
        }

        let bytes = response.bytes().await?;
        let message: MessageResponse = serde_json::from_slice(&bytes)?;
        let output = join_text_blocks(&message.content);
        let output_tokens = calculate_tokens(&output);

        log_performance(&self.model_name(model), start_time, input_tokens, output_tokens);

        Ok(output)
    }

    fn provider(&self) -> Provider {
        Provider::Anthropic
    }
}

/// Newline-joins the text blocks and trims the result; other blocks are dropped.
pub fn join_text_blocks(blocks: &[ContentBlock]) -> String {
    let parts: Vec<&str> = blocks
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            ContentBlock::Other => None,
        })
        .collect();
    parts.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_text_blocks_are_dropped() {
        let message: MessageResponse = serde_json::from_value(json!({
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "a"},
                {"type": "image", "source": {"type": "base64", "media_type": "image/png", "data": "AAAA"}},
                {"type": "text", "text": "b"}
            ],
            "stop_reason": "end_turn"
        }))
        .unwrap();

        assert_eq!(message.content.len(), 3);
        assert_eq!(message.content[1], ContentBlock::Other);
        assert_eq!(join_text_blocks(&message.content), "a\nb");
    }

    #[test]
    fn joined_text_is_trimmed() {
        let blocks = vec![
            ContentBlock::Text {
                text: "\n<rows>".to_string(),
            },
            ContentBlock::Text {
                text: "</rows>\n\n".to_string(),
            },
        ];
        assert_eq!(join_text_blocks(&blocks), "<rows>\n</rows>");
    }

    #[test]
    fn no_text_blocks_gives_empty_output() {
        assert_eq!(join_text_blocks(&[ContentBlock::Other]), "");
        assert_eq!(join_text_blocks(&[]), "");
    }
}
