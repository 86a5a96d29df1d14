mod anthropic;
mod openai;

pub use anthropic::{Anthropic, ContentBlock};
pub use openai::OpenAI;

use crate::config::Config;
use crate::error::XmlAnalystError;
use async_trait::async_trait;
use log::info;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

/// A text-in/text-out model backend.
#[async_trait]
pub trait LLM: Send + Sync {
    async fn generate_text(&self, prompt: &str, model: &str) -> Result<String, XmlAnalystError>;
    fn provider(&self) -> Provider;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    OpenAI,
    Anthropic,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Anthropic => "anthropic",
        }
    }

    /// Model used when a request does not name one.
    pub fn default_model<'a>(&self, config: &'a Config) -> &'a str {
        match self {
            Provider::OpenAI => config.get_openai_model(),
            Provider::Anthropic => config.get_anthropic_model(),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = XmlAnalystError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "anthropic" => Ok(Provider::Anthropic),
            _ => Err(XmlAnalystError::InvalidRequest(
                "provider must be openai or anthropic".to_string(),
            )),
        }
    }
}

/// Hands out a backend for a provider. The orchestrator only talks to this.
pub trait LlmFactory: Send + Sync {
    fn create(&self, provider: Provider) -> Result<Box<dyn LLM>, XmlAnalystError>;
}

/// Builds real HTTP backends from the process configuration.
pub struct ConfiguredLlms {
    config: Arc<Config>,
}

impl ConfiguredLlms {
    pub fn new(config: Arc<Config>) -> Self {
        ConfiguredLlms { config }
    }
}

impl LlmFactory for ConfiguredLlms {
    fn create(&self, provider: Provider) -> Result<Box<dyn LLM>, XmlAnalystError> {
        get_llm(provider, &self.config)
    }
}

pub fn calculate_tokens(text: &str) -> usize {
    // Rough whitespace count; good enough for throughput logging.
    text.split_whitespace().count()
}

pub fn log_performance(
    model: &str,
    start_time: Instant,
    input_tokens: usize,
    output_tokens: usize,
) {
    let duration = start_time.elapsed();
    let total_tokens = input_tokens + output_tokens;
    let tokens_per_second = total_tokens as f64 / duration.as_secs_f64();

    info!(
        "{} - Total duration: {:?}, Input tokens: {}, Output tokens: {}, Total tokens: {}, Tokens per second: {:.2}",
        model, duration, input_tokens, output_tokens, total_tokens, tokens_per_second
    );
}

/// Credentials are checked here so a missing key fails before any request is sent.
pub fn get_llm(provider: Provider, config: &Config) -> Result<Box<dyn LLM>, XmlAnalystError> {
    match provider {
        Provider::OpenAI => {
            let api_key = config.openai_api_key()?;
            Ok(Box::new(OpenAI::new(api_key, config.get_openai_url())))
        }
        Provider::Anthropic => {
            let api_key = config.anthropic_api_key()?;
            Ok(Box::new(Anthropic::new(api_key, config.get_anthropic_url())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_providers() {
        assert_eq!("openai".parse::<Provider>().unwrap(), Provider::OpenAI);
        assert_eq!("Anthropic".parse::<Provider>().unwrap(), Provider::Anthropic);
        match "gemini".parse::<Provider>() {
            Err(XmlAnalystError::InvalidRequest(msg)) => {
                assert_eq!(msg, "provider must be openai or anthropic")
            }
            other => panic!("expected invalid request, got {:?}", other),
        }
    }

    #[test]
    fn missing_credentials_fail_before_building_a_client() {
        let config = Config::default();
        for provider in [Provider::OpenAI, Provider::Anthropic] {
            match get_llm(provider, &config) {
                Err(XmlAnalystError::ConfigError(msg)) => assert!(msg.ends_with("is not set")),
                Err(other) => panic!("expected config error, got {:?}", other),
                Ok(_) => panic!("expected config error for {}", provider),
            }
        }
    }

    #[test]
    fn builds_backend_for_configured_provider() {
        let config = Config {
            anthropic_api_key: Some("sk-ant-test".to_string()),
            ..Config::default()
        };
        let llm = get_llm(Provider::Anthropic, &config).unwrap();
        assert_eq!(llm.provider(), Provider::Anthropic);
        assert!(get_llm(Provider::OpenAI, &config).is_err());
    }

    #[test]
    fn default_models_come_from_config() {
        let config = Config {
            openai_model: Some("gpt-custom".to_string()),
            ..Config::default()
        };
        assert_eq!(Provider::OpenAI.default_model(&config), "gpt-custom");
        assert_eq!(Provider::Anthropic.default_model(&config), "claude-haiku-4-5");
    }

    #[test]
    fn token_estimate_counts_words() {
        assert_eq!(calculate_tokens("a b\n c\t d"), 4);
        assert_eq!(calculate_tokens(""), 0);
    }
}
