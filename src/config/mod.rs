use crate::analyzer::SummaryOptions;
use crate::error::XmlAnalystError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-haiku-4-5";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Process-wide settings. Loaded once at startup and shared read-only.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openai_model: Option<String>,
    pub anthropic_model: Option<String>,
    pub custom_openai_url: Option<String>,
    pub custom_anthropic_url: Option<String>,
    pub max_sample_nodes: Option<usize>,
    pub top_n: Option<usize>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub max_upload_bytes: Option<usize>,
}

impl Config {
    /// Reads the TOML file at `path` (a missing file means all defaults),
    /// then applies environment overrides.
    pub fn load(path: &Path) -> Result<Self, XmlAnalystError> {
        let config = if path.exists() {
            let config_str = fs::read_to_string(path)?;
            toml::from_str::<Config>(&config_str).map_err(|e| {
                XmlAnalystError::ConfigError(format!("{}: {}", path.display(), e))
            })?
        } else {
            Config::default()
        };
        Ok(config.with_env_overrides())
    }

    pub fn with_env_overrides(mut self) -> Self {
        override_from_env(&mut self.openai_api_key, "OPENAI_API_KEY");
        override_from_env(&mut self.anthropic_api_key, "ANTHROPIC_API_KEY");
        override_from_env(&mut self.openai_model, "OPENAI_MODEL");
        override_from_env(&mut self.anthropic_model, "ANTHROPIC_MODEL");
        override_from_env(&mut self.custom_openai_url, "CUSTOM_OPENAI_URL");
        override_from_env(&mut self.custom_anthropic_url, "CUSTOM_ANTHROPIC_URL");
        self
    }

    pub fn openai_api_key(&self) -> Result<&str, XmlAnalystError> {
        required_key(&self.openai_api_key, "OPENAI_API_KEY")
    }

    pub fn anthropic_api_key(&self) -> Result<&str, XmlAnalystError> {
        required_key(&self.anthropic_api_key, "ANTHROPIC_API_KEY")
    }

    pub fn get_openai_model(&self) -> &str {
        self.openai_model.as_deref().unwrap_or(DEFAULT_OPENAI_MODEL)
    }

    pub fn get_anthropic_model(&self) -> &str {
        self.anthropic_model
            .as_deref()
            .unwrap_or(DEFAULT_ANTHROPIC_MODEL)
    }

    pub fn get_openai_url(&self) -> &str {
        self.custom_openai_url
            .as_deref()
            .unwrap_or(DEFAULT_OPENAI_URL)
    }

    pub fn get_anthropic_url(&self) -> &str {
        self.custom_anthropic_url
            .as_deref()
            .unwrap_or(DEFAULT_ANTHROPIC_URL)
    }

    pub fn get_summary_options(&self) -> SummaryOptions {
        let defaults = SummaryOptions::default();
        SummaryOptions {
            max_sample_nodes: self.max_sample_nodes.unwrap_or(defaults.max_sample_nodes),
            top_n: self.top_n.unwrap_or(defaults.top_n),
        }
    }

    pub fn get_host(&self) -> &str {
        self.host.as_deref().unwrap_or("127.0.0.1")
    }

    pub fn get_port(&self) -> u16 {
        self.port.unwrap_or(8000)
    }

    pub fn get_max_upload_bytes(&self) -> usize {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

fn override_from_env(slot: &mut Option<String>, var: &str) {
    if let Ok(value) = env::var(var) {
        if !value.trim().is_empty() {
            *slot = Some(value);
        }
    }
}

fn required_key<'a>(key: &'a Option<String>, name: &str) -> Result<&'a str, XmlAnalystError> {
    match key.as_deref().map(str::trim) {
        Some(k) if !k.is_empty() => Ok(k),
        _ => Err(XmlAnalystError::ConfigError(format!("{} is not set", name))),
    }
}
