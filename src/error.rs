use std::fmt;

#[derive(Debug)]
pub enum XmlAnalystError {
    IoError(std::io::Error),
    ConfigError(String),
    InvalidRequest(String),
    ParseError(String),
    LlmError(String),
    TaskJoinError(String),
}

impl std::error::Error for XmlAnalystError {}

impl fmt::Display for XmlAnalystError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            XmlAnalystError::IoError(err) => write!(f, "IO error: {}", err),
            XmlAnalystError::ConfigError(err) => write!(f, "Configuration error: {}", err),
            XmlAnalystError::InvalidRequest(err) => write!(f, "Invalid request: {}", err),
            XmlAnalystError::ParseError(err) => write!(f, "XML parse error: {}", err),
            XmlAnalystError::LlmError(err) => write!(f, "LLM error: {}", err),
            XmlAnalystError::TaskJoinError(err) => write!(f, "TaskJoin error: {}", err),
        }
    }
}

impl XmlAnalystError {
    /// The bare message, without the variant prefix used by `Display`.
    pub fn message(&self) -> String {
        match self {
            XmlAnalystError::IoError(err) => err.to_string(),
            XmlAnalystError::ConfigError(msg)
            | XmlAnalystError::InvalidRequest(msg)
            | XmlAnalystError::ParseError(msg)
            | XmlAnalystError::LlmError(msg)
            | XmlAnalystError::TaskJoinError(msg) => msg.clone(),
        }
    }
}

impl From<serde_json::Error> for XmlAnalystError {
    fn from(err: serde_json::Error) -> Self {
        XmlAnalystError::LlmError(format!("unexpected response body: {}", err))
    }
}

impl From<reqwest::Error> for XmlAnalystError {
    fn from(err: reqwest::Error) -> Self {
        XmlAnalystError::LlmError(err.to_string())
    }
}

impl From<toml::de::Error> for XmlAnalystError {
    fn from(err: toml::de::Error) -> Self {
        XmlAnalystError::ConfigError(err.to_string())
    }
}

impl From<std::io::Error> for XmlAnalystError {
    fn from(err: std::io::Error) -> Self {
        XmlAnalystError::IoError(err)
    }
}

impl From<tokio::task::JoinError> for XmlAnalystError {
    fn from(err: tokio::task::JoinError) -> Self {
        XmlAnalystError::TaskJoinError(err.to_string())
    }
}
