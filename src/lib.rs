pub mod analyzer;
pub mod config;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod prompt;
pub mod server;
pub mod summary;

pub use analyzer::{summarize, SummaryOptions};
pub use config::Config;
pub use error::XmlAnalystError;
pub use llm::LLM;
pub use orchestrator::{AnalysisOutput, AnalyzeRequest, Orchestrator};
pub use summary::Summary;
