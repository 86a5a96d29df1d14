use crate::analyzer::summarize;
use crate::config::Config;
use crate::error::XmlAnalystError;
use crate::llm::{LlmFactory, Provider};
use crate::prompt::{compose_prompt, OutputFormat};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::task;

/// One analysis request, with enum fields still in their raw string form.
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub file: Vec<u8>,
    pub prompt: String,
    pub output_format: String,
    pub provider: String,
    pub model: Option<String>,
}

impl AnalyzeRequest {
    pub fn new(file: Vec<u8>, prompt: impl Into<String>) -> Self {
        AnalyzeRequest {
            file,
            prompt: prompt.into(),
            output_format: OutputFormat::default().to_string(),
            provider: Provider::default().to_string(),
            model: None,
        }
    }
}

/// Model text plus the download metadata derived from the requested format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOutput {
    pub text: String,
    pub format: OutputFormat,
}

impl AnalysisOutput {
    pub fn filename(&self) -> String {
        self.format.filename()
    }

    pub fn media_type(&self) -> &'static str {
        self.format.media_type()
    }

    pub fn content_disposition(&self) -> String {
        self.format.content_disposition()
    }
}

pub struct Orchestrator {
    config: Arc<Config>,
    llms: Arc<dyn LlmFactory>,
}

impl Orchestrator {
    pub fn new(config: Arc<Config>, llms: Arc<dyn LlmFactory>) -> Self {
        Orchestrator { config, llms }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// validate → summarize → compose → dispatch. The model output is returned
    /// as-is; it is not checked against the requested format.
    pub async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalysisOutput, XmlAnalystError> {
        let format: OutputFormat = request.output_format.parse()?;
        let provider: Provider = request.provider.parse()?;

        if request.file.is_empty() {
            warn!("Rejected request with empty upload");
            return Err(XmlAnalystError::InvalidRequest("Empty file".to_string()));
        }
        let instruction = request.prompt.trim();
        if instruction.is_empty() {
            warn!("Rejected request with empty prompt");
            return Err(XmlAnalystError::InvalidRequest(
                "prompt must not be empty".to_string(),
            ));
        }

        info!(
            "Analyzing {} byte upload with {} as {}",
            request.file.len(),
            provider,
            format
        );

        let options = self.config.get_summary_options();
        let file = request.file;
        let summary = task::spawn_blocking(move || summarize(&file, options))
            .await?
            .map_err(|e| match e {
                XmlAnalystError::ParseError(msg) => {
                    XmlAnalystError::InvalidRequest(format!("Invalid XML: {}", msg))
                }
                other => other,
            })?;

        let summary_text = summary.to_string();
        debug!("Summary is {} bytes", summary_text.len());
        let prompt = compose_prompt(instruction, &summary_text, format);

        let llm = self.llms.create(provider)?;
        let model = request
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| provider.default_model(&self.config))
            .to_string();

        let text = llm.generate_text(&prompt, &model).await?;
        info!("{} returned {} bytes for {}", provider, text.len(), format.filename());

        Ok(AnalysisOutput { text, format })
    }
}
