use super::AppState;
use crate::error::XmlAnalystError;
use crate::orchestrator::AnalyzeRequest;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use serde_json::json;

impl IntoResponse for XmlAnalystError {
    fn into_response(self) -> Response {
        let status = match &self {
            XmlAnalystError::InvalidRequest(_) | XmlAnalystError::ParseError(_) => {
                StatusCode::BAD_REQUEST
            }
            XmlAnalystError::LlmError(_) => StatusCode::BAD_GATEWAY,
            XmlAnalystError::ConfigError(_)
            | XmlAnalystError::IoError(_)
            | XmlAnalystError::TaskJoinError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_client_error() {
            warn!("Rejected analyze request: {}", self);
        } else {
            error!("Analyze request failed: {}", self);
        }

        (status, Json(json!({ "detail": self.message() }))).into_response()
    }
}

fn multipart_error(err: MultipartError) -> XmlAnalystError {
    XmlAnalystError::InvalidRequest(format!("Malformed multipart body: {}", err.body_text()))
}

/// `POST /api/analyze`: form fields `file`, `prompt`, `output_format`,
/// `provider` and `model`.
pub async fn analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, XmlAnalystError> {
    let mut file: Option<Vec<u8>> = None;
    let mut prompt: Option<String> = None;
    let mut output_format: Option<String> = None;
    let mut provider: Option<String> = None;
    let mut model: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => file = Some(field.bytes().await.map_err(multipart_error)?.to_vec()),
            "prompt" => prompt = Some(field.text().await.map_err(multipart_error)?),
            "output_format" => output_format = Some(field.text().await.map_err(multipart_error)?),
            "provider" => provider = Some(field.text().await.map_err(multipart_error)?),
            "model" => model = Some(field.text().await.map_err(multipart_error)?),
            _ => {}
        }
    }

    let file = file
        .ok_or_else(|| XmlAnalystError::InvalidRequest("file is required".to_string()))?;
    let prompt = prompt
        .ok_or_else(|| XmlAnalystError::InvalidRequest("prompt is required".to_string()))?;

    let mut request = AnalyzeRequest::new(file, prompt);
    if let Some(output_format) = output_format {
        request.output_format = output_format;
    }
    if let Some(provider) = provider {
        request.provider = provider;
    }
    request.model = model;

    let output = state.orchestrator.analyze(request).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, output.media_type().to_string()),
            (header::CONTENT_DISPOSITION, output.content_disposition()),
        ],
        output.text,
    )
        .into_response())
}
