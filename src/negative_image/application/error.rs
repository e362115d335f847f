use thiserror::Error;
use axum::extract::multipart::MultipartError;
use crate::domain::error::DomainError; // ドメインエラーをラップするため
use crate::infrastructure::error::InfrastructureError; // InfrastructureError をラップするため

pub const PROCESSING_FAILED_MESSAGE: &str = "Processing error or invalid image format";

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("No file provided")]
    MissingFile,

    // 反転に失敗した (デコード不可・未対応チャンネル数・エンコード不可)
    #[error("Processing error or invalid image format: {0}")]
    ProcessingFailed(#[source] InfrastructureError),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Domain error occurred: {0}")]
    DomainError(#[from] DomainError),

    #[error("Infrastructure error occurred: {0}")]
    InfrastructureError(#[from] InfrastructureError),

    #[error("Underlying error: {source:?}")]
    AnyhowError {
        #[from]
        source: anyhow::Error,
    },
}

// IntoResponse implementation for ApplicationError
use axum::response::{IntoResponse, Response};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApplicationError::MissingFile => (StatusCode::BAD_REQUEST, "No file provided".to_string()),
            ApplicationError::ProcessingFailed(cause) => {
                log::warn!("processing failed: {}", cause);
                (StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED_MESSAGE.to_string())
            }
            ApplicationError::Multipart(multipart_err) => {
                log::warn!("multipart rejected: {}", multipart_err);
                (multipart_err.status(), multipart_err.body_text())
            }
            ApplicationError::DomainError(domain_err) => match domain_err {
                DomainError::InvalidFileType(_) => (StatusCode::BAD_REQUEST, "Invalid file type".to_string()),
                DomainError::UnsupportedFormat { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED_MESSAGE.to_string())
                }
            },
            ApplicationError::InfrastructureError(InfrastructureError::TaskFailed(cause)) => {
                log::error!("blocking task failed: {}", cause);
                (StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED_MESSAGE.to_string())
            }
            ApplicationError::InfrastructureError(infra_err) => {
                log::error!("InfrastructureError: {:?}", infra_err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to store image".to_string())
            }
            ApplicationError::AnyhowError { source } => {
                log::error!("Unhandled AnyhowError: {:?}", source);
                (StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred.".to_string())
            }
        };
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
