use thiserror::Error;
use crate::domain::error::DomainError; // 反転処理が UnsupportedFormat を返すため

#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("Image could not be decoded: {0}")]
    DecodeError(#[source] image::ImageError),

    #[error("Image could not be encoded: {0}")]
    EncodeError(#[source] image::ImageError),

    #[error("No image encoding matches {0}")]
    UnknownOutputFormat(String),

    #[error("File storage error: {0}")]
    FileStorageError(String),

    #[error("Underlying I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Blocking task failed: {0}")]
    TaskFailed(String),
}
