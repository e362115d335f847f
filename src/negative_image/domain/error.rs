use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unsupported format: {channels}-channel image ({detail})")]
    UnsupportedFormat { channels: u8, detail: String },

    #[error("Invalid file type: {0}")]
    InvalidFileType(String),
}
