pub mod channel_layout;
pub mod error;
pub mod image_processor_trait;
pub mod negative;
pub mod upload;
