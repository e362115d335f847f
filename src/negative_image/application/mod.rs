pub mod error;
pub mod negative_service;
