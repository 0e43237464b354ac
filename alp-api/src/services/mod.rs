//! Business logic behind the HTTP handlers

pub mod asset_summary;
pub mod course;
pub mod llm;
pub mod quiz;
pub mod summary;
pub mod transformer;
pub mod translation;

pub use llm::{GeminiClient, LlmError, TextGenerator};
