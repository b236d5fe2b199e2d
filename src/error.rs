//! Custom error types for the analyst
//!
//! Every failure the analyst can hit is one of these. The public analysis
//! operations never return them directly; they are folded into the
//! `{"error": ...}` mapping by [`crate::analyst::AnalystResponse`].

use async_openai::error::OpenAIError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalystError {
    /// No credential was found at construction time
    #[error("AI Service Disabled")]
    Disabled,

    #[error("LLM API error: {0}")]
    Api(#[from] OpenAIError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Failed to parse model response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid {field} in model response: {value}")]
    InvalidField { field: &'static str, value: String },

    #[error("Config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl AnalystError {
    pub fn invalid_field(field: &'static str, value: impl ToString) -> Self {
        AnalystError::InvalidField {
            field,
            value: value.to_string(),
        }
    }
}
