//! Error types for config binding and template rendering

use thiserror::Error;

/// Errors that can occur while building a prompt template config
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Malformed {format} input: {message}")]
    MalformedInput { format: &'static str, message: String },

    #[error("Type mismatch for field '{field}': {message}")]
    TypeMismatch { field: String, message: String },
}

impl ConfigError {
    pub(crate) fn malformed(format: &'static str, message: impl Into<String>) -> Self {
        ConfigError::MalformedInput {
            format,
            message: message.into(),
        }
    }

    pub(crate) fn mismatch(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::TypeMismatch {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Check if the input text could not be parsed
    pub fn is_malformed(&self) -> bool {
        matches!(self, ConfigError::MalformedInput { .. })
    }

    /// Check if a recognized field carried a value of the wrong kind
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, ConfigError::TypeMismatch { .. })
    }

    /// Name of the offending field, for type mismatches
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::TypeMismatch { field, .. } => Some(field),
            ConfigError::MalformedInput { .. } => None,
        }
    }
}

/// Errors that can occur while rendering a template
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Handlebars error: {0}")]
    Handlebars(#[from] handlebars::RenderError),

    #[error("Render context is not serializable: {0}")]
    Context(#[from] serde_json::Error),

    #[error("Template engine error: {0}")]
    Engine(String),
}
