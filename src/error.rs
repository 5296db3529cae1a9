//! Error types for the dashboard core
//!
//! Gateway errors are classified by recoverability so callers can layer
//! their own retry policy:
//! - Retryable: transport failures, timeouts, 429/408/5xx responses
//! - NonRetryable: other HTTP statuses, malformed envelopes, unsupported operations

use std::path::PathBuf;
use thiserror::Error;

/// Any failure talking to the remote record store.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Record store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response envelope missing '{0}' key")]
    Envelope(&'static str),

    #[error("Failed to decode record payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{operation} is not supported for {kind}")]
    Unsupported {
        operation: &'static str,
        kind: crate::record::RecordKind,
    },
}

impl GatewayError {
    /// Returns true if a caller-side retry may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Transport(e) => e.is_timeout() || e.is_connect(),
            GatewayError::Status { status, .. } => {
                *status == 429 || *status == 408 || (500..600).contains(status)
            }
            _ => false,
        }
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            GatewayError::Transport(_) => "Check your network connection and try again.",
            GatewayError::Status { status, .. } if *status == 401 || *status == 403 => {
                "Sign in to the record store again."
            }
            GatewayError::Status { .. } => "The record store rejected the request. Try again later.",
            GatewayError::Envelope(_) | GatewayError::Decode(_) => {
                "The record store returned an unexpected response."
            }
            GatewayError::InvalidUrl(_) => {
                "Check instanceUrl in ~/.advisor-dashboard/config.json"
            }
            GatewayError::Unsupported { .. } => "This record type cannot be changed here.",
        }
    }
}

/// A field value the editor refuses to stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field name must not be empty")]
    EmptyFieldName,

    #[error("'{value}' is not a valid {field}; expected one of: {}", .allowed.join(", "))]
    NotAnOption {
        field: String,
        value: String,
        allowed: Vec<&'static str>,
    },

    #[error("{field} cannot be edited")]
    Inert { field: String },
}

/// Errors from the detail editor state machine.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Record is not being edited")]
    NotEditing,

    #[error("Record has no {0} field")]
    MissingId(&'static str),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Save failed: {0}")]
    Save(#[from] GatewayError),
}

/// Errors loading or saving config.json
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not find home directory")]
    NoHomeDir,

    #[error("Config file not found at {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("instanceUrl is not a valid URL: {0}")]
    InvalidInstanceUrl(String),
}

/// Serializable error representation for a UI layer
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardError {
    pub message: String,
    pub error_type: ErrorType,
    pub can_retry: bool,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Retryable,
    NonRetryable,
    Validation,
}

impl From<&GatewayError> for DashboardError {
    fn from(err: &GatewayError) -> Self {
        let can_retry = err.is_retryable();
        DashboardError {
            message: err.to_string(),
            error_type: if can_retry {
                ErrorType::Retryable
            } else {
                ErrorType::NonRetryable
            },
            can_retry,
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}

impl From<&EditorError> for DashboardError {
    fn from(err: &EditorError) -> Self {
        match err {
            EditorError::Save(inner) => DashboardError::from(inner),
            other => DashboardError {
                message: other.to_string(),
                error_type: ErrorType::Validation,
                can_retry: false,
                recovery_suggestion: "Correct the highlighted field and save again.".to_string(),
            },
        }
    }
}
