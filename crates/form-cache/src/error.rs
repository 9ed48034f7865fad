//! Error types for the form cache

use crate::domain::RequestId;
use thiserror::Error;

/// Errors that can occur while tracking, sending or resolving forms
#[derive(Debug, Error)]
pub enum FormError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed response for form {id}: {reason}")]
    MalformedResponse { id: RequestId, reason: String },

    #[error("Too many pending forms: limit is {max}")]
    CapacityExceeded { max: usize },

    #[error("No free form id available")]
    IdSpaceExhausted,
}

/// Errors reported by the upstream transport
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("upstream channel closed")]
    ChannelClosed,

    #[error("upstream channel full")]
    Backpressure,

    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Configuration validation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid limit: {0}")]
    InvalidLimit(String),
}

/// Result alias used throughout the crate
pub type FormResult<T> = Result<T, FormError>;
