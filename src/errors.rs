// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for deployment graph construction and rendering

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::{NetworkError, ValidationError};

/// Errors that can occur while building or rendering the deployment graph
///
/// Every variant is fatal to the render pass: there is no partial-success mode.
#[derive(Debug, Error)]
pub enum InfrastructureError {
    /// A required input is absent or invalid
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// A network value object failed validation
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// A graph or declaration invariant was violated
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Filesystem error while writing the assembly
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for infrastructure operations
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;

impl From<serde_json::Error> for InfrastructureError {
    fn from(err: serde_json::Error) -> Self {
        InfrastructureError::Serialization(err.to_string())
    }
}
