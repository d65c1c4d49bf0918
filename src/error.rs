//! Error types for MV Director
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use crate::domain::{Purpose, WizardStep};
use thiserror::Error;

/// Main error type for MV Director operations
///
/// The variants mirror how a failure is treated by the workflow: validation
/// and transition errors are rejected before any remote call, generation
/// errors come back from the gateway, and storage errors are logged by the
/// persistence layer.
#[derive(Error, Debug)]
pub enum MvDirectorError {
    /// Missing or invalid user input, rejected before any remote call
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested action is not reachable from the current step
    #[error("Cannot {action} while at step {from}")]
    InvalidTransition {
        /// Step the session was at when the action was attempted
        from: WizardStep,
        /// Short description of the attempted action
        action: String,
    },

    /// Another call of the same purpose is still outstanding
    #[error("A {0} request is already in progress")]
    OperationInFlight(Purpose),

    /// Remote generation call failed or returned an unusable result
    #[error("Generation error: {0}")]
    Generation(String),

    /// Referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Persistence errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl MvDirectorError {
    /// Message suitable for the session's error slot
    ///
    /// Validation and generation errors carry text written for the user, so
    /// the category prefix is dropped for them.
    ///
    /// # Examples
    ///
    /// ```
    /// use mvdirector::error::MvDirectorError;
    ///
    /// let error = MvDirectorError::Validation("Please enter a song title.".to_string());
    /// assert_eq!(error.user_message(), "Please enter a song title.");
    /// ```
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::Generation(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Extract a user-readable message from any error produced by the crate
pub fn user_message(error: &anyhow::Error) -> String {
    match error.downcast_ref::<MvDirectorError>() {
        Some(e) => e.user_message(),
        None => error.to_string(),
    }
}

/// Result type alias for MV Director operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
