//! Generation gateway module for MV Director
//!
//! This module contains the generation gateway abstraction, the Gemini
//! implementation used in production, and a scripted fake for tests.

pub mod base;
pub mod fake;
pub mod gemini;

pub use base::GenerationGateway;
pub use fake::{FakeCall, FakeGateway};
pub use gemini::GeminiGateway;

use crate::config::GeminiConfig;
use crate::error::{MvDirectorError, Result};
use std::sync::Arc;

/// Create the production gateway from configuration
///
/// # Errors
///
/// Returns `MvDirectorError::Config` if no API key is configured, or an
/// error if the HTTP client cannot be built
pub fn create_gateway(config: &GeminiConfig) -> Result<Arc<dyn GenerationGateway>> {
    if config.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
        return Err(MvDirectorError::Config(
            "API key not set. Export GEMINI_API_KEY (or API_KEY) or set gemini.api_key".to_string(),
        )
        .into());
    }

    Ok(Arc::new(GeminiGateway::new(config.clone())?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_gateway_requires_api_key() {
        let config = GeminiConfig::default();
        let result = create_gateway(&config);
        assert!(result.is_err());
    }

    #[test]
    fn test_create_gateway_with_key() {
        let config = GeminiConfig {
            api_key: Some("test-key".to_string()),
            ..Default::default()
        };
        assert!(create_gateway(&config).is_ok());
    }
}
