//! Data Transfer Objects for application layer

use crate::config::GeneratorConfig;
use crate::generation::GenerationReport;
use serde::Serialize;
use std::path::PathBuf;

/// Request to generate a typed client from one OpenAPI document
#[derive(Debug, Clone)]
pub struct GenerateClientRequest {
    /// File path or http(s) URL of the document
    pub schema_source: String,
    pub config: GeneratorConfig,
}

impl GenerateClientRequest {
    pub fn validate(&self) -> Result<(), crate::application::ValidationError> {
        if self.schema_source.trim().is_empty() {
            return Err(crate::application::ValidationError::EmptySchemaSource);
        }

        if self.config.base_path.as_os_str().is_empty() {
            return Err(crate::application::ValidationError::MissingField(
                "base_path".to_string(),
            ));
        }

        if self.config.verbs.is_empty() {
            return Err(crate::application::ValidationError::InvalidConfiguration(
                "at least one HTTP verb must be enabled".to_string(),
            ));
        }

        Ok(())
    }
}

/// A class left out of the run
#[derive(Debug, Clone, Serialize)]
pub struct ClassFailure {
    pub source: String,
    pub message: String,
}

/// Response from client generation
#[derive(Debug, Clone, Serialize)]
pub struct GenerateClientResponse {
    /// Fully-qualified names of the emitted classes
    pub generated: Vec<String>,
    pub failures: Vec<ClassFailure>,
    pub files_written: usize,
    pub output_path: PathBuf,
}

impl GenerateClientResponse {
    pub(crate) fn new(report: GenerationReport, files_written: usize, output_path: PathBuf) -> Self {
        Self {
            generated: report.generated,
            failures: report
                .failures
                .into_iter()
                .map(|failure| ClassFailure {
                    source: failure.source,
                    message: failure.error.to_string(),
                })
                .collect(),
            files_written,
            output_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ValidationError;
    use crate::generation::{GenerationError, GenerationFailure};

    fn request() -> GenerateClientRequest {
        GenerateClientRequest {
            schema_source: "openapi.yaml".to_string(),
            config: GeneratorConfig::default(),
        }
    }

    #[test]
    fn test_generate_client_request_validation() {
        assert!(request().validate().is_ok());

        let mut invalid = request();
        invalid.schema_source = "  ".to_string();
        assert!(matches!(
            invalid.validate().unwrap_err(),
            ValidationError::EmptySchemaSource
        ));

        let mut invalid = request();
        invalid.config.base_path = PathBuf::new();
        assert!(matches!(
            invalid.validate().unwrap_err(),
            ValidationError::MissingField(_)
        ));

        let mut invalid = request();
        invalid.config.verbs.clear();
        assert!(matches!(
            invalid.validate().unwrap_err(),
            ValidationError::InvalidConfiguration(_)
        ));
    }

    #[test]
    fn test_response_flattens_failures() {
        let report = GenerationReport {
            generated: vec!["api::Widgets".to_string()],
            failures: vec![GenerationFailure {
                source: "/gadgets".to_string(),
                error: GenerationError::generator("no usable operations"),
            }],
        };

        let response = GenerateClientResponse::new(report, 3, PathBuf::from("out"));
        assert_eq!(response.generated, ["api::Widgets"]);
        assert_eq!(response.failures[0].source, "/gadgets");
        assert!(response.failures[0].message.contains("no usable operations"));
        assert_eq!(response.files_written, 3);
    }
}
