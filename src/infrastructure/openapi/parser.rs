//! OpenAPI document parsing
//!
//! Loaders only fetch text. This module turns it into a typed
//! `openapiv3::OpenAPI` document and rejects anything that is not OpenAPI 3.

use openapiv3::OpenAPI;
use serde_json::Value as JsonValue;

use crate::generation::GenerationError;

/// Serialization format of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    /// Try JSON first, then YAML
    Unknown,
}

impl DocumentFormat {
    /// Guesses the format from a content type and/or source path.
    pub fn detect(source: &str, content_type: Option<&str>) -> Self {
        let content_type = content_type.unwrap_or_default();
        if content_type.contains("json") || source.ends_with(".json") {
            DocumentFormat::Json
        } else if content_type.contains("yaml")
            || source.ends_with(".yaml")
            || source.ends_with(".yml")
        {
            DocumentFormat::Yaml
        } else {
            DocumentFormat::Unknown
        }
    }
}

/// Parses OpenAPI documents from text
#[derive(Debug)]
pub struct OpenApiParser {
    document: JsonValue,
}

impl OpenApiParser {
    /// Reads `content` in the given format.
    pub fn from_text(content: &str, format: DocumentFormat) -> Result<Self, GenerationError> {
        let document = match format {
            DocumentFormat::Json => {
                serde_json::from_str(content).map_err(GenerationError::SerializationError)?
            }
            DocumentFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| GenerationError::LoadError(format!("Failed to parse YAML: {e}")))?,
            DocumentFormat::Unknown => serde_json::from_str(content)
                .or_else(|_| serde_yaml::from_str(content))
                .map_err(|e| {
                    GenerationError::LoadError(format!("Failed to parse OpenAPI spec: {e}"))
                })?,
        };
        Ok(Self::new(document))
    }

    pub fn new(document: JsonValue) -> Self {
        Self { document }
    }

    /// Checks the version and converts to the typed document.
    pub fn parse(self) -> Result<OpenAPI, GenerationError> {
        let version = self
            .document
            .get("openapi")
            .and_then(JsonValue::as_str)
            .map(str::to_string);

        match version {
            Some(v) if v.starts_with("3.") => {}
            Some(v) => {
                return Err(GenerationError::LoadError(format!(
                    "Unsupported OpenAPI version {v}; only 3.x documents are supported"
                )));
            }
            None if self.document.get("swagger").is_some() => {
                return Err(GenerationError::LoadError(
                    "Swagger 2.0 documents are not supported; convert to OpenAPI 3.x".to_string(),
                ));
            }
            None => {
                return Err(GenerationError::LoadError(
                    "Document has no `openapi` version field".to_string(),
                ));
            }
        }

        serde_json::from_value(self.document)
            .map_err(|e| GenerationError::LoadError(format!("Invalid OpenAPI document: {e}")))
    }
}
