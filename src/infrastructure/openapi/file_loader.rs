//! Reads OpenAPI documents from disk

use async_trait::async_trait;
use openapiv3::OpenAPI;
use tokio::fs;

use super::parser::{DocumentFormat, OpenApiParser};
use crate::generation::{GenerationError, OpenApiLoader};

/// Reads a local file; the extension picks JSON or YAML
pub struct FileOpenApiLoader;

impl FileOpenApiLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileOpenApiLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OpenApiLoader for FileOpenApiLoader {
    async fn load(&self, source: &str) -> Result<OpenAPI, GenerationError> {
        let content = fs::read_to_string(source).await?;
        OpenApiParser::from_text(&content, DocumentFormat::detect(source, None))?.parse()
    }
}
