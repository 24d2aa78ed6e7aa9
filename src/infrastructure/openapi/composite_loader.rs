//! Picks the HTTP or file loader per source

use async_trait::async_trait;
use openapiv3::OpenAPI;
use tracing::debug;

use super::{FileOpenApiLoader, HttpOpenApiLoader};
use crate::generation::{GenerationError, OpenApiLoader};

/// Loads http(s) URLs over the network and everything else from disk
pub struct CompositeOpenApiLoader {
    http: HttpOpenApiLoader,
    file: FileOpenApiLoader,
}

impl CompositeOpenApiLoader {
    pub fn new() -> Self {
        Self {
            http: HttpOpenApiLoader::new(),
            file: FileOpenApiLoader::new(),
        }
    }
}

impl Default for CompositeOpenApiLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OpenApiLoader for CompositeOpenApiLoader {
    async fn load(&self, source: &str) -> Result<OpenAPI, GenerationError> {
        if HttpOpenApiLoader::handles(source) {
            debug!(source = %source, loader = "http", "Loading OpenAPI document");
            self.http.load(source).await
        } else {
            debug!(source = %source, loader = "file", "Loading OpenAPI document");
            self.file.load(source).await
        }
    }
}
