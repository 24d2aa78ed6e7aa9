//! Port interfaces for the generation domain

use async_trait::async_trait;
use openapiv3::OpenAPI;

use crate::generation::{GeneratedClass, GenerationError, MapperSettings, NamespaceIndex};

/// Loads OpenAPI specifications
#[async_trait]
pub trait OpenApiLoader: Send + Sync {
    /// Load and parse a spec from a file path or URL
    async fn load(&self, source: &str) -> Result<OpenAPI, GenerationError>;
}

/// Turns the intermediate representation into source text
pub trait ClassRenderer: Send + Sync {
    /// Render the file for one class
    fn render_class(
        &self,
        class: &GeneratedClass,
        settings: &MapperSettings,
    ) -> Result<String, GenerationError>;

    /// Render the module index (`mod.rs`) for one namespace directory
    fn render_index(
        &self,
        index: &NamespaceIndex,
        settings: &MapperSettings,
    ) -> Result<String, GenerationError>;
}
