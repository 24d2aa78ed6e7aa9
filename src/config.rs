//! Generator configuration
//!
//! Settings come from an optional TOML file and are then overridden by
//! command-line flags:
//!
//! ```toml
//! base_path = "src/api"
//! base_namespace = "api"
//! base_type = "clientgen::runtime::Endpoint"
//! verbs = ["get", "post"]
//! fail_fast = true
//! ```

use openapiv3::OpenAPI;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::generation::mapper::{
    DEFAULT_BASE_TYPE, DEFAULT_CONTENT_TYPE, DEFAULT_MODELS_NAMESPACE, MapperConfig,
};
use crate::generation::{GenerationError, HttpVerb};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Directory the generated modules are written to
    pub base_path: PathBuf,
    /// Module path of `base_path` inside the consuming crate
    pub base_namespace: String,
    /// Type generated endpoints wrap
    pub base_type: String,
    pub content_type: String,
    pub fail_fast: bool,
    pub verbs: Vec<HttpVerb>,
    /// Namespace for model types, relative to `base_namespace`
    pub models_namespace: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("src/api"),
            base_namespace: "api".to_string(),
            base_type: DEFAULT_BASE_TYPE.to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            fail_fast: false,
            verbs: HttpVerb::ALL.to_vec(),
            models_namespace: DEFAULT_MODELS_NAMESPACE.to_string(),
        }
    }
}

/// Command-line values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_path: Option<PathBuf>,
    pub base_namespace: Option<String>,
    pub base_type: Option<String>,
    pub fail_fast: bool,
}

impl GeneratorConfig {
    pub fn from_toml(content: &str) -> Result<Self, GenerationError> {
        toml::from_str(content)
            .map_err(|e| GenerationError::configuration(format!("Invalid configuration: {e}")))
    }

    /// Reads a TOML configuration file.
    pub async fn from_file(path: &Path) -> Result<Self, GenerationError> {
        debug!(config = %path.display(), "Loading configuration");
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            GenerationError::configuration(format!(
                "Failed to read configuration {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn apply(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(base_path) = overrides.base_path {
            self.base_path = base_path;
        }
        if let Some(base_namespace) = overrides.base_namespace {
            self.base_namespace = base_namespace;
        }
        if let Some(base_type) = overrides.base_type {
            self.base_type = base_type;
        }
        self.fail_fast |= overrides.fail_fast;
        self
    }

    /// Pairs the settings with a loaded document for the `Mapper`.
    pub fn into_mapper_config(self, spec: OpenAPI) -> MapperConfig {
        MapperConfig {
            spec,
            base_path: self.base_path,
            base_namespace: self.base_namespace,
            base_type: self.base_type,
            content_type: self.content_type,
            models_namespace: self.models_namespace,
            verbs: self.verbs,
            fail_fast: self.fail_fast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.content_type, "application/json");
        assert_eq!(config.verbs.len(), 5);
        assert_eq!(config.models_namespace, "models");
        assert!(!config.fail_fast);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = GeneratorConfig::from_toml(
            r#"
            base_namespace = "sky::v2"
            verbs = ["get", "delete"]
            "#,
        )
        .unwrap();
        assert_eq!(config.base_namespace, "sky::v2");
        assert_eq!(config.verbs, [HttpVerb::Get, HttpVerb::Delete]);
        assert_eq!(config.base_type, DEFAULT_BASE_TYPE);
    }

    #[test]
    fn test_from_toml_rejects_unknown_keys_and_verbs() {
        let err = GeneratorConfig::from_toml("namespace = \"api\"").unwrap_err();
        assert!(matches!(err, GenerationError::ConfigurationError(_)));

        let err = GeneratorConfig::from_toml("verbs = [\"head\"]").unwrap_err();
        assert!(matches!(err, GenerationError::ConfigurationError(_)));
    }

    #[test]
    fn test_overrides_win() {
        let config = GeneratorConfig::default().apply(ConfigOverrides {
            base_path: Some(PathBuf::from("out")),
            base_namespace: None,
            base_type: Some("crate::rt::Base".to_string()),
            fail_fast: true,
        });
        assert_eq!(config.base_path, PathBuf::from("out"));
        assert_eq!(config.base_namespace, "api");
        assert_eq!(config.base_type, "crate::rt::Base");
        assert!(config.fail_fast);
    }

    #[tokio::test]
    async fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clientgen.toml");
        std::fs::write(&path, "fail_fast = true\n").unwrap();

        let config = GeneratorConfig::from_file(&path).await.unwrap();
        assert!(config.fail_fast);

        let err = GeneratorConfig::from_file(&dir.path().join("missing.toml"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read configuration"));
    }
}
