//! Error types for the generation domain

use thiserror::Error;

/// Errors that can occur while mapping a spec into classes
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The orchestrator was set up with unusable options. Fatal at startup.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The document contains data the engine cannot interpret (missing
    /// responses, missing schemas). Aborts the affected class.
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// An engine invariant was violated (unresolvable type, naming
    /// collision, unsupported reference shape). Aborts the affected class.
    #[error("Generator error: {0}")]
    GeneratorError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("OpenAPI loading error: {0}")]
    LoadError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl GenerationError {
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::ConfigurationError(msg.into())
    }

    pub fn schema<S: Into<String>>(msg: S) -> Self {
        Self::SchemaError(msg.into())
    }

    pub fn generator<S: Into<String>>(msg: S) -> Self {
        Self::GeneratorError(msg.into())
    }

    /// Prefixes the message with where the error happened, e.g. `GET /pets`.
    ///
    /// Only the schema and generator kinds carry a location; everything
    /// else is returned unchanged.
    pub fn at(self, location: &str) -> Self {
        match self {
            Self::SchemaError(msg) => Self::SchemaError(format!("{location}: {msg}")),
            Self::GeneratorError(msg) => Self::GeneratorError(format!("{location}: {msg}")),
            other => other,
        }
    }

    /// True for the kinds that only invalidate one class and leave the run intact.
    pub fn is_per_class(&self) -> bool {
        matches!(self, Self::SchemaError(_) | Self::GeneratorError(_))
    }
}

impl From<tera::Error> for GenerationError {
    fn from(err: tera::Error) -> Self {
        // tera keeps the interesting part in the source chain
        let mut msg = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(inner) = source {
            msg.push_str(": ");
            msg.push_str(&inner.to_string());
            source = inner.source();
        }
        Self::RenderError(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_prefixes_location() {
        let err = GenerationError::schema("has no OK response").at("GET /pets");
        assert_eq!(err.to_string(), "Schema error: GET /pets: has no OK response");

        let err = GenerationError::configuration("bad").at("GET /pets");
        assert_eq!(err.to_string(), "Configuration error: bad");
    }

    #[test]
    fn test_is_per_class() {
        assert!(GenerationError::schema("x").is_per_class());
        assert!(GenerationError::generator("x").is_per_class());
        assert!(!GenerationError::configuration("x").is_per_class());
        assert!(!GenerationError::RenderError("x".to_string()).is_per_class());
    }
}
