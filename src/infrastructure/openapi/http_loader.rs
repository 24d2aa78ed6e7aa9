//! Fetches OpenAPI documents over HTTP(S)

use async_trait::async_trait;
use openapiv3::OpenAPI;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::parser::{DocumentFormat, OpenApiParser};
use crate::generation::{GenerationError, OpenApiLoader};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpOpenApiLoader {
    client: Client,
}

impl HttpOpenApiLoader {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// True for sources this loader can fetch.
    pub fn handles(source: &str) -> bool {
        Url::parse(source).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
    }
}

impl Default for HttpOpenApiLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OpenApiLoader for HttpOpenApiLoader {
    async fn load(&self, source: &str) -> Result<OpenAPI, GenerationError> {
        if !Self::handles(source) {
            return Err(GenerationError::LoadError(format!(
                "not an http(s) URL: {source}"
            )));
        }

        debug!(url = %source, "Fetching OpenAPI document");
        let response = self
            .client
            .get(source)
            .header(ACCEPT, "application/json, application/yaml;q=0.9, */*;q=0.5")
            .send()
            .await
            .map_err(|e| GenerationError::LoadError(format!("Failed to fetch {source}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::LoadError(format!(
                "HTTP {status} when fetching {source}"
            )));
        }

        let format = DocumentFormat::detect(
            source,
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );
        let content = response.text().await.map_err(|e| {
            GenerationError::LoadError(format!("Failed to read body from {source}: {e}"))
        })?;

        OpenApiParser::from_text(&content, format)?.parse()
    }
}
