//! The dispatch primitive generated endpoints are built on

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Method;
use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::client::ApiClient;
use super::error::ClientError;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^}/]+)\}").expect("valid regex"));

/// HTTP verbs generated methods dispatch with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub fn method(self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Patch => Method::PATCH,
            Verb::Delete => Method::DELETE,
        }
    }
}

/// Contract between generated endpoint structs and the type they wrap
#[async_trait]
pub trait EndpointBase: Send + Sync {
    /// Binds a client to one URL pattern such as `/widgets/{widget_id}`.
    fn new(api: ApiClient, url: &'static str) -> Self
    where
        Self: Sized;

    /// Sends one request and returns the decoded JSON body.
    ///
    /// `path` fills the URL placeholders by name, `query` becomes the query
    /// string (null values are left out), and `body` is sent as JSON.
    async fn send(
        &self,
        verb: Verb,
        path: &[(&str, Value)],
        query: &[(&str, Value)],
        body: Option<Value>,
    ) -> Result<Value, ClientError>;
}

/// Default [`EndpointBase`] over `reqwest` with bearer authentication
#[derive(Debug, Clone)]
pub struct Endpoint {
    api: ApiClient,
    url: &'static str,
}

impl Endpoint {
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn url(&self) -> &'static str {
        self.url
    }

    /// Resolves the URL pattern against the client's base URL.
    pub fn request_url(
        &self,
        path: &[(&str, Value)],
        query: &[(&str, Value)],
    ) -> Result<Url, ClientError> {
        let mut url = self.api.base_url().clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ClientError::Configuration("base URL cannot carry a path".to_string())
            })?;
            segments.pop_if_empty();
            for segment in self.url.split('/').filter(|s| !s.is_empty()) {
                segments.push(&fill_segment(segment, path)?);
            }
        }

        let pairs: Vec<(&str, String)> = query
            .iter()
            .filter_map(|(name, value)| scalar_text(value).map(|text| (*name, text)))
            .collect();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }
}

#[async_trait]
impl EndpointBase for Endpoint {
    fn new(api: ApiClient, url: &'static str) -> Self {
        Self { api, url }
    }

    async fn send(
        &self,
        verb: Verb,
        path: &[(&str, Value)],
        query: &[(&str, Value)],
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        let token = self.api.token()?;
        let url = self.request_url(path, query)?;

        self.api.backpressure().wait().await;
        debug!(method = %verb.method(), url = %url, "Sending request");

        let mut request = self
            .api
            .http()
            .request(verb.method(), url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            debug!(status = status.as_u16(), "Request failed");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Replaces every `{name}` in one path segment with its value.
fn fill_segment(segment: &str, path: &[(&str, Value)]) -> Result<String, ClientError> {
    let mut filled = String::with_capacity(segment.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(segment) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = path
            .iter()
            .find(|(key, _)| *key == name.as_str())
            .and_then(|(_, value)| scalar_text(value))
            .ok_or_else(|| {
                ClientError::Argument(format!(
                    "No value for path placeholder `{{{}}}`",
                    name.as_str()
                ))
            })?;
        filled.push_str(&segment[last..whole.start()]);
        filled.push_str(&value);
        last = whole.end();
    }
    filled.push_str(&segment[last..]);
    Ok(filled)
}

/// Text form of a parameter value; `None` for null.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(scalar_text)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}
