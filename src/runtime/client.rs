//! Shared API client handle used by every generated endpoint

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use url::Url;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::error::ClientError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Supplies the bearer token for each request
pub trait TokenProvider: Send + Sync {
    /// `None` means no credential is available
    fn token(&self) -> Option<String>;
}

/// A fixed token, wiped from memory when dropped
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct StaticToken {
    secret: String,
}

impl StaticToken {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken([REDACTED])")
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        (!self.secret.is_empty()).then(|| self.secret.clone())
    }
}

/// Provider with no credential; every request fails authentication
#[derive(Debug, Clone, Copy, Default)]
pub struct NoToken;

impl TokenProvider for NoToken {
    fn token(&self) -> Option<String> {
        None
    }
}

/// Throttling applied before each request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backpressure {
    #[default]
    None,
    /// Wait this long before every request
    FixedDelay(Duration),
}

impl Backpressure {
    pub async fn wait(&self) {
        if let Backpressure::FixedDelay(delay) = self {
            if !delay.is_zero() {
                tokio::time::sleep(*delay).await;
            }
        }
    }
}

struct Inner {
    http: Client,
    base_url: Url,
    tokens: Arc<dyn TokenProvider>,
    backpressure: Backpressure,
}

/// Cheap-to-clone handle shared by all endpoints of one API
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("backpressure", &self.inner.backpressure)
            .finish()
    }
}

impl ApiClient {
    pub fn builder(base_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder::new(base_url)
    }

    pub fn http(&self) -> &Client {
        &self.inner.http
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub fn backpressure(&self) -> Backpressure {
        self.inner.backpressure
    }

    /// Current bearer token, or an authentication error when there is none.
    pub fn token(&self) -> Result<String, ClientError> {
        self.inner
            .tokens
            .token()
            .ok_or_else(|| ClientError::Authentication("no bearer token available".to_string()))
    }
}

/// Builder for [`ApiClient`]
pub struct ApiClientBuilder {
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
    backpressure: Backpressure,
    timeout: Duration,
    user_agent: String,
    http: Option<Client>,
}

impl ApiClientBuilder {
    fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            tokens: Arc::new(NoToken),
            backpressure: Backpressure::None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            http: None,
        }
    }

    /// Shorthand for a [`StaticToken`]
    pub fn bearer_token(self, token: impl Into<String>) -> Self {
        self.token_provider(StaticToken::new(token))
    }

    pub fn token_provider(mut self, provider: impl TokenProvider + 'static) -> Self {
        self.tokens = Arc::new(provider);
        self
    }

    pub fn backpressure(mut self, backpressure: Backpressure) -> Self {
        self.backpressure = backpressure;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Use a preconfigured HTTP client; `timeout` and `user_agent` are then ignored.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http = Some(client);
        self
    }

    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = Url::parse(&self.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Configuration(format!(
                "base URL `{}` cannot carry a path",
                self.base_url
            )));
        }

        let http = match self.http {
            Some(client) => client,
            None => Client::builder()
                .timeout(self.timeout)
                .user_agent(self.user_agent)
                .build()?,
        };

        debug!(base_url = %base_url, "API client ready");
        Ok(ApiClient {
            inner: Arc::new(Inner {
                http,
                base_url,
                tokens: self.tokens,
                backpressure: self.backpressure,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_and_token() {
        let client = ApiClient::builder("https://api.example.com/v1")
            .bearer_token("secret")
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.example.com/v1");
        assert_eq!(client.backpressure(), Backpressure::None);
        assert_eq!(client.token().unwrap(), "secret");
        assert!(!format!("{client:?}").contains("secret"));
    }

    #[test]
    fn test_missing_token_is_an_authentication_error() {
        let client = ApiClient::builder("https://api.example.com").build().unwrap();
        assert!(matches!(client.token(), Err(ClientError::Authentication(_))));

        let client = ApiClient::builder("https://api.example.com")
            .bearer_token("")
            .build()
            .unwrap();
        assert!(matches!(client.token(), Err(ClientError::Authentication(_))));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ApiClient::builder("not a url").build().unwrap_err();
        assert!(matches!(err, ClientError::Url(_)));

        let err = ApiClient::builder("mailto:someone@example.com").build().unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }

    #[test]
    fn test_static_token_debug_is_redacted() {
        let token = StaticToken::new("hunter2");
        assert_eq!(format!("{token:?}"), "StaticToken([REDACTED])");
    }

    #[tokio::test]
    async fn test_fixed_delay_waits() {
        let start = std::time::Instant::now();
        Backpressure::FixedDelay(Duration::from_millis(50)).wait().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
