//! Errors returned by generated client code

use thiserror::Error;

/// Errors surfaced to callers of generated endpoint methods
#[derive(Debug, Error)]
pub enum ClientError {
    /// A required argument was missing or could not be placed in the URL
    #[error("{0}")]
    Argument(String),

    /// No credential was available for the request
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The client was built with invalid settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The response body was not the JSON the method expects
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A typed value could not be built from the decoded response
    #[error("Failed to instantiate {}: {message}", target(*index))]
    Instantiate {
        /// Position of the failing element for element-wise instantiation
        index: Option<usize>,
        message: String,
    },
}

impl ClientError {
    /// The error for a required parameter the caller did not set.
    pub fn missing_parameter(name: &str) -> Self {
        ClientError::Argument(format!("Parameter `{name}` is required"))
    }

    /// HTTP status code, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn target(index: Option<usize>) -> String {
    match index {
        Some(i) => format!("element {i}"),
        None => "response".to_string(),
    }
}
