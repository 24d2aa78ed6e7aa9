//! Runtime support for generated clients
//!
//! Generated endpoint structs wrap a type implementing [`EndpointBase`]
//! (by default [`Endpoint`]) and turn its decoded JSON into typed values
//! with [`instantiate`] and [`instantiate_each`].
//!
//! ```no_run
//! use clientgen::runtime::{ApiClient, Backpressure};
//! use std::time::Duration;
//!
//! let api = ApiClient::builder("https://api.example.com/v1")
//!     .bearer_token("secret")
//!     .backpressure(Backpressure::FixedDelay(Duration::from_millis(100)))
//!     .build()?;
//! # Ok::<(), clientgen::runtime::ClientError>(())
//! ```

pub mod client;
pub mod endpoint;
pub mod error;
pub mod instantiate;

pub use client::{ApiClient, ApiClientBuilder, Backpressure, NoToken, StaticToken, TokenProvider};
pub use endpoint::{Endpoint, EndpointBase, Verb};
pub use error::ClientError;
pub use instantiate::{Instantiate, instantiate, instantiate_each};
