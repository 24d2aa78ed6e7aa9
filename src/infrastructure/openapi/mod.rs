//! OpenAPI document loaders
//!
//! Loaders fetch text from a file or URL and hand it to [`OpenApiParser`],
//! which yields an `openapiv3::OpenAPI` document.

pub mod composite_loader;
pub mod file_loader;
pub mod http_loader;
pub mod parser;

pub use composite_loader::CompositeOpenApiLoader;
pub use file_loader::FileOpenApiLoader;
pub use http_loader::HttpOpenApiLoader;
pub use parser::{DocumentFormat, OpenApiParser};
