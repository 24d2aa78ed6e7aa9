//! Infrastructure layer - concrete implementations of domain ports

pub mod generation;
pub mod openapi;
pub mod output;

pub use generation::TeraClassRenderer;
pub use openapi::CompositeOpenApiLoader;
pub use output::FileSystemOutputService;
