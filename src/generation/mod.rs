//! Generation domain module - maps an OpenAPI document to client classes
//!
//! The `Mapper` runs the resource mappers over the document, the endpoint and
//! model generators build the intermediate representation, and the
//! `NamespaceCollection` holds the result until it is rendered and written.

pub mod collection;
pub mod endpoint;
pub mod errors;
pub mod mapper;
pub mod model;
pub mod rules;
pub mod sanitizers;
pub mod traits;
pub mod type_map;
pub mod types;
pub mod utils;

pub use collection::*;
pub use endpoint::EndpointGenerator;
pub use errors::*;
pub use mapper::*;
pub use model::ModelGenerator;
pub use sanitizers::Sanitize;
pub use traits::*;
pub use type_map::{Primitive, ResolvedType, TypeMap};
pub use types::*;
