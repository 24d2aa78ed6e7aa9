//! clientgen turns an OpenAPI 3 document into typed Rust client modules.
//!
//! The [`generation`] domain maps paths and component schemas into classes,
//! [`infrastructure`] loads documents, renders the classes and writes them,
//! and [`runtime`] is the support code the generated modules call into.
#![deny(unsafe_code)]

pub mod application;
pub mod config;
pub mod generation;
pub mod infrastructure;
pub mod runtime;
