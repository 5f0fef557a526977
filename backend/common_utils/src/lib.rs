//! Common utilities for the AprovaFacil connector

pub mod consts;
pub mod errors;
pub mod request;

// Re-export commonly used items
pub use errors::{CustomResult, ParsingError};
pub use request::{Method, Request, RequestBuilder, RequestContent};
