//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the API handlers.

pub mod body;
pub mod response;

// Re-export commonly used types
pub use body::{read_body, BodyError, BoxError};
pub use response::{apply_common_headers, build_options_response, json_response};
