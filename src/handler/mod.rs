//! Request handler module
//!
//! Routes each request to its endpoint and turns failures into JSON error responses.

pub mod router;

pub use router::handle_request;
