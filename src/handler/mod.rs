//! Request handler module
//!
//! Turns an HTTP request into a response: dispatch, path resolution and
//! static file serving.

pub mod resolve;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
