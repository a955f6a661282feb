//! HTTP protocol layer module
//!
//! Content-type inference, pre-compressed asset headers, conditional
//! requests and response builders, independent of path resolution.

pub mod conditional;
pub mod encoding;
pub mod mime;
pub mod response;

pub use response::{
    build_301_response, build_304_response, build_error_response, build_file_response,
    ResponseBody,
};
