//! gzserve - a static file server for pre-compressed web build assets.
//!
//! Files are served from a root directory over HTTP/1.1. Files whose name
//! ends in `.gz` are sent with `Content-Encoding: gzip`, and the known
//! WebGL build artifacts (`*.js.gz`, `*.wasm.gz`, `*.data.gz`) also get the
//! `Content-Type` of the uncompressed asset.

pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::{AppState, Config};
pub use error::{ServeError, StartupError};
