//! Error types
//!
//! `ServeError` covers everything that can go wrong while answering one
//! request; it never escapes the request handler. `StartupError` is fatal and
//! ends the process with a non-zero exit code.

use hyper::StatusCode;
use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// Per-request failure, converted to an HTTP status at the handler boundary
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("resource not found")]
    NotFound,

    #[error("access to resource is forbidden")]
    Forbidden,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("I/O error: {0}")]
    Internal(#[source] io::Error),
}

impl ServeError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<io::Error> for ServeError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::Forbidden,
            _ => Self::Internal(err),
        }
    }
}

/// Anything that stops the server from coming up
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("invalid listen address '{addr}': {source}")]
    Address {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("failed to build async runtime: {0}")]
    Runtime(#[source] io::Error),

    #[error("failed to open log file: {0}")]
    Logger(#[source] io::Error),

    #[error("failed to install signal handlers: {0}")]
    Signal(#[source] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_classification() {
        let not_found = io::Error::from(io::ErrorKind::NotFound);
        assert!(matches!(ServeError::from(not_found), ServeError::NotFound));

        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert!(matches!(ServeError::from(denied), ServeError::Forbidden));

        let other = io::Error::other("disk on fire");
        assert!(matches!(ServeError::from(other), ServeError::Internal(_)));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ServeError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ServeError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ServeError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServeError::MethodNotAllowed("POST".into()).status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ServeError::Internal(io::Error::other("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_bind_error_message() {
        let err = StartupError::Bind {
            addr: "127.0.0.1:8888".parse().unwrap(),
            source: io::Error::from(io::ErrorKind::AddrInUse),
        };
        assert!(err.to_string().starts_with("failed to bind 127.0.0.1:8888"));
    }
}
