//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, dispatch to
//! the file server, error conversion and access logging.

use crate::config::AppState;
use crate::error::ServeError;
use crate::handler::static_files;
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use hyper::header::{
    CONTENT_ENCODING, CONTENT_LENGTH, IF_MODIFIED_SINCE, IF_NONE_MATCH, REFERER, USER_AGENT,
};
use hyper::{Method, Request, Response, StatusCode, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_modified_since: Option<String>,
    pub has_if_none_match: bool,
}

impl<'a> RequestContext<'a> {
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        Self {
            path: req.uri().path(),
            query: req.uri().query(),
            is_head: req.method() == Method::HEAD,
            if_modified_since: req
                .headers()
                .get(IF_MODIFIED_SINCE)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string),
            has_if_none_match: req.headers().contains_key(IF_NONE_MATCH),
        }
    }
}

/// Main entry point for HTTP request handling. Never fails: every error
/// becomes an HTTP error response.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let ctx = RequestContext::from_request(&req);

    let result = match *req.method() {
        Method::GET | Method::HEAD => static_files::serve(&ctx, &state.config.serving).await,
        ref other => Err(ServeError::MethodNotAllowed(other.to_string())),
    };

    let response = result.unwrap_or_else(|err| {
        match &err {
            ServeError::Internal(source) => {
                logger::log_error(&format!("Failed to serve {}: {source}", ctx.path));
            }
            ServeError::MethodNotAllowed(method) => {
                logger::log_warning(&format!("Method not allowed: {method}"));
            }
            _ => {}
        }
        http::build_error_response(&err)
    });

    if state.access_log {
        let entry = access_log_entry(&req, &ctx, &response, peer_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

fn access_log_entry<B>(
    req: &Request<B>,
    ctx: &RequestContext<'_>,
    response: &Response<ResponseBody>,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let header_string = |value: Option<&hyper::header::HeaderValue>| {
        value
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        ctx.path.to_string(),
    );
    entry.query = ctx.query.map(ToString::to_string);
    entry.http_version = http_version(req.version()).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = if ctx.is_head || response.status() == StatusCode::NOT_MODIFIED {
        0
    } else {
        header_string(response.headers().get(CONTENT_LENGTH))
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    };
    entry.content_encoding = header_string(response.headers().get(CONTENT_ENCODING));
    entry.referer = header_string(req.headers().get(REFERER));
    entry.user_agent = header_string(req.headers().get(USER_AGENT));
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

const fn http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::{BodyExt, Empty};
    use hyper::body::Bytes;
    use hyper::header::ALLOW;

    fn state_for(root: &std::path::Path) -> Arc<AppState> {
        let mut config = Config::default();
        config.serving.root = root.to_path_buf();
        config.logging.access_log = false;
        Arc::new(AppState::new(config))
    }

    fn request(method: Method, uri: &str) -> Request<Empty<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Empty::new())
            .unwrap()
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    #[tokio::test]
    async fn test_post_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "hi").unwrap();

        let resp = handle_request(
            request(Method::POST, "/index.html"),
            state_for(dir.path()),
            peer(),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[ALLOW], "GET, HEAD");
    }

    #[tokio::test]
    async fn test_traversal_never_leaves_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("docs");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(dir.path().join("secret.txt"), "top secret").unwrap();

        for uri in ["/../secret.txt", "/%2e%2e/secret.txt", "/..%2fsecret.txt"] {
            let resp = handle_request(request(Method::GET, uri), state_for(&root), peer())
                .await
                .unwrap();
            assert!(
                matches!(
                    resp.status(),
                    StatusCode::NOT_FOUND | StatusCode::FORBIDDEN
                ),
                "{uri} returned {}",
                resp.status()
            );
            let body = resp.into_body().collect().await.unwrap().to_bytes();
            assert_ne!(&body[..], b"top secret");
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let resp = handle_request(
            request(Method::GET, "/missing.html"),
            state_for(dir.path()),
            peer(),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"404 Not Found");
    }

    #[test]
    fn test_access_log_entry_fields() {
        let req = Request::builder()
            .method(Method::GET)
            .uri("/Build/game.js.gz?v=1")
            .header(USER_AGENT, "curl/8.0")
            .body(Empty::<Bytes>::new())
            .unwrap();
        let ctx = RequestContext::from_request(&req);
        let mut response = http::build_file_response(
            crate::http::response::empty(),
            "application/gzip",
            42,
            None,
        );
        crate::http::encoding::decorate(
            response.headers_mut(),
            std::path::Path::new("game.js.gz"),
        );

        let entry = access_log_entry(&req, &ctx, &response, peer(), Instant::now());
        assert_eq!(entry.remote_addr, "127.0.0.1");
        assert_eq!(entry.path, "/Build/game.js.gz");
        assert_eq!(entry.query.as_deref(), Some("v=1"));
        assert_eq!(entry.body_bytes, 42);
        assert_eq!(entry.content_encoding.as_deref(), Some("gzip"));
        assert_eq!(entry.user_agent.as_deref(), Some("curl/8.0"));
        assert!(entry.referer.is_none());
    }
}
