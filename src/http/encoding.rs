//! Pre-compressed asset headers
//!
//! Headers are derived from the resolved file name alone. A `.gz` file is
//! announced as gzip-encoded without looking at its bytes; the build that
//! produced it is trusted to have compressed it.

use hyper::header::{HeaderMap, HeaderValue, CONTENT_ENCODING, CONTENT_TYPE};
use std::path::Path;

pub const GZIP_SUFFIX: &str = ".gz";

/// Content types for known pre-compressed assets, checked in order
const CONTENT_TYPE_OVERRIDES: [(&str, &str); 3] = [
    (".js.gz", "application/javascript"),
    (".wasm.gz", "application/wasm"),
    (".data.gz", "application/octet-stream"),
];

/// Headers to add on top of the default file response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssetHeaders {
    pub content_type: Option<&'static str>,
    pub content_encoding: Option<&'static str>,
}

impl AssetHeaders {
    /// Decide the extra headers for a resolved file path.
    /// Matching is case-sensitive.
    pub fn for_path(path: &Path) -> Self {
        let name = path.as_os_str().as_encoded_bytes();
        if !name.ends_with(GZIP_SUFFIX.as_bytes()) {
            return Self::default();
        }

        let content_type = CONTENT_TYPE_OVERRIDES
            .iter()
            .find(|(suffix, _)| name.ends_with(suffix.as_bytes()))
            .map(|&(_, content_type)| content_type);

        Self {
            content_type,
            content_encoding: Some("gzip"),
        }
    }

    /// Apply to an already built header map, replacing any default
    /// `Content-Type`.
    pub fn apply(self, headers: &mut HeaderMap) {
        if let Some(content_type) = self.content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        if let Some(encoding) = self.content_encoding {
            headers.insert(CONTENT_ENCODING, HeaderValue::from_static(encoding));
        }
    }
}

/// Decorate response headers for the file at `path`
pub fn decorate(headers: &mut HeaderMap, path: &Path) {
    AssetHeaders::for_path(path).apply(headers);
}
