//! Request path resolution
//!
//! Maps the path of a request URI onto the serving root. Normalization is
//! purely lexical; `confine` then checks the real (symlink-resolved) location
//! so a link inside the root cannot expose files outside it.

use crate::error::ServeError;
use crate::logger;
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};

/// A request path after decoding and normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    /// Path segments below the serving root, never `.`, `..` or empty
    pub segments: Vec<String>,
    /// Whether the request path ended in `/`
    pub trailing_slash: bool,
}

impl RequestTarget {
    /// Decode and normalize the path component of a request URI.
    ///
    /// `..` removes the preceding segment and is dropped at the top, so the
    /// result can never climb above the root. Segments containing a
    /// backslash or NUL are dropped as well.
    pub fn parse(path: &str) -> Result<Self, ServeError> {
        if !path.starts_with('/') {
            return Err(ServeError::BadRequest(format!(
                "request target is not an absolute path: {path}"
            )));
        }

        let decoded = percent_decode_str(path)
            .decode_utf8()
            .map_err(|_| ServeError::NotFound)?;

        let mut segments: Vec<String> = Vec::new();
        for segment in decoded.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                s if s.contains(['\\', '\0']) => {}
                s => segments.push(s.to_string()),
            }
        }

        Ok(Self {
            segments,
            trailing_slash: decoded.ends_with('/'),
        })
    }

    /// Join the segments onto `root`
    pub fn join(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        path.extend(&self.segments);
        path
    }
}

/// Ensure `candidate` really lives under `root` once symlinks are resolved.
///
/// Returns the canonical path of `candidate`.
pub async fn confine(root: &Path, candidate: &Path) -> Result<PathBuf, ServeError> {
    let root_canonical = tokio::fs::canonicalize(root).await?;
    let canonical = tokio::fs::canonicalize(candidate).await?;

    if canonical.starts_with(&root_canonical) {
        Ok(canonical)
    } else {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            candidate.display(),
            canonical.display()
        ));
        Err(ServeError::Forbidden)
    }
}
