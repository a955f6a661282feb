//! Static file serving module
//!
//! Resolves a request under the serving root, opens the file and builds the
//! response. Pre-compressed asset headers are applied as the last step,
//! after the generic file response is complete.

use crate::config::ServingConfig;
use crate::error::ServeError;
use crate::handler::resolve::{self, RequestTarget};
use crate::handler::router::RequestContext;
use crate::http::{self, conditional, encoding, mime, response, ResponseBody};
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};

/// Serve the file a request resolves to
pub async fn serve(
    ctx: &RequestContext<'_>,
    serving: &ServingConfig,
) -> Result<Response<ResponseBody>, ServeError> {
    let target = RequestTarget::parse(ctx.path)?;
    let mut file_path = target.join(&serving.root);

    let metadata = fs::metadata(&file_path).await?;
    resolve::confine(&serving.root, &file_path).await?;

    if metadata.is_dir() {
        if !target.trailing_slash {
            return Ok(http::build_301_response(&directory_location(
                ctx.path, ctx.query,
            )));
        }
        file_path = find_index_file(&file_path, &serving.index_files)
            .await
            .ok_or(ServeError::NotFound)?;
        resolve::confine(&serving.root, &file_path).await?;
    } else if target.trailing_slash {
        // A file never has children
        return Err(ServeError::NotFound);
    }

    let file = File::open(&file_path).await?;
    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(ServeError::NotFound);
    }

    let modified = metadata.modified().ok();
    let last_modified = modified.map(conditional::format_http_date);

    if let (Some(modified), Some(last_modified)) = (modified, last_modified.as_deref()) {
        if conditional::is_not_modified(
            ctx.if_modified_since.as_deref(),
            ctx.has_if_none_match,
            modified,
        ) {
            let mut not_modified = http::build_304_response(last_modified);
            encoding::decorate(not_modified.headers_mut(), &file_path);
            return Ok(not_modified);
        }
    }

    let body = if ctx.is_head {
        response::empty()
    } else {
        response::file_body(file)
    };

    let mut file_response = http::build_file_response(
        body,
        mime::guess_content_type(&file_path),
        metadata.len(),
        last_modified.as_deref(),
    );
    encoding::decorate(file_response.headers_mut(), &file_path);
    Ok(file_response)
}

/// First index file in `dir` that is a regular file
async fn find_index_file(dir: &Path, index_files: &[String]) -> Option<PathBuf> {
    for index_file in index_files {
        let candidate = dir.join(index_file);
        if let Ok(metadata) = fs::metadata(&candidate).await {
            if metadata.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// `Location` for a directory requested without its trailing slash
fn directory_location(path: &str, query: Option<&str>) -> String {
    match query {
        Some(q) => format!("{path}/?{q}"),
        None => format!("{path}/"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::header::{CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, LAST_MODIFIED, LOCATION};
    use hyper::StatusCode;

    fn serving(root: &Path) -> ServingConfig {
        ServingConfig {
            root: root.to_path_buf(),
            ..ServingConfig::default()
        }
    }

    fn get(path: &str) -> RequestContext<'_> {
        RequestContext {
            path,
            query: None,
            is_head: false,
            if_modified_since: None,
            has_if_none_match: false,
        }
    }

    #[tokio::test]
    async fn test_serves_wasm_gz_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let payload = b"\x1f\x8b\x08\x00not really wasm";
        std::fs::write(dir.path().join("build.wasm.gz"), payload).unwrap();

        let resp = serve(&get("/build.wasm.gz"), &serving(dir.path()))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/wasm");
        assert_eq!(resp.headers()[CONTENT_ENCODING], "gzip");
        assert_eq!(
            resp.headers()[CONTENT_LENGTH],
            payload.len().to_string().as_str()
        );
        assert!(resp.headers().contains_key(LAST_MODIFIED));

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], payload);
    }

    #[tokio::test]
    async fn test_plain_file_uses_default_type() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("style.css"), "body{}").unwrap();

        let resp = serve(&get("/style.css"), &serving(dir.path()))
            .await
            .unwrap();
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/css");
        assert!(!resp.headers().contains_key(CONTENT_ENCODING));
    }

    #[tokio::test]
    async fn test_head_has_headers_but_no_body() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("game.js.gz"), vec![7u8; 300]).unwrap();

        let mut ctx = get("/game.js.gz");
        ctx.is_head = true;
        let resp = serve(&ctx, &serving(dir.path())).await.unwrap();

        assert_eq!(resp.headers()[CONTENT_LENGTH], "300");
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/javascript");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = serve(&get("/missing.html"), &serving(dir.path())).await;
        assert!(matches!(result, Err(ServeError::NotFound)));
    }

    #[tokio::test]
    async fn test_directory_redirect_and_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Build")).unwrap();
        std::fs::write(dir.path().join("Build/index.htm"), "<p>build</p>").unwrap();

        let mut ctx = get("/Build");
        ctx.query = Some("v=2");
        let resp = serve(&ctx, &serving(dir.path())).await.unwrap();
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers()[LOCATION], "/Build/?v=2");

        let resp = serve(&get("/Build/"), &serving(dir.path())).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
    }

    #[tokio::test]
    async fn test_file_with_trailing_slash_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("build.wasm.gz"), "wasm").unwrap();

        let result = serve(&get("/build.wasm.gz/"), &serving(dir.path())).await;
        assert!(matches!(result, Err(ServeError::NotFound)));

        let resp = serve(&get("/build.wasm.gz"), &serving(dir.path()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_directory_without_index_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("empty")).unwrap();

        let result = serve(&get("/empty/"), &serving(dir.path())).await;
        assert!(matches!(result, Err(ServeError::NotFound)));
    }

    #[tokio::test]
    async fn test_if_modified_since() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("game.data.gz"), "data").unwrap();

        let first = serve(&get("/game.data.gz"), &serving(dir.path()))
            .await
            .unwrap();
        let last_modified = first.headers()[LAST_MODIFIED].to_str().unwrap().to_string();

        let mut ctx = get("/game.data.gz");
        ctx.if_modified_since = Some(last_modified);
        let resp = serve(&ctx, &serving(dir.path())).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(resp.headers()[CONTENT_ENCODING], "gzip");
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/octet-stream");
    }

    #[test]
    fn test_directory_location() {
        assert_eq!(directory_location("/Build", None), "/Build/");
        assert_eq!(directory_location("/Build", Some("a=1")), "/Build/?a=1");
    }
}
