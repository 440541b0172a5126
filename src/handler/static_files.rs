//! Static asset serving module
//!
//! Resolves request paths under the asset directory and builds the
//! file responses, including conditional and range variants.

use crate::config::Config;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime, range::RangeParseResult};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Serve the asset matching the request path, if one exists.
///
/// Returns `None` when the path does not resolve to a regular file under
/// the asset directory, so the caller can fall through to later routes.
pub async fn serve_asset(
    ctx: &RequestContext<'_>,
    config: &Config,
) -> Option<Response<Full<Bytes>>> {
    let (content, content_type) =
        load_from_directory(&config.assets.dir, ctx.path, &config.assets.index_files).await?;
    Some(build_asset_response(
        &content,
        content_type,
        &config.http.server_name,
        ctx,
    ))
}

/// Load an asset from the directory with index file support
pub async fn load_from_directory(
    assets_dir: &str,
    path: &str,
    index_files: &[String],
) -> Option<(Vec<u8>, &'static str)> {
    // Remove leading slash and prevent directory traversal
    let clean_path = path.trim_start_matches('/').replace("..", "");
    let mut file_path = Path::new(assets_dir).join(&clean_path);

    // Security: resolved paths must stay within assets_dir
    let assets_dir_canonical = match Path::new(assets_dir).canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Asset directory not found or inaccessible '{assets_dir}': {e}"
            ));
            return None;
        }
    };

    // Directory request: probe index files, fall through when none match
    if file_path.is_dir() || clean_path.is_empty() || clean_path.ends_with('/') {
        file_path = find_index_file(&file_path, index_files)?;
    }

    // File not found is common (404), no need to log at warning level
    let Ok(file_path_canonical) = file_path.canonicalize() else {
        return None;
    };
    if !file_path_canonical.starts_with(&assets_dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            file_path_canonical.display()
        ));
        return None;
    }
    if !file_path_canonical.is_file() {
        return None;
    }

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                file_path.display(),
                e
            ));
            return None;
        }
    };

    // Determine content type from extension
    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));

    Some((content, content_type))
}

/// First configured index file that exists in the directory
fn find_index_file(dir: &Path, index_files: &[String]) -> Option<PathBuf> {
    index_files
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Build asset response with `ETag` and Range support
fn build_asset_response(
    data: &[u8],
    content_type: &str,
    server_name: &str,
    ctx: &RequestContext<'_>,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(data);
    let total_size = data.len();

    // Check if client has cached version
    if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
        return http::response::build_304_response(&etag);
    }

    // Check for Range request
    match http::parse_range_header(ctx.range_header.as_deref(), total_size) {
        RangeParseResult::Valid(range) => {
            let start = range.start;
            let end = range.end_position(total_size);

            let body = if ctx.is_head {
                Bytes::new()
            } else {
                Bytes::from(data[start..=end].to_vec())
            };

            return http::response::build_partial_response(
                body,
                content_type,
                &etag,
                server_name,
                start,
                end,
                total_size,
                ctx.is_head,
            );
        }
        RangeParseResult::NotSatisfiable => {
            return http::build_416_response(total_size);
        }
        RangeParseResult::None => {
            // No Range header or malformed, return full content
        }
    }

    // Full response
    let body = if ctx.is_head {
        Bytes::new()
    } else {
        Bytes::from(data.to_owned())
    };

    http::response::build_cached_response(body, content_type, &etag, server_name, ctx.is_head)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_index() -> Vec<String> {
        Vec::new()
    }

    #[tokio::test]
    async fn serves_exact_file_bytes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.js"), b"console.log(1);").unwrap();

        let root = dir.path().to_str().unwrap();
        let (content, content_type) = load_from_directory(root, "/app.js", &no_index())
            .await
            .unwrap();
        assert_eq!(content, b"console.log(1);");
        assert_eq!(content_type, "application/javascript");
    }

    #[tokio::test]
    async fn missing_file_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        assert!(load_from_directory(root, "/nope.png", &no_index())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn root_probes_index_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), b"<html></html>").unwrap();

        let root = dir.path().to_str().unwrap();
        let index_files = vec!["index.html".to_string()];
        let (content, content_type) = load_from_directory(root, "/", &index_files)
            .await
            .unwrap();
        assert_eq!(content, b"<html></html>");
        assert_eq!(content_type, "text/html; charset=utf-8");
    }

    #[tokio::test]
    async fn directory_without_index_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let root = dir.path().to_str().unwrap();
        let index_files = vec!["index.html".to_string()];
        assert!(load_from_directory(root, "/", &index_files).await.is_none());
        assert!(load_from_directory(root, "/sub", &index_files)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn dotdot_segments_do_not_escape() {
        let dir = tempfile::tempdir().unwrap();
        let root_dir = dir.path().join("www");
        std::fs::create_dir(&root_dir).unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"outside").unwrap();

        let root = root_dir.to_str().unwrap();
        assert!(load_from_directory(root, "/../secret.txt", &no_index())
            .await
            .is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlink_escape_is_blocked() {
        let dir = tempfile::tempdir().unwrap();
        let root_dir = dir.path().join("www");
        std::fs::create_dir(&root_dir).unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"outside").unwrap();
        std::os::unix::fs::symlink(dir.path().join("secret.txt"), root_dir.join("link.txt"))
            .unwrap();

        let root = root_dir.to_str().unwrap();
        assert!(load_from_directory(root, "/link.txt", &no_index())
            .await
            .is_none());
    }
}
