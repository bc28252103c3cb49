//! Static content serving
//!
//! Request paths are checked before any filesystem access: parent-directory
//! segments and absolute paths are refused outright.

use crate::server::AppState;
use axum::body::Body;
use axum::extract::{Path as UrlPath, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::path::{Component, Path, PathBuf};
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// Why a request path was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Forbidden;

/// Validates a request path and turns it into a path relative to the root
///
/// Pure string/path inspection; never touches the filesystem.
///
/// # Example
///
/// ```
/// use shelfmark::server::check_request_path;
///
/// assert!(check_request_path("docs/index.html").is_ok());
/// assert!(check_request_path("../etc/passwd").is_err());
/// assert!(check_request_path("/etc/passwd").is_err());
/// ```
pub fn check_request_path(requested: &str) -> Result<PathBuf, Forbidden> {
    if requested.contains("..")
        || requested.starts_with('/')
        || requested.starts_with('\\')
        || requested.contains('\0')
    {
        return Err(Forbidden);
    }

    let relative = Path::new(requested);
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(Forbidden);
    }

    Ok(relative.to_path_buf())
}

/// Finds the file to serve for an already checked relative path
///
/// A directory resolves to its index file; a regular file to itself.
pub async fn locate(root: &Path, relative: &Path, index_filename: &str) -> Option<PathBuf> {
    let candidate = root.join(relative);
    let metadata = tokio::fs::metadata(&candidate).await.ok()?;

    if metadata.is_dir() {
        let index = candidate.join(index_filename);
        return match tokio::fs::metadata(&index).await {
            Ok(m) if m.is_file() => Some(index),
            _ => None,
        };
    }

    metadata.is_file().then_some(candidate)
}

/// `GET /` serves the root index page
pub async fn serve_root(State(state): State<AppState>, request: Request) -> Response {
    serve(&state, "", request).await
}

/// `GET /*path` serves a file or a directory's index page
pub async fn serve_path(
    State(state): State<AppState>,
    UrlPath(requested): UrlPath<String>,
    request: Request,
) -> Response {
    serve(&state, &requested, request).await
}

async fn serve(state: &AppState, requested: &str, request: Request) -> Response {
    let relative = match check_request_path(requested) {
        Ok(relative) => relative,
        Err(Forbidden) => {
            tracing::warn!("Refused content path: {:?}", requested);
            return StatusCode::FORBIDDEN.into_response();
        }
    };

    let Some(file) = locate(&state.content_root, &relative, &state.index_filename).await else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match ServeFile::new(file).oneshot(request).await {
        Ok(response) => response.map(Body::new).into_response(),
        Err(never) => match never {},
    }
}
