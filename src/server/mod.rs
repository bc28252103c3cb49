//! HTTP surface
//!
//! - `GET /search` answers index searches as JSON
//! - `GET /` and `GET /*path` serve the original content

mod content;
mod search;

pub use content::{check_request_path, locate, Forbidden};

use crate::query::QueryService;
use axum::routing::get;
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub query: Arc<QueryService>,
    pub content_root: Arc<PathBuf>,
    pub index_filename: Arc<str>,
}

impl AppState {
    pub fn new(query: QueryService, content_root: PathBuf, index_filename: &str) -> Self {
        Self {
            query: Arc::new(query),
            content_root: Arc::new(content_root),
            index_filename: Arc::from(index_filename),
        }
    }
}

/// Builds the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/search", get(search::search))
        .route("/", get(content::serve_root))
        .route("/*path", get(content::serve_path))
        .with_state(state)
}

/// Serves HTTP on `addr` until `shutdown` resolves
pub async fn serve<F>(addr: SocketAddr, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
