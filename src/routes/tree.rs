//! Browsing endpoints.
//!
//! - GET /api/v1/repositories/{repo}/tree/{rev}[/{*path}]
//!   Directory listing, each child decorated with its last commit.
//! - GET /api/v1/repositories/{repo}/blob/{rev}/{*path}
//!   Blob metadata plus content when it is text.
//! - GET /api/v1/repositories/{repo}/raw/{rev}/{*path}
//!   Blob bytes served unmodified with the detected MIME type.
//! - GET /api/v1/repositories/{repo}/submodules/{rev}?base=
//!   Submodules declared directly under `base`.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::cache::CachedResponse;
use crate::error::AppError;
use crate::mime;
use crate::models::Blob;
use crate::repository::Repository;
use crate::routes::{cached, AppState};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/repositories/{repo}/tree/{rev}", get(get_root_tree))
        .route("/api/v1/repositories/{repo}/tree/{rev}/{*path}", get(get_tree))
        .route("/api/v1/repositories/{repo}/blob/{rev}/{*path}", get(get_blob))
        .route("/api/v1/repositories/{repo}/raw/{rev}/{*path}", get(get_raw))
        .route("/api/v1/repositories/{repo}/submodules/{rev}", get(get_submodules))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct BlobResponse {
    #[serde(flatten)]
    blob: Blob,
    is_binary: bool,
    /// UTF-8 content, only for text blobs
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubmoduleQuery {
    #[serde(default)]
    base: String,
}

async fn get_root_tree(
    State(state): State<AppState>,
    Path((repo, rev)): Path<(String, String)>,
) -> Result<CachedResponse, AppError> {
    tree_response(state, repo, rev, String::new()).await
}

async fn get_tree(
    State(state): State<AppState>,
    Path((repo, rev, path)): Path<(String, String, String)>,
) -> Result<CachedResponse, AppError> {
    tree_response(state, repo, rev, path).await
}

async fn tree_response(
    state: AppState,
    repo: String,
    rev: String,
    path: String,
) -> Result<CachedResponse, AppError> {
    let full_path = format!("{}/{}", rev, path);
    cached(state, "tree", repo, rev, vec![path], move |repository| {
        let tree = repository.tree(&full_path, true)?;
        Ok(CachedResponse::json(&tree)?)
    })
    .await
}

async fn get_blob(
    State(state): State<AppState>,
    Path((repo, rev, path)): Path<(String, String, String)>,
) -> Result<CachedResponse, AppError> {
    let full_path = format!("{}/{}", rev, path);
    cached(state, "blob", repo, rev, vec![path], move |repository| {
        let blob = repository.blob(&full_path)?;
        let data = repository.blob_data(&blob)?;
        let is_binary = mime::is_binary(data);
        let content = if !is_binary && mime::is_text(&blob.mime_type) {
            String::from_utf8(data.to_vec()).ok()
        } else {
            None
        };
        Ok(CachedResponse::json(&BlobResponse {
            blob,
            is_binary,
            content,
        })?)
    })
    .await
}

async fn get_raw(
    State(state): State<AppState>,
    Path((repo, rev, path)): Path<(String, String, String)>,
) -> Result<CachedResponse, AppError> {
    let full_path = format!("{}/{}", rev, path);
    cached(state, "raw", repo, rev, vec![path], move |repository| {
        let (data, mime_type) = repository.raw(&full_path)?;
        Ok(CachedResponse::new(mime_type, data))
    })
    .await
}

async fn get_submodules(
    State(state): State<AppState>,
    Path((repo, rev)): Path<(String, String)>,
    Query(query): Query<SubmoduleQuery>,
) -> Result<CachedResponse, AppError> {
    let revision = rev.clone();
    let base = query.base.clone();
    cached(state, "submodules", repo, rev, vec![query.base], move |repository| {
        let submodules = repository.submodules(&base, &revision)?;
        Ok(CachedResponse::json(&submodules)?)
    })
    .await
}
