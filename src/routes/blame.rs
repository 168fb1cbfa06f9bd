//! Blame endpoint.
//!
//! GET /api/v1/repositories/{repo}/blame/{rev}/{*path}
//!
//! Returns the file's lines grouped into contiguous runs, each with the
//! commit that last modified it.

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use serde::Serialize;

use crate::cache::CachedResponse;
use crate::error::AppError;
use crate::models::BlameGroup;
use crate::repository::Repository;
use crate::routes::{cached, AppState};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/repositories/{repo}/blame/{rev}/{*path}", get(get_blame))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct BlameResponse {
    path: String,
    line_count: usize,
    groups: Vec<BlameGroup>,
}

async fn get_blame(
    State(state): State<AppState>,
    Path((repo, rev, path)): Path<(String, String, String)>,
) -> Result<CachedResponse, AppError> {
    let full_path = format!("{}/{}", rev, path);
    let file_path = path.clone();
    cached(state, "blame", repo, rev, vec![path], move |repository| {
        let groups = repository.blame(&full_path)?;
        Ok(CachedResponse::json(&BlameResponse {
            path: file_path,
            line_count: groups.iter().map(|g| g.lines.len()).sum(),
            groups,
        })?)
    })
    .await
}
