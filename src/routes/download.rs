//! Archive download.
//!
//! GET /api/v1/repositories/{repo}/download/{rev}
//!
//! tar.gz snapshot of the revision, offered as
//! `<repo>-<short id>.tar.gz`.

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};

use crate::cache::CachedResponse;
use crate::error::AppError;
use crate::repository::Repository;
use crate::routes::{cached, AppState};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/repositories/{repo}/download/{rev}", get(download))
        .with_state(state)
}

async fn download(
    State(state): State<AppState>,
    Path((repo, rev)): Path<(String, String)>,
) -> Result<CachedResponse, AppError> {
    let revision = rev.clone();
    cached(state, "download", repo, rev, Vec::new(), move |repository| {
        let archive = repository.archive(&revision)?;
        let mut response = CachedResponse::new(archive.mime_type, archive.data);
        response.content_disposition = Some(format!("attachment; filename={}", archive.filename));
        Ok(response)
    })
    .await
}
