//! Commit endpoints.
//!
//! - GET /api/v1/repositories/{repo}/commit/{rev}
//!   Commit metadata with its diffs against the first parent and stats.
//! - GET /api/v1/repositories/{repo}/history/{rev}[/{*path}]?limit=&skip=
//!   Commits touching the path, newest first.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::cache::CachedResponse;
use crate::error::{AppError, RepositoryError};
use crate::models::{Commit, Diff, Stats};
use crate::repository::Repository;
use crate::routes::{cached, AppState};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/repositories/{repo}/commit/{rev}", get(get_commit))
        .route("/api/v1/repositories/{repo}/history/{rev}", get(get_root_history))
        .route("/api/v1/repositories/{repo}/history/{rev}/{*path}", get(get_history))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct CommitResponse<'a> {
    commit: &'a Commit,
    diffs: &'a [Diff],
    stats: Stats,
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    skip: usize,
}

fn default_limit() -> usize {
    50
}

async fn get_commit(
    State(state): State<AppState>,
    Path((repo, rev)): Path<(String, String)>,
) -> Result<CachedResponse, AppError> {
    let revision = rev.clone();
    cached(state, "commit", repo, rev, Vec::new(), move |repository| {
        let commit = repository.commit(&revision)?;
        let diffs = repository.diffs(&commit)?;
        Ok(CachedResponse::json(&CommitResponse {
            commit: &commit,
            diffs,
            stats: Stats::from_diffs(diffs),
        })?)
    })
    .await
}

async fn get_root_history(
    State(state): State<AppState>,
    Path((repo, rev)): Path<(String, String)>,
    Query(query): Query<HistoryQuery>,
) -> Result<CachedResponse, AppError> {
    history_response(state, repo, rev, String::new(), query).await
}

async fn get_history(
    State(state): State<AppState>,
    Path((repo, rev, path)): Path<(String, String, String)>,
    Query(query): Query<HistoryQuery>,
) -> Result<CachedResponse, AppError> {
    history_response(state, repo, rev, path, query).await
}

async fn history_response(
    state: AppState,
    repo: String,
    rev: String,
    path: String,
    query: HistoryQuery,
) -> Result<CachedResponse, AppError> {
    let full_path = format!("{}/{}", rev, path);
    let extras = vec![path, query.limit.to_string(), query.skip.to_string()];
    cached(state, "history", repo, rev, extras, move |repository| {
        let commits = repository
            .history(&full_path, Some(query.limit), query.skip)?
            .collect::<Result<Vec<_>, RepositoryError>>()?;
        Ok(CachedResponse::json(&commits)?)
    })
    .await
}
