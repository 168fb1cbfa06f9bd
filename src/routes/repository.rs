//! Repository index and overview endpoints.
//!
//! - GET /api/v1/repositories
//!   Servable repositories under the configured root, empty ones included.
//!
//! - GET /api/v1/repositories/{repo}
//!   Redirects to the overview of the active branch.
//!
//! - GET /api/v1/repositories/{repo}/overview/{rev}
//!   Metadata, README, license, clone URLs, branches, tags and the most
//!   recent commits reachable from `rev`.

use axum::{
    extract::{Path, State},
    response::Redirect,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::cache::CachedResponse;
use crate::error::AppError;
use crate::models::{Branch, Commit, Readme, RepositorySummary};
use crate::registry;
use crate::repository::Repository;
use crate::routes::{cached, with_repository, AppState};

/// Commits shown in the overview's activity feed.
const ACTIVITY_COUNT: usize = 4;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/repositories", get(list_repositories))
        .route("/api/v1/repositories/{repo}", get(redirect_to_overview))
        .route("/api/v1/repositories/{repo}/overview/{rev}", get(get_overview))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct Overview {
    repository: RepositorySummary,
    active_branch: String,
    revision: String,
    commit_count: usize,
    readme: Option<Readme>,
    license: Option<String>,
    clone_urls: BTreeMap<String, String>,
    branches: Vec<Branch>,
    tags: Vec<Branch>,
    last_activities: Vec<Commit>,
}

async fn list_repositories(
    State(state): State<AppState>,
) -> Result<Json<Vec<RepositorySummary>>, AppError> {
    let repositories = tokio::task::spawn_blocking(move || registry::list_repositories(&state.config))
        .await??;
    Ok(Json(repositories))
}

async fn redirect_to_overview(
    State(state): State<AppState>,
    Path(repo): Path<String>,
) -> Result<Redirect, AppError> {
    let target = repo.clone();
    let branch = with_repository(state, repo, |repository| Ok(repository.active_branch()?)).await?;
    Ok(Redirect::temporary(&format!(
        "/api/v1/repositories/{}/overview/{}",
        target, branch
    )))
}

async fn get_overview(
    State(state): State<AppState>,
    Path((repo, rev)): Path<(String, String)>,
) -> Result<CachedResponse, AppError> {
    let revision = rev.clone();
    cached(state, "overview", repo, rev, Vec::new(), move |repository| {
        let overview = Overview {
            repository: repository.summary(),
            active_branch: repository.active_branch()?,
            commit_count: repository.commit_count(&revision)?,
            readme: repository.readme()?,
            license: repository.license()?,
            clone_urls: repository.clone_urls(),
            branches: repository.branches()?,
            tags: repository.tags()?,
            last_activities: repository.last_activities(&revision, ACTIVITY_COUNT, 0)?,
            revision,
        };
        Ok(CachedResponse::json(&overview)?)
    })
    .await
}
