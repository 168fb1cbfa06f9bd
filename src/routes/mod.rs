//! API route handlers - maps HTTP endpoints to repository operations.
//!
//! Each submodule defines routes for a feature area:
//! - `repository`: repository index, redirect to the active branch, overview
//! - `tree`: directory listings, blobs, raw content, submodules
//! - `commits`: single commit with diffs, per-path history
//! - `blame`: per-line attribution
//! - `download`: tar.gz archives
//!
//! Handlers open a fresh `GitRepository` per request on the blocking pool.
//! Responses about a revision go through the response cache, keyed by the
//! resolved commit id.

pub mod blame;
pub mod commits;
pub mod download;
pub mod repository;
pub mod tree;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::sync::Arc;

use crate::cache::{self, CachedResponse, ResponseCache};
use crate::config::Config;
use crate::error::AppError;
use crate::git::GitRepository;
use crate::registry;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: Arc<dyn ResponseCache>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let cache = cache::from_config(&config.cache);
        Self {
            config: Arc::new(config),
            cache,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(repository::routes(state.clone()))
        .merge(tree::routes(state.clone()))
        .merge(commits::routes(state.clone()))
        .merge(blame::routes(state.clone()))
        .merge(download::routes(state))
}

impl IntoResponse for CachedResponse {
    fn into_response(self) -> Response {
        let mut response = (
            StatusCode::OK,
            [(header::CONTENT_TYPE, self.content_type)],
            self.body,
        )
            .into_response();

        if let Some(disposition) = self.content_disposition {
            if let Ok(value) = disposition.parse() {
                response.headers_mut().insert(header::CONTENT_DISPOSITION, value);
            }
        }
        response
    }
}

/// Run `build` against the named repository, consulting the cache first.
///
/// `prefix` and `extras` distinguish responses about the same revision.
pub(crate) async fn cached<F>(
    state: AppState,
    prefix: &'static str,
    name: String,
    revision: String,
    extras: Vec<String>,
    build: F,
) -> Result<CachedResponse, AppError>
where
    F: FnOnce(&GitRepository) -> Result<CachedResponse, AppError> + Send + 'static,
{
    let response = tokio::task::spawn_blocking(move || -> Result<CachedResponse, AppError> {
        registry::check_name(&name)?;

        let key = if state.config.cache.enabled {
            cache::cache_key(prefix, &state.config, &name, &revision, &extras)
        } else {
            None
        };

        if let Some(hit) = key.as_deref().and_then(|k| state.cache.get(k)) {
            return Ok(hit);
        }

        let repository = registry::open_repository(&state.config, &name)?;
        let response = build(&repository)?;

        if let Some(key) = key {
            state.cache.insert(key, response.clone());
        }
        Ok(response)
    })
    .await??;

    Ok(response)
}

/// Run `f` against the named repository on the blocking pool, uncached.
pub(crate) async fn with_repository<F, T>(state: AppState, name: String, f: F) -> Result<T, AppError>
where
    F: FnOnce(&GitRepository) -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || -> Result<T, AppError> {
        let repository = registry::open_repository(&state.config, &name)?;
        f(&repository)
    })
    .await?
}
