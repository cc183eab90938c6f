pub mod browse;
pub mod files;
pub mod manage;

use axum::Router;
use lumen_core::error::LumenError;
use lumen_core::models::item::ItemType;
use lumen_core::models::item_id::ItemId;
use lumen_scan::guard;
use lumen_scan::ResolvedItem;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

/// Characters left as-is when a relative path goes into a query string.
const QUERY_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// All `/api` routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(browse::router())
        .merge(files::router())
        .merge(manage::router())
}

/// Query carrying the directory an identifier lives in.
#[derive(Debug, Default, Deserialize)]
pub struct ItemQuery {
    #[serde(default)]
    pub parent: String,
}

/// Run filesystem work off the async worker threads.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await?)
}

pub(crate) fn normalize(raw: &str) -> Result<String, AppError> {
    guard::normalize(raw).ok_or_else(|| LumenError::invalid_path(raw).into())
}

pub(crate) fn parse_id(raw: &str) -> Result<ItemId, AppError> {
    ItemId::parse(raw).ok_or_else(|| LumenError::not_found(format!("item {raw}")).into())
}

/// Resolve `id` inside `parent`, rescanning the parent directory.
pub(crate) async fn locate(
    state: &AppState,
    parent: &str,
    id: &ItemId,
) -> Result<ResolvedItem, AppError> {
    let parent = normalize(parent)?;
    let library = state.library.clone();
    let lookup = id.clone();
    blocking(move || library.resolve_identifier(&parent, &lookup))
        .await?
        .ok_or_else(|| LumenError::not_found(format!("item {id}")).into())
}

/// Resolve `id` and require it to be a regular file.
pub(crate) async fn locate_file(
    state: &AppState,
    parent: &str,
    id: &ItemId,
) -> Result<ResolvedItem, AppError> {
    let item = locate(state, parent, id).await?;
    if !item.abs_path.is_file() {
        return Err(LumenError::not_found(format!("file {}", item.rel_path)).into());
    }
    Ok(item)
}

/// Resolve a relative directory path to an existing directory.
pub(crate) fn resolve_dir(state: &AppState, raw: &str) -> Result<(String, std::path::PathBuf), AppError> {
    let rel = normalize(raw)?;
    let abs = state
        .library
        .resolve(&rel)
        .ok_or_else(|| LumenError::invalid_path(raw))?;
    if !abs.is_dir() {
        return Err(LumenError::not_found(format!("directory '{rel}'")).into());
    }
    Ok((rel, abs))
}

pub(crate) fn file_name(rel_path: &str) -> &str {
    guard::split_rel(rel_path).1
}

pub(crate) fn classify(state: &AppState, rel_path: &str) -> ItemType {
    state.library.classify(file_name(rel_path))
}

/// `/api/<action>/<id>?parent=<parent>`
pub(crate) fn item_url(action: &str, parent: &str, id: &ItemId) -> String {
    if parent.is_empty() {
        format!("/api/{action}/{id}")
    } else {
        format!(
            "/api/{action}/{id}?parent={}",
            utf8_percent_encode(parent, QUERY_SAFE)
        )
    }
}
