use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use lumen_core::models::item::ListedItem;
use lumen_core::models::sort::{SortBy, SortOrder};
use lumen_scan::guard;
use lumen_scan::lister::paginate;
use serde::{Deserialize, Serialize};

use super::{blocking, resolve_dir};
use crate::auth::Authenticated;
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/browse", get(browse_root))
        .route("/api/browse/{*path}", get(browse))
}

/// Listing options. Unknown values fall back to the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct BrowseQuery {
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Breadcrumb {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct BrowseResponse {
    pub path: String,
    pub name: String,
    pub breadcrumbs: Vec<Breadcrumb>,
    /// Absent at the root.
    pub parent: Option<String>,
    pub items: Vec<ListedItem>,
    pub image_only: bool,
    pub page: usize,
    pub total_pages: usize,
    /// Whether a playlist can be generated for this folder.
    pub has_media: bool,
    pub sort: SortBy,
    pub order: SortOrder,
}

async fn browse_root(
    _: Authenticated,
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<BrowseResponse>, AppError> {
    list(state, String::new(), query).await
}

async fn browse(
    _: Authenticated,
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<BrowseResponse>, AppError> {
    list(state, path, query).await
}

#[tracing::instrument(skip(state))]
async fn list(
    state: AppState,
    path: String,
    query: BrowseQuery,
) -> Result<Json<BrowseResponse>, AppError> {
    let (rel, _) = resolve_dir(&state, &path)?;
    let sort: SortBy = query.sort.as_deref().and_then(|s| s.parse().ok()).unwrap_or_default();
    let order: SortOrder = query.order.as_deref().and_then(|s| s.parse().ok()).unwrap_or_default();
    let page = query.page.as_deref().and_then(|p| p.parse().ok()).unwrap_or(1);

    let library = state.library.clone();
    let target = rel.clone();
    let listing = blocking(move || library.list(&target, sort, order)).await?;

    let has_media = listing.items.iter().any(|item| item.item_type.is_media());
    let (items, page, total_pages) = if listing.image_only {
        let paged = paginate(&listing.items, page, state.config.page_size);
        (paged.items, paged.page, paged.total_pages)
    } else {
        (listing.items, 1, 1)
    };

    let (breadcrumbs, name) = breadcrumbs(&rel);
    let parent = (!rel.is_empty()).then(|| guard::split_rel(&rel).0.to_string());

    tracing::debug!(path = %rel, count = items.len(), page, total_pages, "browse");
    Ok(Json(BrowseResponse {
        path: rel,
        name,
        breadcrumbs,
        parent,
        items,
        image_only: listing.image_only,
        page,
        total_pages,
        has_media,
        sort,
        order,
    }))
}

/// Trail from the root to `rel`, plus the display name of the current folder.
fn breadcrumbs(rel: &str) -> (Vec<Breadcrumb>, String) {
    let mut crumbs = vec![Breadcrumb {
        name: "Home".to_string(),
        path: String::new(),
    }];
    let mut name = "Home".to_string();
    let mut acc = String::new();
    for part in rel.split('/').filter(|p| !p.is_empty()) {
        acc = guard::join_rel(&acc, part);
        crumbs.push(Breadcrumb {
            name: part.to_string(),
            path: acc.clone(),
        });
        name = part.to_string();
    }
    (crumbs, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breadcrumbs() {
        let (crumbs, name) = breadcrumbs("tv/show/s01");
        let paths: Vec<&str> = crumbs.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["", "tv", "tv/show", "tv/show/s01"]);
        assert_eq!(name, "s01");

        let (root, name) = breadcrumbs("");
        assert_eq!(root.len(), 1);
        assert_eq!(name, "Home");
    }
}
