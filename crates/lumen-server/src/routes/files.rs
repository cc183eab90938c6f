use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use lumen_core::error::LumenError;
use lumen_core::models::item::ItemType;
use lumen_core::models::item_id::ItemId;
use lumen_core::models::variant::{QualityVariant, ORIGINAL_LABEL};
use lumen_scan::{guard, text};
use lumen_stream::{open_stream, Delivery, FileStream};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Serialize;

use super::{
    blocking, classify, file_name, item_url, locate_file, parse_id, resolve_dir, ItemQuery,
};
use crate::auth::Authenticated;
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/download/{id}", get(download))
        .route("/api/text/{id}", get(view_text))
        .route("/api/image/{id}", get(view_image))
        .route("/api/stream/{id}", get(stream))
        .route("/api/play/{id}", get(play))
        .route("/api/playlist", get(playlist_root))
        .route("/api/playlist/{*path}", get(playlist))
}

/// Public: anyone holding a link can download.
#[tracing::instrument(skip(state))]
async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ItemQuery>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let item = locate_file(&state, &query.parent, &id).await?;
    let kind = classify(&state, &item.rel_path);
    let file = open_stream(&item.abs_path, None, state.config.chunk_size, kind).await?;

    tracing::info!(path = %item.rel_path, size = file.plan.size, "download");
    file_response(file, Some(content_disposition("attachment", file_name(&item.rel_path))))
}

#[derive(Debug, Serialize)]
pub struct TextResponse {
    pub content: String,
    pub filename: String,
    pub encoding: &'static str,
}

async fn view_text(
    _: Authenticated,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ItemQuery>,
) -> Result<Json<TextResponse>, AppError> {
    let id = parse_id(&id)?;
    let item = locate_file(&state, &query.parent, &id).await?;
    require_kind(&state, &item.rel_path, &[ItemType::Text])?;

    let max = state.config.max_text_size;
    let path = item.abs_path.clone();
    let text = blocking(move || text::read_text(&path, max)).await??;

    Ok(Json(TextResponse {
        content: text.content,
        filename: file_name(&item.rel_path).to_string(),
        encoding: text.encoding,
    }))
}

async fn view_image(
    _: Authenticated,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ItemQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let item = locate_file(&state, &query.parent, &id).await?;
    require_kind(&state, &item.rel_path, &[ItemType::Image])?;

    let file =
        open_stream(&item.abs_path, None, state.config.chunk_size, ItemType::Image).await?;
    if let Some(not_modified) = not_modified(&headers, &file) {
        return Ok(not_modified);
    }
    file_response(file, None)
}

/// Range-aware media streaming. HEAD is answered by the same handler with
/// the body dropped.
#[tracing::instrument(skip(state, headers))]
async fn stream(
    _: Authenticated,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ItemQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let item = locate_file(&state, &query.parent, &id).await?;
    let kind = classify(&state, &item.rel_path);

    let range = headers
        .get(header::RANGE)
        .map(|v| {
            v.to_str().map_err(|_| LumenError::MalformedRange {
                header: String::from_utf8_lossy(v.as_bytes()).into_owned(),
            })
        })
        .transpose()?;

    let file = open_stream(&item.abs_path, range, state.config.chunk_size, kind).await?;
    if range.is_none() {
        if let Some(not_modified) = not_modified(&headers, &file) {
            return Ok(not_modified);
        }
    }

    tracing::debug!(
        path = %item.rel_path,
        range = ?file.plan.range,
        size = file.plan.size,
        "stream"
    );
    file_response(file, None)
}

#[derive(Debug, Serialize)]
pub struct NavLink {
    pub id: ItemId,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct VariantLink {
    pub label: String,
    pub id: ItemId,
    pub path: String,
    pub stream_url: String,
}

/// Everything a player page needs for one media item.
#[derive(Debug, Serialize)]
pub struct PlayResponse {
    pub kind: ItemType,
    pub id: ItemId,
    pub name: String,
    pub parent: String,
    pub stream_url: String,
    pub download_url: String,
    pub mime_type: String,
    /// The on-disk name could not be decoded; same rule as listings.
    pub is_problematic: bool,
    /// Quality options, best first. Empty for audio.
    pub variants: Vec<VariantLink>,
    pub prev: Option<NavLink>,
    pub next: Option<NavLink>,
}

#[tracing::instrument(skip(state))]
async fn play(
    _: Authenticated,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ItemQuery>,
) -> Result<Json<PlayResponse>, AppError> {
    let id = parse_id(&id)?;
    let item = locate_file(&state, &query.parent, &id).await?;
    let kind = require_kind(&state, &item.rel_path, &[ItemType::Video, ItemType::Audio])?;
    let (parent, name) = guard::split_rel(&item.rel_path);
    let parent = parent.to_string();
    let name = name.to_string();

    let library = state.library.clone();
    let rel = item.rel_path.clone();
    let (adjacent, variants) = blocking(move || {
        let adjacent = library.find_adjacent(&rel, Some(kind));
        let variants = match kind {
            ItemType::Video => library.find_variants(&rel),
            _ => Vec::new(),
        };
        (adjacent, variants)
    })
    .await?;

    let mut variants = variants;
    if kind == ItemType::Video && variants.is_empty() {
        variants.push(QualityVariant {
            label: ORIGINAL_LABEL.to_string(),
            path: item.rel_path.clone(),
            id: id.clone(),
        });
    }
    let variants = variants
        .into_iter()
        .map(|v| VariantLink {
            stream_url: item_url("stream", &parent, &v.id),
            label: v.label,
            id: v.id,
            path: v.path,
        })
        .collect();

    let link = |id: ItemId| NavLink {
        url: item_url("play", &parent, &id),
        id,
    };

    Ok(Json(PlayResponse {
        kind,
        stream_url: item_url("stream", &parent, &id),
        download_url: item_url("download", &parent, &id),
        mime_type: player_mime(&item.abs_path, kind),
        is_problematic: item.is_problematic,
        variants,
        prev: adjacent.prev.map(link),
        next: adjacent.next.map(link),
        id,
        name,
        parent,
    }))
}

async fn playlist_root(
    _: Authenticated,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    build_playlist(state, String::new(), headers).await
}

async fn playlist(
    _: Authenticated,
    State(state): State<AppState>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    build_playlist(state, path, headers).await
}

/// M3U of the folder's audio and video, pointing at public download links so
/// external players need no credentials.
#[tracing::instrument(skip(state, headers))]
async fn build_playlist(
    state: AppState,
    path: String,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let (rel, _) = resolve_dir(&state, &path)?;
    let library = state.library.clone();
    let target = rel.clone();
    let listing = blocking(move || library.list(&target, Default::default(), Default::default())).await?;

    let media: Vec<_> = listing.items.iter().filter(|i| i.item_type.is_media()).collect();
    if media.is_empty() {
        return Err(LumenError::not_found(format!("playable media in '{rel}'")).into());
    }

    let base = external_base(&headers);
    let mut m3u = String::from("#EXTM3U\n");
    for item in &media {
        let title = item.display_name.replace(',', ";").replace(['\n', '\r'], " ");
        m3u.push_str(&format!("#EXTINF:-1,{title}\n"));
        m3u.push_str(&format!("{base}{}\n", item_url("download", &rel, &item.id)));
    }

    let folder = guard::split_rel(&rel).1;
    let filename = format!("{}.m3u", playlist_stem(if folder.is_empty() { "media_root" } else { folder }));
    tracing::info!(path = %rel, entries = media.len(), %filename, "generated playlist");

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("audio/x-mpegurl; charset=utf-8"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        header_value(&content_disposition("attachment", &filename))?,
    );
    Ok((StatusCode::OK, headers, m3u).into_response())
}

fn require_kind(state: &AppState, rel_path: &str, allowed: &[ItemType]) -> Result<ItemType, AppError> {
    let kind = classify(state, rel_path);
    if allowed.contains(&kind) {
        Ok(kind)
    } else {
        Err(LumenError::WrongType {
            path: rel_path.to_string(),
            expected: allowed
                .iter()
                .map(ItemType::to_string)
                .collect::<Vec<_>>()
                .join(" or "),
        }
        .into())
    }
}

fn player_mime(path: &std::path::Path, kind: ItemType) -> String {
    let guessed = lumen_stream::response::content_type_for(path, kind);
    match kind {
        ItemType::Video if guessed == "video/x-matroska" || !guessed.starts_with("video/") => {
            "video/mp4".to_string()
        }
        ItemType::Audio if !guessed.starts_with("audio/") => "audio/mpeg".to_string(),
        _ => guessed,
    }
}

fn file_response(file: FileStream, disposition: Option<String>) -> Result<Response, AppError> {
    let FileStream { plan, body } = file;
    let status = match plan.delivery {
        Delivery::Partial => StatusCode::PARTIAL_CONTENT,
        Delivery::Full => StatusCode::OK,
    };

    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(plan.content_length()));
    headers.insert(header::CONTENT_TYPE, header_value(&plan.content_type)?);
    headers.insert(header::ETAG, header_value(&plan.etag)?);
    if let Some(range) = plan.content_range() {
        headers.insert(header::CONTENT_RANGE, header_value(&range)?);
    }
    if let Some(disposition) = disposition {
        headers.insert(header::CONTENT_DISPOSITION, header_value(&disposition)?);
    }

    Ok((status, headers, Body::from_stream(body)).into_response())
}

fn not_modified(headers: &HeaderMap, file: &FileStream) -> Option<Response> {
    let tag = headers.get(header::IF_NONE_MATCH)?;
    if tag.as_bytes() != file.plan.etag.as_bytes() {
        return None;
    }
    let mut response = StatusCode::NOT_MODIFIED.into_response();
    if let Ok(etag) = HeaderValue::from_str(&file.plan.etag) {
        response.headers_mut().insert(header::ETAG, etag);
    }
    Some(response)
}

fn header_value(value: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(value).map_err(|e| AppError::Internal(format!("bad header value: {e}")))
}

/// `Content-Disposition` with an ASCII fallback name and the exact UTF-8
/// name in `filename*`.
fn content_disposition(kind: &str, name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c == ' ' || c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect();
    format!(
        "{kind}; filename=\"{fallback}\"; filename*=UTF-8''{}",
        utf8_percent_encode(name, NON_ALPHANUMERIC)
    )
}

/// Filesystem-safe playlist name.
fn playlist_stem(folder: &str) -> String {
    let stem: String = folder
        .chars()
        .map(|c| match c {
            ' ' => '_',
            c if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') => c,
            _ => '_',
        })
        .collect();
    let stem = stem.trim_matches(|c| c == '.' || c == '_').to_string();
    if stem.is_empty() {
        "playlist".to_string()
    } else {
        stem
    }
}

/// `scheme://host` the client used to reach us, honouring a reverse proxy's
/// `X-Forwarded-Proto`.
fn external_base(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .filter(|s| *s == "https" || *s == "http")
        .unwrap_or("http");
    format!("{scheme}://{host}")
}
