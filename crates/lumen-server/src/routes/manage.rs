use axum::extract::multipart::Field;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, post};
use axum::{Json, Router};
use lumen_core::error::LumenError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use tokio::io::AsyncWriteExt;

use super::{locate, parse_id, resolve_dir, ItemQuery};
use crate::auth::Authenticated;
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/upload", post(upload_root))
        .route("/api/upload/{*path}", post(upload))
        .layer(DefaultBodyLimit::disable())
        .route("/api/folders", post(create_folder_root))
        .route("/api/folders/{*path}", post(create_folder))
        .route("/api/items/{id}", delete(delete_item))
}

#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub success: bool,
    /// Relative path of the created or deleted entry.
    pub path: String,
}

async fn upload_root(
    _: Authenticated,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<MutationResponse>), AppError> {
    store_upload(state, String::new(), multipart).await
}

async fn upload(
    _: Authenticated,
    State(state): State<AppState>,
    Path(path): Path<String>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<MutationResponse>), AppError> {
    store_upload(state, path, multipart).await
}

/// Save the `file` field of a multipart body into the target folder.
///
/// Existing files are never overwritten. A partially written file is
/// removed when the transfer fails.
#[tracing::instrument(skip(state, multipart))]
async fn store_upload(
    state: AppState,
    path: String,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<MutationResponse>), AppError> {
    let (rel, dir_abs) = resolve_dir(&state, &path)?;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(AppError::BadRequest("no 'file' part in the request".into())),
            Err(e) => return Err(AppError::BadRequest(format!("invalid multipart body: {e}"))),
        };
        if field.name() == Some("file") {
            return save_field(&state, &rel, &dir_abs, field).await;
        }
    }
}

async fn save_field(
    state: &AppState,
    rel: &str,
    dir_abs: &std::path::Path,
    mut field: Field<'_>,
) -> Result<(StatusCode, Json<MutationResponse>), AppError> {
    let original = field.file_name().unwrap_or_default().to_string();
    let name = clean_upload_name(&original)?;
    let dest = state
        .library
        .guard()
        .resolve_child(dir_abs, OsStr::new(&name))
        .ok_or_else(|| LumenError::invalid_path(&name))?;
    let dest_rel = lumen_scan::guard::join_rel(rel, &name);

    let mut file = match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&dest)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(LumenError::AlreadyExists { path: dest_rel }.into());
        }
        Err(e) => return Err(LumenError::Io(e).into()),
    };

    let mut written: u64 = 0;
    let outcome: Result<(), AppError> = async {
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::BadRequest(format!("upload interrupted: {e}")))?
        {
            file.write_all(&chunk).await.map_err(LumenError::Io)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(LumenError::Io)?;
        Ok(())
    }
    .await;

    if let Err(e) = outcome {
        drop(file);
        remove_partial(&dest).await;
        return Err(e);
    }

    tracing::info!(path = %dest_rel, bytes = written, original = %original, "uploaded file");
    Ok((
        StatusCode::CREATED,
        Json(MutationResponse {
            success: true,
            path: dest_rel,
        }),
    ))
}

async fn remove_partial(dest: &std::path::Path) {
    if let Err(e) = tokio::fs::remove_file(dest).await {
        tracing::warn!(path = %dest.display(), "could not remove partial upload: {e}");
    }
}

async fn remove_link(link: &std::path::Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(link).await {
        // directory symlinks on Windows are removed as directories
        #[cfg(windows)]
        Err(_) => tokio::fs::remove_dir(link).await,
        result => result,
    }
}

/// Strip surrounding dots and spaces and flatten separators, refusing names
/// that still carry `..` or end up empty.
fn clean_upload_name(original: &str) -> Result<String, AppError> {
    let cleaned = original
        .trim_matches(|c| c == '.' || c == ' ')
        .replace(['/', '\\'], "_");
    if cleaned.contains("..") {
        return Err(AppError::BadRequest(format!(
            "filename '{original}' contains invalid components ('..')"
        )));
    }
    if cleaned.is_empty() {
        return Err(AppError::BadRequest(format!("filename '{original}' is invalid")));
    }
    Ok(cleaned)
}

#[derive(Debug, Deserialize)]
pub struct CreateFolder {
    pub name: String,
}

async fn create_folder_root(
    _: Authenticated,
    State(state): State<AppState>,
    Json(body): Json<CreateFolder>,
) -> Result<(StatusCode, Json<MutationResponse>), AppError> {
    make_folder(state, String::new(), body).await
}

async fn create_folder(
    _: Authenticated,
    State(state): State<AppState>,
    Path(path): Path<String>,
    Json(body): Json<CreateFolder>,
) -> Result<(StatusCode, Json<MutationResponse>), AppError> {
    make_folder(state, path, body).await
}

#[tracing::instrument(skip(state))]
async fn make_folder(
    state: AppState,
    path: String,
    body: CreateFolder,
) -> Result<(StatusCode, Json<MutationResponse>), AppError> {
    let (rel, dir_abs) = resolve_dir(&state, &path)?;
    let name = body.name.trim();
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(AppError::BadRequest(format!(
            "invalid folder name '{name}': use a simple name without slashes or leading dots"
        )));
    }

    let target = state
        .library
        .guard()
        .resolve_child(&dir_abs, OsStr::new(name))
        .ok_or_else(|| LumenError::invalid_path(name))?;
    let target_rel = lumen_scan::guard::join_rel(&rel, name);

    match tokio::fs::create_dir(&target).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(LumenError::AlreadyExists { path: target_rel }.into());
        }
        Err(e) => return Err(LumenError::Io(e).into()),
    }

    tracing::info!(path = %target_rel, "created folder");
    Ok((
        StatusCode::CREATED,
        Json(MutationResponse {
            success: true,
            path: target_rel,
        }),
    ))
}

/// Delete a file, or a folder with everything in it. A symlink is removed
/// as a link; its target is left alone.
#[tracing::instrument(skip(state))]
async fn delete_item(
    _: Authenticated,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ItemQuery>,
) -> Result<Json<MutationResponse>, AppError> {
    let id = parse_id(&id)?;
    let item = locate(&state, &query.parent, &id).await?;
    let target = &item.entry_path;
    if target == state.library.root() {
        return Err(LumenError::invalid_path(item.rel_path).into());
    }

    let file_type = tokio::fs::symlink_metadata(target)
        .await
        .map_err(LumenError::Io)?
        .file_type();
    if file_type.is_symlink() {
        remove_link(target).await.map_err(LumenError::Io)?;
        tracing::info!(path = %item.rel_path, "deleted symlink");
    } else if file_type.is_file() {
        tokio::fs::remove_file(target).await.map_err(LumenError::Io)?;
        tracing::info!(path = %item.rel_path, "deleted file");
    } else if file_type.is_dir() {
        tokio::fs::remove_dir_all(target).await.map_err(LumenError::Io)?;
        tracing::info!(path = %item.rel_path, "deleted folder and contents");
    } else {
        return Err(LumenError::WrongType {
            path: item.rel_path,
            expected: "file or folder".into(),
        }
        .into());
    }

    Ok(Json(MutationResponse {
        success: true,
        path: item.rel_path,
    }))
}
