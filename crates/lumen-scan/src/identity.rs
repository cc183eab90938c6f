use lumen_core::models::item_id::{ItemId, ITEM_ID_LEN};
use sha2::{Digest, Sha256};
use std::ffi::OsStr;
use std::path::PathBuf;

use crate::guard::{self, PathGuard};

/// An identifier matched back to a directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedItem {
    /// Forward-slash relative path. Lossy when the name is not valid UTF-8.
    pub rel_path: String,
    /// Canonical absolute path, already confined to the root. Symlinks are
    /// followed, so this is what reads go through.
    pub abs_path: PathBuf,
    /// The directory entry itself: the canonical parent joined with the
    /// entry name. A symlink stays a symlink here, so mutations act on the
    /// link and never on its target.
    pub entry_path: PathBuf,
    /// The on-disk name could not be decoded cleanly.
    pub is_problematic: bool,
}

/// Identifier for a relative path.
///
/// Slashes are unified and trimmed first, so `a/b`, `/a/b/` and `a\b` all
/// map to the same identifier; the empty string is the root.
pub fn identifier_of(rel_path: &str) -> ItemId {
    let canonical = rel_path.replace('\\', "/");
    digest_hex(canonical.trim_matches('/').as_bytes())
}

/// Identifier for `name` inside the directory `parent_rel`, computed from the
/// raw bytes of the name so that undecodable names still get a stable id.
pub fn child_identifier(parent_rel: &str, name: &OsStr) -> ItemId {
    let parent = parent_rel.replace('\\', "/");
    let parent = parent.trim_matches('/');
    let mut bytes = Vec::with_capacity(parent.len() + 1 + name.len());
    if !parent.is_empty() {
        bytes.extend_from_slice(parent.as_bytes());
        bytes.push(b'/');
    }
    bytes.extend_from_slice(&name_bytes(name));
    digest_hex(&bytes)
}

/// Find the child of `parent_rel` whose identifier is `id`.
///
/// Rescans the parent directory on every call. The match is re-validated
/// through the guard, so a child swapped for an escaping symlink between
/// listing and lookup resolves to `None`.
pub fn resolve_identifier(guard: &PathGuard, parent_rel: &str, id: &ItemId) -> Option<ResolvedItem> {
    let parent_clean = guard::normalize(parent_rel)?;
    let parent_abs = guard.resolve(&parent_clean).filter(|p| p.is_dir());
    let Some(parent_abs) = parent_abs else {
        tracing::warn!(parent = parent_rel, "cannot resolve id: invalid parent directory");
        return None;
    };

    tracing::debug!(%id, parent = %parent_clean, "searching for item id");
    let entries = match std::fs::read_dir(&parent_abs) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!(%id, dir = %parent_abs.display(), "failed to list directory: {e}");
            return None;
        }
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        if guard::is_hidden(&name) {
            continue;
        }
        if child_identifier(&parent_clean, &name) != *id {
            continue;
        }

        let rel_path = guard::join_rel(&parent_clean, &name.to_string_lossy());
        return match guard.resolve_child(&parent_abs, &name) {
            Some(abs_path) => Some(ResolvedItem {
                rel_path,
                abs_path,
                entry_path: parent_abs.join(&name),
                is_problematic: guard::is_problematic_name(&name),
            }),
            None => {
                tracing::error!(%id, path = %rel_path, "matched item failed safety check");
                None
            }
        };
    }

    tracing::warn!(%id, parent = %parent_clean, "item id not found");
    None
}

fn digest_hex(bytes: &[u8]) -> ItemId {
    let digest = Sha256::digest(bytes);
    let hex: String = digest
        .iter()
        .take(ITEM_ID_LEN / 2)
        .map(|b| format!("{b:02x}"))
        .collect();
    ItemId::from_hex(hex)
}

#[cfg(unix)]
fn name_bytes(name: &OsStr) -> std::borrow::Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    std::borrow::Cow::Borrowed(name.as_bytes())
}

#[cfg(not(unix))]
fn name_bytes(name: &OsStr) -> std::borrow::Cow<'_, [u8]> {
    match name.to_string_lossy() {
        std::borrow::Cow::Borrowed(s) => std::borrow::Cow::Borrowed(s.as_bytes()),
        std::borrow::Cow::Owned(s) => std::borrow::Cow::Owned(s.into_bytes()),
    }
}
