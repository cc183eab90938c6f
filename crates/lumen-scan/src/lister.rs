use chrono::{DateTime, Utc};
use lumen_core::config::FileTypes;
use lumen_core::models::item::{ItemType, ListedItem};
use lumen_core::models::sort::{SortBy, SortOrder};
use serde::Serialize;
use std::ffi::OsStr;
use std::fs::Metadata;
use walkdir::WalkDir;

use crate::guard::{self, PathGuard};
use crate::identity;

/// Immediate children of a directory, sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Listing {
    pub items: Vec<ListedItem>,
    /// True iff the directory is non-empty and holds nothing but images.
    pub image_only: bool,
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, clamped into `1..=total_pages`.
    pub page: usize,
    pub total_pages: usize,
}

/// List the immediate children of `rel_path`.
///
/// Invalid or missing directories yield an empty listing. Hidden entries,
/// entries that are neither file nor directory, and entries that resolve
/// outside the root are skipped.
pub fn list_directory(
    guard: &PathGuard,
    types: &FileTypes,
    rel_path: &str,
    sort_by: SortBy,
    order: SortOrder,
) -> Listing {
    let Some(clean) = guard::normalize(rel_path) else {
        tracing::warn!(path = rel_path, "cannot list contents: unsafe path");
        return Listing::default();
    };
    let dir_abs = match guard.resolve(&clean) {
        Some(p) if p.is_dir() => p,
        other => {
            tracing::error!(
                path = %clean,
                resolved = ?other,
                "cannot list contents: invalid or non-existent directory"
            );
            return Listing::default();
        }
    };

    let mut items = Vec::new();
    let walker = WalkDir::new(&dir_abs)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::error!(dir = %dir_abs.display(), "error reading entry: {e}");
                continue;
            }
        };

        let name = entry.file_name();
        if guard::is_hidden(name) {
            continue;
        }
        if guard.resolve_child(&dir_abs, name).is_none() {
            tracing::warn!(dir = %clean, name = ?name, "skipping entry outside media root");
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                tracing::error!(path = %entry.path().display(), "os error accessing item: {e}");
                continue;
            }
        };

        if let Some(item) = build_item(types, &clean, name, &metadata) {
            items.push(item);
        }
    }

    let image_only = !items.is_empty() && items.iter().all(|i| i.item_type == ItemType::Image);
    sort_items(&mut items, sort_by, order);

    tracing::debug!(path = %clean, count = items.len(), image_only, "listed directory");
    Listing { items, image_only }
}

fn build_item(types: &FileTypes, parent: &str, name: &OsStr, metadata: &Metadata) -> Option<ListedItem> {
    let is_problematic = guard::is_problematic_name(name);
    let display_name = match name.to_str() {
        Some(s) => s.to_string(),
        None => format!("{name:?}"),
    };

    let (item_type, size) = if metadata.is_dir() {
        (ItemType::Folder, 0)
    } else if metadata.is_file() {
        (types.classify(&name.to_string_lossy()), metadata.len())
    } else {
        return None;
    };

    let modified = metadata
        .modified()
        .ok()
        .and_then(|t| {
            let duration = t.duration_since(std::time::UNIX_EPOCH).unwrap_or_default();
            DateTime::from_timestamp(duration.as_secs() as i64, duration.subsec_nanos())
        })
        .unwrap_or_default();

    Some(ListedItem {
        item_type,
        display_name,
        id: identity::child_identifier(parent, name),
        path: guard::join_rel(parent, &name.to_string_lossy()),
        size,
        modified,
        is_problematic,
    })
}

/// Sort key derived from a display name: the leading number (if any) of the
/// lowercased name, then the lowercased name itself. Names without a leading
/// number sort after all numbered names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NaturalKey {
    no_prefix: bool,
    digits_len: usize,
    digits: String,
    lower: String,
}

impl NaturalKey {
    pub fn new(name: &str) -> Self {
        let lower = name.to_lowercase();
        let raw: String = lower.chars().take_while(|c| c.is_ascii_digit()).collect();
        let digits = raw.trim_start_matches('0').to_string();
        Self {
            no_prefix: raw.is_empty(),
            digits_len: digits.len(),
            digits,
            lower,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Primary {
    None,
    Rank(u8),
    Size(u64),
    Date(DateTime<Utc>),
}

/// Order items folder-first, then by `sort_by` with the natural name key as
/// tiebreak. `Desc` reverses the order inside the folder and non-folder
/// groups but keeps folders first.
pub fn sort_items(items: &mut Vec<ListedItem>, sort_by: SortBy, order: SortOrder) {
    let mut keyed: Vec<_> = items
        .drain(..)
        .map(|item| {
            let primary = match sort_by {
                SortBy::Name => Primary::None,
                SortBy::Type => Primary::Rank(item.item_type.rank()),
                SortBy::Size => Primary::Size(item.size),
                SortBy::Date => Primary::Date(item.modified),
            };
            let key = (primary, NaturalKey::new(&item.display_name));
            (item, key)
        })
        .collect();

    keyed.sort_by(|(a, ka), (b, kb)| {
        let is_file = |i: &ListedItem| i.item_type != ItemType::Folder;
        is_file(a).cmp(&is_file(b)).then_with(|| {
            let ord = ka.cmp(kb);
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        })
    });

    items.extend(keyed.into_iter().map(|(item, _)| item));
}

/// Slice one page out of a full listing.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_pages = items.len().div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(items.len());
    Page {
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        page,
        total_pages,
    }
}
