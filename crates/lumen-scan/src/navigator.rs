use lumen_core::config::{extension_of, FileTypes};
use lumen_core::models::item::ItemType;
use lumen_core::models::item_id::ItemId;
use lumen_core::models::sort::{SortBy, SortOrder};
use lumen_core::models::variant::{QualityVariant, ORIGINAL_LABEL};
use std::collections::{BTreeMap, HashSet};

use crate::guard::{self, PathGuard};
use crate::identity;
use crate::lister;

/// Identifiers of the items before and after the current one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjacent {
    pub prev: Option<ItemId>,
    pub next: Option<ItemId>,
}

/// Find the neighbours of `item_rel` among its siblings in default
/// (name, ascending) order, optionally keeping only one item type.
pub fn find_adjacent(
    guard: &PathGuard,
    types: &FileTypes,
    item_rel: &str,
    type_filter: Option<ItemType>,
) -> Adjacent {
    let Some(item_rel) = guard::normalize(item_rel) else {
        return Adjacent::default();
    };
    let (parent, _) = guard::split_rel(&item_rel);

    let listing = lister::list_directory(guard, types, parent, SortBy::Name, SortOrder::Asc);
    let relevant: Vec<_> = listing
        .items
        .iter()
        .filter(|item| type_filter.map_or(true, |t| item.item_type == t))
        .collect();

    let current = identity::identifier_of(&item_rel);
    let Some(index) = relevant.iter().position(|item| item.id == current) else {
        tracing::warn!(
            path = %item_rel,
            filter = ?type_filter,
            "current item not found among relevant siblings"
        );
        return Adjacent::default();
    };

    let adjacent = Adjacent {
        prev: index.checked_sub(1).map(|i| relevant[i].id.clone()),
        next: relevant.get(index + 1).map(|item| item.id.clone()),
    };
    tracing::debug!(path = %item_rel, filter = ?type_filter, ?adjacent, "found neighbours");
    adjacent
}

/// Collect the quality variants of a media file.
///
/// The original always comes first. A sibling qualifies when its name is the
/// original's base name plus a configured suffix, with the same extension
/// (compared case-insensitively). Returns an empty list when the original is
/// not a safe, existing file.
pub fn find_variants(
    guard: &PathGuard,
    suffixes: &BTreeMap<String, String>,
    item_rel: &str,
) -> Vec<QualityVariant> {
    let Some(item_rel) = guard::normalize(item_rel) else {
        return Vec::new();
    };
    let (parent, file_name) = guard::split_rel(&item_rel);
    if file_name.is_empty() {
        return Vec::new();
    }

    match guard.resolve(&item_rel) {
        Some(p) if p.is_file() => {}
        _ => {
            tracing::warn!(path = %item_rel, "original file invalid for quality check");
            return Vec::new();
        }
    }

    let ext = extension_of(file_name).unwrap_or("");
    let base = &file_name[..file_name.len() - ext.len()];

    let mut variants = vec![QualityVariant {
        label: ORIGINAL_LABEL.to_string(),
        path: item_rel.clone(),
        id: identity::identifier_of(&item_rel),
    }];

    let dir_abs = match guard.resolve(parent) {
        Some(p) if p.is_dir() => p,
        _ => {
            tracing::warn!(parent, "parent directory invalid for quality check");
            return variants;
        }
    };

    let mut names: Vec<String> = match std::fs::read_dir(&dir_abs) {
        Ok(entries) => entries
            .flatten()
            .filter_map(|e| e.file_name().into_string().ok())
            .collect(),
        Err(e) => {
            tracing::error!(dir = %dir_abs.display(), "error scanning for quality options: {e}");
            return variants;
        }
    };
    // read_dir order is unspecified; keep discovery order stable
    names.sort();

    for name in names {
        if name == file_name || name.starts_with('.') {
            continue;
        }
        let Some(label) = variant_label(suffixes, base, ext, &name) else {
            continue;
        };
        let rel = guard::join_rel(parent, &name);
        match guard.resolve(&rel) {
            Some(p) if p.is_file() => variants.push(QualityVariant {
                label: label.to_string(),
                id: identity::identifier_of(&rel),
                path: rel,
            }),
            Some(_) => {}
            None => tracing::warn!(path = %rel, "skipping unsafe quality option"),
        }
    }

    // stable sort keeps discovery order on ties
    variants.sort_by(|a, b| b.rank().cmp(&a.rank()));

    let mut seen = HashSet::new();
    variants.retain(|v| seen.insert(v.path.clone()));
    tracing::debug!(path = %item_rel, count = variants.len(), "found quality options");
    variants
}

fn variant_label<'a>(
    suffixes: &'a BTreeMap<String, String>,
    base: &str,
    ext: &str,
    candidate: &str,
) -> Option<&'a str> {
    let cand_ext = extension_of(candidate).unwrap_or("");
    if !cand_ext.eq_ignore_ascii_case(ext) {
        return None;
    }
    let cand_base = &candidate[..candidate.len() - cand_ext.len()];
    let suffix = cand_base.strip_prefix(base)?;
    suffixes.get(suffix).map(String::as_str)
}
