use indicatif::{ProgressBar, ProgressStyle};
use lumen_core::config::FileTypes;
use lumen_core::models::item::ItemType;
use lumen_core::models::item_id::ItemId;
use serde::Serialize;
use std::path::Path;
use walkdir::WalkDir;

use crate::guard::{self, PathGuard};
use crate::identity;

/// Configuration for a recursive index run.
pub struct TreeConfig<'a> {
    pub guard: &'a PathGuard,
    pub types: &'a FileTypes,
    /// Relative directory to start from.
    pub start: String,
    /// Whether to show a progress spinner.
    pub show_progress: bool,
}

/// One entry of the identifier manifest.
#[derive(Debug, Clone, Serialize)]
pub struct TreeEntry {
    pub id: ItemId,
    pub path: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub size: u64,
}

/// Result of indexing a directory tree.
#[derive(Debug, Default, Serialize)]
pub struct TreeIndex {
    pub entries: Vec<TreeEntry>,
    pub total_files: u64,
    pub total_dirs: u64,
    pub total_bytes: u64,
    pub errors: Vec<String>,
}

/// Walk everything below `config.start` and record the identifier of each
/// visible entry. Hidden directories are not descended into and symlinks are
/// not followed.
pub fn index_tree(config: &TreeConfig<'_>) -> anyhow::Result<TreeIndex> {
    let start = guard::normalize(&config.start)
        .ok_or_else(|| anyhow::anyhow!("invalid path: {}", config.start))?;
    let start_abs = config
        .guard
        .resolve(&start)
        .filter(|p| p.is_dir())
        .ok_or_else(|| anyhow::anyhow!("not a directory: {}", start))?;

    let pb = if config.show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
        );
        pb.set_message("Indexing files...");
        Some(pb)
    } else {
        None
    };

    let mut index = TreeIndex::default();
    let walker = WalkDir::new(&start_abs)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !guard::is_hidden(e.file_name()));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                index.errors.push(format!("walk error: {e}"));
                continue;
            }
        };

        let Some(rel_path) = relative_to_root(config.guard.root(), entry.path()) else {
            continue;
        };

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                index.errors.push(format!("{rel_path}: {e}"));
                continue;
            }
        };

        let (item_type, size) = if metadata.is_dir() {
            index.total_dirs += 1;
            (ItemType::Folder, 0)
        } else if metadata.is_file() {
            index.total_files += 1;
            index.total_bytes += metadata.len();
            (config.types.classify(&entry.file_name().to_string_lossy()), metadata.len())
        } else {
            continue;
        };

        index.entries.push(TreeEntry {
            id: identity::identifier_of(&rel_path),
            path: rel_path,
            item_type,
            size,
        });

        if let Some(ref pb) = pb {
            pb.set_message(format!(
                "{} files, {} dirs indexed",
                index.total_files, index.total_dirs
            ));
            pb.tick();
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message(format!(
            "Indexed {} files, {} dirs ({} bytes)",
            index.total_files, index.total_dirs, index.total_bytes
        ));
    }

    Ok(index)
}

fn relative_to_root(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_index_basic() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("file1.mp4"), "hello").unwrap();
        fs::create_dir(dir.path().join("subdir")).unwrap();
        fs::write(dir.path().join("subdir/file2.txt"), "nested").unwrap();
        fs::create_dir(dir.path().join(".cache")).unwrap();
        fs::write(dir.path().join(".cache/skip.txt"), "skip").unwrap();

        let guard = PathGuard::new(dir.path()).unwrap();
        let types = FileTypes::default();
        let config = TreeConfig {
            guard: &guard,
            types: &types,
            start: String::new(),
            show_progress: false,
        };

        let index = index_tree(&config).unwrap();
        assert_eq!(index.total_files, 2);
        assert_eq!(index.total_dirs, 1);
        assert_eq!(index.total_bytes, 11);
        let nested = index
            .entries
            .iter()
            .find(|e| e.path == "subdir/file2.txt")
            .unwrap();
        assert_eq!(nested.id, identity::identifier_of("subdir/file2.txt"));
        assert_eq!(nested.item_type, ItemType::Text);
        assert!(index.entries.iter().all(|e| !e.path.starts_with(".cache")));
    }

    #[test]
    fn test_index_rejects_bad_start() {
        let dir = TempDir::new().unwrap();
        let guard = PathGuard::new(dir.path()).unwrap();
        let types = FileTypes::default();
        let config = TreeConfig {
            guard: &guard,
            types: &types,
            start: "../elsewhere".into(),
            show_progress: false,
        };
        assert!(index_tree(&config).is_err());
    }
}
