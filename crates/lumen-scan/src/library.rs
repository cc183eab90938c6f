use lumen_core::config::{FileTypes, LumenConfig};
use lumen_core::error::LumenError;
use lumen_core::models::item::ItemType;
use lumen_core::models::item_id::ItemId;
use lumen_core::models::sort::{SortBy, SortOrder};
use lumen_core::models::variant::QualityVariant;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::guard::PathGuard;
use crate::identity::{self, ResolvedItem};
use crate::lister::{self, Listing};
use crate::navigator::{self, Adjacent};

/// A media root together with the tables needed to interpret it.
///
/// Holds no mutable state; every call rescans the filesystem.
#[derive(Debug, Clone)]
pub struct Library {
    guard: PathGuard,
    types: FileTypes,
    quality_suffixes: BTreeMap<String, String>,
}

impl Library {
    pub fn new(
        root: &Path,
        types: FileTypes,
        quality_suffixes: BTreeMap<String, String>,
    ) -> Result<Self, LumenError> {
        Ok(Self {
            guard: PathGuard::new(root)?,
            types,
            quality_suffixes,
        })
    }

    /// Build from configuration, creating the media root if missing.
    pub fn from_config(config: &LumenConfig) -> Result<Self, LumenError> {
        let root = config.prepare_media_root()?;
        Self::new(&root, config.types.clone(), config.quality_suffixes.clone())
    }

    pub fn guard(&self) -> &PathGuard {
        &self.guard
    }

    pub fn root(&self) -> &Path {
        self.guard.root()
    }

    pub fn types(&self) -> &FileTypes {
        &self.types
    }

    pub fn resolve(&self, rel_path: &str) -> Option<PathBuf> {
        self.guard.resolve(rel_path)
    }

    pub fn classify(&self, file_name: &str) -> ItemType {
        self.types.classify(file_name)
    }

    pub fn list(&self, rel_path: &str, sort_by: SortBy, order: SortOrder) -> Listing {
        lister::list_directory(&self.guard, &self.types, rel_path, sort_by, order)
    }

    pub fn resolve_identifier(&self, parent_rel: &str, id: &ItemId) -> Option<ResolvedItem> {
        identity::resolve_identifier(&self.guard, parent_rel, id)
    }

    pub fn find_adjacent(&self, item_rel: &str, type_filter: Option<ItemType>) -> Adjacent {
        navigator::find_adjacent(&self.guard, &self.types, item_rel, type_filter)
    }

    pub fn find_variants(&self, item_rel: &str) -> Vec<QualityVariant> {
        navigator::find_variants(&self.guard, &self.quality_suffixes, item_rel)
    }
}
