use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::item_id::ItemId;

/// Kind of a directory entry as shown to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Folder,
    Video,
    Audio,
    Image,
    Text,
    Other,
}

impl ItemType {
    /// Position used by the `type` sort order.
    pub fn rank(self) -> u8 {
        match self {
            ItemType::Folder => 0,
            ItemType::Video => 1,
            ItemType::Audio => 2,
            ItemType::Image => 3,
            ItemType::Text => 4,
            ItemType::Other => 5,
        }
    }

    /// Video or audio.
    pub fn is_media(self) -> bool {
        matches!(self, ItemType::Video | ItemType::Audio)
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemType::Folder => write!(f, "folder"),
            ItemType::Video => write!(f, "video"),
            ItemType::Audio => write!(f, "audio"),
            ItemType::Image => write!(f, "image"),
            ItemType::Text => write!(f, "text"),
            ItemType::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "folder" => Ok(ItemType::Folder),
            "video" => Ok(ItemType::Video),
            "audio" => Ok(ItemType::Audio),
            "image" => Ok(ItemType::Image),
            "text" => Ok(ItemType::Text),
            "other" => Ok(ItemType::Other),
            _ => Err(format!("unknown item type: {s}")),
        }
    }
}

/// One immediate child of a listed directory.
///
/// Recomputed from the filesystem on every listing; never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedItem {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Name shown to users. Names that are not valid UTF-8 are shown escaped.
    pub display_name: String,
    pub id: ItemId,
    /// Forward-slash path relative to the media root.
    pub path: String,
    /// File size in bytes (0 for folders).
    pub size: u64,
    /// Last modification time from the filesystem.
    pub modified: DateTime<Utc>,
    /// Set when the on-disk name could not be decoded cleanly.
    pub is_problematic: bool,
}
