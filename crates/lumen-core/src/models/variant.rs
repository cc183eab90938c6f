use serde::{Deserialize, Serialize};

use super::item_id::ItemId;

/// Label of the file a variant list was built from.
pub const ORIGINAL_LABEL: &str = "Original";

/// An alternate encoding of the same media item, stored as a sibling file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityVariant {
    pub label: String,
    pub path: String,
    pub id: ItemId,
}

impl QualityVariant {
    pub fn is_original(&self) -> bool {
        self.label == ORIGINAL_LABEL
    }

    /// Ordering rank: the original above every numeric label, numeric labels
    /// by their leading number, anything else last.
    pub fn rank(&self) -> u32 {
        if self.is_original() {
            return u32::MAX - 1;
        }
        let digits: String = self
            .label
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        match (digits.parse::<u32>(), &self.label[digits.len()..]) {
            (Ok(n), "p") => n,
            _ => 0,
        }
    }
}
