use serde::{Deserialize, Serialize};

/// Width of an identifier in hex characters.
pub const ITEM_ID_LEN: usize = 16;

/// Stable identifier standing in for a relative path in URLs.
///
/// Carries neither type nor existence; it must be resolved against a parent
/// directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Wrap an already computed hex digest.
    pub fn from_hex(hex: String) -> Self {
        Self(hex)
    }

    /// Parse an identifier supplied by a client.
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() == ITEM_ID_LEN && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(s.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ItemId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid item id: {s}"))
    }
}
