use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::LumenError;
use crate::models::item::ItemType;

/// Top-level Lumen configuration, stored at `~/.lumen/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LumenConfig {
    /// Directory every served path is confined to.
    #[serde(default = "default_media_root")]
    pub media_root: PathBuf,

    /// Address the HTTP server binds to.
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Bytes per streamed body chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Items per page in image-only folders.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Largest text file the viewer will decode.
    #[serde(default = "default_max_text_size")]
    pub max_text_size: u64,

    /// Shared password as an Argon2id PHC string (`lumen hash-password`).
    /// Without one, every authenticated route refuses access.
    #[serde(default)]
    pub password_hash: Option<String>,

    /// Default log filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub types: FileTypes,

    /// Filename suffix (before the extension) to quality label.
    #[serde(default = "default_quality_suffixes")]
    pub quality_suffixes: BTreeMap<String, String>,
}

/// Extension lists used to classify files. Extensions are lowercase and
/// include the leading dot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTypes {
    pub video: Vec<String>,
    pub audio: Vec<String>,
    pub image: Vec<String>,
    pub text: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for FileTypes {
    fn default() -> Self {
        Self {
            video: strings(&[".mp4", ".mkv", ".avi", ".mov", ".webm"]),
            audio: strings(&[".mp3", ".ogg", ".wav", ".flac", ".m4a", ".aac", ".opus"]),
            image: strings(&[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".svg"]),
            text: strings(&[
                ".txt", ".md", ".log", ".py", ".js", ".css", ".html", ".sh", ".json", ".xml",
                ".yaml", ".csv",
            ]),
        }
    }
}

impl FileTypes {
    /// Classify a file by the extension of its name. Unknown or missing
    /// extensions are `Other`. Never returns `Folder`.
    pub fn classify(&self, file_name: &str) -> ItemType {
        let Some(ext) = extension_of(file_name) else {
            return ItemType::Other;
        };
        let ext = ext.to_lowercase();
        let table = [
            (&self.video, ItemType::Video),
            (&self.audio, ItemType::Audio),
            (&self.image, ItemType::Image),
            (&self.text, ItemType::Text),
        ];
        table
            .into_iter()
            .find(|(exts, _)| exts.iter().any(|e| e.eq_ignore_ascii_case(&ext)))
            .map(|(_, t)| t)
            .unwrap_or(ItemType::Other)
    }
}

/// Extension including the dot, or `None` for names like `README` and
/// `.profile`.
pub fn extension_of(file_name: &str) -> Option<&str> {
    let trimmed = file_name.trim_start_matches('.');
    let dot = trimmed.rfind('.')?;
    Some(&trimmed[dot..])
}

fn default_media_root() -> PathBuf {
    LumenConfig::home_dir()
        .map(|h| h.join("media"))
        .unwrap_or_else(|_| PathBuf::from("media"))
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5000))
}

fn default_chunk_size() -> usize {
    1024 * 1024
}

fn default_page_size() -> usize {
    198
}

fn default_max_text_size() -> u64 {
    1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_quality_suffixes() -> BTreeMap<String, String> {
    [("_1080p", "1080p"), ("_720p", "720p"), ("_480p", "480p"), ("_360p", "360p")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Default for LumenConfig {
    fn default() -> Self {
        Self {
            media_root: default_media_root(),
            listen: default_listen(),
            chunk_size: default_chunk_size(),
            page_size: default_page_size(),
            max_text_size: default_max_text_size(),
            password_hash: None,
            log_level: default_log_level(),
            types: FileTypes::default(),
            quality_suffixes: default_quality_suffixes(),
        }
    }
}

impl LumenConfig {
    /// Returns the Lumen home directory (`~/.lumen/`).
    pub fn home_dir() -> Result<PathBuf, LumenError> {
        let base = dirs::home_dir().ok_or_else(|| LumenError::Config {
            message: "could not determine home directory".into(),
        })?;
        Ok(base.join(".lumen"))
    }

    /// Returns the path to the config file.
    pub fn config_path() -> Result<PathBuf, LumenError> {
        Ok(Self::home_dir()?.join("config.toml"))
    }

    /// Load config from the default location, or return defaults if not found.
    pub fn load() -> Result<Self, LumenError> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, LumenError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| LumenError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), LumenError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| LumenError::Serialization(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Initialize the Lumen home directory with default config.
    pub fn init() -> Result<PathBuf, LumenError> {
        let home = Self::home_dir()?;
        std::fs::create_dir_all(&home)?;

        let config_path = Self::config_path()?;
        if !config_path.exists() {
            Self::default().save_to(&config_path)?;
        }

        Ok(home)
    }

    pub fn validate(&self) -> Result<(), LumenError> {
        if self.chunk_size == 0 {
            return Err(LumenError::Config {
                message: "chunk_size must be positive".into(),
            });
        }
        if self.page_size == 0 {
            return Err(LumenError::Config {
                message: "page_size must be positive".into(),
            });
        }
        Ok(())
    }

    /// Make sure the media root exists and return its canonical form.
    pub fn prepare_media_root(&self) -> Result<PathBuf, LumenError> {
        if !self.media_root.is_dir() {
            tracing::warn!(root = %self.media_root.display(), "creating missing media directory");
            std::fs::create_dir_all(&self.media_root)?;
        }
        Ok(std::fs::canonicalize(&self.media_root)?)
    }
}
