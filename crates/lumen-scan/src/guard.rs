use std::ffi::OsStr;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Confines user-supplied relative paths to a single root directory.
///
/// Every lookup in Lumen goes through here. Rejections are logged and
/// reported as `None`; nothing in this type panics or returns an error for
/// bad input.
#[derive(Debug, Clone)]
pub struct PathGuard {
    root: PathBuf,
}

impl PathGuard {
    /// The root must exist; it is stored in canonical form.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = std::fs::canonicalize(root.as_ref())?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("media root is not a directory: {}", root.display()),
            ));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path to an absolute path inside the root.
    ///
    /// The empty path (and anything that normalizes to it) is the root.
    pub fn resolve(&self, input: &str) -> Option<PathBuf> {
        let Some(rel) = normalize(input) else {
            tracing::warn!(input, "blocked unsafe relative path");
            return None;
        };

        let mut joined = self.root.clone();
        for segment in rel.split('/').filter(|s| !s.is_empty()) {
            if !is_single_normal_component(OsStr::new(segment)) {
                tracing::warn!(input, segment, "blocked path segment during join");
                return None;
            }
            joined.push(segment);
        }

        let confined = self.confine(&joined);
        if confined.is_none() {
            tracing::error!(
                input,
                resolved = %joined.display(),
                root = %self.root.display(),
                "path traversal attempt detected after join"
            );
        }
        confined
    }

    /// Resolve one directory entry of an already resolved directory.
    ///
    /// Hidden names and names that are not a single plain component are
    /// refused, and the result must still canonicalize inside the root.
    pub fn resolve_child(&self, parent_abs: &Path, name: &OsStr) -> Option<PathBuf> {
        if is_hidden(name) || !is_single_normal_component(name) {
            return None;
        }
        self.confine(&parent_abs.join(name))
    }

    /// Canonicalize `abs` and check it is the root or lies below it.
    ///
    /// Paths that do not exist yet are checked through their deepest
    /// existing ancestor.
    pub fn confine(&self, abs: &Path) -> Option<PathBuf> {
        let canonical = canonicalize_lenient(abs)?;
        if canonical == self.root || canonical.starts_with(&self.root) {
            Some(canonical)
        } else {
            None
        }
    }
}

/// Normalize a relative path.
///
/// Turns backslashes into slashes, drops empty and `.` segments, and rejects
/// `..` and dot-prefixed segments. The result has no leading or trailing
/// slash; the root is the empty string.
///
/// Input is taken literally. URLs are percent-decoded once by the HTTP
/// extractors, and paths rebuilt from directory entries must not be decoded
/// again: `ep%201.mp4` is a valid file name.
pub fn normalize(input: &str) -> Option<String> {
    if input.contains('\0') {
        return None;
    }
    let unified = input.replace('\\', "/");

    let mut segments = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s if s.starts_with('.') => return None,
            s => segments.push(s),
        }
    }
    Some(segments.join("/"))
}

/// Join a relative directory path and a child name.
pub fn join_rel(parent: &str, name: &str) -> String {
    let parent = parent.trim_matches('/');
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Split a relative path into its parent path and final name.
pub fn split_rel(rel: &str) -> (&str, &str) {
    let rel = rel.trim_matches('/');
    match rel.rfind('/') {
        Some(i) => (&rel[..i], &rel[i + 1..]),
        None => ("", rel),
    }
}

pub fn is_hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Whether an entry name cannot be shown without substitution.
pub fn is_problematic_name(name: &OsStr) -> bool {
    name.to_str().is_none()
}

fn is_single_normal_component(name: &OsStr) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn canonicalize_lenient(path: &Path) -> Option<PathBuf> {
    if let Ok(canonical) = std::fs::canonicalize(path) {
        return Some(canonical);
    }
    let mut missing = Vec::new();
    let mut current = path;
    loop {
        missing.push(current.file_name()?.to_os_string());
        current = current.parent()?;
        if let Ok(mut canonical) = std::fs::canonicalize(current) {
            for part in missing.iter().rev() {
                canonical.push(part);
            }
            return Some(canonical);
        }
    }
}
