//! Mapping URL paths to files under the document root.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use harbor_core::ConfigError;
use tracing::debug;

/// A file the request may refer to, resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Canonical path on disk (or the unresolved join when nothing exists).
    pub path: PathBuf,
    pub exists: bool,
    pub size: u64,
    pub last_modified: Option<SystemTime>,
    pub is_regular_file: bool,
    /// The URL tried to leave the document root, by `..` or by a symlink.
    pub outside_root: bool,
}

impl CandidateFile {
    /// Candidate for a path with nothing on disk.
    pub const fn missing(path: PathBuf) -> Self {
        Self {
            path,
            exists: false,
            size: 0,
            last_modified: None,
            is_regular_file: false,
            outside_root: false,
        }
    }

    /// Candidate for a URL that escapes the document root.
    pub fn rejected(path: PathBuf) -> Self {
        Self {
            outside_root: true,
            ..Self::missing(path)
        }
    }

    /// Existing regular file, ready to serve.
    pub const fn is_servable(&self) -> bool {
        self.exists && self.is_regular_file && !self.outside_root
    }

    /// Lower-cased extension without the dot.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// The directory static resources are served from.
#[derive(Debug, Clone)]
pub struct DocumentRoot {
    root: PathBuf,
}

impl DocumentRoot {
    /// Canonicalize `root`. Fails when it is missing or not a directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let root = root.as_ref();
        let invalid = |reason: String| ConfigError::InvalidDocumentRoot {
            path: root.to_path_buf(),
            reason,
        };

        let canonical = fs::canonicalize(root).map_err(|e| invalid(e.to_string()))?;
        if !canonical.is_dir() {
            return Err(invalid("not a directory".to_string()));
        }

        Ok(Self { root: canonical })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolve a percent-encoded URL path to a [`CandidateFile`].
    ///
    /// Never fails: anything that cannot be served becomes a missing or
    /// rejected candidate.
    pub fn resolve(&self, url_path: &str) -> CandidateFile {
        let Some(relative) = relative_path(url_path) else {
            debug!(url_path, "rejected path outside document root");
            return CandidateFile::rejected(self.root.clone());
        };

        let joined = self.root.join(&relative);
        let canonical = match fs::canonicalize(&joined) {
            Ok(path) => path,
            Err(_) => return CandidateFile::missing(joined),
        };

        if !canonical.starts_with(&self.root) {
            debug!(url_path, "symlink resolves outside document root");
            return CandidateFile::rejected(joined);
        }

        match fs::metadata(&canonical) {
            Ok(meta) => CandidateFile {
                exists: true,
                size: meta.len(),
                last_modified: meta.modified().ok(),
                is_regular_file: meta.is_file(),
                outside_root: false,
                path: canonical,
            },
            Err(_) => CandidateFile::missing(canonical),
        }
    }
}

/// Decode and sanitize a URL path into a path relative to the root.
fn relative_path(url_path: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(url_path).ok()?;
    if decoded.contains('\0') || decoded.contains('\\') {
        return None;
    }

    let mut relative = PathBuf::new();
    for component in Path::new(decoded.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(relative)
}
