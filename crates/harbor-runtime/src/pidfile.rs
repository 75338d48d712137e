//! Persistent pid record.
//!
//! Format: two-line text file, an empty line meaning "absent"
//! ```text
//! <primary pid>
//! <manager pid>
//! ```
//!
//! Writes go through `<file>.tmp` and a rename, so a reader in another
//! process never observes a half-written record. Every read hits the disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use harbor_core::paths::temp_sibling;
use harbor_core::{PidFileError, PidRecord};
use tracing::{debug, warn};

/// Reads, writes and clears the pid record at one location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PidStore {
    path: PathBuf,
}

impl PidStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `record` atomically, creating the parent directory if needed.
    pub fn write(&self, record: &PidRecord) -> Result<(), PidFileError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| PidFileError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let temp = temp_sibling(&self.path);
        let write_err = |source| PidFileError::Write {
            path: self.path.clone(),
            source,
        };

        fs::write(&temp, format_record(record)).map_err(write_err)?;
        if let Err(source) = fs::rename(&temp, &self.path) {
            let _ = fs::remove_file(&temp);
            return Err(write_err(source));
        }

        debug!(path = %self.path.display(), %record, "pid record written");
        Ok(())
    }

    /// Current record. A missing, unreadable or corrupt file reads as
    /// [`PidRecord::EMPTY`].
    pub fn read(&self) -> PidRecord {
        match fs::read_to_string(&self.path) {
            Ok(content) => parse_record(&content).unwrap_or_else(|| {
                warn!(path = %self.path.display(), "ignoring corrupt pid file");
                PidRecord::EMPTY
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => PidRecord::EMPTY,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable pid file");
                PidRecord::EMPTY
            }
        }
    }

    /// Remove the record. Idempotent.
    pub fn clear(&self) -> Result<(), PidFileError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "pid record cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PidFileError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

fn format_record(record: &PidRecord) -> String {
    let line = |pid: Option<harbor_core::Pid>| pid.map(|p| p.to_string()).unwrap_or_default();
    format!("{}\n{}\n", line(record.primary), line(record.manager))
}

fn parse_record(content: &str) -> Option<PidRecord> {
    let mut lines = content.lines();
    let mut field = || -> Option<Option<harbor_core::Pid>> {
        match lines.next().map(str::trim) {
            None | Some("") => Some(None),
            Some(raw) => raw.parse().ok().map(Some),
        }
    };

    let primary = field()?;
    let manager = field()?;
    if lines.any(|rest| !rest.trim().is_empty()) {
        return None;
    }

    Some(PidRecord { primary, manager })
}
