//! Default filesystem locations.
//!
//! Resolution order for the data root:
//! 1. `HARBOR_DATA_DIR` environment variable
//! 2. Platform data directory (e.g. `~/.local/share/harbor`)
//! 3. `<temp dir>/harbor`

use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data root.
pub const DATA_DIR_ENV: &str = "HARBOR_DATA_DIR";

/// File name of the pid record inside the data root.
pub const PID_FILE_NAME: &str = "harbor.pid";

/// Root directory for harbor's runtime state.
pub fn data_root() -> PathBuf {
    if let Ok(dir) = env::var(DATA_DIR_ENV) {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    dirs::data_dir().map_or_else(|| env::temp_dir().join("harbor"), |dir| dir.join("harbor"))
}

/// Default location of the pid record.
pub fn default_pid_file() -> PathBuf {
    data_root().join(PID_FILE_NAME)
}

/// Temp sibling used for atomic writes of `path`.
pub fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_file_is_under_data_root() {
        let pid_file = default_pid_file();
        assert!(pid_file.starts_with(data_root()));
        assert!(pid_file.ends_with(PID_FILE_NAME));
    }

    #[test]
    fn temp_sibling_stays_in_same_directory() {
        let target = Path::new("/var/run/harbor/harbor.pid");
        let tmp = temp_sibling(target);
        assert_eq!(tmp, Path::new("/var/run/harbor/harbor.pid.tmp"));
        assert_eq!(tmp.parent(), target.parent());
    }
}
