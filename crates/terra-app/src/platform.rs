//! Platform directory resolution.
//!
//! Config and log directories follow OS conventions (XDG on Linux, Known
//! Folders on Windows, Library on macOS) through the `dirs` crate.

use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("could not determine OS configuration directory")]
    NoConfigDir,
    #[error("platform I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Directories Terra reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// JSON log files (debug builds).
    pub log_dir: PathBuf,
}

pub const APP_NAME: &str = "terra";

impl PlatformDirs {
    /// Resolve platform-specific directories without creating them.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NoConfigDir`] if the OS does not expose a
    /// configuration directory.
    pub fn resolve() -> Result<Self, PlatformError> {
        let base = dirs::config_dir().ok_or(PlatformError::NoConfigDir)?;
        Ok(Self::resolve_with_root(&base))
    }

    /// Resolve directories, honoring an explicit `--config <dir>`, and create
    /// them on disk.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if resolution or directory creation fails.
    pub fn resolve_and_create(config_dir: Option<PathBuf>) -> Result<Self, PlatformError> {
        let dirs = match config_dir {
            Some(config_dir) => Self::from_config_dir(config_dir),
            None => Self::resolve()?,
        };
        dirs.create_dirs()?;
        Ok(dirs)
    }

    /// Directories rooted under `root`.
    pub fn resolve_with_root(root: &Path) -> Self {
        Self::from_config_dir(root.join(APP_NAME))
    }

    /// Use an explicit config directory (`--config <dir>`); logs go beside it.
    pub fn from_config_dir(config_dir: PathBuf) -> Self {
        let log_dir = config_dir.join("logs");
        Self {
            config_dir,
            log_dir,
        }
    }

    /// # Errors
    ///
    /// Returns [`PlatformError::Io`] if either directory cannot be created.
    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_with_root_appends_app_name() {
        let dirs = PlatformDirs::resolve_with_root(Path::new("/tmp/base"));
        assert_eq!(dirs.config_dir, Path::new("/tmp/base").join(APP_NAME));
        assert_eq!(dirs.log_dir, Path::new("/tmp/base").join(APP_NAME).join("logs"));
    }

    #[test]
    fn test_explicit_config_dir_keeps_logs_beside_it() {
        let dirs = PlatformDirs::from_config_dir(PathBuf::from("custom"));
        assert_eq!(dirs.config_dir, PathBuf::from("custom"));
        assert_eq!(dirs.log_dir, PathBuf::from("custom").join("logs"));
    }

    #[test]
    fn test_directory_creation() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::resolve_with_root(tmp.path());
        dirs.create_dirs().unwrap();
        assert!(dirs.config_dir.is_dir());
        assert!(dirs.log_dir.is_dir());
        // Creating twice is fine.
        dirs.create_dirs().unwrap();
    }

    #[test]
    fn test_resolve_and_create_with_explicit_config_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let config_dir = tmp.path().join("nested").join("terra-config");
        let dirs = PlatformDirs::resolve_and_create(Some(config_dir.clone())).unwrap();
        assert_eq!(dirs.config_dir, config_dir);
        assert!(dirs.config_dir.is_dir());
        assert!(dirs.log_dir.is_dir());
    }

    #[test]
    fn test_resolve_and_create_reports_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("occupied");
        std::fs::write(&blocker, "not a directory").unwrap();
        let result = PlatformDirs::resolve_and_create(Some(blocker.join("terra")));
        assert!(matches!(result, Err(PlatformError::Io(_))));
    }

    #[test]
    fn test_no_config_dir_message() {
        assert_eq!(
            PlatformError::NoConfigDir.to_string(),
            "could not determine OS configuration directory"
        );
    }
}
