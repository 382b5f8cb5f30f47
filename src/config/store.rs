//! Config file location and crash-safe persistence.

use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::warn;

use crate::error::{OneKeyError, Result};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "ONEKEY_CONFIG";

const APP_DIR: &str = "onekey";
const CONFIG_FILE: &str = "config.json";

/// `$ONEKEY_CONFIG`, else `<platform config dir>/onekey/config.json`.
pub fn default_config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    directories::BaseDirs::new()
        .map(|dirs| dirs.config_dir().join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(format!(".{APP_DIR}")))
        .join(CONFIG_FILE)
}

/// Read a file, mapping "not found" to `None`.
pub(crate) fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(data) => Ok(Some(data)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(OneKeyError::Io(err)),
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// `config.json` → `config.json.bak`, next to the original.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| CONFIG_FILE.into());
    name.push(".bak");
    path.with_file_name(name)
}

/// Move an unreadable config aside so a fresh one can be written without
/// losing what the user stored. An older backup is replaced.
pub(crate) fn move_to_backup(path: &Path) -> Result<PathBuf> {
    let backup = backup_path(path);
    fs::rename(path, &backup)?;
    warn!(from = %path.display(), to = %backup.display(), "moved unreadable config aside");
    Ok(backup)
}

/// Replace `path` with `data` in one rename. The file holds API keys, so it
/// is owner-only on unix.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if path.file_name().is_none() {
        return Err(OneKeyError::InvalidArgument(format!(
            "config path {} has no file name",
            path.display()
        )));
    }
    let dir = parent_dir(path);
    fs::create_dir_all(dir)?;

    // Same directory as the target, so the final rename never crosses devices.
    let mut staged = NamedTempFile::new_in(dir)?;
    #[cfg(unix)]
    staged
        .as_file()
        .set_permissions(fs::Permissions::from_mode(0o600))?;
    staged.write_all(data)?;
    staged.as_file().sync_all()?;

    // A failed persist drops the temp file, which removes it.
    staged
        .persist(path)
        .map_err(|err| OneKeyError::Io(err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_creates_parents_and_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        atomic_write(&path, b"{}").unwrap();
        atomic_write(&path, b"{\"a\":1}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"a\":1}");
        let entries: Vec<_> = fs::read_dir(path.parent().unwrap()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn written_file_is_owner_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        atomic_write(&path, b"{}").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_optional(&dir.path().join("absent.json")).unwrap().is_none());
    }

    #[test]
    fn backup_sits_next_to_the_original() {
        assert_eq!(
            backup_path(Path::new("/etc/onekey/config.json")),
            PathBuf::from("/etc/onekey/config.json.bak")
        );
    }

    #[test]
    fn move_to_backup_replaces_older_backup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(backup_path(&path), "old").unwrap();
        fs::write(&path, "{ broken").unwrap();

        let backup = move_to_backup(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(fs::read_to_string(backup).unwrap(), "{ broken");
    }
}
