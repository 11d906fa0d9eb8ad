//! On-disk locations and atomic file writes.
//!
//! Settings and the file key-value backend both go through `write_atomic`,
//! so a crash mid-write leaves the previous value in place. Files are
//! owner-only on Unix.

use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use crate::error::StoreError;

// ============================================================================
// Default Paths
// ============================================================================

/// Returns the default configuration directory.
///
/// - macOS: `~/Library/Application Support/storefront`
/// - Linux: `~/.config/storefront`
/// - Windows: `%APPDATA%\storefront`
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|c| c.join("storefront"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the default data directory for the key-value store.
///
/// - macOS: `~/Library/Application Support/storefront`
/// - Linux: `~/.local/share/storefront`
/// - Windows: `%APPDATA%\storefront`
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|c| c.join("storefront"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the default settings file path.
pub fn default_settings_path() -> PathBuf {
    default_config_dir().join("settings.json")
}

// ============================================================================
// Security: File Permissions
// ============================================================================

/// Sets restrictive file permissions (0o600) on Unix systems.
///
/// The key-value store holds the bearer credential, so files are only
/// readable by the owner.
#[cfg(unix)]
pub(crate) fn set_restrictive_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

/// Sets restrictive directory permissions (0o700) on Unix systems.
#[cfg(unix)]
fn set_restrictive_dir_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o700);
    std::fs::set_permissions(path, perms)?;

    debug!(path = %path.display(), mode = "0700", "Set restrictive directory permissions");
    Ok(())
}

/// No-op for non-Unix systems.
#[cfg(not(unix))]
pub(crate) fn set_restrictive_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

/// No-op for non-Unix systems.
#[cfg(not(unix))]
fn set_restrictive_dir_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ============================================================================
// File Operations
// ============================================================================

/// Ensures a directory exists with secure permissions.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    if !path.exists() {
        debug!(path = %path.display(), "Creating directory");
        std::fs::create_dir_all(path)?;
        set_restrictive_dir_permissions(path)?;
    }
    Ok(())
}

/// Writes a file atomically (temp file + rename) with 0600 permissions.
///
/// # Errors
///
/// Returns an error if any filesystem step fails.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let temp_path = temp_path_for(path);
    let written = (|| -> Result<(), StoreError> {
        std::fs::write(&temp_path, contents)?;
        set_restrictive_permissions(&temp_path)?;
        std::fs::rename(&temp_path, path)?;
        Ok(())
    })();
    if written.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }
    written
}

/// A sibling temp path unique to this process and write.
fn temp_path_for(path: &Path) -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.{n}.tmp", std::process::id()))
}

/// Saves data to a JSON file with secure permissions.
///
/// Creates parent directories if they don't exist and writes atomically.
///
/// # Errors
///
/// Returns an error if serialization or any filesystem step fails.
pub async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    debug!(path = %path.display(), "Saving JSON file");

    let json = serde_json::to_string_pretty(data)?;
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomic(&path, &json))
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))??;

    Ok(())
}

/// Loads data from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    debug!(path = %path.display(), "Loading JSON file");

    let content = tokio::fs::read_to_string(path).await?;
    let data = serde_json::from_str(&content)?;
    Ok(data)
}

/// Loads data from a JSON file, returning default if missing or malformed.
pub async fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match load_json(path).await {
        Ok(data) => data,
        Err(e) => {
            if !matches!(e, StoreError::Io(_)) {
                warn!(path = %path.display(), error = %e, "Failed to load, using defaults");
            }
            T::default()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        assert!(!default_config_dir().as_os_str().is_empty());
        assert!(!default_data_dir().as_os_str().is_empty());
        assert!(default_settings_path().ends_with("settings.json"));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("nested").join("value.json");

        write_atomic(&file, "{}").unwrap();

        let mode = std::fs::metadata(&file).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "File should have 0600 permissions");
        assert!(!file.with_extension("tmp").exists());
    }

    #[test]
    fn test_concurrent_writers_leave_a_whole_value() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("cart.json");
        let values: Vec<String> = (0..8).map(|i| format!("{{\"writer\":{i},\"pad\":\"{}\"}}", "x".repeat(4096))).collect();

        std::thread::scope(|scope| {
            for value in &values {
                let file = &file;
                scope.spawn(move || {
                    for _ in 0..20 {
                        write_atomic(file, value).unwrap();
                    }
                });
            }
        });

        let content = std::fs::read_to_string(&file).unwrap();
        assert!(values.contains(&content));
        let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_temp_paths_are_unique() {
        let path = Path::new("/data/kv/cart.json");
        let first = temp_path_for(path);
        let second = temp_path_for(path);

        assert_ne!(first, second);
        assert_eq!(first.parent(), path.parent());
        assert!(first.file_name().unwrap().to_string_lossy().starts_with(".cart.json."));
    }
}
