//! Serialized storage deletion.
//!
//! Comparison work runs fully in parallel, but the delete syscall itself is
//! treated as a scarce shared resource: every worker funnels its removals
//! through one [`StorageGate`], whose mutex keeps delete calls from
//! overlapping. Partitions are disjoint, so the paths can never collide;
//! the gate throttles the primitive, it does not arbitrate ownership.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

/// Error type for storage removal.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved since scanning).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Single serialization point for the native delete call, shared by all
/// workers of a run.
#[derive(Debug, Default)]
pub struct StorageGate {
    lock: Mutex<()>,
}

impl StorageGate {
    /// Create a new gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Permanently remove `path` from storage.
    ///
    /// The call holds the gate's mutex for the duration of the syscall only.
    /// Deletion is immediate and irrevocable; there is no trash or rollback.
    ///
    /// # Errors
    ///
    /// Returns [`DeleteError`] if the filesystem refuses the removal. The
    /// caller keeps the record in its working set and counts the failure.
    pub fn remove(&self, path: &Path) -> Result<(), DeleteError> {
        let _guard = self
            .lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        fs::remove_file(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DeleteError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => DeleteError::PermissionDenied(path.to_path_buf()),
            _ => DeleteError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        log::info!("Deleted {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_remove_deletes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doomed.jpg");
        File::create(&path).unwrap().write_all(b"x").unwrap();
        assert!(path.exists());

        let gate = StorageGate::new();
        gate.remove(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_remove_missing_file_is_not_found() {
        let gate = StorageGate::new();
        let result = gate.remove(Path::new("/nonexistent/file.jpg"));
        assert!(matches!(result, Err(DeleteError::NotFound(_))));
    }

    #[test]
    fn test_concurrent_removals() {
        let dir = tempdir().unwrap();
        let gate = Arc::new(StorageGate::new());

        let paths: Vec<PathBuf> = (0..16)
            .map(|i| {
                let p = dir.path().join(format!("f{i}.jpg"));
                File::create(&p).unwrap().write_all(b"x").unwrap();
                p
            })
            .collect();

        std::thread::scope(|scope| {
            for chunk in paths.chunks(4) {
                let gate = Arc::clone(&gate);
                scope.spawn(move || {
                    for path in chunk {
                        gate.remove(path).unwrap();
                    }
                });
            }
        });

        assert!(paths.iter().all(|p| !p.exists()));
    }

    #[test]
    fn test_delete_error_display() {
        let err = DeleteError::NotFound(PathBuf::from("/x.jpg"));
        assert!(err.to_string().contains("not found"));

        let err = DeleteError::PermissionDenied(PathBuf::from("/x.jpg"));
        assert!(err.to_string().contains("permission denied"));
    }
}
