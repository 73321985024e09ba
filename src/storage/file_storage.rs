//! Blob storage for uploaded problem files

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, AppResult};
use crate::utils::get_available_name;

/// Storage backend for problem files.
///
/// Paths are relative to the backend's root and use `/` separators.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store `contents` at `path`, or at a free variant of it when taken.
    /// Returns the path actually written.
    async fn save(&self, contents: &[u8], path: &str) -> AppResult<String>;

    /// Remove the file at `path`
    async fn delete(&self, path: &str) -> AppResult<()>;

    /// Check whether a file exists at `path`
    async fn exists(&self, path: &str) -> AppResult<bool>;
}

/// Local-disk storage rooted at a configured directory
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a storage-relative path, refusing anything that escapes the root
    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

        if path.is_empty() || escapes {
            return Err(AppError::Storage(format!(
                "Path {:?} is outside the storage root",
                path
            )));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn save(&self, contents: &[u8], path: &str) -> AppResult<String> {
        let (dir, filename) = match path.rsplit_once('/') {
            Some((dir, filename)) => (Some(dir), filename),
            None => (None, path),
        };

        // `create_new` claims the name atomically; a taken name moves on to
        // a suffixed variant
        let mut candidate = path.to_string();
        let mut file = loop {
            let full_path = self.resolve(&candidate)?;
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent).await?;
            }

            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&full_path)
                .await
            {
                Ok(file) => break file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    let alternative = get_available_name(filename);
                    candidate = match dir {
                        Some(dir) => format!("{}/{}", dir, alternative),
                        None => alternative,
                    };
                }
                Err(e) => {
                    return Err(AppError::Storage(format!(
                        "Failed to create {}: {}",
                        candidate, e
                    )));
                }
            }
        };

        file.write_all(contents).await?;
        file.flush().await?;

        tracing::debug!(path = %candidate, bytes = contents.len(), "Stored file");
        Ok(candidate)
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => {
                tracing::debug!(path = %path, "Deleted stored file");
                Ok(())
            }
            // Already gone
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to delete {}: {}",
                path, e
            ))),
        }
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        let full_path = self.resolve(path)?;
        Ok(fs::try_exists(&full_path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let storage = LocalFileStorage::new(temp.path());

        let stored = storage
            .save(b"%PDF-1.4", "bank/problem_files/spec.pdf")
            .await
            .unwrap();

        assert_eq!(stored, "bank/problem_files/spec.pdf");
        assert!(temp.path().join("bank/problem_files/spec.pdf").is_file());
        assert!(storage.exists(&stored).await.unwrap());
    }

    #[tokio::test]
    async fn test_save_picks_available_name_when_taken() {
        let temp = TempDir::new().unwrap();
        let storage = LocalFileStorage::new(temp.path());

        let first = storage.save(b"one", "bank/problem_files/spec.pdf").await.unwrap();
        let second = storage.save(b"two", "bank/problem_files/spec.pdf").await.unwrap();

        assert_ne!(first, second);
        assert!(second.starts_with("bank/problem_files/spec_"));
        assert!(second.ends_with(".pdf"));
        let first_contents = std::fs::read(temp.path().join(&first)).unwrap();
        assert_eq!(first_contents, b"one");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_never_overwrite() {
        let temp = TempDir::new().unwrap();
        let storage = Arc::new(LocalFileStorage::new(temp.path()));

        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let storage = storage.clone();
                tokio::spawn(async move {
                    let stored = storage
                        .save(&[i], "bank/problem_files/spec.pdf")
                        .await
                        .unwrap();
                    (i, stored)
                })
            })
            .collect();

        let mut names = BTreeSet::new();
        for handle in handles {
            let (i, stored) = handle.await.unwrap();
            assert_eq!(std::fs::read(temp.path().join(&stored)).unwrap(), vec![i]);
            names.insert(stored);
        }
        assert_eq!(names.len(), 8);
    }

    #[tokio::test]
    async fn test_delete_removes_file_and_tolerates_missing() {
        let temp = TempDir::new().unwrap();
        let storage = LocalFileStorage::new(temp.path());
        let stored = storage.save(b"x", "bank/problem_files/a.pdf").await.unwrap();

        storage.delete(&stored).await.unwrap();
        assert!(!storage.exists(&stored).await.unwrap());

        storage.delete(&stored).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_paths_outside_root() {
        let temp = TempDir::new().unwrap();
        let storage = LocalFileStorage::new(temp.path());

        assert!(matches!(
            storage.exists("../outside.pdf").await,
            Err(AppError::Storage(_))
        ));
        assert!(matches!(
            storage.delete("/etc/passwd").await,
            Err(AppError::Storage(_))
        ));
    }
}
