//! Per-problem testcase directories
//!
//! Every saved problem owns `<bank_root>/bank/testcases/<problem_id>/`. The
//! directory is provisioned after each save and removed, with everything
//! under it, after the problem row is deleted.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::constants::TESTCASES_DIR;
use crate::error::{AppError, AppResult};

/// Statistics from removing a testcase directory
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RemovalStats {
    pub files_deleted: u64,
    pub dirs_deleted: u64,
    pub bytes_freed: u64,
}

/// Testcase directory tree rooted at `<bank_root>/bank/testcases`
#[derive(Debug, Clone)]
pub struct TestcaseDirectories {
    root: PathBuf,
}

impl TestcaseDirectories {
    /// Build from the configured bank root (the parent of `bank/`)
    pub fn new(bank_root: impl AsRef<Path>) -> Self {
        Self {
            root: bank_root.as_ref().join(TESTCASES_DIR),
        }
    }

    /// `<bank_root>/bank/testcases`
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for one problem
    pub fn path_for(&self, problem_id: i32) -> PathBuf {
        self.root.join(problem_id.to_string())
    }

    /// Create the directory (and parents) if missing.
    ///
    /// Returns `true` when the directory was created by this call. A
    /// non-directory entry at the path is an error.
    pub async fn ensure(&self, problem_id: i32) -> AppResult<bool> {
        let dir = self.path_for(problem_id);
        if let Ok(metadata) = tokio::fs::metadata(&dir).await {
            if metadata.is_dir() {
                return Ok(false);
            }
        }

        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create testcase directory {:?}: {}",
                dir, e
            ))
        })?;

        tracing::debug!(problem_id, path = ?dir, "Provisioned testcase directory");
        Ok(true)
    }

    /// Delete every file under the problem's directory, then the emptied
    /// directories. A missing directory is a no-op.
    pub async fn remove(&self, problem_id: i32) -> AppResult<RemovalStats> {
        let dir = self.path_for(problem_id);

        tokio::task::spawn_blocking(move || remove_tree(&dir))
            .await
            .map_err(|e| AppError::Internal(e.into()))?
    }

    /// Problem ids that currently have a directory on disk, ascending
    pub async fn problem_ids_on_disk(&self) -> AppResult<Vec<i32>> {
        let root = self.root.clone();

        tokio::task::spawn_blocking(move || -> AppResult<Vec<i32>> {
            let mut ids = Vec::new();
            if !root.exists() {
                return Ok(ids);
            }

            for entry in WalkDir::new(&root).min_depth(1).max_depth(1) {
                let entry = entry?;
                if !entry.file_type().is_dir() {
                    continue;
                }
                match entry.file_name().to_str().and_then(|name| name.parse().ok()) {
                    Some(id) => ids.push(id),
                    None => tracing::debug!(path = ?entry.path(), "Ignoring non-problem entry"),
                }
            }

            ids.sort_unstable();
            Ok(ids)
        })
        .await
        .map_err(|e| AppError::Internal(e.into()))?
    }
}

fn remove_tree(dir: &Path) -> AppResult<RemovalStats> {
    let mut stats = RemovalStats::default();

    if !dir.exists() {
        tracing::debug!(path = ?dir, "Testcase directory does not exist, skipping");
        return Ok(stats);
    }

    // Children are yielded before their parent, so each directory is empty
    // by the time it is reached. Symlinks are removed, never followed.
    for entry in WalkDir::new(dir).contents_first(true).follow_root_links(false) {
        let entry = entry?;
        let path = entry.path();

        if entry.file_type().is_dir() {
            fs::remove_dir(path).map_err(|e| {
                AppError::Storage(format!("Failed to remove directory {:?}: {}", path, e))
            })?;
            stats.dirs_deleted += 1;
        } else {
            let bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
            fs::remove_file(path).map_err(|e| {
                AppError::Storage(format!("Failed to remove file {:?}: {}", path, e))
            })?;
            stats.files_deleted += 1;
            stats.bytes_freed += bytes;
        }
    }

    tracing::debug!(
        path = ?dir,
        files = stats.files_deleted,
        dirs = stats.dirs_deleted,
        bytes = stats.bytes_freed,
        "Removed testcase directory"
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_path_layout() {
        let dirs = TestcaseDirectories::new("/srv/judge");
        assert_eq!(dirs.path_for(42), PathBuf::from("/srv/judge/bank/testcases/42"));
    }

    #[tokio::test]
    async fn test_ensure_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let dirs = TestcaseDirectories::new(temp.path());

        assert!(dirs.ensure(1).await.unwrap());
        assert!(!dirs.ensure(1).await.unwrap());

        assert!(dirs.path_for(1).is_dir());
        let entries = std::fs::read_dir(dirs.root()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_ensure_rejects_file_in_place_of_directory() {
        let temp = TempDir::new().unwrap();
        let dirs = TestcaseDirectories::new(temp.path());
        std::fs::create_dir_all(dirs.root()).unwrap();
        std::fs::write(dirs.path_for(1), "stray").unwrap();

        let err = dirs.ensure(1).await.unwrap_err();

        assert!(matches!(err, AppError::Storage(_)));
        assert!(dirs.path_for(1).is_file());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_remove_unlinks_symlinked_directory_without_following() {
        let temp = TempDir::new().unwrap();
        let dirs = TestcaseDirectories::new(temp.path());
        std::fs::create_dir_all(dirs.root()).unwrap();

        let shared = temp.path().join("shared");
        std::fs::create_dir_all(&shared).unwrap();
        std::fs::write(shared.join("1.in"), "1 2\n").unwrap();
        std::os::unix::fs::symlink(&shared, dirs.path_for(4)).unwrap();

        let stats = dirs.remove(4).await.unwrap();

        assert_eq!(stats.files_deleted, 1);
        assert!(!dirs.path_for(4).exists());
        assert!(shared.join("1.in").is_file());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_remove_failure_is_storage_error() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("bank")).unwrap();
        // procfs entries cannot be unlinked, even by root
        std::os::unix::fs::symlink("/proc", temp.path().join("bank/testcases")).unwrap();
        let dirs = TestcaseDirectories::new(temp.path());
        let pid = std::process::id() as i32;

        let err = dirs.remove(pid).await.unwrap_err();

        assert!(matches!(err, AppError::Storage(_)));
        assert!(dirs.path_for(pid).is_dir());
    }

    #[tokio::test]
    async fn test_remove_deletes_nested_contents() {
        let temp = TempDir::new().unwrap();
        let dirs = TestcaseDirectories::new(temp.path());
        dirs.ensure(3).await.unwrap();

        let dir = dirs.path_for(3);
        std::fs::write(dir.join("1.in"), "1 2\n").unwrap();
        std::fs::write(dir.join("1.out"), "3\n").unwrap();
        std::fs::create_dir_all(dir.join("sample/extra")).unwrap();
        std::fs::write(dir.join("sample/extra/2.in"), "4 5\n").unwrap();

        let stats = dirs.remove(3).await.unwrap();

        assert!(!dir.exists());
        assert!(dirs.root().exists());
        assert_eq!(stats.files_deleted, 3);
        assert_eq!(stats.dirs_deleted, 3);
        assert_eq!(stats.bytes_freed, 4 + 2 + 4);
    }

    #[tokio::test]
    async fn test_remove_missing_directory_is_noop() {
        let temp = TempDir::new().unwrap();
        let dirs = TestcaseDirectories::new(temp.path());

        let stats = dirs.remove(999).await.unwrap();
        assert_eq!(stats, RemovalStats::default());
    }

    #[tokio::test]
    async fn test_problem_ids_on_disk() {
        let temp = TempDir::new().unwrap();
        let dirs = TestcaseDirectories::new(temp.path());
        assert!(dirs.problem_ids_on_disk().await.unwrap().is_empty());

        dirs.ensure(10).await.unwrap();
        dirs.ensure(2).await.unwrap();
        std::fs::create_dir_all(dirs.root().join("scratch")).unwrap();
        std::fs::write(dirs.root().join("README"), "notes").unwrap();

        assert_eq!(dirs.problem_ids_on_disk().await.unwrap(), vec![2, 10]);
    }
}
