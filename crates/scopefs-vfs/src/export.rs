//! Copy the current task's scope roots out to an external directory.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::scope::Scope;
use crate::types::ExportSummary;
use crate::{ScopedVfs, VfsError, VfsResult};

impl ScopedVfs {
    /// Copy every existing scope root into
    /// `<external_root>/tasks/<task_id>/<scope>`.
    ///
    /// The copy is additive: files already at the destination are
    /// overwritten, nothing is removed. Symlinks are skipped.
    ///
    /// # Errors
    ///
    /// Returns an IO error if a directory cannot be created or a file cannot
    /// be copied.
    pub async fn export_tree(&self, external_root: &Path) -> VfsResult<ExportSummary> {
        let destination = external_root
            .join("tasks")
            .join(self.store().task_id());

        let mut sources = Vec::with_capacity(Scope::ALL.len());
        for scope in Scope::ALL {
            let root = self.root(scope).to_path_buf();
            if tokio::fs::try_exists(&root).await.unwrap_or(false) {
                sources.push((scope, root, destination.join(scope.as_str())));
            } else {
                debug!(scope = %scope, "Scope root missing, not exported");
            }
        }

        let dest = destination.clone();
        let summary = tokio::task::spawn_blocking(move || copy_scopes(dest, sources))
            .await
            .map_err(|e| VfsError::Io(std::io::Error::other(e)))??;

        info!(
            destination = %summary.destination.display(),
            files = summary.files_copied,
            bytes = summary.bytes_copied,
            "Exported scope tree"
        );
        Ok(summary)
    }
}

fn copy_scopes(
    destination: PathBuf,
    sources: Vec<(Scope, PathBuf, PathBuf)>,
) -> VfsResult<ExportSummary> {
    let mut summary = ExportSummary {
        destination,
        scopes: Vec::with_capacity(sources.len()),
        files_copied: 0,
        bytes_copied: 0,
    };

    for (scope, src_root, dst_root) in sources {
        std::fs::create_dir_all(&dst_root)?;

        for entry in WalkDir::new(&src_root).min_depth(1).follow_links(false) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(scope = %scope, error = %e, "Skipping unreadable entry during export");
                    continue;
                },
            };
            let Ok(relative) = entry.path().strip_prefix(&src_root) else {
                continue;
            };
            let target = dst_root.join(relative);
            let file_type = entry.file_type();

            if file_type.is_dir() {
                std::fs::create_dir_all(&target)?;
            } else if file_type.is_file() {
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let bytes = std::fs::copy(entry.path(), &target)?;
                summary.files_copied = summary.files_copied.saturating_add(1);
                summary.bytes_copied = summary.bytes_copied.saturating_add(bytes);
            } else {
                debug!(path = %entry.path().display(), "Skipping symlink during export");
            }
        }
        summary.scopes.push(scope);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use crate::{Scope, ScopedVfs, VfsOptions, WriteOptions};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_export_copies_all_scopes() {
        let eco = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let vfs = ScopedVfs::open(VfsOptions::new(eco.path(), "t1", "r1"))
            .await
            .unwrap();

        vfs.write("a/b.txt", "run", Scope::Run, WriteOptions::new())
            .await
            .unwrap();
        vfs.write("t.txt", "task", Scope::Task, WriteOptions::new())
            .await
            .unwrap();
        vfs.mkdir("empty", Scope::Global).await.unwrap();

        let summary = vfs.export_tree(out.path()).await.unwrap();
        assert_eq!(summary.files_copied, 2);
        assert_eq!(summary.bytes_copied, 7);
        assert_eq!(summary.scopes, Scope::ALL.to_vec());

        let dest = out.path().join("tasks").join("t1");
        assert_eq!(summary.destination, dest);
        assert_eq!(
            std::fs::read_to_string(dest.join("run/a/b.txt")).unwrap(),
            "run"
        );
        assert_eq!(
            std::fs::read_to_string(dest.join("task/t.txt")).unwrap(),
            "task"
        );
        assert!(dest.join("global/empty").is_dir());
    }

    #[tokio::test]
    async fn test_export_is_additive() {
        let eco = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let keep = out.path().join("tasks/t1/run/keep.txt");
        std::fs::create_dir_all(keep.parent().unwrap()).unwrap();
        std::fs::write(&keep, "old").unwrap();

        let vfs = ScopedVfs::open(VfsOptions::new(eco.path(), "t1", "r1"))
            .await
            .unwrap();
        vfs.write("new.txt", "n", Scope::Run, WriteOptions::new())
            .await
            .unwrap();
        vfs.export_tree(out.path()).await.unwrap();

        assert!(keep.exists());
        assert!(out.path().join("tasks/t1/run/new.txt").exists());
    }
}
