use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::scope::{Scope, ScopeRoots};
use crate::{VfsError, VfsResult};

/// Lexically normalizes a logical path into a relative path.
///
/// Leading `/` and `\` separators are stripped, `.` components dropped.
/// An empty result names the scope root itself. Does NOT touch the filesystem.
///
/// # Errors
///
/// Returns `VfsError::EmptyPath` for an empty or whitespace-only path and
/// `VfsError::PathTraversal` if any `..`, root or prefix component remains.
pub fn normalize_logical(logical: &str) -> VfsResult<PathBuf> {
    if logical.trim().is_empty() {
        return Err(VfsError::EmptyPath);
    }
    if logical.contains('\0') {
        return Err(VfsError::PathTraversal(
            "NUL bytes are not allowed in paths".into(),
        ));
    }

    let stripped = logical.trim_start_matches(['/', '\\']);
    let mut normalized = PathBuf::new();

    for component in Path::new(stripped).components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                return Err(VfsError::PathTraversal(format!(
                    "absolute path override in '{logical}'"
                )));
            },
            Component::ParentDir => {
                return Err(VfsError::PathTraversal(format!(
                    "parent directory reference in '{logical}'"
                )));
            },
            Component::CurDir => {},
            Component::Normal(p) => normalized.push(p),
        }
    }

    Ok(normalized)
}

/// Renders a normalized relative path as a logical path string (`/` separated).
#[must_use]
pub fn to_logical(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(p) => Some(p.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Joins a child name onto a logical directory path.
#[must_use]
pub fn join_logical(parent: &str, name: &str) -> String {
    let parent = parent.trim_matches(['/', '\\']);
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Maps logical paths onto confined absolute paths.
#[derive(Debug, Clone)]
pub struct PathResolver {
    roots: ScopeRoots,
}

impl PathResolver {
    /// Create a resolver over a fixed root table.
    #[must_use]
    pub fn new(roots: ScopeRoots) -> Self {
        Self { roots }
    }

    /// The root table this resolver confines paths to.
    #[must_use]
    pub fn roots(&self) -> &ScopeRoots {
        &self.roots
    }

    /// Resolve `logical` inside `scope`. Pure: performs no I/O.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::EmptyPath` or `VfsError::PathTraversal`; see
    /// [`normalize_logical`].
    pub fn resolve(&self, logical: &str, scope: Scope) -> VfsResult<PathBuf> {
        let root = self.roots.get(scope);
        let resolved = root.join(normalize_logical(logical)?);

        if !resolved.starts_with(root) {
            return Err(VfsError::PathTraversal(format!(
                "'{logical}' escapes the {scope} scope"
            )));
        }
        Ok(resolved)
    }

    /// Resolve a scope given by name.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::InvalidScope` for an unknown scope name, otherwise
    /// the errors of [`PathResolver::resolve`].
    pub fn resolve_named(&self, logical: &str, scope: &str) -> VfsResult<PathBuf> {
        self.resolve(logical, scope.parse()?)
    }

    /// Resolve `logical` and verify the deepest existing ancestor still lies
    /// inside the canonical scope root, closing symlink escapes.
    ///
    /// The returned path is rebuilt on the canonical ancestor so a symlink
    /// swapped in later cannot redirect the non-existent tail.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::PathTraversal` if a symlink leads outside the scope,
    /// plus everything [`PathResolver::resolve`] returns.
    pub async fn resolve_existing(&self, logical: &str, scope: Scope) -> VfsResult<PathBuf> {
        let resolved = self.resolve(logical, scope)?;
        self.secure(resolved, logical, scope).await
    }

    /// Resolve `logical` to the directory entry itself: the parent is
    /// secured like [`resolve_existing`](Self::resolve_existing), the final
    /// component is left unresolved so a symlink names the link, not its
    /// target.
    ///
    /// # Errors
    ///
    /// Same as [`PathResolver::resolve_existing`].
    pub async fn resolve_entry(&self, logical: &str, scope: Scope) -> VfsResult<PathBuf> {
        let resolved = self.resolve(logical, scope)?;
        if resolved.as_path() == self.roots.get(scope) {
            return self.secure(resolved, logical, scope).await;
        }
        match (resolved.parent(), resolved.file_name()) {
            (Some(parent), Some(name)) => {
                let name = name.to_owned();
                let parent = self.secure(parent.to_path_buf(), logical, scope).await?;
                Ok(parent.join(name))
            },
            _ => Ok(resolved),
        }
    }

    /// Canonical form of the `scope` root, or the configured path when the
    /// root does not exist.
    pub async fn canonical_root(&self, scope: Scope) -> PathBuf {
        let root = self.roots.get(scope);
        tokio::fs::canonicalize(root)
            .await
            .unwrap_or_else(|_| root.to_path_buf())
    }

    async fn secure(&self, resolved: PathBuf, logical: &str, scope: Scope) -> VfsResult<PathBuf> {
        let root = self.roots.get(scope);
        let canonical_root = self.canonical_root(scope).await;

        let mut current = resolved.clone();
        let mut missing = Vec::new();

        loop {
            if tokio::fs::symlink_metadata(&current).await.is_ok() {
                let canonical = tokio::fs::canonicalize(&current).await?;
                if !canonical.starts_with(&canonical_root) {
                    return Err(VfsError::PathTraversal(format!(
                        "'{logical}' leaves the {scope} scope through a symlink"
                    )));
                }

                let mut secured = canonical;
                for part in missing.into_iter().rev() {
                    secured.push(part);
                }
                debug!(scope = %scope, logical, resolved = %secured.display(), "Resolved path");
                return Ok(secured);
            }

            // Never walk above the scope root; an absent root falls back to the lexical path.
            if current == root {
                break;
            }
            match (current.parent(), current.file_name()) {
                (Some(parent), Some(name)) => {
                    missing.push(name.to_owned());
                    current = parent.to_path_buf();
                },
                _ => break,
            }
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(base: &Path) -> PathResolver {
        PathResolver::new(ScopeRoots::new(base, "t", "r").unwrap())
    }

    #[test]
    fn test_valid_path() {
        let r = resolver(Path::new("/var/eco"));
        let res = r.resolve("src/main.rs", Scope::Task).unwrap();
        assert_eq!(res, Path::new("/var/eco/tasks/t/src/main.rs"));
    }

    #[test]
    fn test_leading_separator_stripped() {
        let r = resolver(Path::new("/var/eco"));
        assert_eq!(
            r.resolve("/notes/a.txt", Scope::Global).unwrap(),
            Path::new("/var/eco/global/notes/a.txt")
        );
        assert_eq!(
            r.resolve("//notes/./a.txt", Scope::Global).unwrap(),
            Path::new("/var/eco/global/notes/a.txt")
        );
    }

    #[test]
    fn test_slash_is_scope_root() {
        let r = resolver(Path::new("/var/eco"));
        assert_eq!(
            r.resolve("/", Scope::Run).unwrap(),
            Path::new("/var/eco/runs/t/r")
        );
    }

    #[test]
    fn test_traversal_blocked_in_every_scope() {
        let r = resolver(Path::new("/var/eco"));
        for scope in Scope::ALL {
            for path in ["../x", "a/../../etc/passwd", "a/../b", "/../../etc", "..", "ok/.."] {
                assert!(
                    matches!(r.resolve(path, scope), Err(VfsError::PathTraversal(_))),
                    "{path} in {scope} should be rejected"
                );
            }
        }
    }

    #[test]
    fn test_empty_path() {
        let r = resolver(Path::new("/var/eco"));
        assert!(matches!(r.resolve("", Scope::Run), Err(VfsError::EmptyPath)));
        assert!(matches!(
            r.resolve(" \t", Scope::Run),
            Err(VfsError::EmptyPath)
        ));
    }

    #[test]
    fn test_invalid_scope_name() {
        let r = resolver(Path::new("/var/eco"));
        assert!(matches!(
            r.resolve_named("a.txt", "tmp"),
            Err(VfsError::InvalidScope(s)) if s == "tmp"
        ));
        assert!(r.resolve_named("a.txt", "global").is_ok());
    }

    #[test]
    fn test_logical_helpers() {
        assert_eq!(to_logical(&normalize_logical("/a/./b/c.txt").unwrap()), "a/b/c.txt");
        assert_eq!(join_logical("/", "x"), "x");
        assert_eq!(join_logical("docs/", "x"), "docs/x");
    }

    #[tokio::test]
    async fn test_resolve_existing_nonexistent_tail() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path());
        std::fs::create_dir_all(r.roots().get(Scope::Run)).unwrap();

        let resolved = r.resolve_existing("new/dir/file.txt", Scope::Run).await.unwrap();
        let canonical_root = std::fs::canonicalize(r.roots().get(Scope::Run)).unwrap();
        assert_eq!(resolved, canonical_root.join("new/dir/file.txt"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_blocked() {
        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), "s").unwrap();

        let r = resolver(dir.path());
        let root = r.roots().get(Scope::Global).to_path_buf();
        std::fs::create_dir_all(&root).unwrap();
        std::os::unix::fs::symlink(outside.path(), root.join("link")).unwrap();

        let res = r.resolve_existing("link/secret.txt", Scope::Global).await;
        assert!(matches!(res, Err(VfsError::PathTraversal(_))));

        let res = r.resolve_existing("link/new.txt", Scope::Global).await;
        assert!(matches!(res, Err(VfsError::PathTraversal(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_entry_keeps_final_link() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path());
        let root = r.roots().get(Scope::Run).to_path_buf();
        std::fs::create_dir_all(root.join("real")).unwrap();
        std::os::unix::fs::symlink("real", root.join("link")).unwrap();
        let canonical_root = std::fs::canonicalize(&root).unwrap();

        assert_eq!(
            r.resolve_entry("link", Scope::Run).await.unwrap(),
            canonical_root.join("link")
        );
        assert_eq!(
            r.resolve_existing("link", Scope::Run).await.unwrap(),
            canonical_root.join("real")
        );
        assert_eq!(r.resolve_entry("/", Scope::Run).await.unwrap(), canonical_root);
    }
}
