//! List files tool: lists a directory, optionally walking it depth-first.

use scopefs_vfs::{FileEntry, Scope, ScopedVfs, VfsResult};
use serde_json::{Map, Value};

use crate::{HostTool, Params, ToolContext, ToolResult};

/// Host tool for listing directories.
pub struct ListFilesTool;

#[async_trait::async_trait]
impl HostTool for ListFilesTool {
    fn name(&self) -> &'static str {
        "listFiles"
    }

    fn description(&self) -> &'static str {
        "Lists the files and directories under a path. With recursive set, every \
         descendant is appended to files depth-first, each directory followed by \
         its contents. A directory that does not exist lists as empty."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Directory relative to the scope root",
                    "default": "/"
                },
                "scope": {
                    "type": "string",
                    "enum": ["run", "task", "global"],
                    "default": "run"
                },
                "recursive": {
                    "type": "boolean",
                    "default": false
                }
            }
        })
    }

    async fn execute(&self, params: &Params, ctx: &ToolContext) -> ToolResult {
        let path = params.opt_str("path")?.unwrap_or("/");
        let scope = params.scope_or(Scope::Run)?;
        let recursive = params.bool_or("recursive", false)?;

        let listing = ctx.vfs.list(path, scope).await?;
        let files = if recursive {
            let mut files = listing.files.clone();
            for dir in &listing.directories {
                walk(&ctx.vfs, dir, scope, &mut files).await?;
            }
            files
        } else {
            listing.files
        };

        let mut out = Map::new();
        out.insert("path".into(), Value::String(path.to_string()));
        out.insert("scope".into(), serde_json::to_value(scope)?);
        out.insert("recursive".into(), Value::Bool(recursive));
        out.insert("files".into(), serde_json::to_value(files)?);
        out.insert("directories".into(), serde_json::to_value(listing.directories)?);
        Ok(out)
    }
}

/// Push `dir` and then everything beneath it onto `out`, depth-first.
///
/// Iterative so deep trees do not need recursive async calls. Symlinks are
/// listed as files and never descended into.
async fn walk(
    vfs: &ScopedVfs,
    dir: &FileEntry,
    scope: Scope,
    out: &mut Vec<FileEntry>,
) -> VfsResult<()> {
    let mut stack = vec![dir.clone()];
    while let Some(current) = stack.pop() {
        let listing = vfs.list(&current.path, scope).await?;
        out.push(current);
        out.extend(listing.files);
        // Reverse so the first directory by name is visited first.
        stack.extend(listing.directories.into_iter().rev());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ctx, params};
    use scopefs_vfs::WriteOptions;
    use serde_json::json;

    fn names(value: &Value) -> Vec<String> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["path"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_list_files_flat() {
        let (_dir, ctx) = ctx().await;
        ctx.vfs
            .write("top.txt", "t", Scope::Run, WriteOptions::new())
            .await
            .unwrap();
        ctx.vfs
            .write("sub/inner.txt", "i", Scope::Run, WriteOptions::new())
            .await
            .unwrap();

        let out = ListFilesTool
            .execute(&params(json!({})), &ctx)
            .await
            .unwrap();
        assert_eq!(names(&out["files"]), vec!["top.txt"]);
        assert_eq!(names(&out["directories"]), vec!["sub"]);
        assert_eq!(out["directories"][0]["type"], json!("directory"));
        assert_eq!(out["files"][0]["extension"], json!("txt"));
    }

    #[tokio::test]
    async fn test_list_files_recursive_depth_first() {
        let (_dir, ctx) = ctx().await;
        for path in ["a/x.txt", "a/deep/y.txt", "b/z.txt", "root.txt"] {
            ctx.vfs
                .write(path, "-", Scope::Task, WriteOptions::new())
                .await
                .unwrap();
        }

        let out = ListFilesTool
            .execute(
                &params(json!({"path": "/", "scope": "task", "recursive": true})),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(
            names(&out["files"]),
            vec![
                "root.txt",
                "a",
                "a/x.txt",
                "a/deep",
                "a/deep/y.txt",
                "b",
                "b/z.txt"
            ]
        );
        assert_eq!(names(&out["directories"]), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_list_files_missing_directory() {
        let (_dir, ctx) = ctx().await;
        let out = ListFilesTool
            .execute(&params(json!({"path": "ghost", "recursive": true})), &ctx)
            .await
            .unwrap();
        assert_eq!(out["files"], json!([]));
        assert_eq!(out["directories"], json!([]));
    }
}
