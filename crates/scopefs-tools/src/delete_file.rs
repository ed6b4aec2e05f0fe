//! Delete file tool: removes a file or a whole directory tree.

use scopefs_vfs::Scope;
use serde_json::Value;

use crate::envelope::fields;
use crate::{HostTool, Params, ToolContext, ToolResult};

/// Host tool for deleting files and directories.
pub struct DeleteFileTool;

#[async_trait::async_trait]
impl HostTool for DeleteFileTool {
    fn name(&self) -> &'static str {
        "deleteFile"
    }

    fn description(&self) -> &'static str {
        "Deletes a file, or a directory together with everything beneath it. \
         Fails if nothing exists at the path. Scope roots cannot be deleted."
    }

    fn required(&self) -> &'static [&'static str] {
        &["path"]
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path relative to the scope root"
                },
                "scope": {
                    "type": "string",
                    "enum": ["run", "task", "global"],
                    "default": "run"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, params: &Params, ctx: &ToolContext) -> ToolResult {
        let path = params.str("path")?;
        let scope = params.scope_or(Scope::Run)?;

        let outcome = ctx.vfs.delete(path, scope).await?;
        let mut out = fields(&outcome)?;
        out.insert("deleted".into(), Value::Bool(true));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToolError;
    use crate::test_support::{ctx, params};
    use scopefs_vfs::{VfsError, WriteOptions};
    use serde_json::json;

    #[tokio::test]
    async fn test_delete_directory_tree() {
        let (_dir, ctx) = ctx().await;
        ctx.vfs
            .write("tree/a/b.txt", "x", Scope::Run, WriteOptions::new())
            .await
            .unwrap();

        let out = DeleteFileTool
            .execute(&params(json!({"path": "tree"})), &ctx)
            .await
            .unwrap();
        assert_eq!(out["wasDirectory"], json!(true));
        assert_eq!(out["deleted"], json!(true));
        assert!(!ctx.vfs.exists("tree/a/b.txt", Scope::Run).await);
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let (_dir, ctx) = ctx().await;
        let err = DeleteFileTool
            .execute(&params(json!({"path": "nope", "scope": "task"})), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Vfs(VfsError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_scope_root_refused() {
        let (_dir, ctx) = ctx().await;
        let err = DeleteFileTool
            .execute(&params(json!({"path": "/", "scope": "global"})), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Vfs(VfsError::RootOperation(_))));
    }
}
