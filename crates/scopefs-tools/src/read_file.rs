//! Read file tool: reads from one scope or the first scope that has the file.

use scopefs_vfs::ScopeSelector;
use serde_json::Value;

use crate::envelope::fields;
use crate::{HostTool, Params, ToolContext, ToolResult};

/// Host tool for reading files.
pub struct ReadFileTool;

#[async_trait::async_trait]
impl HostTool for ReadFileTool {
    fn name(&self) -> &'static str {
        "readFile"
    }

    fn description(&self) -> &'static str {
        "Reads a file. With scope \"auto\" (the default) the run, task and global \
         scopes are tried in that order and the first hit wins."
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
                    "enum": ["auto", "run", "task", "global"],
                    "default": "auto"
                },
                "encoding": {
                    "type": "string",
                    "enum": ["utf8", "base64", "hex", "latin1", "binary"],
                    "default": "utf8"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, params: &Params, ctx: &ToolContext) -> ToolResult {
        let path = params.str("path")?;
        let selector = params.selector_or(ScopeSelector::Auto)?;
        let encoding = params.encoding()?;

        let outcome = ctx.vfs.read(path, selector, encoding).await?;
        fields(&outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToolError;
    use crate::test_support::{ctx, params};
    use scopefs_vfs::{Scope, VfsError, WriteOptions};
    use serde_json::json;

    #[tokio::test]
    async fn test_read_file_auto_prefers_run() {
        let (_dir, ctx) = ctx().await;
        ctx.vfs
            .write("cfg", "global", Scope::Global, WriteOptions::new())
            .await
            .unwrap();
        ctx.vfs
            .write("cfg", "run", Scope::Run, WriteOptions::new())
            .await
            .unwrap();

        let out = ReadFileTool
            .execute(&params(json!({"path": "cfg"})), &ctx)
            .await
            .unwrap();
        assert_eq!(out["content"], json!("run"));
        assert_eq!(out["scope"], json!("run"));
        assert_eq!(out["encoding"], json!("utf8"));
    }

    #[tokio::test]
    async fn test_read_file_base64() {
        let (_dir, ctx) = ctx().await;
        ctx.vfs
            .write("b", "hi", Scope::Task, WriteOptions::new())
            .await
            .unwrap();
        let out = ReadFileTool
            .execute(
                &params(json!({"path": "b", "scope": "task", "encoding": "base64"})),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(out["content"], json!("aGk="));
        assert_eq!(out["size"], json!(2));
    }

    #[tokio::test]
    async fn test_read_file_not_found() {
        let (_dir, ctx) = ctx().await;
        let err = ReadFileTool
            .execute(&params(json!({"path": "missing", "scope": "global"})), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Vfs(VfsError::NotFound(_))));
    }
}
