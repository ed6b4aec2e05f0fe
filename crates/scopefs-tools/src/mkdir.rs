//! Mkdir tool: recursive and idempotent directory creation.

use scopefs_vfs::Scope;
use serde_json::{Map, Value};

use crate::{HostTool, Params, ToolContext, ToolResult};

/// Host tool for creating directories.
pub struct MkdirTool;

#[async_trait::async_trait]
impl HostTool for MkdirTool {
    fn name(&self) -> &'static str {
        "mkdir"
    }

    fn description(&self) -> &'static str {
        "Creates a directory and any missing parents. Succeeds if it already exists."
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
                    "description": "Directory relative to the scope root"
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

        let outcome = ctx.vfs.mkdir(path, scope).await?;
        let mut out = Map::new();
        out.insert("path".into(), Value::String(outcome.path));
        out.insert("scope".into(), serde_json::to_value(outcome.scope)?);
        out.insert("created".into(), Value::Bool(outcome.created));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ctx, params};
    use serde_json::json;

    #[tokio::test]
    async fn test_mkdir_idempotent() {
        let (_dir, ctx) = ctx().await;
        let p = params(json!({"path": "x/y/z", "scope": "task"}));

        let first = MkdirTool.execute(&p, &ctx).await.unwrap();
        assert_eq!(first["created"], json!(true));
        let second = MkdirTool.execute(&p, &ctx).await.unwrap();
        assert_eq!(second["created"], json!(false));

        assert!(ctx.vfs.root(Scope::Task).join("x/y/z").is_dir());
        assert!(second.get("fullPath").is_none());
    }
}
