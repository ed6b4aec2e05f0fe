//! File exists tool: never fails; anything unresolvable is reported absent.

use scopefs_vfs::Scope;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{HostTool, Params, ToolContext, ToolResult};

/// Host tool for existence checks.
pub struct FileExistsTool;

#[async_trait::async_trait]
impl HostTool for FileExistsTool {
    fn name(&self) -> &'static str {
        "fileExists"
    }

    fn description(&self) -> &'static str {
        "Reports whether a file or directory exists. Invalid paths and scopes \
         report false instead of failing."
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
        let path = params.get("path").cloned().unwrap_or(Value::Null);
        let scope_echo = params
            .get("scope")
            .cloned()
            .unwrap_or_else(|| Value::String(Scope::Run.to_string()));

        let exists = match (params.str("path"), params.scope_or(Scope::Run)) {
            (Ok(p), Ok(scope)) => ctx.vfs.exists(p, scope).await,
            (Err(e), _) | (_, Err(e)) => {
                debug!(error = %e, "Existence check parameters unusable, reporting absent");
                false
            },
        };

        let mut out = Map::new();
        out.insert("exists".into(), Value::Bool(exists));
        out.insert("path".into(), path);
        out.insert("scope".into(), scope_echo);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ctx, params};
    use scopefs_vfs::WriteOptions;
    use serde_json::json;

    #[tokio::test]
    async fn test_file_exists() {
        let (_dir, ctx) = ctx().await;
        ctx.vfs
            .write("here.txt", "x", Scope::Global, WriteOptions::new())
            .await
            .unwrap();

        let out = FileExistsTool
            .execute(&params(json!({"path": "here.txt", "scope": "global"})), &ctx)
            .await
            .unwrap();
        assert_eq!(out["exists"], json!(true));
        assert_eq!(out["scope"], json!("global"));

        let out = FileExistsTool
            .execute(&params(json!({"path": "here.txt"})), &ctx)
            .await
            .unwrap();
        assert_eq!(out["exists"], json!(false));
        assert_eq!(out["scope"], json!("run"));
    }

    #[tokio::test]
    async fn test_file_exists_never_fails() {
        let (_dir, ctx) = ctx().await;
        for p in [
            json!({"path": "../../etc/passwd"}),
            json!({"path": "   "}),
            json!({"path": "a", "scope": "nowhere"}),
            json!({"path": 42}),
        ] {
            let out = FileExistsTool.execute(&params(p), &ctx).await.unwrap();
            assert_eq!(out["exists"], json!(false));
        }
    }
}
