//! Watch file tool: arms a native watch that lives until released.

use scopefs_vfs::Scope;
use serde_json::{Map, Value};

use crate::{HostTool, Params, ToolContext, ToolResult};

/// Host tool for watching a file or directory.
pub struct WatchFileTool;

#[async_trait::async_trait]
impl HostTool for WatchFileTool {
    fn name(&self) -> &'static str {
        "watchFile"
    }

    fn description(&self) -> &'static str {
        "Starts watching an existing file or directory (non-recursive). Changes \
         are published as file:change events tagged with the returned watchId."
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

        let subscription = ctx.vfs.watch(path, scope).await?;
        let id = ctx.watches.insert(subscription);

        let mut out = Map::new();
        out.insert("watchId".into(), Value::String(id.to_string()));
        out.insert("path".into(), Value::String(path.to_string()));
        out.insert("scope".into(), serde_json::to_value(scope)?);
        out.insert("watching".into(), Value::Bool(true));
        Ok(out)
    }
}
