//! File stat tool: size, timestamps and kind of one entry.

use scopefs_vfs::Scope;
use serde_json::Value;

use crate::envelope::fields;
use crate::{HostTool, Params, ToolContext, ToolResult};

/// Host tool for entry metadata.
pub struct FileStatTool;

#[async_trait::async_trait]
impl HostTool for FileStatTool {
    fn name(&self) -> &'static str {
        "fileStat"
    }

    fn description(&self) -> &'static str {
        "Returns size, modified/created/accessed times and whether the path is a \
         file or a directory."
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

        let stat = ctx.vfs.stat(path, scope).await?;
        fields(&stat)
    }
}
