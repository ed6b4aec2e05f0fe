//! Write file tool: writes text, encoded bytes or JSON into a scope.

use scopefs_vfs::{Scope, WriteOptions};
use serde_json::Value;

use crate::envelope::fields;
use crate::{HostTool, Params, ToolContext, ToolResult};

/// Host tool for writing files.
pub struct WriteFileTool;

#[async_trait::async_trait]
impl HostTool for WriteFileTool {
    fn name(&self) -> &'static str {
        "writeFile"
    }

    fn description(&self) -> &'static str {
        "Writes content to a file in the given scope, creating parent directories. \
         Non-string content is stored as pretty-printed JSON. Set append to add to \
         the end of an existing file."
    }

    fn required(&self) -> &'static [&'static str] {
        &["path", "content"]
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path relative to the scope root"
                },
                "content": {
                    "description": "Text to write, or any JSON value to store as JSON"
                },
                "scope": {
                    "type": "string",
                    "enum": ["run", "task", "global"],
                    "default": "run"
                },
                "encoding": {
                    "type": "string",
                    "enum": ["utf8", "base64", "hex", "latin1", "binary"],
                    "default": "utf8"
                },
                "append": {
                    "type": "boolean",
                    "default": false
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, params: &Params, ctx: &ToolContext) -> ToolResult {
        let path = params.str("path")?;
        let content = params.content()?;
        let scope = params.scope_or(Scope::Run)?;
        let mut options = WriteOptions::new().with_encoding(params.encoding()?);
        if params.bool_or("append", false)? {
            options = options.appending();
        }

        let outcome = ctx.vfs.write(path, content, scope, options).await?;
        fields(&outcome)
    }
}
