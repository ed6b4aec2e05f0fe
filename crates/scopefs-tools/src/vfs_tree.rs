//! VFS tree tool: per-scope root, existence and total size.

use serde_json::{Map, Value};

use crate::{HostTool, Params, ToolContext, ToolResult};

/// Host tool summarizing every scope root.
pub struct VfsTreeTool;

#[async_trait::async_trait]
impl HostTool for VfsTreeTool {
    fn name(&self) -> &'static str {
        "vfsTree"
    }

    fn description(&self) -> &'static str {
        "Returns, for each scope, its root directory, whether it exists and the \
         total size of the files beneath it."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _params: &Params, ctx: &ToolContext) -> ToolResult {
        let tree = ctx.vfs.tree().await;
        let mut out = Map::new();
        out.insert("tree".into(), serde_json::to_value(tree)?);
        Ok(out)
    }
}
