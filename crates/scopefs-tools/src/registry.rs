//! Name-based dispatch with parameter validation and envelopes.

use std::collections::HashMap;
use std::sync::Arc;

use scopefs_vfs::ScopedVfs;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, trace};
use uuid::Uuid;

use crate::envelope::{failure, redact_params, success};
use crate::{
    DeleteFileTool, FileExistsTool, FileStatTool, HostTool, ListFilesTool, MkdirTool, Params,
    ReadFileTool, ToolContext, ToolError, VfsTreeTool, WatchFileTool, WriteFileTool,
};

/// Description of one registered tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Parameters that must be supplied.
    pub required: Vec<String>,
    /// JSON schema of the parameters.
    pub input_schema: Value,
}

/// Registry of host tools over one [`ScopedVfs`].
///
/// The only surface task code calls. Every failure, including unknown tool
/// names and missing parameters, comes back as a failure envelope.
pub struct HostToolRegistry {
    tools: HashMap<String, Box<dyn HostTool>>,
    ctx: ToolContext,
    debug: bool,
}

impl std::fmt::Debug for HostToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostToolRegistry")
            .field("tools", &self.names())
            .field("ctx", &self.ctx)
            .field("debug", &self.debug)
            .finish()
    }
}

impl HostToolRegistry {
    /// Create an empty registry over `vfs`.
    #[must_use]
    pub fn new(vfs: Arc<ScopedVfs>) -> Self {
        let debug = vfs.debug();
        Self {
            tools: HashMap::new(),
            ctx: ToolContext::new(vfs),
            debug,
        }
    }

    /// Create a registry with every host tool registered.
    #[must_use]
    pub fn with_defaults(vfs: Arc<ScopedVfs>) -> Self {
        let mut registry = Self::new(vfs);
        registry.register(Box::new(WriteFileTool));
        registry.register(Box::new(ReadFileTool));
        registry.register(Box::new(ListFilesTool));
        registry.register(Box::new(DeleteFileTool));
        registry.register(Box::new(FileExistsTool));
        registry.register(Box::new(FileStatTool));
        registry.register(Box::new(MkdirTool));
        registry.register(Box::new(WatchFileTool));
        registry.register(Box::new(VfsTreeTool));
        registry
    }

    /// Register a tool, replacing any tool with the same name.
    pub fn register(&mut self, tool: Box<dyn HostTool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn HostTool> {
        self.tools.get(name).map(AsRef::as_ref)
    }

    /// Registered tool names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Definitions of every registered tool, sorted by name.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<_> = self
            .tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                required: t.required().iter().map(ToString::to_string).collect(),
                input_schema: t.input_schema(),
            })
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// The filesystem tools operate on.
    #[must_use]
    pub fn vfs(&self) -> &Arc<ScopedVfs> {
        &self.ctx.vfs
    }

    /// Shared tool context.
    #[must_use]
    pub fn context(&self) -> &ToolContext {
        &self.ctx
    }

    /// Dispatch `name` with `params` and wrap the outcome in an envelope.
    pub async fn call(&self, name: &str, params: Value) -> Value {
        let outcome = self.dispatch(name, &params).await;
        let ok = outcome.is_ok();
        let envelope = match outcome {
            Ok(fields) => success(fields),
            Err(e) => failure(name, &e, &params),
        };

        if self.debug {
            info!(
                tool = name,
                params = %redact_params(&params),
                success = ok,
                error = envelope.get("error").and_then(serde_json::Value::as_str),
                "Tool dispatched"
            );
        } else {
            trace!(tool = name, success = ok, "Tool dispatched");
        }

        envelope
    }

    async fn dispatch(&self, name: &str, params: &Value) -> crate::ToolResult {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let params = Params::from_value(params.clone())?;

        let missing = params.missing(tool.required());
        if !missing.is_empty() {
            return Err(ToolError::MissingParameters(missing));
        }

        tool.execute(&params, &self.ctx).await
    }

    /// Release the watch started by `watchFile` with `id`.
    pub fn close_watch(&self, id: Uuid) -> bool {
        self.ctx.watches.close(id)
    }

    /// Release every watch. Returns how many were active.
    pub fn close_all_watches(&self) -> usize {
        self.ctx.watches.close_all()
    }

    /// Number of watches currently held.
    #[must_use]
    pub fn active_watches(&self) -> usize {
        self.ctx.watches.len()
    }
}
