//! Tool system for the agent.
//!
//! Tools are the agent's only way to touch the session's layers. Each one
//! declares a JSON schema for its arguments, validates them into a typed
//! struct before doing any work, and reports back a plain-text observation.
//!
//! The GIS tools also accept the older single-string convention
//! (`"school_zones,500"`), either as a bare JSON string or under an `input`
//! key, and split it positionally on commas.

mod args;
mod buffer;
mod intersect;
mod layers;
mod summarize;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::layers::LayerRegistry;
use crate::llm::{FunctionSchema, ToolSchema};

pub use args::ArgumentError;
pub use buffer::{BufferLayer, BUFFER_OUTPUT};
pub use intersect::{IntersectLayers, INTERSECTION_OUTPUT};
pub use layers::ListLayers;
pub use summarize::SummarizeLayer;

/// Information about a tool for display purposes.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// Trait for implementing tools.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool.
    fn name(&self) -> &str;

    /// A description of what this tool does.
    fn description(&self) -> &str;

    /// JSON schema for the tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool against the session's layers.
    async fn execute(&self, args: Value, layers: &LayerRegistry) -> anyhow::Result<String>;
}

/// Registry of available tools, in registration order.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a registry with the default GIS tool set.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(BufferLayer));
        registry.register(Arc::new(IntersectLayers));
        registry.register(Arc::new(SummarizeLayer));
        registry.register(Arc::new(ListLayers));
        registry
    }

    pub fn empty() -> Self {
        Self { tools: Vec::new() }
    }

    /// Add a tool, replacing any existing tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
    }

    /// List all available tools.
    pub fn list_tools(&self) -> Vec<ToolInfo> {
        self.tools
            .iter()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect()
    }

    /// Get tool schemas in LLM-compatible format.
    pub fn get_tool_schemas(&self) -> Vec<ToolSchema> {
        self.tools
            .iter()
            .map(|t| ToolSchema {
                schema_type: "function".to_string(),
                function: FunctionSchema {
                    name: t.name().to_string(),
                    description: t.description().to_string(),
                    parameters: t.parameters_schema(),
                },
            })
            .collect()
    }

    /// Execute a tool by name.
    pub async fn execute(
        &self,
        name: &str,
        args: Value,
        layers: &LayerRegistry,
    ) -> anyhow::Result<String> {
        let tool = self.tools.iter().find(|t| t.name() == name).ok_or_else(|| {
            let known: Vec<&str> = self.tools.iter().map(|t| t.name()).collect();
            anyhow::anyhow!("Unknown tool: {}. Available tools: {:?}", name, known)
        })?;

        tool.execute(args, layers).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
