//! Layer listing tool.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Tool;
use crate::layers::LayerRegistry;

/// List the layers currently available in the session.
pub struct ListLayers;

#[async_trait]
impl Tool for ListLayers {
    fn name(&self) -> &str {
        "list_layers"
    }

    fn description(&self) -> &str {
        "List every layer currently available, with feature count, geometry types, coordinate reference system and attribute columns."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _args: Value, layers: &LayerRegistry) -> anyhow::Result<String> {
        let layers = layers.layers().await;
        if layers.is_empty() {
            return Ok("No layers are loaded.".to_string());
        }

        Ok(layers
            .iter()
            .map(|layer| format!("- {}", layer.info()))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
