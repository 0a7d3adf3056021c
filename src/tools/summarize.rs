//! Summary statistics tool.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::args;
use super::Tool;
use crate::gis;
use crate::layers::LayerRegistry;

#[derive(Debug, Deserialize)]
struct SummarizeArgs {
    layer: String,
}

/// Describe every column of a layer.
pub struct SummarizeLayer;

#[async_trait]
impl Tool for SummarizeLayer {
    fn name(&self) -> &str {
        "summarize_layer"
    }

    fn description(&self) -> &str {
        "Return descriptive statistics for a layer: feature count per column, unique/top/freq for text and geometry columns, and mean/std/min/quartiles/max for numeric columns."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "layer": {
                    "type": "string",
                    "description": "Name of the layer to summarize"
                }
            },
            "required": ["layer"]
        })
    }

    async fn execute(&self, args: Value, layers: &LayerRegistry) -> anyhow::Result<String> {
        let name = match args::string_form(&args) {
            Some(input) => input.trim().to_string(),
            None => args::from_object::<SummarizeArgs>("summarize_layer", args)?.layer,
        };

        let layer = layers.resolve(name.trim()).await?;
        let table = gis::summarize(&layer);
        Ok(format!(
            "Summary of '{}' ({} features):\n{}",
            layer.name,
            layer.len(),
            table
        ))
    }
}
