//! Intersection tool.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::args::{self, ArgumentError};
use super::Tool;
use crate::gis;
use crate::layers::{validate_name, LayerRegistry};

/// Layer name an intersection writes to unless the call names another.
pub const INTERSECTION_OUTPUT: &str = "school_zones_in_flood_zones";

#[derive(Debug, Deserialize)]
struct IntersectArgs {
    first: String,
    second: String,
    #[serde(default)]
    output: Option<String>,
}

impl IntersectArgs {
    fn parse(value: Value) -> Result<Self, ArgumentError> {
        if let Some(input) = args::string_form(&value) {
            let parts = args::split_positional(input, 2, "layer1,layer2")?;
            return Ok(Self {
                first: parts[0].to_string(),
                second: parts[1].to_string(),
                output: None,
            });
        }
        args::from_object("intersect_layers", value)
    }
}

/// Overlay two layers and keep the parts of the first that fall in the second.
pub struct IntersectLayers;

#[async_trait]
impl Tool for IntersectLayers {
    fn name(&self) -> &str {
        "intersect_layers"
    }

    fn description(&self) -> &str {
        "Find the geometric intersection of two layers. Each overlapping pair of features becomes one result feature carrying the attributes of both. Results keep the geometry type of the first layer: points inside the second layer, lines clipped to it, or shared polygon area. The result is stored as 'school_zones_in_flood_zones' unless 'output' is given."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "first": {
                    "type": "string",
                    "description": "Name of the first layer"
                },
                "second": {
                    "type": "string",
                    "description": "Name of the second layer"
                },
                "output": {
                    "type": "string",
                    "description": "Optional name for the result layer (default: school_zones_in_flood_zones)"
                }
            },
            "required": ["first", "second"]
        })
    }

    async fn execute(&self, args: Value, layers: &LayerRegistry) -> anyhow::Result<String> {
        let args = IntersectArgs::parse(args)?;
        let output = validate_name(args.output.as_deref().unwrap_or(INTERSECTION_OUTPUT))?;

        let first = layers.resolve(args.first.trim()).await?;
        let second = layers.resolve(args.second.trim()).await?;
        let result = gis::intersect(&first, &second, &output)?;
        let count = result.len();
        let area = result.total_area();
        layers.register(result).await;

        if count == 0 {
            return Ok(format!(
                "Layer '{}' created successfully but it is empty: no features of '{}' overlap '{}'.",
                output, first.name, second.name
            ));
        }

        let mut message = format!(
            "Layer '{}' created successfully: {} overlapping features between '{}' and '{}'",
            output, count, first.name, second.name
        );
        if area > 0.0 {
            message.push_str(&format!(" (total area {:.2})", area));
        }
        message.push('.');
        Ok(message)
    }
}
