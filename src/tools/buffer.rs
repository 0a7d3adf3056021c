//! Buffer tool.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::args::{self, ArgumentError};
use super::Tool;
use crate::gis;
use crate::layers::{validate_name, LayerRegistry};

/// Layer name a buffer writes to unless the call names another.
pub const BUFFER_OUTPUT: &str = "buffer_result";

#[derive(Debug, Deserialize)]
struct BufferArgs {
    layer: String,
    #[serde(deserialize_with = "args::number_or_string")]
    distance: f64,
    #[serde(default)]
    output: Option<String>,
}

impl BufferArgs {
    fn parse(value: Value) -> Result<Self, ArgumentError> {
        if let Some(input) = args::string_form(&value) {
            let parts = args::split_positional(input, 2, "layer,distance")?;
            return Ok(Self {
                layer: parts[0].to_string(),
                distance: args::parse_number("distance", parts[1])?,
                output: None,
            });
        }
        args::from_object("buffer_layer", value)
    }
}

/// Buffer every geometry of a layer by a distance.
pub struct BufferLayer;

#[async_trait]
impl Tool for BufferLayer {
    fn name(&self) -> &str {
        "buffer_layer"
    }

    fn description(&self) -> &str {
        "Buffer every geometry in a layer outward by a distance, in the layer's own coordinate units (metres for projected layers). The result is stored as a new layer, 'buffer_result' unless 'output' is given."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "layer": {
                    "type": "string",
                    "description": "Name of the layer to buffer"
                },
                "distance": {
                    "type": "number",
                    "description": "Buffer distance in layer units"
                },
                "output": {
                    "type": "string",
                    "description": "Optional name for the result layer (default: buffer_result)"
                }
            },
            "required": ["layer", "distance"]
        })
    }

    async fn execute(&self, args: Value, layers: &LayerRegistry) -> anyhow::Result<String> {
        let args = BufferArgs::parse(args)?;
        let output = validate_name(args.output.as_deref().unwrap_or(BUFFER_OUTPUT))?;

        let source = layers.resolve(args.layer.trim()).await?;
        let result = gis::buffer(&source, args.distance, &output)?;
        let count = result.len();
        let area = result.total_area();
        layers.register(result).await;

        Ok(format!(
            "Layer '{}' created successfully: {} buffered features from '{}' (distance {}, total area {:.2}).",
            output, count, source.name, args.distance, area
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{Feature, Layer, LayerError, Properties};
    use geo::{polygon, Area};

    async fn registry_with_schools() -> LayerRegistry {
        let registry = LayerRegistry::new();
        let first = polygon![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0), (x: 100.0, y: 100.0), (x: 0.0, y: 100.0)];
        let second = polygon![(x: 1000.0, y: 0.0), (x: 1100.0, y: 0.0), (x: 1100.0, y: 100.0), (x: 1000.0, y: 100.0)];
        registry
            .register(Layer::new(
                "school_zones",
                vec![
                    Feature::new(first.into(), Properties::new()),
                    Feature::new(second.into(), Properties::new()),
                ],
                None,
            ))
            .await;
        registry
    }

    #[tokio::test]
    async fn string_form_buffers_into_fixed_output() {
        let registry = registry_with_schools().await;
        let message = BufferLayer
            .execute(json!("school_zones,500"), &registry)
            .await
            .unwrap();
        assert!(message.contains("buffer_result"));

        let source = registry.resolve("school_zones").await.unwrap();
        let result = registry.resolve(BUFFER_OUTPUT).await.unwrap();
        assert_eq!(result.len(), source.len());
        for (buffered, original) in result.features.iter().zip(&source.features) {
            let grown = buffered.geometry.unsigned_area() - original.geometry.unsigned_area();
            // Four 100x500 strips plus (approximated) quarter circles of radius 500.
            assert!(grown > 4.0 * 100.0 * 500.0);
        }
    }

    #[tokio::test]
    async fn structured_arguments_with_custom_output() {
        let registry = registry_with_schools().await;
        BufferLayer
            .execute(
                json!({"layer": "school_zones", "distance": "250", "output": "school_buffers"}),
                &registry,
            )
            .await
            .unwrap();
        assert!(registry.contains("school_buffers").await);
        assert!(!registry.contains(BUFFER_OUTPUT).await);
    }

    #[tokio::test]
    async fn second_call_overwrites_fixed_output() {
        let registry = registry_with_schools().await;
        BufferLayer.execute(json!("school_zones,500"), &registry).await.unwrap();
        let first_area = registry.resolve(BUFFER_OUTPUT).await.unwrap().total_area();
        BufferLayer.execute(json!("school_zones,10"), &registry).await.unwrap();
        let second_area = registry.resolve(BUFFER_OUTPUT).await.unwrap().total_area();
        assert!(second_area < first_area);
    }

    #[tokio::test]
    async fn non_numeric_distance_fails() {
        let registry = registry_with_schools().await;
        let err = BufferLayer
            .execute(json!("school_zones,far"), &registry)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ArgumentError>(),
            Some(ArgumentError::NotANumber { field: "distance", .. })
        ));
    }

    #[tokio::test]
    async fn missing_layer_lists_known_layers() {
        let registry = registry_with_schools().await;
        let err = BufferLayer
            .execute(json!("schools,500"), &registry)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LayerError>(),
            Some(LayerError::NotFound { .. })
        ));
        assert!(err.to_string().contains("school_zones"));
    }
}
