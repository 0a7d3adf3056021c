//! GeoJSON reading and writing for layers.

use geo::Geometry;
use geojson::{FeatureCollection, GeoJson, JsonObject};
use serde_json::Value;

use super::{validate_name, Feature, Layer, LayerError};

impl Layer {
    /// Parse a GeoJSON document into a layer.
    ///
    /// Accepts a FeatureCollection, a single Feature, or a bare Geometry.
    pub fn from_geojson(name: &str, bytes: &[u8]) -> Result<Self, LayerError> {
        let name = validate_name(name)?;
        let text = std::str::from_utf8(bytes)
            .map_err(|e| LayerError::Parse(format!("input is not UTF-8: {}", e)))?;
        let geojson: GeoJson = text
            .parse()
            .map_err(|e: geojson::Error| LayerError::Parse(e.to_string()))?;

        let (features, crs) = match geojson {
            GeoJson::FeatureCollection(collection) => {
                let crs = collection.foreign_members.as_ref().and_then(crs_name);
                (collection.features, crs)
            }
            GeoJson::Feature(feature) => (vec![feature], None),
            GeoJson::Geometry(geometry) => (vec![geojson::Feature::from(geometry)], None),
        };

        let features = features
            .into_iter()
            .enumerate()
            .map(|(index, feature)| convert_feature(index, feature))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "Parsed layer '{}' with {} features (crs: {:?})",
            name,
            features.len(),
            crs
        );

        Ok(Layer::new(name, features, crs))
    }

    /// Write the layer out as a GeoJSON FeatureCollection.
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let features = self
            .features
            .iter()
            .map(|feature| geojson::Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(
                    &feature.geometry,
                ))),
                id: None,
                properties: Some(feature.properties.clone()),
                foreign_members: None,
            })
            .collect();

        let foreign_members = self.crs.as_ref().map(|name| {
            let mut members = JsonObject::new();
            members.insert(
                "crs".to_string(),
                serde_json::json!({"type": "name", "properties": {"name": name}}),
            );
            members
        });

        FeatureCollection {
            bbox: None,
            features,
            foreign_members,
        }
    }
}

fn convert_feature(index: usize, feature: geojson::Feature) -> Result<Feature, LayerError> {
    let geometry = feature
        .geometry
        .ok_or(LayerError::MissingGeometry { index })?;
    let geometry = Geometry::<f64>::try_from(geometry)
        .map_err(|e| LayerError::Parse(format!("feature {}: {}", index, e)))?;
    Ok(Feature::new(geometry, feature.properties.unwrap_or_default()))
}

/// Extract `crs.properties.name` from the legacy (pre-RFC 7946) member.
fn crs_name(members: &JsonObject) -> Option<String> {
    members
        .get("crs")?
        .get("properties")?
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
}
