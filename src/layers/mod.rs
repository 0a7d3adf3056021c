//! Named vector layers and the session-scoped registry that holds them.
//!
//! A [`Layer`] is an ordered list of features (geometry plus a JSON attribute
//! object) with an optional CRS name. Layers enter a [`LayerRegistry`] either
//! from an upload or as the output of a GIS operation, and every tool resolves
//! its inputs from the registry by name.

mod io;
mod registry;
mod table;

use geo::{Area, Geometry};
use serde_json::{Map, Value};
use thiserror::Error;

pub use registry::LayerRegistry;
pub use table::{LayerInfo, LayerTable};

/// Attribute object attached to a feature.
pub type Properties = Map<String, Value>;

#[derive(Debug, Error)]
pub enum LayerError {
    #[error("Layer '{name}' not found. Available: {available:?}")]
    NotFound { name: String, available: Vec<String> },

    #[error("Invalid layer name {0:?}: names must be non-empty and must not contain commas")]
    InvalidName(String),

    #[error("Failed to parse GeoJSON: {0}")]
    Parse(String),

    #[error("Feature {index} has no geometry")]
    MissingGeometry { index: usize },
}

/// A single vector feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Geometry<f64>,
    pub properties: Properties,
}

impl Feature {
    pub fn new(geometry: Geometry<f64>, properties: Properties) -> Self {
        Self {
            geometry,
            properties,
        }
    }
}

/// A named vector dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub features: Vec<Feature>,
    /// CRS name from the legacy GeoJSON `crs` member, when the source had one.
    pub crs: Option<String>,
}

impl Layer {
    pub fn new(name: impl Into<String>, features: Vec<Feature>, crs: Option<String>) -> Self {
        Self {
            name: name.into(),
            features,
            crs,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Attribute column names in first-seen order across all features.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for feature in &self.features {
            for key in feature.properties.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        columns
    }

    /// Sum of the planar areas of all geometries, in squared layer units.
    pub fn total_area(&self) -> f64 {
        self.features
            .iter()
            .map(|f| f.geometry.unsigned_area())
            .sum()
    }
}

/// Validate a layer name. Commas are reserved for positional tool arguments.
pub fn validate_name(name: &str) -> Result<String, LayerError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.contains(',') {
        return Err(LayerError::InvalidName(name.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Human-readable geometry type, matching the GeoJSON vocabulary where one exists.
pub fn geometry_type(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}
