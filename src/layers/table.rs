//! Tabular views of a layer for the UI and for tool observations.

use geo::Area;
use serde::Serialize;
use serde_json::Value;

use super::{geometry_type, Layer};

/// Short description of a layer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LayerInfo {
    pub name: String,
    pub feature_count: usize,
    /// Distinct geometry types, sorted
    pub geometry_types: Vec<String>,
    pub crs: Option<String>,
    pub columns: Vec<String>,
}

/// Row-oriented table of a layer: attribute columns, then `geometry` and `area`.
#[derive(Debug, Clone, Serialize)]
pub struct LayerTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Layer {
    pub fn info(&self) -> LayerInfo {
        let mut geometry_types: Vec<String> = self
            .features
            .iter()
            .map(|f| geometry_type(&f.geometry).to_string())
            .collect();
        geometry_types.sort();
        geometry_types.dedup();

        LayerInfo {
            name: self.name.clone(),
            feature_count: self.len(),
            geometry_types,
            crs: self.crs.clone(),
            columns: self.columns(),
        }
    }

    pub fn table(&self) -> LayerTable {
        let attributes = self.columns();
        let rows = self
            .features
            .iter()
            .map(|feature| {
                let mut row: Vec<Value> = attributes
                    .iter()
                    .map(|c| feature.properties.get(c).cloned().unwrap_or(Value::Null))
                    .collect();
                row.push(Value::from(geometry_type(&feature.geometry)));
                row.push(Value::from(feature.geometry.unsigned_area()));
                row
            })
            .collect();

        let mut columns = attributes;
        columns.push("geometry".to_string());
        columns.push("area".to_string());

        LayerTable {
            name: self.name.clone(),
            columns,
            rows,
        }
    }
}

impl std::fmt::Display for LayerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} features, geometry [{}], crs {}, columns [{}]",
            self.name,
            self.feature_count,
            self.geometry_types.join(", "),
            self.crs.as_deref().unwrap_or("unknown"),
            self.columns.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{Feature, Properties};
    use geo::{polygon, Point};
    use serde_json::json;

    #[test]
    fn table_fills_missing_attributes_with_null() {
        let mut named = Properties::new();
        named.insert("name".to_string(), json!("Hillside"));
        let square = polygon![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0), (x: 2.0, y: 2.0), (x: 0.0, y: 2.0)];
        let layer = Layer::new(
            "school_zones",
            vec![
                Feature::new(square.into(), named),
                Feature::new(Point::new(5.0, 5.0).into(), Properties::new()),
            ],
            None,
        );

        let table = layer.table();
        assert_eq!(table.columns, vec!["name", "geometry", "area"]);
        assert_eq!(table.rows[0], vec![json!("Hillside"), json!("Polygon"), json!(4.0)]);
        assert_eq!(table.rows[1], vec![Value::Null, json!("Point"), json!(0.0)]);
    }

    #[test]
    fn info_lists_distinct_geometry_types() {
        let layer = Layer::new(
            "points",
            vec![
                Feature::new(Point::new(0.0, 0.0).into(), Properties::new()),
                Feature::new(Point::new(1.0, 0.0).into(), Properties::new()),
            ],
            Some("EPSG:4326".to_string()),
        );
        let info = layer.info();
        assert_eq!(info.feature_count, 2);
        assert_eq!(info.geometry_types, vec!["Point"]);
        assert!(info.to_string().contains("EPSG:4326"));
    }
}
