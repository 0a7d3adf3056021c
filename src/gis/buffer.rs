use geo::Buffer;

use super::{as_multi_polygon, simplify_multi, GisError};
use crate::layers::{Feature, Layer};

/// Expand every geometry in `layer` by `distance` layer units.
///
/// One output feature per input feature; attributes and CRS carry over. No
/// reprojection happens, so geographic (degree) layers buffer in degrees.
pub fn buffer(layer: &Layer, distance: f64, output_name: &str) -> Result<Layer, GisError> {
    if !distance.is_finite() {
        return Err(GisError::InvalidDistance(distance));
    }

    let features = layer
        .features
        .iter()
        .map(|feature| {
            // Zero-width buffers keep polygonal input untouched.
            let geometry = match (distance == 0.0, as_multi_polygon(&feature.geometry)) {
                (true, Some(_)) => feature.geometry.clone(),
                _ => simplify_multi(feature.geometry.buffer(distance)),
            };
            Feature::new(geometry, feature.properties.clone())
        })
        .collect();

    tracing::debug!(
        "Buffered '{}' by {} into '{}' ({} features)",
        layer.name,
        distance,
        output_name,
        layer.len()
    );

    Ok(Layer::new(output_name, features, layer.crs.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::Properties;
    use geo::{polygon, Area, BoundingRect, Geometry, Point};
    use serde_json::json;

    fn square_layer() -> Layer {
        let mut props = Properties::new();
        props.insert("name".to_string(), json!("Hillside Primary"));
        let square = polygon![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0), (x: 100.0, y: 100.0), (x: 0.0, y: 100.0)];
        Layer::new("school_zones", vec![Feature::new(square.into(), props)], None)
    }

    #[test]
    fn zero_distance_returns_input_geometry() {
        let layer = square_layer();
        let result = buffer(&layer, 0.0, "buffer_result").unwrap();
        assert_eq!(result.features, layer.features);
    }

    #[test]
    fn positive_distance_grows_each_geometry() {
        let layer = square_layer();
        let result = buffer(&layer, 50.0, "buffer_result").unwrap();

        assert_eq!(result.name, "buffer_result");
        assert_eq!(result.len(), 1);
        assert_eq!(result.features[0].properties, layer.features[0].properties);

        let area = result.features[0].geometry.unsigned_area();
        let exact = 100.0 * 100.0 + 4.0 * 100.0 * 50.0 + std::f64::consts::PI * 50.0 * 50.0;
        assert!(area > 100.0 * 100.0 + 4.0 * 100.0 * 50.0);
        assert!(area <= exact + 1e-3);

        let bounds = result.features[0].geometry.bounding_rect().unwrap();
        assert!((bounds.min().x + 50.0).abs() < 1e-3);
        assert!((bounds.max().y - 150.0).abs() < 1e-3);
    }

    #[test]
    fn points_become_polygons() {
        let layer = Layer::new(
            "schools",
            vec![Feature::new(Point::new(10.0, 10.0).into(), Properties::new())],
            None,
        );
        let result = buffer(&layer, 5.0, "buffer_result").unwrap();
        assert!(matches!(result.features[0].geometry, Geometry::Polygon(_)));
        assert!(result.features[0].geometry.unsigned_area() > 70.0);
    }

    #[test]
    fn non_finite_distance_is_rejected() {
        let err = buffer(&square_layer(), f64::NAN, "buffer_result").unwrap_err();
        assert!(matches!(err, GisError::InvalidDistance(_)));
    }
}
