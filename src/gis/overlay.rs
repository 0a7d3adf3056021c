use geo::{
    Area, BooleanOps, BoundingRect, Geometry, Intersects, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Point, Rect,
};

use super::{as_multi_polygon, simplify_multi, GisError};
use crate::layers::{geometry_type, Feature, Layer, Properties};

/// Pairwise intersection of two layers.
///
/// Every pair of features with a non-empty overlap yields one output feature
/// carrying the attributes of both inputs. Keys present on both sides get
/// `_1` / `_2` suffixes.
///
/// Results keep the geometry dimension of `first`: points stay the points
/// that touch the other feature, lines are clipped to the other feature's
/// polygons and polygons keep the shared area. Pairs whose overlap has a
/// lower dimension than `first` (a polygon touching a point) are dropped.
pub fn intersect(first: &Layer, second: &Layer, output_name: &str) -> Result<Layer, GisError> {
    let left = shapes(first)?;
    let right = shapes(second)?;

    if first.crs != second.crs {
        tracing::warn!(
            "CRS mismatch in intersection: '{}' is {:?}, '{}' is {:?}",
            first.name,
            first.crs,
            second.name,
            second.crs
        );
    }

    let mut features = Vec::new();
    for (a, (a_shape, a_bounds)) in first.features.iter().zip(&left) {
        for (b, (b_shape, b_bounds)) in second.features.iter().zip(&right) {
            let (Some(a_bounds), Some(b_bounds)) = (a_bounds, b_bounds) else {
                continue;
            };
            if !a_bounds.intersects(b_bounds) {
                continue;
            }

            if let Some(geometry) = overlap(a_shape, b_shape) {
                features.push(Feature::new(
                    geometry,
                    merge_properties(&a.properties, &b.properties),
                ));
            }
        }
    }

    tracing::debug!(
        "Intersected '{}' x '{}' into '{}' ({} features)",
        first.name,
        second.name,
        output_name,
        features.len()
    );

    Ok(Layer::new(output_name, features, first.crs.clone()))
}

/// A feature's geometry grouped by dimension.
enum Shape {
    Points(MultiPoint<f64>),
    Lines(MultiLineString<f64>),
    Polygons(MultiPolygon<f64>),
}

impl Shape {
    fn classify(geometry: &Geometry<f64>) -> Option<Self> {
        if let Some(polygons) = as_multi_polygon(geometry) {
            return Some(Self::Polygons(polygons));
        }
        if let Some(points) = as_multi_point(geometry) {
            return Some(Self::Points(points));
        }
        as_multi_line_string(geometry).map(Self::Lines)
    }

    fn bounding_rect(&self) -> Option<Rect<f64>> {
        match self {
            Self::Points(points) => points.bounding_rect(),
            Self::Lines(lines) => lines.bounding_rect(),
            Self::Polygons(polygons) => polygons.bounding_rect(),
        }
    }

    fn touches_point(&self, point: &Point<f64>) -> bool {
        match self {
            Self::Points(points) => points.intersects(point),
            Self::Lines(lines) => lines.intersects(point),
            Self::Polygons(polygons) => polygons.intersects(point),
        }
    }
}

fn shapes(layer: &Layer) -> Result<Vec<(Shape, Option<Rect<f64>>)>, GisError> {
    layer
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            let shape = Shape::classify(&feature.geometry).ok_or_else(|| {
                GisError::IncompatibleGeometry {
                    layer: layer.name.clone(),
                    index,
                    kind: geometry_type(&feature.geometry),
                }
            })?;
            let bounds = shape.bounding_rect();
            Ok((shape, bounds))
        })
        .collect()
}

fn overlap(first: &Shape, second: &Shape) -> Option<Geometry<f64>> {
    match (first, second) {
        (Shape::Polygons(a), Shape::Polygons(b)) => {
            let shared = a.intersection(b);
            if shared.0.is_empty() || shared.unsigned_area() <= 0.0 {
                None
            } else {
                Some(simplify_multi(shared))
            }
        }
        (Shape::Points(a), other) => {
            let mut kept: Vec<Point<f64>> =
                a.iter().filter(|p| other.touches_point(p)).copied().collect();
            match kept.len() {
                0 => None,
                1 => Some(Geometry::Point(kept.remove(0))),
                _ => Some(Geometry::MultiPoint(MultiPoint::new(kept))),
            }
        }
        (Shape::Lines(a), Shape::Polygons(b)) => {
            let mut parts: Vec<LineString<f64>> = b
                .clip(a, false)
                .0
                .into_iter()
                .filter(|line| line.0.windows(2).any(|w| w[0] != w[1]))
                .collect();
            match parts.len() {
                0 => None,
                1 => Some(Geometry::LineString(parts.remove(0))),
                _ => Some(Geometry::MultiLineString(MultiLineString::new(parts))),
            }
        }
        _ => None,
    }
}

fn as_multi_point(geometry: &Geometry<f64>) -> Option<MultiPoint<f64>> {
    match geometry {
        Geometry::Point(p) => Some(MultiPoint::new(vec![*p])),
        Geometry::MultiPoint(mp) => Some(mp.clone()),
        Geometry::GeometryCollection(collection) => {
            let mut points = Vec::new();
            for member in collection.iter() {
                points.extend(as_multi_point(member)?.0);
            }
            Some(MultiPoint::new(points))
        }
        _ => None,
    }
}

fn as_multi_line_string(geometry: &Geometry<f64>) -> Option<MultiLineString<f64>> {
    match geometry {
        Geometry::Line(l) => Some(MultiLineString::new(vec![LineString::from(vec![
            l.start, l.end,
        ])])),
        Geometry::LineString(ls) => Some(MultiLineString::new(vec![ls.clone()])),
        Geometry::MultiLineString(mls) => Some(mls.clone()),
        Geometry::GeometryCollection(collection) => {
            let mut lines = Vec::new();
            for member in collection.iter() {
                lines.extend(as_multi_line_string(member)?.0);
            }
            Some(MultiLineString::new(lines))
        }
        _ => None,
    }
}

fn merge_properties(first: &Properties, second: &Properties) -> Properties {
    let mut merged = Properties::new();
    for (key, value) in first {
        if second.contains_key(key) {
            merged.insert(format!("{}_1", key), value.clone());
        } else {
            merged.insert(key.clone(), value.clone());
        }
    }
    for (key, value) in second {
        if first.contains_key(key) {
            merged.insert(format!("{}_2", key), value.clone());
        } else {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}
