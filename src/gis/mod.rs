//! Vector GIS operations over registry layers.
//!
//! These are thin wrappers around the `geo` crate: buffering, overlay
//! and a descriptive-statistics summary. Each returns a new value and leaves
//! registration to the caller.

mod buffer;
mod describe;
mod overlay;

use geo::{Geometry, MultiPolygon, Polygon};
use thiserror::Error;

pub use buffer::buffer;
pub use describe::{summarize, DescribeTable, Stat, StatRow};
pub use overlay::intersect;

#[derive(Debug, Error)]
pub enum GisError {
    #[error("Buffer distance must be a finite number, got {0}")]
    InvalidDistance(f64),

    #[error("Layer '{layer}' feature {index} has {kind} geometry mixing dimensions, which intersection does not support")]
    IncompatibleGeometry {
        layer: String,
        index: usize,
        kind: &'static str,
    },
}

/// View a geometry as a multipolygon, if it is polygonal.
pub(crate) fn as_multi_polygon(geometry: &Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p.clone()])),
        Geometry::MultiPolygon(mp) => Some(mp.clone()),
        Geometry::Rect(r) => Some(MultiPolygon::new(vec![r.to_polygon()])),
        Geometry::Triangle(t) => Some(MultiPolygon::new(vec![t.to_polygon()])),
        Geometry::GeometryCollection(collection) => {
            let mut polygons: Vec<Polygon<f64>> = Vec::new();
            for member in collection.iter() {
                polygons.extend(as_multi_polygon(member)?.0);
            }
            Some(MultiPolygon::new(polygons))
        }
        _ => None,
    }
}

/// Collapse a single-member multipolygon back to a plain polygon.
pub(crate) fn simplify_multi(mut multi: MultiPolygon<f64>) -> Geometry<f64> {
    if multi.0.len() == 1 {
        Geometry::Polygon(multi.0.remove(0))
    } else {
        Geometry::MultiPolygon(multi)
    }
}
