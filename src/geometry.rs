//! The capability boundary over the two input geometries: enumerating rings
//! and their vertices, and (opaquely, from this crate's point of view)
//! transforming coordinates into a robust comparison space.
//!
//! Polygon / MultiPolygon / Ring / LineString / Rect share the "enumerate
//! rings and their vertices" capability. Rather than five separate trait
//! impls threaded through every algorithm, we model them as one small tagged
//! variant with a visitor that produces `(ring_id, vertices)` pairs; the
//! sectionalizer and bucketizer need nothing else.

use crate::ids::RingId;
use geo_types::{Coord, CoordFloat, LineString, MultiPolygon, Polygon, Rect};

/// One of the geometry shapes the overlay core can decompose into rings.
#[derive(Debug, Clone)]
pub enum GeometryInput<F: CoordFloat> {
    Polygon(Polygon<F>),
    MultiPolygon(MultiPolygon<F>),
    LineString(LineString<F>),
    Ring(LineString<F>),
    Rect(Rect<F>),
}

impl<F: CoordFloat> GeometryInput<F> {
    /// Enumerates this geometry's rings in ring-order, multi-index-order,
    /// and vertex-order, tagging each with a [`RingId`] rooted at
    /// `source_index`.
    pub fn rings(&self, source_index: u8) -> Vec<(RingId, Vec<Coord<F>>)> {
        match self {
            GeometryInput::Polygon(polygon) => polygon_rings(polygon, source_index, -1),
            GeometryInput::MultiPolygon(multi) => multi
                .0
                .iter()
                .enumerate()
                .flat_map(|(multi_index, polygon)| {
                    polygon_rings(polygon, source_index, multi_index as i32)
                })
                .collect(),
            GeometryInput::LineString(ls) | GeometryInput::Ring(ls) => {
                vec![(RingId::new(source_index, -1, -1), ls.0.clone())]
            }
            GeometryInput::Rect(rect) => {
                let min = rect.min();
                let max = rect.max();
                // Synthesized closed 5-point ring: ll -> ul -> ur -> lr -> ll.
                let coords = vec![
                    min,
                    Coord { x: min.x, y: max.y },
                    max,
                    Coord { x: max.x, y: min.y },
                    min,
                ];
                vec![(RingId::new(source_index, -1, -1), coords)]
            }
        }
    }
}

fn polygon_rings<F: CoordFloat>(
    polygon: &Polygon<F>,
    source_index: u8,
    multi_index: i32,
) -> Vec<(RingId, Vec<Coord<F>>)> {
    let mut out = Vec::with_capacity(1 + polygon.interiors().len());
    out.push((
        RingId::new(source_index, multi_index, -1),
        polygon.exterior().0.clone(),
    ));
    for (ring_index, interior) in polygon.interiors().iter().enumerate() {
        out.push((
            RingId::new(source_index, multi_index, ring_index as i32),
            interior.0.clone(),
        ));
    }
    out
}

/// Converts geometry points into a robust coordinate space used by the side
/// sorter. For this crate the policy is otherwise opaque: it is supplied by
/// the caller (typically the same rescaling policy used by the upstream
/// segment-intersection stage) and we only ever call `transform`.
pub trait RobustPolicy<F: CoordFloat> {
    fn transform(&self, coord: Coord<F>) -> Coord<F>;
}

/// The default policy: no rescaling. Suitable whenever the input coordinates
/// are already well-conditioned (e.g. in tests, or integer-derived doubles).
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityRobustPolicy;

impl<F: CoordFloat> RobustPolicy<F> for IdentityRobustPolicy {
    fn transform(&self, coord: Coord<F>) -> Coord<F> {
        coord
    }
}
