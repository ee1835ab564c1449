//! Robust 2D orientation predicate, used by the side sorter to rank outgoing
//! directions around a cluster center.
//!
//! Converts to `f64` and delegates to the `robust` crate's adaptive-precision
//! `orient2d`, rather than a plain cross product, so that nearly-collinear
//! configurations (common at colocated turns) don't flip sign due to
//! floating point error.

use geo_types::{Coord, CoordFloat};
use num_traits::NumCast;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Clockwise,
    CounterClockwise,
    Collinear,
}

fn to_robust_coord<F: CoordFloat>(c: Coord<F>) -> robust::Coord<f64> {
    robust::Coord {
        x: <f64 as NumCast>::from(c.x).unwrap(),
        y: <f64 as NumCast>::from(c.y).unwrap(),
    }
}

/// Orientation of the turn `p -> q -> r`.
pub fn orient2d<F: CoordFloat>(p: Coord<F>, q: Coord<F>, r: Coord<F>) -> Orientation {
    let det = robust::orient2d(to_robust_coord(p), to_robust_coord(q), to_robust_coord(r));
    if det > 0. {
        Orientation::CounterClockwise
    } else if det < 0. {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}
