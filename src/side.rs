//! Angular ordering of outgoing directions around a shared center point.
//!
//! Used both by the colocation handler's right-turn test and by the
//! enricher's same-fraction tie-break. Ties (collinear directions) receive
//! the same `main_rank`; everything else is strictly ordered going
//! counterclockwise starting from the positive x-axis's quadrant.

use crate::orientation::{orient2d, Orientation};
use geo_types::{Coord, CoordFloat};

/// Quadrant of the cartesian plane a direction vector falls in, used as the
/// first (cheap) sort key before falling back to the exact orientation
/// predicate for vectors in the same quadrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Quadrant {
    NE,
    NW,
    SW,
    SE,
}

impl Quadrant {
    fn new<F: CoordFloat>(dx: F, dy: F) -> Option<Quadrant> {
        if dx.is_zero() && dy.is_zero() {
            return None;
        }
        Some(match (dy >= F::zero(), dx >= F::zero()) {
            (true, true) => Quadrant::NE,
            (true, false) => Quadrant::NW,
            (false, false) => Quadrant::SW,
            (false, true) => Quadrant::SE,
        })
    }
}

/// One outgoing direction to rank: a leg of a turn, pointing from a shared
/// center toward `to`.
#[derive(Debug, Clone, Copy)]
pub struct Leg<F: CoordFloat> {
    pub turn_index: usize,
    pub operation_index: usize,
    pub source_index: u8,
    pub to: Coord<F>,
    /// The "subject" leg is the one the right-turn test ranks others
    /// relative to; unused by the ordering itself but carried through so
    /// callers can find their subject leg's rank afterward.
    pub is_subject: bool,
}

/// A [`Leg`] after ranking.
#[derive(Debug, Clone, Copy)]
pub struct RankedLeg<F: CoordFloat> {
    pub turn_index: usize,
    pub operation_index: usize,
    pub source_index: u8,
    pub is_subject: bool,
    pub to: Coord<F>,
    /// 1-based rank; ties (exactly collinear, same-ray directions) share a
    /// rank.
    pub main_rank: usize,
}

/// Reflects `to` through `center`, approximating "travel the other way
/// around the ring" for a source whose ring orientation is reversed,
/// without needing to re-derive the direction from the original geometry.
fn effective_to<F: CoordFloat>(center: Coord<F>, to: Coord<F>, reversed: bool) -> Coord<F> {
    if reversed {
        Coord {
            x: center.x + center.x - to.x,
            y: center.y + center.y - to.y,
        }
    } else {
        to
    }
}

fn compare_directions<F: CoordFloat>(
    center: Coord<F>,
    a: Coord<F>,
    b: Coord<F>,
) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    let qa = Quadrant::new(a.x - center.x, a.y - center.y);
    let qb = Quadrant::new(b.x - center.x, b.y - center.y);

    match (qa, qb) {
        (Some(qa), Some(qb)) if qa != qb => qa.cmp(&qb),
        _ => match orient2d(center, b, a) {
            Orientation::Clockwise => Ordering::Less,
            Orientation::CounterClockwise => Ordering::Greater,
            Orientation::Collinear => Ordering::Equal,
        },
    }
}

/// Sorts `legs` angularly around `center` and assigns `main_rank`.
/// `reverse1`/`reverse2` flip the effective direction of legs whose
/// `source_index` is 0 or 1 respectively, modeling a ring whose winding
/// order is reversed relative to the other input.
pub fn sort_sides<F: CoordFloat>(
    center: Coord<F>,
    legs: Vec<Leg<F>>,
    reverse1: bool,
    reverse2: bool,
) -> Vec<RankedLeg<F>> {
    let mut ranked: Vec<RankedLeg<F>> = legs
        .into_iter()
        .map(|leg| {
            let reversed = (leg.source_index == 0 && reverse1) || (leg.source_index == 1 && reverse2);
            RankedLeg {
                turn_index: leg.turn_index,
                operation_index: leg.operation_index,
                source_index: leg.source_index,
                is_subject: leg.is_subject,
                to: effective_to(center, leg.to, reversed),
                main_rank: 0,
            }
        })
        .collect();

    ranked.sort_by(|a, b| compare_directions(center, a.to, b.to));

    let mut rank = 0usize;
    let mut previous: Option<Coord<F>> = None;
    for leg in ranked.iter_mut() {
        let bump = match previous {
            None => true,
            Some(prev) => compare_directions(center, prev, leg.to) != std::cmp::Ordering::Equal,
        };
        if bump {
            rank += 1;
        }
        leg.main_rank = rank;
        previous = Some(leg.to);
    }

    ranked
}
