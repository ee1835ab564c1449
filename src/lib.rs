//! Turn enrichment core for a 2D polygon overlay engine.
//!
//! This crate picks up after segment-vs-segment intersection has already
//! produced a flat list of [`turn::Turn`]s and turns it into a directed
//! graph a ring-traversal stage can walk: turns that share a location are
//! clustered and the redundant ones discarded ([`cluster`]), the survivors
//! are grouped per ring ([`bucketize`]), and each ring's operations are
//! sorted and wired up with successor links ([`enrich`]). [`section`]
//! (sectionalization) is independent of the above and is typically run
//! earlier, to narrow down which segment pairs are worth intersecting in
//! the first place.
//!
//! Segment-vs-segment intersection and the ring traversal that actually
//! emits output geometry are out of scope here; see each module's docs for
//! the shape of data this crate expects to receive and to hand off.

pub mod bucketize;
pub mod cluster;
pub mod enrich;
pub mod geometry;
pub mod ids;
pub mod orientation;
pub mod ratio;
pub mod section;
pub mod side;
pub mod turn;

pub use bucketize::{create_map, discard_lonely_uu, IndexedOperation, OverlayOp};
pub use cluster::{handle_colocations, ClusterId, Clusters};
pub use enrich::assign_successors;
pub use geometry::{GeometryInput, IdentityRobustPolicy, RobustPolicy};
pub use ids::{RingId, SegmentId};
pub use orientation::{orient2d, Orientation};
pub use ratio::{SegmentFractionKey, SegmentRatio};
pub use section::{sectionalize, Section};
pub use side::{sort_sides, Leg, RankedLeg};
pub use turn::{Enriched, Operation, Turn, TurnMethod, TurnOperation};

use cluster::RingLookup;
use geo_types::CoordFloat;
use std::collections::BTreeMap;

/// Runs the full enrichment pipeline over `turns`: discards turns whose
/// [`TurnMethod`] is `None`, detects and resolves colocations ([`cluster`]),
/// buckets the survivors per ring ([`bucketize`]), discards lonely `uu`
/// turns left stranded by that resolution, then sorts and wires successor
/// links ring by ring ([`enrich`]).
///
/// `geometry1`/`geometry2` must be the same geometries `turns` was produced
/// against. `reverse1`/`reverse2` flip the effective winding direction of
/// either input for the angular sorts used throughout. Any coordinate
/// rescaling a [`RobustPolicy`] performs is expected to have already been
/// applied to `turns` and the two geometries by the caller — this function
/// only consumes already-comparable coordinates.
#[allow(clippy::too_many_arguments)]
pub fn enrich_intersection_points<F: CoordFloat>(
    turns: &mut Vec<Turn<F>>,
    clusters: &mut Clusters,
    for_operation: OverlayOp,
    geometry1: &GeometryInput<F>,
    geometry2: &GeometryInput<F>,
    reverse1: bool,
    reverse2: bool,
) {
    for turn in turns.iter_mut() {
        if turn.both(Operation::None) {
            turn.discarded = true;
        }
    }

    let mut colocated_cc_map: BTreeMap<RingId, usize> = BTreeMap::new();
    cluster::handle_colocations(
        turns,
        clusters,
        &mut colocated_cc_map,
        for_operation,
        geometry1,
        geometry2,
        reverse1,
        reverse2,
    );

    let mut map = bucketize::create_map(turns, for_operation);
    bucketize::discard_lonely_uu(turns, &mut map, &colocated_cc_map);

    let lookup = RingLookup::build(geometry1, geometry2);
    for ops in map.values_mut() {
        enrich::sort_ring_operations(turns, ops, &lookup, reverse1, reverse2);
    }
    for ops in map.values() {
        enrich::assign_successors(turns, ops);
    }
}
