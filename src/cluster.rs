//! Detection and clustering of turns that share a geometric location
//! ("colocations"), with policy-driven discarding of redundant or invalid
//! turns.
//!
//! This is the hardest part of the crate: tie-breaks for degenerate
//! (colocated / collinear / tangent) configurations have to be total orders,
//! and two turns found to be colocated via *different* segments must end up
//! in the same cluster. That merge is resolved with a union-find over
//! cluster ids (see DESIGN.md) rather than arbitrarily picking one side.

use crate::bucketize::OverlayOp;
use crate::geometry::GeometryInput;
use crate::ids::{RingId, SegmentId};
use crate::ratio::{SegmentFractionKey, SegmentRatio};
use crate::side::{sort_sides, Leg};
use crate::turn::{Operation, Turn};
use geo_types::{Coord, CoordFloat};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

pub type ClusterId = usize;
pub type Clusters = BTreeMap<ClusterId, BTreeSet<usize>>;

#[derive(Debug, Clone, Copy)]
struct TurnOperationIndex {
    turn_index: usize,
    op_index: usize,
}

/// Total order used to sort the turns occupying a single segment: first by
/// fraction, then `xx` before anything else (so it can pre-empt colocated
/// followers), then `uu` before anything else, then by the *other*
/// operation's segment id (exterior rings before interiors).
fn less_by_fraction_and_type<F: CoordFloat>(
    turns: &[Turn<F>],
    left: TurnOperationIndex,
    right: TurnOperationIndex,
) -> Ordering {
    let left_turn = &turns[left.turn_index];
    let right_turn = &turns[right.turn_index];
    let left_op = &left_turn.operations[left.op_index];
    let right_op = &right_turn.operations[right.op_index];

    let by_fraction = left_op.fraction.cmp(&right_op.fraction);
    if by_fraction != Ordering::Equal {
        return by_fraction;
    }

    let left_xx = left_turn.both(Operation::Blocked);
    let right_xx = right_turn.both(Operation::Blocked);
    if left_xx != right_xx {
        return if left_xx { Ordering::Less } else { Ordering::Greater };
    }

    let left_uu = left_turn.both(Operation::Union);
    let right_uu = right_turn.both(Operation::Union);
    if left_uu != right_uu {
        return if left_uu { Ordering::Less } else { Ordering::Greater };
    }

    let left_other = &left_turn.operations[1 - left.op_index];
    let right_other = &right_turn.operations[1 - right.op_index];
    left_other.seg_id.cmp(&right_other.seg_id)
}

/// Disjoint-set forest over cluster ids, used to merge two clusters that
/// turn out to be the same colocation discovered via different segments.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new() -> Self {
        UnionFind { parent: Vec::new() }
    }

    fn make_set(&mut self) -> usize {
        let id = self.parent.len();
        self.parent.push(id);
        id
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            let root = self.find(self.parent[x]);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    /// Unions the sets containing `a` and `b`, returning the surviving root.
    fn union(&mut self, a: usize, b: usize) -> usize {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return ra;
        }
        self.parent[rb] = ra;
        ra
    }
}

/// Per-ring vertex table used to find the vertex a turn operation is heading
/// toward, needed by the right-turn test's angular sort. Also reused by
/// [`crate::enrich`]'s same-fraction tie-break, which needs the same
/// "what direction does this operation travel" lookup.
pub(crate) struct RingLookup<F: CoordFloat> {
    rings: [BTreeMap<RingId, Vec<Coord<F>>>; 2],
}

impl<F: CoordFloat> RingLookup<F> {
    pub(crate) fn build(geometry1: &GeometryInput<F>, geometry2: &GeometryInput<F>) -> Self {
        RingLookup {
            rings: [
                geometry1.rings(0).into_iter().collect(),
                geometry2.rings(1).into_iter().collect(),
            ],
        }
    }

    /// The vertex this segment travels toward (its end point).
    pub(crate) fn endpoint(&self, seg_id: SegmentId) -> Coord<F> {
        let ring = &self.rings[seg_id.source_index as usize][&seg_id.ring_id()];
        ring[seg_id.segment_index + 1]
    }
}

/// The right-turn test: at a shared cluster point, sort the three relevant
/// outgoing directions (ref's two operations, plus the follower's
/// non-shared operation) angularly. If every direction ranked first
/// (`main_rank == 1`) originates from the same source as `ref`'s subject
/// operation, the follower is dominated and may be discarded.
fn follower_is_dominated<F: CoordFloat>(
    turns: &[Turn<F>],
    ref_toi: TurnOperationIndex,
    toi: TurnOperationIndex,
    lookup: &RingLookup<F>,
    reverse1: bool,
    reverse2: bool,
) -> bool {
    let ref_turn = &turns[ref_toi.turn_index];
    let turn = &turns[toi.turn_index];
    debug_assert!(ref_turn.both(Operation::Union));

    let ref_subject = &ref_turn.operations[ref_toi.op_index];
    let ref_other = &ref_turn.operations[1 - ref_toi.op_index];
    let other_other = &turn.operations[1 - toi.op_index];
    debug_assert_eq!(ref_subject.seg_id, turn.operations[toi.op_index].seg_id);

    let legs = vec![
        Leg {
            turn_index: ref_toi.turn_index,
            operation_index: ref_toi.op_index,
            source_index: ref_subject.seg_id.source_index,
            to: lookup.endpoint(ref_subject.seg_id),
            is_subject: true,
        },
        Leg {
            turn_index: ref_toi.turn_index,
            operation_index: 1 - ref_toi.op_index,
            source_index: ref_other.seg_id.source_index,
            to: lookup.endpoint(ref_other.seg_id),
            is_subject: false,
        },
        Leg {
            turn_index: toi.turn_index,
            operation_index: 1 - toi.op_index,
            source_index: other_other.seg_id.source_index,
            to: lookup.endpoint(other_other.seg_id),
            is_subject: false,
        },
    ];

    let ranked = sort_sides(ref_turn.point, legs, reverse1, reverse2);
    let source_index = ref_subject.seg_id.source_index;

    for ranked_leg in &ranked {
        if ranked_leg.main_rank > 1 {
            break;
        }
        if ranked_leg.source_index != source_index {
            // Another source's direction is tied for most-right: not
            // dominated, keep both turns.
            return false;
        }
    }
    true
}

fn get_cluster(
    cluster_per_segment: &BTreeMap<SegmentFractionKey, usize>,
    seg_id: SegmentId,
    fraction: SegmentRatio,
) -> Option<usize> {
    cluster_per_segment
        .get(&SegmentFractionKey::new(seg_id, fraction))
        .copied()
}

fn set_cluster(
    cluster_per_segment: &mut BTreeMap<SegmentFractionKey, usize>,
    seg_id: SegmentId,
    fraction: SegmentRatio,
    id: usize,
) {
    cluster_per_segment.insert(SegmentFractionKey::new(seg_id, fraction), id);
}

/// Ensures both of `turn`'s operations are registered under the same
/// union-find set, creating or merging sets as needed, and returns that
/// set's id.
fn add_turn_to_cluster<F: CoordFloat>(
    turn: &Turn<F>,
    cluster_per_segment: &mut BTreeMap<SegmentFractionKey, usize>,
    uf: &mut UnionFind,
) -> usize {
    let op0 = &turn.operations[0];
    let op1 = &turn.operations[1];
    let id0 = get_cluster(cluster_per_segment, op0.seg_id, op0.fraction);
    let id1 = get_cluster(cluster_per_segment, op1.seg_id, op1.fraction);

    match (id0, id1) {
        (None, None) => {
            let id = uf.make_set();
            set_cluster(cluster_per_segment, op0.seg_id, op0.fraction, id);
            set_cluster(cluster_per_segment, op1.seg_id, op1.fraction, id);
            id
        }
        (None, Some(id1)) => {
            set_cluster(cluster_per_segment, op0.seg_id, op0.fraction, id1);
            id1
        }
        (Some(id0), None) => {
            set_cluster(cluster_per_segment, op1.seg_id, op1.fraction, id0);
            id0
        }
        (Some(id0), Some(id1)) => {
            let merged = uf.union(id0, id1);
            set_cluster(cluster_per_segment, op0.seg_id, op0.fraction, merged);
            set_cluster(cluster_per_segment, op1.seg_id, op1.fraction, merged);
            merged
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_colocation_cluster<F: CoordFloat>(
    turns: &mut [Turn<F>],
    uf: &mut UnionFind,
    cluster_per_segment: &mut BTreeMap<SegmentFractionKey, usize>,
    colocated_cc_map: &mut BTreeMap<RingId, usize>,
    operations: &[TurnOperationIndex],
    for_operation: OverlayOp,
    lookup: &RingLookup<F>,
    reverse1: bool,
    reverse2: bool,
) {
    let mut iter = operations.iter().copied();
    let mut ref_toi = match iter.next() {
        Some(first) => first,
        None => return,
    };
    let mut ref_id: Option<usize> = None;

    for toi in iter {
        let ref_op = turns[ref_toi.turn_index].operations[ref_toi.op_index];
        let op = turns[toi.turn_index].operations[toi.op_index];
        debug_assert_eq!(ref_op.seg_id, op.seg_id);

        if ref_op.fraction != op.fraction {
            ref_toi = toi;
            ref_id = None;
            continue;
        }

        let ref_other = turns[ref_toi.turn_index].operations[1 - ref_toi.op_index];
        let other = turns[toi.turn_index].operations[1 - toi.op_index];

        if ref_id.is_none() {
            ref_id = Some(add_turn_to_cluster(&turns[ref_toi.turn_index], cluster_per_segment, uf));
        }
        let id = ref_id.expect("just assigned");

        // ref_turn's both operations, and `op`, are already in the cluster;
        // only `other_op` (the follower's non-shared side) still needs it.
        match get_cluster(cluster_per_segment, other.seg_id, other.fraction) {
            Some(existing) if existing != id => {
                let merged = uf.union(id, existing);
                ref_id = Some(merged);
                set_cluster(cluster_per_segment, other.seg_id, other.fraction, merged);
            }
            None => {
                set_cluster(cluster_per_segment, other.seg_id, other.fraction, id);
            }
            _ => {}
        }

        let ref_is_xx = turns[ref_toi.turn_index].both(Operation::Blocked);
        if ref_is_xx {
            // xx cannot itself be discarded: it must remain to stop other
            // traversals. The colocated follower can never be followed.
            turns[toi.turn_index].discarded = true;
        }

        if for_operation == OverlayOp::Union
            && turns[ref_toi.turn_index].both(Operation::Union)
            && !turns[toi.turn_index].both(Operation::Union)
        {
            let same_ring = other.seg_id.ring_id() == ref_other.seg_id.ring_id();
            if same_ring
                && follower_is_dominated(turns, ref_toi, toi, lookup, reverse1, reverse2)
            {
                turns[toi.turn_index].discarded = true;
                turns[toi.turn_index].colocated = true;
            }
            if turns[toi.turn_index].both(Operation::Continue) {
                turns[toi.turn_index].discarded = true;
                turns[toi.turn_index].colocated = true;

                *colocated_cc_map.entry(op.seg_id.ring_id()).or_insert(0) += 1;
                *colocated_cc_map.entry(other.seg_id.ring_id()).or_insert(0) += 1;
            }
        }
    }
}

fn assign_cluster_to_turns<F: CoordFloat>(
    turns: &mut [Turn<F>],
    clusters: &mut Clusters,
    cluster_per_segment: &BTreeMap<SegmentFractionKey, usize>,
    uf: &mut UnionFind,
) {
    for (turn_index, turn) in turns.iter_mut().enumerate() {
        if turn.discarded {
            // Processed (to build a correct map) but not added; may leave a
            // cluster with a single member, cleaned up afterward.
            continue;
        }
        for op_index in 0..2 {
            let op = &turn.operations[op_index];
            if let Some(raw_id) = get_cluster(cluster_per_segment, op.seg_id, op.fraction) {
                let id = uf.find(raw_id);
                if let Some(existing) = turn.cluster_id {
                    if existing != id {
                        log::warn!(
                            "turn {turn_index} operation {op_index} maps to cluster {id} \
                             but turn already carries cluster {existing}; keeping existing \
                             (union-find should prevent this; investigate if seen)"
                        );
                        continue;
                    }
                }
                turn.cluster_id = Some(id);
                clusters.entry(id).or_default().insert(turn_index);
            }
        }
    }
}

fn remove_singleton_clusters<F: CoordFloat>(turns: &mut [Turn<F>], clusters: &mut Clusters) {
    let singletons: Vec<usize> = clusters
        .iter()
        .filter(|(_, members)| members.len() == 1)
        .map(|(id, _)| *id)
        .collect();
    for id in singletons {
        if let Some(members) = clusters.remove(&id) {
            for turn_index in members {
                turns[turn_index].cluster_id = None;
            }
        }
    }
}

fn renumber_clusters_from_one<F: CoordFloat>(turns: &mut [Turn<F>], clusters: &mut Clusters) {
    let old_ids: Vec<usize> = clusters.keys().copied().collect();
    let renumber: BTreeMap<usize, usize> = old_ids
        .into_iter()
        .enumerate()
        .map(|(i, old)| (old, i + 1))
        .collect();

    let mut renumbered = Clusters::new();
    for (old_id, members) in std::mem::take(clusters) {
        let new_id = renumber[&old_id];
        for &turn_index in &members {
            turns[turn_index].cluster_id = Some(new_id);
        }
        renumbered.insert(new_id, members);
    }
    *clusters = renumbered;
}

/// Detects colocated turns, clusters them, and applies the discarding
/// policy. Returns `false` (and leaves `turns`/`clusters` untouched) if no
/// segment carries more than one turn, so callers can skip clustering
/// entirely.
pub fn handle_colocations<F: CoordFloat>(
    turns: &mut [Turn<F>],
    clusters: &mut Clusters,
    colocated_cc_map: &mut BTreeMap<RingId, usize>,
    for_operation: OverlayOp,
    geometry1: &GeometryInput<F>,
    geometry2: &GeometryInput<F>,
    reverse1: bool,
    reverse2: bool,
) -> bool {
    // Cluster assignment is recomputed from scratch every call; a turn's
    // cluster_id from a previous pass must not be mistaken for a conflict
    // with the id this pass computes.
    for turn in turns.iter_mut() {
        turn.cluster_id = None;
    }

    let mut map: BTreeMap<SegmentId, Vec<TurnOperationIndex>> = BTreeMap::new();
    for (turn_index, turn) in turns.iter().enumerate() {
        for op_index in 0..2 {
            map.entry(turn.operations[op_index].seg_id)
                .or_default()
                .push(TurnOperationIndex { turn_index, op_index });
        }
    }

    if !map.values().any(|v| v.len() > 1) {
        return false;
    }

    for group in map.values_mut() {
        group.sort_by(|&l, &r| less_by_fraction_and_type(turns, l, r));
    }

    let lookup = RingLookup::build(geometry1, geometry2);
    let mut uf = UnionFind::new();
    let mut cluster_per_segment: BTreeMap<SegmentFractionKey, usize> = BTreeMap::new();

    for group in map.values() {
        if group.len() > 1 {
            handle_colocation_cluster(
                turns,
                &mut uf,
                &mut cluster_per_segment,
                colocated_cc_map,
                group,
                for_operation,
                &lookup,
                reverse1,
                reverse2,
            );
        }
    }

    assign_cluster_to_turns(turns, clusters, &cluster_per_segment, &mut uf);
    remove_singleton_clusters(turns, clusters);
    renumber_clusters_from_one(turns, clusters);

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::{TurnMethod, TurnOperation};
    use geo_types::{LineString, Polygon};

    fn seg(source_index: u8, segment_index: usize) -> SegmentId {
        SegmentId::new(source_index, -1, -1, segment_index)
    }

    fn unit_square(source_index: u8) -> GeometryInput<f64> {
        let _ = source_index;
        GeometryInput::Polygon(Polygon::new(
            LineString::from(vec![(0., 0.), (1., 0.), (1., 1.), (0., 1.), (0., 0.)]),
            vec![],
        ))
    }

    #[test]
    fn no_colocations_when_every_segment_has_one_turn() {
        let op0 = TurnOperation::new(seg(0, 0), SegmentRatio::new(1, 2), Operation::Union);
        let op1 = TurnOperation::new(seg(1, 0), SegmentRatio::new(1, 2), Operation::Union);
        let mut turns = vec![Turn::new(Coord { x: 0.5, y: 0.0 }, TurnMethod::Crosses, op0, op1)];
        let mut clusters = Clusters::new();
        let mut cc = BTreeMap::new();
        let geom1 = unit_square(0);
        let geom2 = unit_square(1);
        let changed = handle_colocations(
            &mut turns, &mut clusters, &mut cc, OverlayOp::Union, &geom1, &geom2, false, false,
        );
        assert!(!changed);
        assert!(clusters.is_empty());
        assert_eq!(turns[0].cluster_id, None);
    }

    #[test]
    fn two_turns_at_same_fraction_form_a_cluster() {
        // Two distinct turns both land at fraction 1/2 of segment 0 on
        // geometry 0 (e.g. one with a ring at multi_index 1, one at 2),
        // sharing that exact point.
        let frac = SegmentRatio::new(1, 2);
        let t0 = Turn::new(
            Coord { x: 0.5, y: 0.0 },
            TurnMethod::Touches,
            TurnOperation::new(seg(0, 0), frac, Operation::Union),
            TurnOperation::new(SegmentId::new(1, 0, -1, 0), frac, Operation::Union),
        );
        let t1 = Turn::new(
            Coord { x: 0.5, y: 0.0 },
            TurnMethod::Touches,
            TurnOperation::new(seg(0, 0), frac, Operation::Union),
            TurnOperation::new(SegmentId::new(1, 1, -1, 0), frac, Operation::Union),
        );
        let mut turns = vec![t0, t1];
        let mut clusters = Clusters::new();
        let mut cc = BTreeMap::new();
        let geom1 = unit_square(0);
        let geom2 = unit_square(1);
        let changed = handle_colocations(
            &mut turns, &mut clusters, &mut cc, OverlayOp::Union, &geom1, &geom2, false, false,
        );
        assert!(changed);
        assert_eq!(clusters.len(), 1);
        let (&id, members) = clusters.iter().next().unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(turns[0].cluster_id, Some(id));
        assert_eq!(turns[1].cluster_id, Some(id));
    }

    #[test]
    fn xx_discards_colocated_follower_but_is_never_discarded_itself() {
        let frac = SegmentRatio::new(1, 2);
        let xx = Turn::new(
            Coord { x: 0.5, y: 0.0 },
            TurnMethod::Collinear,
            TurnOperation::new(seg(0, 0), frac, Operation::Blocked),
            TurnOperation::new(SegmentId::new(1, 0, -1, 0), frac, Operation::Blocked),
        );
        let follower = Turn::new(
            Coord { x: 0.5, y: 0.0 },
            TurnMethod::Touches,
            TurnOperation::new(seg(0, 0), frac, Operation::Union),
            TurnOperation::new(SegmentId::new(1, 1, -1, 0), frac, Operation::Union),
        );
        let mut turns = vec![xx, follower];
        let mut clusters = Clusters::new();
        let mut cc = BTreeMap::new();
        let geom1 = unit_square(0);
        let geom2 = unit_square(1);
        handle_colocations(
            &mut turns, &mut clusters, &mut cc, OverlayOp::Union, &geom1, &geom2, false, false,
        );
        assert!(!turns[0].discarded);
        assert!(turns[1].discarded);
    }

    #[test]
    fn idempotent_second_pass_is_a_no_op() {
        let frac = SegmentRatio::new(1, 2);
        let t0 = Turn::new(
            Coord { x: 0.5, y: 0.0 },
            TurnMethod::Touches,
            TurnOperation::new(seg(0, 0), frac, Operation::Union),
            TurnOperation::new(SegmentId::new(1, 0, -1, 0), frac, Operation::Union),
        );
        let t1 = Turn::new(
            Coord { x: 0.5, y: 0.0 },
            TurnMethod::Touches,
            TurnOperation::new(seg(0, 0), frac, Operation::Union),
            TurnOperation::new(SegmentId::new(1, 1, -1, 0), frac, Operation::Union),
        );
        let mut turns = vec![t0, t1];
        let mut clusters = Clusters::new();
        let mut cc = BTreeMap::new();
        let geom1 = unit_square(0);
        let geom2 = unit_square(1);
        handle_colocations(
            &mut turns, &mut clusters, &mut cc, OverlayOp::Union, &geom1, &geom2, false, false,
        );
        let snapshot_clusters = clusters.clone();
        let snapshot_discarded: Vec<bool> = turns.iter().map(|t| t.discarded).collect();

        // Re-running detection from scratch on the same (now-enriched)
        // turns must find the same clusters and discard nothing new.
        let mut clusters2 = Clusters::new();
        let mut cc2 = BTreeMap::new();
        handle_colocations(
            &mut turns, &mut clusters2, &mut cc2, OverlayOp::Union, &geom1, &geom2, false, false,
        );
        assert_eq!(snapshot_clusters, clusters2);
        let discarded2: Vec<bool> = turns.iter().map(|t| t.discarded).collect();
        assert_eq!(snapshot_discarded, discarded2);
    }
}
