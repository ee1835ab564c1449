//! Groups turn operations into per-ring vectors, skipping turns that are
//! irrelevant to the requested overlay mode.

use crate::ids::{RingId, SegmentId};
use crate::ratio::SegmentRatio;
use crate::turn::{Operation, Turn};
use geo_types::CoordFloat;
use std::collections::BTreeMap;

/// Which boolean operation the resulting ring graph will be traversed for.
/// `ux`/`xu` turns (one side blocked, the other not) are only relevant for
/// union; including them for intersection/difference would wrongly
/// terminate traversal there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayOp {
    Union,
    Intersection,
    Difference,
}

impl OverlayOp {
    fn matches(&self, operation: Operation) -> bool {
        match self {
            OverlayOp::Union => operation == Operation::Union,
            // Difference is computed as intersection against a reversed
            // second geometry, so it filters exactly like intersection: a
            // ux/xu turn is only relevant to union and would wrongly
            // terminate traversal here too.
            OverlayOp::Intersection | OverlayOp::Difference => operation == Operation::Intersection,
        }
    }
}

/// One operation of a turn, tagged with its owning turn/operation index and
/// a copy of the sibling operation's segment id (needed by the enricher's
/// sort without having to look the turn back up every comparison).
#[derive(Debug, Clone)]
pub struct IndexedOperation {
    pub turn_index: usize,
    pub operation_index: usize,
    pub seg_id: SegmentId,
    pub fraction: SegmentRatio,
    pub operation: Operation,
    pub other_seg_id: SegmentId,
}

/// Builds `ring_id -> [operations on that ring]` for the given overlay mode,
/// skipping discarded turns and (outside union) `blocked`-but-not-matching
/// turns.
pub fn create_map<F: CoordFloat>(
    turns: &[Turn<F>],
    for_operation: OverlayOp,
) -> BTreeMap<RingId, Vec<IndexedOperation>> {
    let mut map: BTreeMap<RingId, Vec<IndexedOperation>> = BTreeMap::new();

    for (turn_index, turn) in turns.iter().enumerate() {
        if turn.discarded {
            continue;
        }
        if for_operation != OverlayOp::Union
            && turn.has(Operation::Blocked)
            && !turn.operations.iter().any(|op| for_operation.matches(op.operation))
        {
            // Don't include ux for intersection/difference; still necessary
            // to include ix for union.
            continue;
        }

        for operation_index in 0..2 {
            // Both operations are inserted, including blocked ones: they
            // remain relevant for the other side of the graph.
            let op = &turn.operations[operation_index];
            let other = &turn.operations[1 - operation_index];
            let ring_id = op.seg_id.ring_id();
            map.entry(ring_id).or_default().push(IndexedOperation {
                turn_index,
                operation_index,
                seg_id: op.seg_id,
                fraction: op.fraction,
                operation: op.operation,
                other_seg_id: other.seg_id,
            });
        }
    }

    map
}

/// Discards "lonely uu" turns: a ring whose bucketized operation vector has
/// exactly one entry, where that turn's both operations are `union`, and
/// the ring was recorded in `colocated_cc_map` (meaning at least one `cc`
/// turn on it was discarded during colocation handling). Left alone, such a
/// turn would cause traversal to visit this ring twice, since its only
/// reason for being a decision point — the neighboring `cc` turns — is gone.
pub fn discard_lonely_uu<F: CoordFloat>(
    turns: &mut [Turn<F>],
    map: &mut BTreeMap<RingId, Vec<IndexedOperation>>,
    colocated_cc_map: &BTreeMap<RingId, usize>,
) {
    let lonely: Vec<usize> = map
        .iter()
        .filter_map(|(ring_id, ops)| {
            if ops.len() != 1 || !colocated_cc_map.contains_key(ring_id) {
                return None;
            }
            let turn_index = ops[0].turn_index;
            turns[turn_index].both(Operation::Union).then_some(turn_index)
        })
        .collect();

    for turn_index in lonely {
        turns[turn_index].discarded = true;
        for ops in map.values_mut() {
            ops.retain(|op| op.turn_index != turn_index);
        }
    }
}
