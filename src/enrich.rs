//! Per-ring sorting of turn operations and assignment of the successor
//! links a traversal stage walks.
//!
//! Two passes, run per ring after bucketization (`bucketize::create_map`)
//! and colocation handling (`cluster::handle_colocations`) have both run:
//! sort the ring's operations along the segment they sit on, then walk the
//! sorted vector circularly wiring up `travels_to_ip_index` /
//! `travels_to_vertex_index` / `next_ip_index`.

use crate::bucketize::IndexedOperation;
use crate::cluster::RingLookup;
use crate::side::{sort_sides, Leg};
use crate::turn::Turn;
use geo_types::CoordFloat;
use std::cmp::Ordering;

/// Sorts one ring's operations by `(segment_index, fraction)`. Runs of
/// operations that land at the exact same `(seg_id, fraction)` — distinct
/// turns colocated on this segment — are further ordered by the angular
/// side-sorter so their relative order matches the cluster's geometric
/// arrangement rather than an arbitrary stable-sort tie.
pub(crate) fn sort_ring_operations<F: CoordFloat>(
    turns: &[Turn<F>],
    ops: &mut [IndexedOperation],
    lookup: &RingLookup<F>,
    reverse1: bool,
    reverse2: bool,
) {
    ops.sort_by(|a, b| {
        a.seg_id
            .segment_index
            .cmp(&b.seg_id.segment_index)
            .then_with(|| a.fraction.cmp(&b.fraction))
    });

    let mut i = 0;
    while i < ops.len() {
        let mut j = i + 1;
        while j < ops.len()
            && ops[j].seg_id.segment_index == ops[i].seg_id.segment_index
            && ops[j].fraction == ops[i].fraction
        {
            j += 1;
        }
        if j - i > 1 {
            resolve_colocated_run(turns, &mut ops[i..j], lookup, reverse1, reverse2);
        }
        i = j;
    }
}

fn resolve_colocated_run<F: CoordFloat>(
    turns: &[Turn<F>],
    run: &mut [IndexedOperation],
    lookup: &RingLookup<F>,
    reverse1: bool,
    reverse2: bool,
) {
    let center = turns[run[0].turn_index].point;
    let legs: Vec<Leg<F>> = run
        .iter()
        .map(|op| Leg {
            turn_index: op.turn_index,
            operation_index: op.operation_index,
            source_index: op.seg_id.source_index,
            to: lookup.endpoint(op.seg_id),
            is_subject: false,
        })
        .collect();
    let ranked = sort_sides(center, legs, reverse1, reverse2);

    let original: Vec<IndexedOperation> = run.to_vec();
    for (slot, ranked_leg) in run.iter_mut().zip(ranked.iter()) {
        *slot = original
            .iter()
            .find(|op| {
                op.turn_index == ranked_leg.turn_index && op.operation_index == ranked_leg.operation_index
            })
            .cloned()
            .expect("every ranked leg must correspond to one of the run's operations");
    }
}

/// Walks a ring's sorted operation vector circularly, writing each entry's
/// successor links into the corresponding turn.
pub fn assign_successors<F: CoordFloat>(turns: &mut [Turn<F>], ops: &[IndexedOperation]) {
    let n = ops.len();
    if n == 0 {
        return;
    }

    for cur_idx in 0..n {
        let cur = &ops[cur_idx];
        let mut next_idx = (cur_idx + 1) % n;

        if ops[next_idx].turn_index == cur.turn_index {
            next_idx = (next_idx + 1) % n;
        }

        if let Some(cluster_id) = turns[cur.turn_index].cluster_id {
            loop {
                if ops[next_idx].turn_index == cur.turn_index {
                    break;
                }
                let candidate = &ops[next_idx];
                let same_cluster = turns[candidate.turn_index].cluster_id == Some(cluster_id);
                let same_segment = candidate.seg_id == cur.seg_id;
                if same_cluster && same_segment {
                    next_idx = (next_idx + 1) % n;
                } else {
                    break;
                }
            }
        }

        let next = &ops[next_idx];
        let travels_to_ip_index = next.turn_index;
        let travels_to_vertex_index = next.seg_id.segment_index;
        let next_ip_index = if cur.seg_id.segment_index == next.seg_id.segment_index
            && cur.fraction.cmp(&next.fraction) == Ordering::Less
        {
            Some(next.turn_index)
        } else {
            None
        };

        let cur_turn_index = cur.turn_index;
        let cur_operation_index = cur.operation_index;
        let enriched = &mut turns[cur_turn_index].operations[cur_operation_index].enriched;
        enriched.travels_to_ip_index = Some(travels_to_ip_index);
        enriched.travels_to_vertex_index = Some(travels_to_vertex_index);
        enriched.next_ip_index = next_ip_index;
    }
}
