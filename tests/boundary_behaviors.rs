//! Integration tests exercising the published API as an external crate
//! would: empty-input behavior, the colocation/cluster boundary cases, and
//! the cross-module invariants the full pipeline must uphold.

use geo_overlay_core::{
    enrich_intersection_points, sectionalize, Clusters, GeometryInput, Operation, OverlayOp,
    SegmentId, SegmentRatio, Turn, TurnMethod, TurnOperation,
};
use geo_types::{Coord, LineString, Polygon};

fn empty_polygon() -> GeometryInput<f64> {
    GeometryInput::Polygon(Polygon::new(LineString::new(vec![]), vec![]))
}

fn triangle(offset: f64) -> GeometryInput<f64> {
    GeometryInput::Polygon(Polygon::new(
        LineString::from(vec![
            (0. + offset, 0.),
            (4. + offset, 0.),
            (2. + offset, 4.),
            (0. + offset, 0.),
        ]),
        vec![],
    ))
}

fn seg(source_index: u8, segment_index: usize) -> SegmentId {
    SegmentId::new(source_index, -1, -1, segment_index)
}

#[test]
fn empty_geometry_has_no_sections() {
    let empty = empty_polygon();
    let sections = sectionalize(&empty, 0, 10);
    assert!(sections.is_empty());
}

#[test]
fn empty_turn_list_yields_empty_clusters_through_the_full_pipeline() {
    let mut turns: Vec<Turn<f64>> = Vec::new();
    let mut clusters = Clusters::new();
    let geom = triangle(0.0);
    enrich_intersection_points(
        &mut turns,
        &mut clusters,
        OverlayOp::Union,
        &geom,
        &geom,
        false,
        false,
    );
    assert!(turns.is_empty());
    assert!(clusters.is_empty());
}

/// A single segment of geometry 0 crossing two segments of geometry 1 at the
/// exact same point produces two turns sharing a location; after colocation
/// handling they must land in one cluster with both members present.
#[test]
fn single_segment_crossing_two_segments_at_one_point_forms_one_cluster_of_two() {
    let mut turns = vec![
        Turn::new(
            Coord { x: 2.0, y: 0.0 },
            TurnMethod::Touches,
            TurnOperation::new(seg(0, 0), SegmentRatio::new(1, 2), Operation::Union),
            TurnOperation::new(seg(1, 0), SegmentRatio::one(), Operation::Union),
        ),
        Turn::new(
            Coord { x: 2.0, y: 0.0 },
            TurnMethod::Touches,
            TurnOperation::new(seg(0, 0), SegmentRatio::new(1, 2), Operation::Union),
            TurnOperation::new(seg(1, 1), SegmentRatio::zero(), Operation::Union),
        ),
    ];
    let mut clusters = Clusters::new();
    let mut colocated_cc_map = std::collections::BTreeMap::new();
    let geom0 = GeometryInput::LineString(LineString::from(vec![(0., 0.), (4., 0.)]));
    let geom1 = GeometryInput::Ring(LineString::from(vec![
        (2., 0.),
        (2., 0.),
        (2., 0.),
    ]));

    geo_overlay_core::handle_colocations(
        &mut turns,
        &mut clusters,
        &mut colocated_cc_map,
        OverlayOp::Union,
        &geom0,
        &geom1,
        false,
        false,
    );

    assert_eq!(clusters.len(), 1);
    let members = clusters.values().next().unwrap();
    assert_eq!(members.len(), 2);
    assert!(turns[0].cluster_id.is_some());
    assert_eq!(turns[0].cluster_id, turns[1].cluster_id);
}

/// §8 invariant: every surviving (non-discarded) turn's operations are
/// ordered geometry-0-then-geometry-1.
#[test]
fn surviving_turns_keep_source_index_order() {
    let mut turns = vec![Turn::new(
        Coord { x: 2.0, y: 2.0 },
        TurnMethod::Crosses,
        TurnOperation::new(seg(0, 0), SegmentRatio::new(1, 2), Operation::Union),
        TurnOperation::new(seg(1, 0), SegmentRatio::new(1, 2), Operation::Union),
    )];
    let mut clusters = Clusters::new();
    let geom = triangle(0.0);
    enrich_intersection_points(
        &mut turns,
        &mut clusters,
        OverlayOp::Union,
        &geom,
        &geom,
        false,
        false,
    );
    for turn in turns.iter().filter(|t| !t.discarded) {
        assert_eq!(turn.operations[0].seg_id.source_index, 0);
        assert_eq!(turn.operations[1].seg_id.source_index, 1);
    }
}

/// §8 invariant: after singleton removal, every remaining cluster has at
/// least two members.
#[test]
fn every_remaining_cluster_has_at_least_two_members() {
    let mut turns = vec![
        // A genuine colocation: two turns sharing a fraction on segment 0.
        Turn::new(
            Coord { x: 1.0, y: 0.0 },
            TurnMethod::Touches,
            TurnOperation::new(seg(0, 0), SegmentRatio::new(1, 4), Operation::Union),
            TurnOperation::new(seg(1, 0), SegmentRatio::one(), Operation::Union),
        ),
        Turn::new(
            Coord { x: 1.0, y: 0.0 },
            TurnMethod::Touches,
            TurnOperation::new(seg(0, 0), SegmentRatio::new(1, 4), Operation::Union),
            TurnOperation::new(seg(1, 1), SegmentRatio::zero(), Operation::Union),
        ),
        // A lone turn elsewhere on a different segment: must not be
        // clustered at all.
        Turn::new(
            Coord { x: 3.0, y: 0.0 },
            TurnMethod::Crosses,
            TurnOperation::new(seg(0, 1), SegmentRatio::new(1, 2), Operation::Union),
            TurnOperation::new(seg(1, 2), SegmentRatio::new(1, 2), Operation::Union),
        ),
    ];
    let mut clusters = Clusters::new();
    let geom = triangle(0.0);
    enrich_intersection_points(
        &mut turns,
        &mut clusters,
        OverlayOp::Union,
        &geom,
        &geom,
        false,
        false,
    );
    for members in clusters.values() {
        assert!(members.len() >= 2);
    }
    assert!(turns[2].cluster_id.is_none());
}

/// §8 invariant: `next_ip_index` is only ever set when the successor sits on
/// the same segment at a strictly greater fraction.
#[test]
fn next_ip_index_respects_same_segment_and_strictly_greater_fraction() {
    let mut turns = vec![
        Turn::new(
            Coord { x: 1.0, y: 0.0 },
            TurnMethod::Crosses,
            TurnOperation::new(seg(0, 0), SegmentRatio::new(1, 4), Operation::Union),
            TurnOperation::new(seg(1, 0), SegmentRatio::new(1, 4), Operation::Union),
        ),
        Turn::new(
            Coord { x: 2.0, y: 4.0 },
            TurnMethod::Crosses,
            TurnOperation::new(seg(0, 1), SegmentRatio::new(1, 2), Operation::Union),
            TurnOperation::new(seg(1, 1), SegmentRatio::new(1, 2), Operation::Union),
        ),
    ];
    let mut clusters = Clusters::new();
    let geom = triangle(0.0);
    enrich_intersection_points(
        &mut turns,
        &mut clusters,
        OverlayOp::Union,
        &geom,
        &geom,
        false,
        false,
    );

    for turn in &turns {
        for op_index in 0..2 {
            let op = &turn.operations[op_index];
            if let Some(next_turn_index) = op.enriched.next_ip_index {
                let next = &turns[next_turn_index];
                let next_op = next
                    .operations
                    .iter()
                    .find(|o| o.seg_id.segment_index == op.seg_id.segment_index)
                    .expect("next_ip_index must point at a turn on the same segment");
                assert_eq!(next_op.seg_id.segment_index, op.seg_id.segment_index);
                assert!(op.fraction < next_op.fraction);
            }
        }
    }
}

#[test]
fn running_the_full_pipeline_twice_is_idempotent() {
    let mut turns = vec![
        Turn::new(
            Coord { x: 1.0, y: 0.0 },
            TurnMethod::Crosses,
            TurnOperation::new(seg(0, 0), SegmentRatio::new(1, 4), Operation::Union),
            TurnOperation::new(seg(1, 0), SegmentRatio::new(1, 4), Operation::Union),
        ),
        Turn::new(
            Coord { x: 2.0, y: 4.0 },
            TurnMethod::Crosses,
            TurnOperation::new(seg(0, 1), SegmentRatio::new(1, 2), Operation::Union),
            TurnOperation::new(seg(1, 1), SegmentRatio::new(1, 2), Operation::Union),
        ),
    ];
    let geom = triangle(0.0);

    let mut clusters_a = Clusters::new();
    enrich_intersection_points(
        &mut turns,
        &mut clusters_a,
        OverlayOp::Union,
        &geom,
        &geom,
        false,
        false,
    );
    let snapshot_a: Vec<_> = turns
        .iter()
        .map(|t| {
            (
                t.discarded,
                t.cluster_id,
                t.operations[0].enriched.travels_to_ip_index,
                t.operations[1].enriched.travels_to_ip_index,
            )
        })
        .collect();

    let mut clusters_b = Clusters::new();
    enrich_intersection_points(
        &mut turns,
        &mut clusters_b,
        OverlayOp::Union,
        &geom,
        &geom,
        false,
        false,
    );
    let snapshot_b: Vec<_> = turns
        .iter()
        .map(|t| {
            (
                t.discarded,
                t.cluster_id,
                t.operations[0].enriched.travels_to_ip_index,
                t.operations[1].enriched.travels_to_ip_index,
            )
        })
        .collect();

    assert_eq!(snapshot_a, snapshot_b);
    assert_eq!(clusters_a, clusters_b);
}
