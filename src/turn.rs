//! The in-memory representation of an intersection point ("turn") between a
//! segment of geometry 0 and a segment of geometry 1.

use crate::ids::SegmentId;
use crate::ratio::SegmentRatio;
use geo_types::{Coord, CoordFloat};

/// Classification of how one source traverses a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Contributes to a union boundary.
    Union,
    /// Contributes to an intersection boundary.
    Intersection,
    /// Traversal must stop here (the two rings run antiparallel/tangent).
    Blocked,
    /// The ring continues straight through; this turn is not a boundary
    /// decision point for this source.
    Continue,
    /// Not relevant to this turn at all.
    None,
}

impl Operation {
    pub fn is_union(&self) -> bool {
        matches!(self, Operation::Union)
    }
    pub fn is_blocked(&self) -> bool {
        matches!(self, Operation::Blocked)
    }
    pub fn is_continue(&self) -> bool {
        matches!(self, Operation::Continue)
    }
    pub fn is_none(&self) -> bool {
        matches!(self, Operation::None)
    }
}

/// Classification of the intersection geometry itself (shared by both
/// operations of a turn).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnMethod {
    Crosses,
    Touches,
    TouchesInterior,
    Equal,
    Collinear,
    Start,
    End,
    None,
}

/// Successor links populated by the enricher; unset (`None`/sentinel) until
/// [`crate::enrich`] runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Enriched {
    /// Index of the successor turn to travel to when leaving this turn.
    pub travels_to_ip_index: Option<usize>,
    /// Segment index of the vertex to walk toward next.
    pub travels_to_vertex_index: Option<usize>,
    /// Index of the next turn on the *same* segment with a strictly greater
    /// fraction, or `None` if this is the last turn on the segment.
    pub next_ip_index: Option<usize>,
}

/// One side of a turn: which input geometry it came from, on which segment,
/// at what fraction, and how that source classifies the turn.
#[derive(Debug, Clone, Copy)]
pub struct TurnOperation {
    pub seg_id: SegmentId,
    pub fraction: SegmentRatio,
    pub operation: Operation,
    pub enriched: Enriched,
}

impl TurnOperation {
    pub fn new(seg_id: SegmentId, fraction: SegmentRatio, operation: Operation) -> Self {
        TurnOperation {
            seg_id,
            fraction,
            operation,
            enriched: Enriched::default(),
        }
    }
}

/// An intersection point between a segment of geometry 0 and a segment of
/// geometry 1.
#[derive(Debug, Clone)]
pub struct Turn<F: CoordFloat> {
    pub operations: [TurnOperation; 2],
    pub point: Coord<F>,
    pub method: TurnMethod,
    /// `None` until [`crate::cluster`] assigns this turn to a cluster of
    /// colocated turns.
    pub cluster_id: Option<usize>,
    pub discarded: bool,
    pub colocated: bool,
}

impl<F: CoordFloat> Turn<F> {
    pub fn new(
        point: Coord<F>,
        method: TurnMethod,
        op0: TurnOperation,
        op1: TurnOperation,
    ) -> Self {
        debug_assert_eq!(op0.seg_id.source_index, 0);
        debug_assert_eq!(op1.seg_id.source_index, 1);
        Turn {
            operations: [op0, op1],
            point,
            method,
            cluster_id: None,
            discarded: false,
            colocated: false,
        }
    }

    /// True iff both operations equal `op`.
    pub fn both(&self, op: Operation) -> bool {
        self.operations[0].operation == op && self.operations[1].operation == op
    }

    /// True iff either operation equals `op`.
    pub fn has(&self, op: Operation) -> bool {
        self.operations[0].operation == op || self.operations[1].operation == op
    }
}
