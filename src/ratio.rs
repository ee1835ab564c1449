//! Exact rational fractions along a segment, and the key used to identify a
//! point on a segment.
//!
//! Comparing fractions via converted floating-point values is incorrect: two
//! operations whose fractions differ by one ulp must still be orderable
//! consistently with the angular side-sort. We therefore keep fractions as
//! exact numerator/denominator pairs and compare by cross-multiplication in a
//! wider integer type.

use crate::ids::SegmentId;
use std::cmp::Ordering;

/// An exact rational number in `[0, 1]`, representing distance along a
/// segment from its start vertex.
///
/// `denominator` is always strictly positive; `numerator` is in
/// `[0, denominator]`.
#[derive(Debug, Clone, Copy)]
pub struct SegmentRatio {
    numerator: i64,
    denominator: i64,
}

impl SegmentRatio {
    /// Constructs a ratio `numerator / denominator`. `denominator` must be
    /// non-zero; a negative denominator is normalized by flipping both
    /// signs.
    pub fn new(numerator: i64, denominator: i64) -> Self {
        assert!(denominator != 0, "segment ratio denominator must not be zero");
        if denominator < 0 {
            SegmentRatio {
                numerator: -numerator,
                denominator: -denominator,
            }
        } else {
            SegmentRatio {
                numerator,
                denominator,
            }
        }
    }

    pub fn zero() -> Self {
        SegmentRatio::new(0, 1)
    }

    pub fn one() -> Self {
        SegmentRatio::new(1, 1)
    }

    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    pub fn is_one(&self) -> bool {
        self.numerator == self.denominator
    }

    pub fn to_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

impl PartialEq for SegmentRatio {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SegmentRatio {}

impl PartialOrd for SegmentRatio {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SegmentRatio {
    fn cmp(&self, other: &Self) -> Ordering {
        // a/b vs c/d, both b, d > 0: compare a*d vs c*b.
        let lhs = self.numerator as i128 * other.denominator as i128;
        let rhs = other.numerator as i128 * self.denominator as i128;
        lhs.cmp(&rhs)
    }
}

/// `(segment_id, segment_ratio)`: identifies a precise point along a
/// specific segment. Total order: by `segment_id` first, then by ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SegmentFractionKey {
    pub seg_id: SegmentId,
    pub fraction: SegmentRatio,
}

impl SegmentFractionKey {
    pub fn new(seg_id: SegmentId, fraction: SegmentRatio) -> Self {
        SegmentFractionKey { seg_id, fraction }
    }
}
