//! Decomposition of a ring/linestring into monotonic axis-aligned sections,
//! used upstream to prune segment-vs-segment intersection candidates.
//!
//! Based on the boost.geometry `sectionalize` algorithm: walk the ring once,
//! growing an open section while each new segment's per-dimension direction
//! matches the section's and the section hasn't yet hit `max_count`
//! segments; otherwise close it and start a new one.

use crate::geometry::GeometryInput;
use crate::ids::RingId;
use geo_types::{Coord, CoordFloat, Rect};

/// Number of coordinate dimensions a section tracks direction/monotonicity
/// for. Always 2 for the planar geometries this crate handles; kept as a
/// named constant rather than unrolled per-dimension code, since a
/// 2-element runtime loop is simpler and just as fast here.
pub const SECTION_DIMENSIONS: usize = 2;

/// Pseudo-direction assigned to a duplicate (zero-length) segment so it
/// never merges into a directional section.
pub const DUPLICATE_DIRECTION: i8 = -99;

/// A maximal run of segments monotonic in every dimension.
#[derive(Debug, Clone)]
pub struct Section<F: CoordFloat> {
    pub ring_id: RingId,
    pub bounding_box: Rect<F>,
    pub directions: [i8; SECTION_DIMENSIONS],
    pub begin_index: usize,
    pub end_index: usize,
    pub count: usize,
    pub range_count: usize,
    pub duplicate: bool,
    pub non_duplicate_index: usize,
    pub is_non_duplicate_first: bool,
    pub is_non_duplicate_last: bool,
}

fn sign<F: CoordFloat>(v: F) -> i8 {
    if v > F::zero() {
        1
    } else if v < F::zero() {
        -1
    } else {
        0
    }
}

fn segment_directions<F: CoordFloat>(p: Coord<F>, q: Coord<F>) -> [i8; SECTION_DIMENSIONS] {
    [sign(q.x - p.x), sign(q.y - p.y)]
}

fn is_duplicate_segment<F: CoordFloat>(p: Coord<F>, q: Coord<F>) -> bool {
    p.x == q.x && p.y == q.y
}

fn relaxed_epsilon<F: CoordFloat>() -> F {
    F::epsilon() * F::from(10.0).unwrap()
}

fn inflate_box<F: CoordFloat>(rect: Rect<F>) -> Rect<F> {
    let eps = relaxed_epsilon::<F>();
    let min = rect.min();
    let max = rect.max();
    Rect::new(
        Coord {
            x: min.x - eps,
            y: min.y - eps,
        },
        Coord {
            x: max.x + eps,
            y: max.y + eps,
        },
    )
}

struct OpenSection<F: CoordFloat> {
    ring_id: RingId,
    bounding_box: Option<Rect<F>>,
    directions: [i8; SECTION_DIMENSIONS],
    begin_index: usize,
    end_index: usize,
    count: usize,
    range_count: usize,
    duplicate: bool,
    non_duplicate_index: usize,
}

impl<F: CoordFloat> OpenSection<F> {
    fn expand(&mut self, coord: Coord<F>) {
        self.bounding_box = Some(match self.bounding_box.take() {
            None => Rect::new(coord, coord),
            Some(existing) => {
                let min = existing.min();
                let max = existing.max();
                Rect::new(
                    Coord {
                        x: if coord.x < min.x { coord.x } else { min.x },
                        y: if coord.y < min.y { coord.y } else { min.y },
                    },
                    Coord {
                        x: if coord.x > max.x { coord.x } else { max.x },
                        y: if coord.y > max.y { coord.y } else { max.y },
                    },
                )
            }
        });
    }

    fn into_section(self) -> Section<F> {
        Section {
            ring_id: self.ring_id,
            bounding_box: inflate_box(self.bounding_box.expect("section must have a bounding box")),
            directions: self.directions,
            begin_index: self.begin_index,
            end_index: self.end_index,
            count: self.count,
            range_count: self.range_count,
            duplicate: self.duplicate,
            non_duplicate_index: self.non_duplicate_index,
            is_non_duplicate_first: false,
            is_non_duplicate_last: false,
        }
    }
}

/// Decomposes a single ring's vertices into monotonic sections, appending
/// them to `sections`. A ring with fewer than 2 vertices produces no
/// sections.
fn sectionalize_ring<F: CoordFloat>(
    ring_id: RingId,
    coords: &[Coord<F>],
    max_count: usize,
    sections: &mut Vec<Section<F>>,
) {
    if coords.len() < 2 {
        return;
    }

    let range_count = coords.len();
    let mut ndi = 0usize;
    let mut open: Option<OpenSection<F>> = None;
    let ring_start = sections.len();
    // Index (within `sections`) of the last pushed non-duplicate section,
    // so that once the whole ring is walked we can mark it as the final one.
    let mut last_non_duplicate_index: Option<usize> = None;

    for index in 0..coords.len() - 1 {
        let p = coords[index];
        let q = coords[index + 1];
        let duplicate = is_duplicate_segment(p, q);
        let directions = if duplicate {
            [DUPLICATE_DIRECTION; SECTION_DIMENSIONS]
        } else {
            segment_directions(p, q)
        };

        let should_close = match &open {
            Some(section) => section.directions != directions || section.count >= max_count,
            None => false,
        };

        if should_close {
            let finished = open.take().unwrap();
            if !finished.duplicate {
                last_non_duplicate_index = Some(sections.len());
            }
            sections.push(finished.into_section());
        }

        if open.is_none() {
            let mut section = OpenSection {
                ring_id,
                bounding_box: None,
                directions,
                begin_index: index,
                end_index: index,
                count: 0,
                range_count,
                duplicate,
                non_duplicate_index: ndi,
            };
            section.expand(p);
            open = Some(section);
        }

        let section = open.as_mut().unwrap();
        section.expand(q);
        section.end_index = index + 1;
        section.count += 1;
        if !duplicate {
            ndi += 1;
        }
    }

    if let Some(section) = open.take() {
        if !section.duplicate {
            last_non_duplicate_index = Some(sections.len());
        }
        sections.push(section.into_section());
    }

    // Mark first/last non-duplicate sections, used by traversal to know
    // where to start/stop within a ring that begins or ends with degenerate
    // segments.
    if let Some(first_idx) = sections[ring_start..]
        .iter()
        .position(|s| !s.duplicate)
        .map(|i| ring_start + i)
    {
        sections[first_idx].is_non_duplicate_first = true;
    }
    if let Some(last_idx) = last_non_duplicate_index {
        sections[last_idx].is_non_duplicate_last = true;
    }
}

/// Decomposes `geometry` into monotonic sections, each no longer than
/// `max_count` segments (a section may grow to `max_count` segments before a
/// direction change forces a new one to start).
pub fn sectionalize<F: CoordFloat>(
    geometry: &GeometryInput<F>,
    source_index: u8,
    max_count: usize,
) -> Vec<Section<F>> {
    let mut sections = Vec::new();
    for (ring_id, coords) in geometry.rings(source_index) {
        sectionalize_ring(ring_id, &coords, max_count, &mut sections);
    }
    sections
}
