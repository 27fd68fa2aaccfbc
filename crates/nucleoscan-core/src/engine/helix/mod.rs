//! Reordering of selected pairs into continuous helices.
//!
//! Pairs are linked to at most two spatial neighbors (one on each side), the resulting
//! paths and rings become helices, and each helix is oriented so that strand I runs 5'→3'
//! along the helix order.

mod neighbors;
mod organizer;
mod strand;

pub use organizer::HelixOrganizer;

use crate::core::models::pair::BasePair;
use serde::Serialize;
use std::ops::Range;

/// An ordered run of pairs, by index into the selected-pair list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Helix {
    pub pairs: Vec<usize>,
    /// The last pair stacks back onto the first.
    pub is_circular: bool,
    /// A step lacks backbone linkage on both strands or exceeds the break distance.
    pub has_break: bool,
    /// Most pairs have their two base normals pointing the same way.
    pub is_parallel: bool,
    /// Strand direction is contradictory or could not be determined.
    pub has_mixed_direction: bool,
}

impl Helix {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Final pair order, helix boundaries and per-pair strand assignment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HelixOrganization {
    order: Vec<usize>,
    helices: Vec<Helix>,
    strand_swapped: Vec<bool>,
}

impl HelixOrganization {
    /// Organization with every pair keeping its original strand assignment.
    pub fn from_helices(helices: Vec<Helix>, pair_count: usize) -> Self {
        Self::with_strands(helices, vec![false; pair_count])
    }

    pub(crate) fn with_strands(helices: Vec<Helix>, strand_swapped: Vec<bool>) -> Self {
        let order = helices.iter().flat_map(|h| h.pairs.iter().copied()).collect();
        Self {
            order,
            helices,
            strand_swapped,
        }
    }

    /// Pair indices in final order, helices concatenated.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn helices(&self) -> &[Helix] {
        &self.helices
    }

    /// Per-pair strand-swap flags, indexed like the selected-pair list.
    pub fn strand_swapped(&self) -> &[bool] {
        &self.strand_swapped
    }

    /// Position ranges of each helix within [`Self::order`].
    pub fn boundaries(&self) -> Vec<Range<usize>> {
        let mut start = 0;
        self.helices
            .iter()
            .map(|h| {
                let range = start..start + h.len();
                start = range.end;
                range
            })
            .collect()
    }

    /// Writes the strand-swap flags onto the pairs they were computed for.
    pub fn apply_strands(&self, pairs: &mut [BasePair]) {
        for (pair, &swapped) in pairs.iter_mut().zip(&self.strand_swapped) {
            pair.strand_swapped = swapped;
        }
    }
}
