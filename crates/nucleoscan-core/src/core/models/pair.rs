use super::frame::ReferenceFrame;
use super::ids::{LegacyIndex, PairKey};
use crate::core::hbond::HydrogenBond;
use serde::Serialize;
use std::fmt;

/// Discrete classification of a candidate pair (`bp_type_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BasePairType {
    Unknown,
    NonCanonical,
    Wobble,
    WatsonCrick,
}

impl BasePairType {
    /// Numeric id: -1 unknown, 0 non-canonical, 1 wobble, 2 Watson–Crick.
    pub fn id(self) -> i8 {
        match self {
            BasePairType::Unknown => -1,
            BasePairType::NonCanonical => 0,
            BasePairType::Wobble => 1,
            BasePairType::WatsonCrick => 2,
        }
    }
}

impl fmt::Display for BasePairType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BasePairType::Unknown => "unknown",
            BasePairType::NonCanonical => "non-canonical",
            BasePairType::Wobble => "wobble",
            BasePairType::WatsonCrick => "watson-crick",
        };
        f.write_str(label)
    }
}

/// A selected base pair.
///
/// `residue1`/`residue2` keep the order in which selection produced the pair (lower legacy
/// index first). The helix organizer only toggles `strand_swapped`; strand-aware accessors
/// resolve which residue runs on strand I.
#[derive(Debug, Clone, PartialEq)]
pub struct BasePair {
    pub residue1: LegacyIndex,
    pub residue2: LegacyIndex,
    pub base1: char,
    pub base2: char,
    pub frame1: ReferenceFrame,
    pub frame2: ReferenceFrame,
    pub pair_type: BasePairType,
    pub hbonds: Vec<HydrogenBond>,
    pub quality_score: f64,
    pub selection_score: f64,
    pub strand_swapped: bool,
}

impl BasePair {
    pub fn key(&self) -> PairKey {
        PairKey::new(self.residue1, self.residue2)
    }

    pub fn contains(&self, index: LegacyIndex) -> bool {
        self.residue1 == index || self.residue2 == index
    }

    pub fn strand1(&self) -> LegacyIndex {
        if self.strand_swapped { self.residue2 } else { self.residue1 }
    }

    pub fn strand2(&self) -> LegacyIndex {
        if self.strand_swapped { self.residue1 } else { self.residue2 }
    }

    /// Frames of the strand I and strand II residues, in that order.
    pub fn strand_frames(&self) -> (&ReferenceFrame, &ReferenceFrame) {
        if self.strand_swapped {
            (&self.frame2, &self.frame1)
        } else {
            (&self.frame1, &self.frame2)
        }
    }

    /// Base letters as "strand I - strand II", e.g. `G-C`.
    pub fn label(&self) -> String {
        if self.strand_swapped {
            format!("{}-{}", self.base2, self.base1)
        } else {
            format!("{}-{}", self.base1, self.base2)
        }
    }

    /// The two bases' z-axes point the same way (parallel local orientation).
    pub fn has_parallel_z(&self) -> bool {
        self.frame1.z_axis().dot(&self.frame2.z_axis()) > 0.0
    }
}

/// Selected pairs as produced by a selection strategy.
pub type SelectedPair = BasePair;
