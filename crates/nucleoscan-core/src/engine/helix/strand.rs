//! Strand assignment between adjacent pairs of a helix.
//!
//! Each rule looks at one step (an already oriented pair followed by the next pair in its
//! current orientation) and either decides whether the next pair keeps or swaps its strand
//! assignment, or abstains. Rules are tried in priority order; the first decision wins.

use crate::core::models::backbone::{Backbone, ChainConnectivity};
use crate::core::models::frame::ReferenceFrame;
use crate::core::models::ids::LegacyIndex;
use crate::core::models::pair::{BasePair, BasePairType};
use crate::engine::config::OrderingMode;

/// Minimum difference between the two z-alignment sums for the Watson–Crick rule.
const WATSON_CRICK_Z_MARGIN: f64 = 0.5;
/// Minimum difference (Å) between the two O3'–O3' distance sums.
const O3_DISTANCE_MARGIN: f64 = 1.0;
const FRAME_TIE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrandCall {
    Keep,
    Swap,
}

impl StrandCall {
    fn from_scores(keep: f64, swap: f64, margin: f64, higher_is_better: bool) -> Option<Self> {
        if (keep - swap).abs() <= margin {
            return None;
        }
        let keep_wins = if higher_is_better { keep > swap } else { keep < swap };
        Some(if keep_wins { StrandCall::Keep } else { StrandCall::Swap })
    }
}

/// A pair seen through a given strand assignment.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OrientedPair<'a> {
    pub strand1: LegacyIndex,
    pub strand2: LegacyIndex,
    pub frame1: &'a ReferenceFrame,
    pub frame2: &'a ReferenceFrame,
    pub pair_type: BasePairType,
}

impl<'a> OrientedPair<'a> {
    pub(crate) fn new(pair: &'a BasePair, swapped: bool) -> Self {
        if swapped {
            Self {
                strand1: pair.residue2,
                strand2: pair.residue1,
                frame1: &pair.frame2,
                frame2: &pair.frame1,
                pair_type: pair.pair_type,
            }
        } else {
            Self {
                strand1: pair.residue1,
                strand2: pair.residue2,
                frame1: &pair.frame1,
                frame2: &pair.frame2,
                pair_type: pair.pair_type,
            }
        }
    }
}

/// Optional data the rules draw on.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StrandEvidence<'a> {
    pub backbone: Option<&'a Backbone>,
    pub chains: Option<&'a ChainConnectivity>,
    pub max_link_distance: f64,
}

impl StrandEvidence<'_> {
    /// Covalent link in either direction between two residues.
    pub(crate) fn connected(&self, a: LegacyIndex, b: LegacyIndex) -> bool {
        self.backbone.is_some_and(|bb| {
            bb.is_linked(a, b, self.max_link_distance) || bb.is_linked(b, a, self.max_link_distance)
        })
    }

    /// Covalent 5'→3' link from `from` to `to`.
    pub(crate) fn linked(&self, from: LegacyIndex, to: LegacyIndex) -> bool {
        self.backbone
            .is_some_and(|bb| bb.is_linked(from, to, self.max_link_distance))
    }

    pub(crate) fn has_backbone(&self) -> bool {
        self.backbone.is_some_and(|bb| !bb.is_empty())
    }
}

type StrandRule = fn(&StrandEvidence, &OrientedPair, &OrientedPair) -> Option<StrandCall>;

fn backbone_linkage(ev: &StrandEvidence, prev: &OrientedPair, next: &OrientedPair) -> Option<StrandCall> {
    let same = ev.connected(prev.strand1, next.strand1) as u8 + ev.connected(prev.strand2, next.strand2) as u8;
    let cross = ev.connected(prev.strand1, next.strand2) as u8 + ev.connected(prev.strand2, next.strand1) as u8;
    StrandCall::from_scores(same as f64, cross as f64, 0.0, true)
}

fn z_alignment(prev: &OrientedPair, next: &OrientedPair) -> (f64, f64) {
    let keep = prev.frame1.z_axis().dot(&next.frame1.z_axis())
        + prev.frame2.z_axis().dot(&next.frame2.z_axis());
    let swap = prev.frame1.z_axis().dot(&next.frame2.z_axis())
        + prev.frame2.z_axis().dot(&next.frame1.z_axis());
    (keep, swap)
}

fn watson_crick_alignment(_: &StrandEvidence, prev: &OrientedPair, next: &OrientedPair) -> Option<StrandCall> {
    if prev.pair_type != BasePairType::WatsonCrick || next.pair_type != BasePairType::WatsonCrick {
        return None;
    }
    let (keep, swap) = z_alignment(prev, next);
    StrandCall::from_scores(keep, swap, WATSON_CRICK_Z_MARGIN, true)
}

fn o3_distances(ev: &StrandEvidence, prev: &OrientedPair, next: &OrientedPair) -> Option<StrandCall> {
    let backbone = ev.backbone?;
    let keep = backbone.o3_distance(prev.strand1, next.strand1)?
        + backbone.o3_distance(prev.strand2, next.strand2)?;
    let swap = backbone.o3_distance(prev.strand1, next.strand2)?
        + backbone.o3_distance(prev.strand2, next.strand1)?;
    StrandCall::from_scores(keep, swap, O3_DISTANCE_MARGIN, false)
}

fn chain_connectivity(ev: &StrandEvidence, prev: &OrientedPair, next: &OrientedPair) -> Option<StrandCall> {
    let chains = ev.chains?;
    let gap = |a: LegacyIndex, b: LegacyIndex| chains.offset(a, b).map(|d| d.unsigned_abs());
    let closest = |x: Option<usize>, y: Option<usize>| match (x, y) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, y) => x.or(y),
    };
    let keep = closest(gap(prev.strand1, next.strand1), gap(prev.strand2, next.strand2));
    let swap = closest(gap(prev.strand1, next.strand2), gap(prev.strand2, next.strand1));
    match (keep, swap) {
        (Some(k), Some(s)) if k < s => Some(StrandCall::Keep),
        (Some(k), Some(s)) if s < k => Some(StrandCall::Swap),
        (Some(_), None) => Some(StrandCall::Keep),
        (None, Some(_)) => Some(StrandCall::Swap),
        _ => None,
    }
}

fn frame_alignment(_: &StrandEvidence, prev: &OrientedPair, next: &OrientedPair) -> Option<StrandCall> {
    let (keep, swap) = z_alignment(prev, next);
    StrandCall::from_scores(keep, swap, FRAME_TIE_TOLERANCE, true)
}

const LEGACY_RULES: [(&str, StrandRule); 5] = [
    ("backbone-linkage", backbone_linkage),
    ("watson-crick-alignment", watson_crick_alignment),
    ("o3-distance", o3_distances),
    ("chain-connectivity", chain_connectivity),
    ("frame-alignment", frame_alignment),
];

const CHAIN_FIRST_RULES: [(&str, StrandRule); 5] = [
    ("chain-connectivity", chain_connectivity),
    ("backbone-linkage", backbone_linkage),
    ("watson-crick-alignment", watson_crick_alignment),
    ("o3-distance", o3_distances),
    ("frame-alignment", frame_alignment),
];

/// Decides the strand assignment of `next` relative to `prev`; `None` when no rule can.
pub(crate) fn resolve_step(
    mode: OrderingMode,
    evidence: &StrandEvidence,
    prev: &OrientedPair,
    next: &OrientedPair,
) -> Option<(StrandCall, &'static str)> {
    let rules: &[(&'static str, StrandRule)] = match mode {
        OrderingMode::LegacyFiveToThree => &LEGACY_RULES,
        OrderingMode::ChainBased => &CHAIN_FIRST_RULES,
    };
    rules
        .iter()
        .find_map(|(name, rule)| rule(evidence, prev, next).map(|call| (call, *name)))
}

/// 5'→3' link counts along a helix for each strand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct LinkCounts {
    pub strand1_forward: usize,
    pub strand1_reverse: usize,
    pub strand2_forward: usize,
    pub strand2_reverse: usize,
}

impl LinkCounts {
    pub(crate) fn add_step(&mut self, evidence: &StrandEvidence, prev: &OrientedPair, next: &OrientedPair) {
        self.strand1_forward += evidence.linked(prev.strand1, next.strand1) as usize;
        self.strand1_reverse += evidence.linked(next.strand1, prev.strand1) as usize;
        self.strand2_forward += evidence.linked(prev.strand2, next.strand2) as usize;
        self.strand2_reverse += evidence.linked(next.strand2, prev.strand2) as usize;
    }

    pub(crate) fn is_mixed(&self) -> bool {
        (self.strand1_forward > 0 && self.strand1_reverse > 0)
            || (self.strand2_forward > 0 && self.strand2_reverse > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn idx(i: usize) -> LegacyIndex {
        LegacyIndex::new(i).unwrap()
    }

    fn pair(r1: usize, r2: usize, z: f64, pair_type: BasePairType) -> BasePair {
        let frame = ReferenceFrame::identity_at(Point3::new(0.0, 0.0, z));
        BasePair {
            residue1: idx(r1),
            residue2: idx(r2),
            base1: 'G',
            base2: 'C',
            frame1: frame,
            frame2: frame.flipped(),
            pair_type,
            hbonds: Vec::new(),
            quality_score: 0.0,
            selection_score: 0.0,
            strand_swapped: false,
        }
    }

    fn no_evidence() -> StrandEvidence<'static> {
        StrandEvidence {
            backbone: None,
            chains: None,
            max_link_distance: 2.5,
        }
    }

    #[test]
    fn backbone_link_between_same_strand_residues_keeps() {
        let mut backbone = Backbone::new();
        backbone.insert_o3_prime(idx(1), Point3::new(0.0, 0.0, 0.0));
        backbone.insert_phosphorus(idx(2), Point3::new(1.6, 0.0, 0.0));
        let evidence = StrandEvidence {
            backbone: Some(&backbone),
            ..no_evidence()
        };
        let a = pair(1, 4, 0.0, BasePairType::NonCanonical);
        let b = pair(2, 3, 3.4, BasePairType::NonCanonical);
        let prev = OrientedPair::new(&a, false);

        let call = resolve_step(
            OrderingMode::LegacyFiveToThree,
            &evidence,
            &prev,
            &OrientedPair::new(&b, false),
        );
        assert_eq!(call, Some((StrandCall::Keep, "backbone-linkage")));

        let crossed = pair(2, 3, 3.4, BasePairType::NonCanonical);
        let call = resolve_step(
            OrderingMode::LegacyFiveToThree,
            &evidence,
            &prev,
            &OrientedPair::new(&crossed, true),
        );
        assert_eq!(call.map(|c| c.0), Some(StrandCall::Swap));
    }

    #[test]
    fn watson_crick_alignment_detects_reversed_pairs() {
        let a = pair(1, 4, 0.0, BasePairType::WatsonCrick);
        let b = pair(2, 3, 3.4, BasePairType::WatsonCrick);
        let prev = OrientedPair::new(&a, false);
        let evidence = no_evidence();
        assert_eq!(
            resolve_step(OrderingMode::LegacyFiveToThree, &evidence, &prev, &OrientedPair::new(&b, true)),
            Some((StrandCall::Swap, "watson-crick-alignment"))
        );
    }

    #[test]
    fn chain_based_mode_consults_chains_first() {
        let chains = ChainConnectivity::from_chains(&[vec![idx(1), idx(4)], vec![idx(2), idx(3)]]);
        let evidence = StrandEvidence {
            chains: Some(&chains),
            ..no_evidence()
        };
        let a = pair(1, 2, 0.0, BasePairType::WatsonCrick);
        let b = pair(3, 4, 3.4, BasePairType::WatsonCrick);
        let prev = OrientedPair::new(&a, false);
        let next = OrientedPair::new(&b, false);
        assert_eq!(
            resolve_step(OrderingMode::ChainBased, &evidence, &prev, &next),
            Some((StrandCall::Swap, "chain-connectivity"))
        );
        assert_eq!(
            resolve_step(OrderingMode::LegacyFiveToThree, &evidence, &prev, &next),
            Some((StrandCall::Keep, "watson-crick-alignment"))
        );
    }

    #[test]
    fn degenerate_frames_without_other_evidence_abstain() {
        let a = pair(1, 4, 0.0, BasePairType::NonCanonical);
        let mut b = pair(2, 3, 3.4, BasePairType::NonCanonical);
        // Both bases of the next pair face the same way, so neither assignment aligns better.
        b.frame2 = b.frame1;
        let evidence = no_evidence();
        assert_eq!(
            resolve_step(
                OrderingMode::LegacyFiveToThree,
                &evidence,
                &OrientedPair::new(&a, false),
                &OrientedPair::new(&b, false),
            ),
            None
        );
    }

    #[test]
    fn link_counts_track_both_directions() {
        let mut backbone = Backbone::new();
        backbone.insert_o3_prime(idx(1), Point3::origin());
        backbone.insert_phosphorus(idx(2), Point3::new(1.6, 0.0, 0.0));
        backbone.insert_o3_prime(idx(3), Point3::new(5.0, 0.0, 0.0));
        backbone.insert_phosphorus(idx(4), Point3::new(6.6, 0.0, 0.0));
        let evidence = StrandEvidence {
            backbone: Some(&backbone),
            ..no_evidence()
        };
        let a = pair(1, 4, 0.0, BasePairType::WatsonCrick);
        let b = pair(2, 3, 3.4, BasePairType::WatsonCrick);
        let mut counts = LinkCounts::default();
        counts.add_step(&evidence, &OrientedPair::new(&a, false), &OrientedPair::new(&b, false));
        assert_eq!(counts.strand1_forward, 1);
        assert_eq!(counts.strand2_reverse, 1);
        assert!(!counts.is_mixed());
    }
}
