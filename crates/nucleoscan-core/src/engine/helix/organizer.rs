use super::neighbors::{NeighborGraph, find_neighbors};
use super::strand::{LinkCounts, OrientedPair, StrandCall, StrandEvidence, resolve_step};
use super::{Helix, HelixOrganization};
use crate::core::models::backbone::{Backbone, ChainConnectivity};
use crate::core::models::frame::ReferenceFrame;
use crate::core::models::pair::BasePair;
use crate::engine::config::HelixOrganizerConfig;
use crate::engine::parameters::pair_frame;
use tracing::{debug, info, instrument, trace};

/// Orders selected pairs into helices and assigns strand I of every pair.
///
/// Never fails: when the strand direction of a step cannot be decided the pair keeps its
/// current assignment and the helix is flagged instead.
#[derive(Debug, Clone)]
pub struct HelixOrganizer<'a> {
    config: &'a HelixOrganizerConfig,
}

impl<'a> HelixOrganizer<'a> {
    pub fn new(config: &'a HelixOrganizerConfig) -> Self {
        Self { config }
    }

    #[instrument(skip_all, name = "helix_organizer")]
    pub fn organize(
        &self,
        pairs: &[BasePair],
        backbone: Option<&Backbone>,
        chains: Option<&ChainConnectivity>,
    ) -> HelixOrganization {
        if pairs.is_empty() {
            return HelixOrganization::default();
        }

        let frames: Vec<ReferenceFrame> = pairs.iter().map(pair_frame).collect();
        let graph = find_neighbors(&frames, self.config);
        let evidence = StrandEvidence {
            backbone,
            chains,
            max_link_distance: self.config.max_backbone_link_distance,
        };

        let mut swapped: Vec<bool> = pairs.iter().map(|p| p.strand_swapped).collect();
        let helices: Vec<Helix> = trace_helices(&graph)
            .into_iter()
            .map(|(members, circular)| {
                self.orient(pairs, &frames, members, circular, &evidence, &mut swapped)
            })
            .collect();

        info!(
            pairs = pairs.len(),
            helices = helices.len(),
            circular = helices.iter().filter(|h| h.is_circular).count(),
            "Organized base pairs into helices."
        );
        HelixOrganization::with_strands(helices, swapped)
    }

    fn orient(
        &self,
        pairs: &[BasePair],
        frames: &[ReferenceFrame],
        mut members: Vec<usize>,
        circular: bool,
        evidence: &StrandEvidence,
        swapped: &mut [bool],
    ) -> Helix {
        let mode = self.config.ordering_mode;
        let mut unresolved = false;

        for window in members.windows(2) {
            let (a, b) = (window[0], window[1]);
            let prev = OrientedPair::new(&pairs[a], swapped[a]);
            let next = OrientedPair::new(&pairs[b], swapped[b]);
            match resolve_step(mode, evidence, &prev, &next) {
                Some((call, rule)) => {
                    trace!(from = a, to = b, ?call, rule, "Strand assignment decided.");
                    if call == StrandCall::Swap {
                        swapped[b] = !swapped[b];
                    }
                }
                None => {
                    debug!(from = a, to = b, "No strand evidence for step; keeping assignment.");
                    unresolved = true;
                }
            }
        }

        if circular && members.len() > 2 {
            let (last, first) = (members[members.len() - 1], members[0]);
            let closing = resolve_step(
                mode,
                evidence,
                &OrientedPair::new(&pairs[last], swapped[last]),
                &OrientedPair::new(&pairs[first], swapped[first]),
            );
            if closing.map(|(call, _)| call) != Some(StrandCall::Keep) {
                unresolved = true;
            }
        }

        let counts = link_counts(pairs, &members, circular, swapped, evidence);
        if counts.strand1_reverse > counts.strand1_forward {
            if counts.strand2_forward > counts.strand2_reverse {
                for &m in &members {
                    swapped[m] = !swapped[m];
                }
            } else {
                members.reverse();
            }
        }
        let counts = link_counts(pairs, &members, circular, swapped, evidence);

        let has_break = steps(&members, circular).any(|(a, b)| {
            let distance = (frames[b].origin - frames[a].origin).norm();
            if distance > self.config.helix_break {
                return true;
            }
            if !evidence.has_backbone() {
                return false;
            }
            let prev = OrientedPair::new(&pairs[a], swapped[a]);
            let next = OrientedPair::new(&pairs[b], swapped[b]);
            !evidence.connected(prev.strand1, next.strand1)
                && !evidence.connected(prev.strand2, next.strand2)
        });

        let parallel = members.iter().filter(|&&m| pairs[m].has_parallel_z()).count();
        let helix = Helix {
            is_circular: circular,
            has_break,
            is_parallel: 2 * parallel > members.len(),
            has_mixed_direction: unresolved || counts.is_mixed(),
            pairs: members,
        };
        debug!(
            size = helix.len(),
            circular = helix.is_circular,
            has_break = helix.has_break,
            is_parallel = helix.is_parallel,
            mixed = helix.has_mixed_direction,
            "Helix oriented."
        );
        helix
    }
}

/// Consecutive steps of a helix, including the closing step of a ring.
fn steps(members: &[usize], circular: bool) -> impl Iterator<Item = (usize, usize)> + '_ {
    let closing = (circular && members.len() > 2)
        .then(|| (members[members.len() - 1], members[0]));
    members.windows(2).map(|w| (w[0], w[1])).chain(closing)
}

fn link_counts(
    pairs: &[BasePair],
    members: &[usize],
    circular: bool,
    swapped: &[bool],
    evidence: &StrandEvidence,
) -> LinkCounts {
    let mut counts = LinkCounts::default();
    for (a, b) in steps(members, circular) {
        counts.add_step(
            evidence,
            &OrientedPair::new(&pairs[a], swapped[a]),
            &OrientedPair::new(&pairs[b], swapped[b]),
        );
    }
    counts
}

/// Paths from every endpoint (ascending), then the remaining rings from their lowest member.
fn trace_helices(graph: &NeighborGraph) -> Vec<(Vec<usize>, bool)> {
    let mut visited = vec![false; graph.len()];
    let mut helices = Vec::new();

    for start in 0..graph.len() {
        if !visited[start] && graph.degree(start) < 2 {
            helices.push((walk(graph, start, &mut visited), false));
        }
    }
    for start in 0..graph.len() {
        if !visited[start] {
            helices.push((walk(graph, start, &mut visited), true));
        }
    }
    helices
}

fn walk(graph: &NeighborGraph, start: usize, visited: &mut [bool]) -> Vec<usize> {
    let mut path = vec![start];
    visited[start] = true;
    let mut current = start;
    while let Some(&next) = graph.links(current).iter().find(|&&k| !visited[k]) {
        visited[next] = true;
        path.push(next);
        current = next;
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ids::LegacyIndex;
    use crate::core::models::pair::BasePairType;
    use crate::engine::config::OrderingMode;
    use crate::engine::fixtures::{duplex_pair_frame, ideal_duplex, strand2_index};
    use nalgebra::{Point3, Vector3};
    use std::collections::HashSet;

    fn idx(i: usize) -> LegacyIndex {
        LegacyIndex::new(i).unwrap()
    }

    fn pair(r1: LegacyIndex, r2: LegacyIndex, frame1: ReferenceFrame, frame2: ReferenceFrame) -> BasePair {
        BasePair {
            residue1: r1,
            residue2: r2,
            base1: 'G',
            base2: 'C',
            frame1,
            frame2,
            pair_type: BasePairType::WatsonCrick,
            hbonds: Vec::new(),
            quality_score: 0.0,
            selection_score: 0.0,
            strand_swapped: false,
        }
    }

    /// Duplex pairs with strand I on chain A, listed bottom to top.
    fn duplex_pairs(n: usize) -> Vec<BasePair> {
        (0..n)
            .map(|k| {
                let f = duplex_pair_frame(k);
                pair(idx(k + 1), strand2_index(n, k), f, f.flipped())
            })
            .collect()
    }

    #[test]
    fn ideal_duplex_is_one_forward_helix() {
        let n = 6;
        let structure = ideal_duplex(n);
        let backbone = Backbone::from_structure(&structure);
        let config = HelixOrganizerConfig::default();
        let pairs = duplex_pairs(n);

        let org = HelixOrganizer::new(&config).organize(&pairs, Some(&backbone), None);
        assert_eq!(org.helices().len(), 1);
        let helix = &org.helices()[0];
        assert_eq!(helix.pairs, (0..n).collect::<Vec<_>>());
        assert!(!helix.is_circular && !helix.has_break && !helix.is_parallel);
        assert!(!helix.has_mixed_direction);
        assert!(org.strand_swapped().iter().all(|&s| !s));
    }

    #[test]
    fn scrambled_duplex_is_reoriented_consistently() {
        let n = 6;
        let structure = ideal_duplex(n);
        let backbone = Backbone::from_structure(&structure);
        let config = HelixOrganizerConfig::default();

        // Top to bottom, with every other pair listing its chain B residue first.
        let mut pairs: Vec<BasePair> = duplex_pairs(n).into_iter().rev().collect();
        for p in pairs.iter_mut().skip(1).step_by(2) {
            std::mem::swap(&mut p.residue1, &mut p.residue2);
            std::mem::swap(&mut p.frame1, &mut p.frame2);
        }

        let org = HelixOrganizer::new(&config).organize(&pairs, Some(&backbone), None);
        assert_eq!(org.helices().len(), 1);
        assert!(!org.helices()[0].has_mixed_direction);
        org.apply_strands(&mut pairs);

        // Strand I must run 5'→3' along the final order.
        let order = org.order();
        for w in order.windows(2) {
            let (a, b) = (&pairs[w[0]], &pairs[w[1]]);
            assert!(backbone.is_linked(a.strand1(), b.strand1(), 2.5));
            assert!(backbone.is_linked(b.strand2(), a.strand2(), 2.5));
        }
        let strand1: HashSet<_> = pairs.iter().map(|p| p.strand1().get() > n).collect();
        assert_eq!(strand1.len(), 1);
    }

    #[test]
    fn reversed_listing_is_reoriented_along_strand_one() {
        let n = 4;
        let structure = ideal_duplex(n);
        let backbone = Backbone::from_structure(&structure);
        let config = HelixOrganizerConfig::default();
        // Pairs listed top to bottom, strand I still on chain A.
        let pairs: Vec<BasePair> = duplex_pairs(n).into_iter().rev().collect();

        let org = HelixOrganizer::new(&config).organize(&pairs, Some(&backbone), None);
        let helix = &org.helices()[0];
        assert!(!helix.has_mixed_direction);
        // Either the order was flipped or every pair's strands were, never neither.
        let flipped_order = helix.pairs == vec![3, 2, 1, 0];
        let all_swapped = org.strand_swapped().iter().all(|&s| s);
        assert!(flipped_order != all_swapped);
    }

    /// `count` pairs evenly spaced on a circle with `side` Å between neighbors, each pair's
    /// z-axis tangent to the circle.
    fn ring(count: usize, side: f64) -> Vec<BasePair> {
        let step = 360.0 / count as f64;
        let radius = side / (2.0 * (step / 2.0).to_radians().sin());
        (0..count)
            .map(|k| {
                let theta = (step * k as f64).to_radians();
                let x = Vector3::new(theta.cos(), theta.sin(), 0.0);
                let z = Vector3::new(-theta.sin(), theta.cos(), 0.0);
                let frame = ReferenceFrame::from_axes(x, z.cross(&x), z, Point3::from(x * radius));
                let mut p = pair(idx(k + 1), idx(2 * count - k), frame, frame.flipped());
                p.pair_type = BasePairType::NonCanonical;
                p
            })
            .collect()
    }

    fn assert_single_circular_helix(pairs: &[BasePair], config: &HelixOrganizerConfig) -> Helix {
        let org = HelixOrganizer::new(config).organize(pairs, None, None);
        assert_eq!(org.helices().len(), 1, "ring of {} split", pairs.len());
        let helix = org.helices()[0].clone();
        assert!(helix.is_circular, "ring of {} not circular", pairs.len());
        let members: HashSet<usize> = helix.pairs.iter().copied().collect();
        assert_eq!(members, (0..pairs.len()).collect::<HashSet<_>>());
        assert_eq!(helix.len(), pairs.len());
        helix
    }

    #[test]
    fn closed_ring_is_a_single_circular_helix() {
        let helix = assert_single_circular_helix(&ring(8, 4.0), &HelixOrganizerConfig::default());
        assert!(!helix.has_break && !helix.has_mixed_direction);
    }

    #[test]
    fn small_rings_are_circular_for_every_size() {
        let config = HelixOrganizerConfig::default();
        for count in [4, 5, 6, 7] {
            for side in [6.0, 7.0] {
                assert_single_circular_helix(&ring(count, side), &config);
            }
        }
    }

    #[test]
    fn missing_evidence_is_flagged_not_fatal() {
        let f0 = ReferenceFrame::identity_at(Point3::origin());
        let f1 = ReferenceFrame::identity_at(Point3::new(0.0, 0.0, 3.4));
        let mut a = pair(idx(1), idx(4), f0, f0.flipped());
        let mut b = pair(idx(2), idx(3), f1, f1);
        a.pair_type = BasePairType::NonCanonical;
        b.pair_type = BasePairType::NonCanonical;
        let config = HelixOrganizerConfig::default();

        let org = HelixOrganizer::new(&config).organize(&[a, b], None, None);
        assert_eq!(org.helices().len(), 1);
        assert!(org.helices()[0].has_mixed_direction);
        assert_eq!(org.strand_swapped(), &[false, false]);
    }

    #[test]
    fn distant_stacks_form_separate_helices_and_gaps_flag_breaks() {
        let mut pairs = duplex_pairs(3);
        let far = ReferenceFrame::identity_at(Point3::new(40.0, 0.0, 0.0));
        pairs.push(pair(idx(10), idx(11), far, far.flipped()));
        let config = HelixOrganizerConfig {
            helix_break: 3.0,
            ..HelixOrganizerConfig::default()
        };

        let org = HelixOrganizer::new(&config).organize(&pairs, None, None);
        assert_eq!(org.helices().len(), 2);
        assert_eq!(org.helices()[0].pairs, vec![0, 1, 2]);
        assert!(org.helices()[0].has_break);
        assert_eq!(org.helices()[1].pairs, vec![3]);
        assert_eq!(org.order().len(), 4);
    }

    #[test]
    fn chain_based_mode_uses_chain_order() {
        let n = 4;
        let structure = ideal_duplex(n);
        let chains = ChainConnectivity::from_structure(&structure);
        let config = HelixOrganizerConfig {
            ordering_mode: OrderingMode::ChainBased,
            ..HelixOrganizerConfig::default()
        };
        let pairs = duplex_pairs(n);
        let org = HelixOrganizer::new(&config).organize(&pairs, None, Some(&chains));
        assert_eq!(org.helices().len(), 1);
        assert!(org.strand_swapped().iter().all(|&s| !s));
    }

    #[test]
    fn empty_input_gives_empty_organization() {
        let config = HelixOrganizerConfig::default();
        let org = HelixOrganizer::new(&config).organize(&[], None, None);
        assert!(org.helices().is_empty());
        assert!(org.order().is_empty());
    }
}
