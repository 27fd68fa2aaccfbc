use crate::core::models::frame::ReferenceFrame;
use crate::core::utils::geometry::angle_between_deg;
use crate::engine::config::HelixOrganizerConfig;
use kiddo::{KdTree, SquaredEuclidean};
use std::cmp::Ordering;
use tracing::trace;

/// Minimum angle between the directions to a pair's two neighbors (degrees).
const MIN_NEIGHBOR_SPREAD: f64 = 45.0;

/// Undirected stacking graph over pairs; every node has at most two links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NeighborGraph {
    links: Vec<Vec<usize>>,
}

impl NeighborGraph {
    pub(crate) fn len(&self) -> usize {
        self.links.len()
    }

    /// Linked pairs, ascending.
    pub(crate) fn links(&self, index: usize) -> &[usize] {
        &self.links[index]
    }

    pub(crate) fn degree(&self, index: usize) -> usize {
        self.links[index].len()
    }

    #[cfg(test)]
    pub(crate) fn are_linked(&self, a: usize, b: usize) -> bool {
        self.links[a].contains(&b)
    }
}

fn stacks_with(
    frames: &[ReferenceFrame],
    a: usize,
    b: usize,
    config: &HelixOrganizerConfig,
) -> bool {
    angle_between_deg(&frames[a].x_axis(), &frames[b].x_axis()) <= config.end_stack_angle
}

/// Up to two proposed neighbors of `index`: the nearest stacking pair and the nearest
/// remaining stacking pair that does not lie in the same direction as the first.
fn propose(
    tree: &KdTree<f64, 3>,
    frames: &[ReferenceFrame],
    index: usize,
    config: &HelixOrganizerConfig,
) -> Vec<usize> {
    let origin = frames[index].origin;
    let query = [origin.x, origin.y, origin.z];
    let cutoff_sq = config.neighbor_cutoff * config.neighbor_cutoff;

    let mut candidates: Vec<(f64, usize)> = tree
        .within::<SquaredEuclidean>(&query, cutoff_sq)
        .into_iter()
        .map(|n| (n.distance, n.item as usize))
        .filter(|&(_, k)| k != index && stacks_with(frames, index, k, config))
        .collect();
    candidates.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then(a.1.cmp(&b.1))
    });

    let Some(&(_, first)) = candidates.first() else {
        return Vec::new();
    };
    let towards_first = frames[first].origin - origin;
    let second = candidates
        .iter()
        .skip(1)
        .map(|&(_, k)| k)
        .find(|&k| {
            angle_between_deg(&(frames[k].origin - origin), &towards_first) > MIN_NEIGHBOR_SPREAD
        });

    let mut proposals = vec![first];
    proposals.extend(second);
    proposals
}

/// Links pairs whose base-pair frames stack onto each other; a link is kept only when both
/// pairs propose it.
pub(crate) fn find_neighbors(
    frames: &[ReferenceFrame],
    config: &HelixOrganizerConfig,
) -> NeighborGraph {
    if frames.is_empty() {
        return NeighborGraph { links: Vec::new() };
    }
    let centers: Vec<[f64; 3]> = frames
        .iter()
        .map(|f| [f.origin.x, f.origin.y, f.origin.z])
        .collect();
    let tree: KdTree<f64, 3> = (&centers).into();

    let proposals: Vec<Vec<usize>> = (0..frames.len())
        .map(|i| propose(&tree, frames, i, config))
        .collect();

    let links = proposals
        .iter()
        .enumerate()
        .map(|(i, proposed)| {
            let mut mutual: Vec<usize> = proposed
                .iter()
                .copied()
                .filter(|&k| proposals[k].contains(&i))
                .collect();
            mutual.sort_unstable();
            trace!(pair = i, ?mutual, "Pair neighbors resolved.");
            mutual
        })
        .collect();
    NeighborGraph { links }
}
