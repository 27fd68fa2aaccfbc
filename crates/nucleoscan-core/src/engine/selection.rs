//! Strategies that turn the candidate cache into a list of base pairs.

use crate::core::models::ids::{LegacyIndex, PairKey};
use crate::core::models::pair::{BasePair, SelectedPair};
use crate::core::models::structure::Structure;
use crate::engine::cache::PairCandidateCache;
use crate::engine::config::{SelectionPolicy, SelectionStrategyKind, TieBreak};
use crate::engine::error::EngineError;
use crate::engine::quality::CandidateInfo;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub trait PairSelectionStrategy {
    fn name(&self) -> &'static str;

    fn select(
        &self,
        structure: &Structure,
        cache: &PairCandidateCache,
    ) -> Result<Vec<SelectedPair>, EngineError>;
}

/// Builds the strategy configured by `kind`.
pub fn strategy_for(
    kind: SelectionStrategyKind,
    policy: &SelectionPolicy,
) -> Box<dyn PairSelectionStrategy + Send + Sync> {
    match kind {
        SelectionStrategyKind::BestPair => Box::new(MutualBestMatch::new(policy)),
        SelectionStrategyKind::AllPairs => Box::new(AllPairs),
    }
}

fn build_pair(
    structure: &Structure,
    key: PairKey,
    info: &CandidateInfo,
) -> Result<BasePair, EngineError> {
    let residue1 = structure
        .residue(key.low())
        .ok_or(EngineError::ResidueNotFound { index: key.low() })?;
    let residue2 = structure
        .residue(key.high())
        .ok_or(EngineError::ResidueNotFound { index: key.high() })?;
    let frame1 = residue1
        .frame
        .ok_or(EngineError::MissingFrame { index: key.low() })?;
    let frame2 = residue2
        .frame
        .ok_or(EngineError::MissingFrame { index: key.high() })?;

    Ok(BasePair {
        residue1: key.low(),
        residue2: key.high(),
        base1: residue1.base,
        base2: residue2.base,
        frame1,
        frame2,
        pair_type: info.pair_type,
        hbonds: info.result.hbonds.clone(),
        quality_score: info.result.quality_score,
        selection_score: info.selection_score,
        strand_swapped: false,
    })
}

/// `matched` is indexed by legacy index; slot 0 is unused.
fn is_matched(matched: &[bool], index: LegacyIndex) -> bool {
    matched.get(index.get()).copied().unwrap_or(false)
}

/// Mutual-best-match selection.
///
/// Each round first computes, for every unmatched residue, its best unmatched partner
/// against a frozen matched set; those scans are independent and may run in parallel.
/// The commit phase then accepts every mutual pair in ascending legacy-index order. Rounds
/// repeat until one adds nothing, so at most N/2 + 1 rounds run for N residues.
#[derive(Debug, Clone, Copy)]
pub struct MutualBestMatch {
    score_tolerance: f64,
    tie_break: TieBreak,
}

impl MutualBestMatch {
    pub fn new(policy: &SelectionPolicy) -> Self {
        Self {
            score_tolerance: policy.score_tolerance,
            tie_break: policy.tie_break,
        }
    }

    fn prefers_on_tie(&self, candidate: LegacyIndex, incumbent: LegacyIndex) -> bool {
        match self.tie_break {
            TieBreak::LowestLegacyIndex => candidate < incumbent,
            TieBreak::HighestLegacyIndex => candidate > incumbent,
        }
    }

    /// Best unmatched partner of `index`, or `None` when every valid partner is taken.
    pub fn best_partner(
        &self,
        cache: &PairCandidateCache,
        index: LegacyIndex,
        matched: &[bool],
    ) -> Option<LegacyIndex> {
        let mut best: Option<(LegacyIndex, f64)> = None;
        for &partner in cache.valid_partners(index) {
            if is_matched(matched, partner) {
                continue;
            }
            let Some(info) = cache.get(index, partner) else {
                continue;
            };
            let score = info.selection_score;
            best = match best {
                None => Some((partner, score)),
                Some((incumbent, best_score)) => {
                    if (score - best_score).abs() < self.score_tolerance {
                        if self.prefers_on_tie(partner, incumbent) {
                            Some((partner, score))
                        } else {
                            best
                        }
                    } else if score < best_score {
                        Some((partner, score))
                    } else {
                        best
                    }
                }
            };
        }
        best.map(|(partner, _)| partner)
    }

    /// Accepted pairs as residue keys, in discovery order.
    pub fn matching(&self, cache: &PairCandidateCache) -> Vec<PairKey> {
        let slots = cache.residues().iter().map(|r| r.get()).max().map_or(0, |m| m + 1);
        let mut matched = vec![false; slots];
        let mut accepted = Vec::new();
        let mut round = 0usize;

        loop {
            round += 1;
            let unmatched: Vec<LegacyIndex> = cache
                .residues()
                .iter()
                .copied()
                .filter(|&r| !is_matched(&matched, r))
                .collect();

            #[cfg(not(feature = "parallel"))]
            let iterator = unmatched.iter();

            #[cfg(feature = "parallel")]
            let iterator = unmatched.par_iter();

            let best: HashMap<LegacyIndex, LegacyIndex> = iterator
                .filter_map(|&i| self.best_partner(cache, i, &matched).map(|j| (i, j)))
                .collect();

            let before = accepted.len();
            for &i in &unmatched {
                let Some(&j) = best.get(&i) else {
                    continue;
                };
                if i < j && best.get(&j) == Some(&i) {
                    matched[i.get()] = true;
                    matched[j.get()] = true;
                    accepted.push(PairKey::new(i, j));
                }
            }

            let added = accepted.len() - before;
            debug!(round, added, unmatched = unmatched.len(), "Selection round finished.");
            if added == 0 {
                break;
            }
        }
        accepted
    }
}

impl PairSelectionStrategy for MutualBestMatch {
    fn name(&self) -> &'static str {
        "best-pair"
    }

    #[instrument(skip_all, name = "mutual_best_match")]
    fn select(
        &self,
        structure: &Structure,
        cache: &PairCandidateCache,
    ) -> Result<Vec<SelectedPair>, EngineError> {
        let pairs = self
            .matching(cache)
            .into_iter()
            .map(|key| {
                let info = cache.get(key.low(), key.high()).ok_or_else(|| {
                    EngineError::Internal(format!("selected pair {key:?} missing from cache"))
                })?;
                build_pair(structure, key, info)
            })
            .collect::<Result<Vec<_>, _>>()?;
        info!(pairs = pairs.len(), "Mutual best-match selection complete.");
        Ok(pairs)
    }
}

/// Every valid candidate, without matching constraints.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllPairs;

impl PairSelectionStrategy for AllPairs {
    fn name(&self) -> &'static str {
        "all-pairs"
    }

    #[instrument(skip_all, name = "all_pairs")]
    fn select(
        &self,
        structure: &Structure,
        cache: &PairCandidateCache,
    ) -> Result<Vec<SelectedPair>, EngineError> {
        let pairs = cache
            .valid_candidates()
            .into_iter()
            .map(|(key, info)| build_pair(structure, key, info))
            .collect::<Result<Vec<_>, _>>()?;
        info!(pairs = pairs.len(), "Collected all valid candidate pairs.");
        Ok(pairs)
    }
}
