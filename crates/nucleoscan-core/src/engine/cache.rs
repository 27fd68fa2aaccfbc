use crate::core::models::ids::{LegacyIndex, PairKey};
use crate::core::models::structure::Structure;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::quality::{CandidateInfo, QualityScorer};
use crate::engine::validation::PairValidator;
use itertools::Itertools;
use std::collections::HashMap;
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Validation and scoring results for every unordered pair of nucleotide residues.
///
/// Invalid pairs are kept too so diagnostics can explain why a pair was rejected. The
/// per-residue partner lists hold valid partners only, in ascending legacy-index order.
#[derive(Debug, Clone, Default)]
pub struct PairCandidateCache {
    residues: Vec<LegacyIndex>,
    entries: HashMap<PairKey, CandidateInfo>,
    partners: HashMap<LegacyIndex, Vec<LegacyIndex>>,
}

impl PairCandidateCache {
    /// Validates and scores all pairs among `residues` (expected ascending, no duplicates).
    #[instrument(skip_all, name = "candidate_cache_build")]
    pub fn build(
        structure: &Structure,
        residues: &[LegacyIndex],
        validator: &PairValidator,
        scorer: &QualityScorer,
        reporter: &ProgressReporter,
    ) -> Result<Self, EngineError> {
        let keys: Vec<PairKey> = residues
            .iter()
            .tuple_combinations()
            .map(|(&a, &b)| PairKey::new(a, b))
            .collect();

        info!(
            residues = residues.len(),
            candidates = keys.len(),
            "Building pair candidate cache."
        );
        reporter.report(Progress::TaskStart {
            total_steps: keys.len() as u64,
        });

        #[cfg(not(feature = "parallel"))]
        let iterator = keys.iter();

        #[cfg(feature = "parallel")]
        let iterator = keys.par_iter();

        let scored: Vec<(PairKey, CandidateInfo)> = iterator
            .map(|key| {
                let residue1 = structure
                    .residue(key.low())
                    .ok_or(EngineError::ResidueNotFound { index: key.low() })?;
                let residue2 = structure
                    .residue(key.high())
                    .ok_or(EngineError::ResidueNotFound { index: key.high() })?;
                let result = validator.validate(residue1, residue2)?;
                let frame1 = residue1
                    .frame
                    .as_ref()
                    .ok_or(EngineError::MissingFrame { index: key.low() })?;
                let frame2 = residue2
                    .frame
                    .as_ref()
                    .ok_or(EngineError::MissingFrame { index: key.high() })?;
                let info = scorer.score(result, frame1, frame2, residue1.base, residue2.base);
                reporter.report(Progress::TaskIncrement);
                Ok((*key, info))
            })
            .collect::<Result<_, EngineError>>()?;

        reporter.report(Progress::TaskFinish);

        let cache = Self::from_candidates(residues.to_vec(), scored);
        info!(
            valid = cache.valid_count(),
            "Pair candidate cache ready."
        );
        Ok(cache)
    }

    /// Assembles a cache from already scored candidates.
    pub fn from_candidates(
        mut residues: Vec<LegacyIndex>,
        candidates: impl IntoIterator<Item = (PairKey, CandidateInfo)>,
    ) -> Self {
        residues.sort_unstable();
        residues.dedup();

        let mut entries = HashMap::new();
        let mut partners: HashMap<LegacyIndex, Vec<LegacyIndex>> = HashMap::new();
        for (key, info) in candidates {
            if info.is_valid() {
                partners.entry(key.low()).or_default().push(key.high());
                partners.entry(key.high()).or_default().push(key.low());
            }
            entries.insert(key, info);
        }
        for list in partners.values_mut() {
            list.sort_unstable();
            list.dedup();
        }

        Self {
            residues,
            entries,
            partners,
        }
    }

    pub fn get(&self, a: LegacyIndex, b: LegacyIndex) -> Option<&CandidateInfo> {
        self.entries.get(&PairKey::new(a, b))
    }

    /// Valid partners of `index`, ascending.
    pub fn valid_partners(&self, index: LegacyIndex) -> &[LegacyIndex] {
        self.partners.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Residues the cache was built over, ascending.
    pub fn residues(&self) -> &[LegacyIndex] {
        &self.residues
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn valid_count(&self) -> usize {
        self.entries.values().filter(|info| info.is_valid()).count()
    }

    /// Valid candidates ordered by pair key.
    pub fn valid_candidates(&self) -> Vec<(PairKey, &CandidateInfo)> {
        self.entries
            .iter()
            .filter(|(_, info)| info.is_valid())
            .map(|(key, info)| (*key, info))
            .sorted_by_key(|(key, _)| *key)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hbond::DistanceHydrogenBondDetector;
    use crate::core::models::frame::ReferenceFrame;
    use crate::core::models::pair::BasePairType;
    use crate::core::models::residue::StandardNucleotideChecker;
    use crate::engine::config::{SelectionPolicy, ValidationParameters};
    use crate::engine::fixtures::{ideal_duplex, strand2_index, watson_crick_pair};
    use nalgebra::Point3;
    use std::sync::{Arc, Mutex};

    fn build(structure: &Structure, reporter: &ProgressReporter) -> PairCandidateCache {
        let params = ValidationParameters::default();
        let policy = SelectionPolicy::default();
        let detector = DistanceHydrogenBondDetector::default();
        let validator = PairValidator::new(&params, &detector);
        let scorer = QualityScorer::new(&policy);
        let residues = structure.nucleotide_indices(&StandardNucleotideChecker);
        PairCandidateCache::build(structure, &residues, &validator, &scorer, reporter).unwrap()
    }

    #[test]
    fn caches_every_pair_once_including_invalid_ones() {
        let structure = ideal_duplex(4);
        let cache = build(&structure, &ProgressReporter::new());
        assert_eq!(cache.residues().len(), 8);
        assert_eq!(cache.len(), 8 * 7 / 2);
        assert_eq!(cache.valid_count(), 4);
    }

    #[test]
    fn partner_index_lists_valid_partners_only() {
        let n = 4;
        let structure = ideal_duplex(n);
        let cache = build(&structure, &ProgressReporter::new());
        for k in 0..n {
            let strand1 = LegacyIndex::new(k + 1).unwrap();
            let strand2 = strand2_index(n, k);
            assert_eq!(cache.valid_partners(strand1), &[strand2]);
            assert_eq!(cache.valid_partners(strand2), &[strand1]);
            let info = cache.get(strand2, strand1).unwrap();
            assert_eq!(info.pair_type, BasePairType::WatsonCrick);
        }
    }

    #[test]
    fn lookups_are_order_independent() {
        let (structure, g, c) = watson_crick_pair(Point3::origin());
        let cache = build(&structure, &ProgressReporter::new());
        assert_eq!(cache.get(g, c), cache.get(c, g));
        assert!((cache.get(g, c).unwrap().selection_score + 5.0).abs() < 1e-9);
    }

    #[test]
    fn residues_without_frames_are_skipped_by_the_checker() {
        let (mut structure, _, _) = watson_crick_pair(Point3::origin());
        structure.add_residue("HOH", 'W', 1, 'X');
        let cache = build(&structure, &ProgressReporter::new());
        assert_eq!(cache.residues().len(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn empty_structure_builds_an_empty_cache() {
        let cache = build(&Structure::new(), &ProgressReporter::new());
        assert!(cache.is_empty());
        assert!(cache.valid_candidates().is_empty());
    }

    #[test]
    fn build_reports_one_increment_per_candidate() {
        let structure = ideal_duplex(3);
        let increments = Arc::new(Mutex::new(0u64));
        let sink = Arc::clone(&increments);
        let reporter = ProgressReporter::with_callback(Box::new(move |event: Progress| {
            if let Progress::TaskIncrement = event {
                *sink.lock().unwrap() += 1;
            }
        }));
        build(&structure, &reporter);
        assert_eq!(*increments.lock().unwrap(), 15);
    }

    #[test]
    fn requested_residue_without_frame_is_an_error() {
        let mut structure = Structure::new();
        let a = structure.add_residue("G", 'A', 1, 'G');
        let b = structure.add_residue("C", 'B', 1, 'C');
        structure.set_frame(a, ReferenceFrame::identity_at(Point3::origin()));
        let params = ValidationParameters::default();
        let policy = SelectionPolicy::default();
        let detector = DistanceHydrogenBondDetector::default();
        let validator = PairValidator::new(&params, &detector);
        let scorer = QualityScorer::new(&policy);
        let result = PairCandidateCache::build(
            &structure,
            &[a, b],
            &validator,
            &scorer,
            &ProgressReporter::new(),
        );
        assert!(matches!(result, Err(EngineError::MissingFrame { .. })));
    }
}
