use crate::core::hbond::DistanceHydrogenBondDetector;
use crate::core::models::backbone::{Backbone, ChainConnectivity};
use crate::core::models::pair::BasePair;
use crate::core::models::residue::StandardNucleotideChecker;
use crate::core::models::structure::Structure;
use crate::engine::cache::PairCandidateCache;
use crate::engine::config::AnalysisConfig;
use crate::engine::error::EngineError;
use crate::engine::helix::{HelixOrganization, HelixOrganizer};
use crate::engine::parameters::{BasePairParameters, StepRecord, base_pair_parameters, compute_step_records};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::quality::QualityScorer;
use crate::engine::selection::strategy_for;
use crate::engine::validation::PairValidator;
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Counts describing one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AnalysisSummary {
    pub nucleotides: usize,
    pub candidates: usize,
    pub valid_candidates: usize,
    pub pairs: usize,
    pub helices: usize,
    pub circular_helices: usize,
    pub steps: usize,
}

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Selected pairs in selection order, with the organizer's strand assignment applied.
    pub pairs: Vec<BasePair>,
    /// Base-pair parameters, indexed like `pairs`.
    pub pair_parameters: Vec<BasePairParameters>,
    pub organization: HelixOrganization,
    pub steps: Vec<StepRecord>,
    pub summary: AnalysisSummary,
}

impl AnalysisResult {
    /// Pairs in final helix order, with their index into `pairs`.
    pub fn ordered_pairs(&self) -> impl Iterator<Item = (usize, &BasePair)> {
        self.organization
            .order()
            .iter()
            .map(|&i| (i, &self.pairs[i]))
    }

    /// Helix index of every pair, indexed like `pairs`.
    pub fn helix_of_pairs(&self) -> Vec<Option<usize>> {
        let mut helix_of = vec![None; self.pairs.len()];
        for (h, helix) in self.organization.helices().iter().enumerate() {
            for &p in &helix.pairs {
                helix_of[p] = Some(h);
            }
        }
        helix_of
    }
}

/// Runs candidate validation, pair selection, helix organization and parameter
/// calculation on a structure whose residues already carry reference frames.
#[instrument(skip_all, name = "analysis_workflow")]
pub fn run(
    structure: &Structure,
    config: &AnalysisConfig,
    reporter: &ProgressReporter,
) -> Result<AnalysisResult, EngineError> {
    config.validate()?;

    // === Phase 1: Candidate validation and scoring ===
    let nucleotides = structure.nucleotide_indices(&StandardNucleotideChecker);
    info!(
        residues = structure.len(),
        nucleotides = nucleotides.len(),
        "Starting base-pair analysis."
    );
    if nucleotides.len() < structure.len() {
        reporter.report(Progress::Message(format!(
            "Skipping {} residue(s) that are not framed nucleotides",
            structure.len() - nucleotides.len()
        )));
    }

    let detector = DistanceHydrogenBondDetector::default();
    let validator = PairValidator::new(&config.validation, &detector);
    let scorer = QualityScorer::new(&config.selection);
    let cache = reporter.phase("Validating Candidates", || {
        PairCandidateCache::build(structure, &nucleotides, &validator, &scorer, reporter)
    })?;

    // === Phase 2: Pair selection ===
    let strategy = strategy_for(config.strategy, &config.selection);
    let mut pairs = reporter.phase("Selecting Pairs", || strategy.select(structure, &cache))?;
    info!(strategy = strategy.name(), pairs = pairs.len(), "Pair selection complete.");
    if pairs.is_empty() && !nucleotides.is_empty() {
        warn!("No base pairs were found.");
    }

    // === Phase 3: Helix organization ===
    let backbone = Backbone::from_structure(structure);
    let chains = ChainConnectivity::from_structure(structure);
    let organization = reporter.phase("Organizing Helices", || {
        HelixOrganizer::new(&config.helix).organize(
            &pairs,
            (!backbone.is_empty()).then_some(&backbone),
            (!chains.is_empty()).then_some(&chains),
        )
    });
    organization.apply_strands(&mut pairs);

    // === Phase 4: Base-pair, step and helical parameters ===
    let (pair_parameters, steps) = reporter.phase("Computing Parameters", || {
        let pair_parameters: Vec<BasePairParameters> = pairs
            .iter()
            .map(|pair| {
                let (strand1, strand2) = pair.strand_frames();
                base_pair_parameters(strand1, strand2).0
            })
            .collect();
        compute_step_records(&pairs, &organization, &config.parameters)
            .map(|steps| (pair_parameters, steps))
    })?;

    let summary = AnalysisSummary {
        nucleotides: nucleotides.len(),
        candidates: cache.len(),
        valid_candidates: cache.valid_count(),
        pairs: pairs.len(),
        helices: organization.helices().len(),
        circular_helices: organization.helices().iter().filter(|h| h.is_circular).count(),
        steps: steps.len(),
    };
    info!(
        pairs = summary.pairs,
        helices = summary.helices,
        steps = summary.steps,
        "Analysis complete."
    );

    Ok(AnalysisResult {
        pairs,
        pair_parameters,
        organization,
        steps,
        summary,
    })
}
