use crate::core::hbond::HydrogenBond;
use crate::core::models::frame::ReferenceFrame;
use crate::core::models::pair::BasePairType;
use crate::core::utils::identifiers;
use crate::engine::config::SelectionPolicy;
use crate::engine::parameters::{BasePairParameters, base_pair_parameters};
use crate::engine::validation::ValidationResult;

const MAX_CANONICAL_STRETCH: f64 = 2.0;
const MAX_CANONICAL_OPENING: f64 = 60.0;
const WATSON_CRICK_MAX_SHEAR: f64 = 1.8;
const WOBBLE_MAX_SHEAR: f64 = 2.8;
const GOOD_HBOND_FULL_CREDIT: usize = 2;
const FULL_HBOND_ADJUSTMENT: f64 = 3.0;

/// Validation output plus everything the selection strategies rank on.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateInfo {
    pub result: ValidationResult,
    pub pair_type: BasePairType,
    /// Raw quality score minus the hydrogen-bond adjustment.
    pub adjusted_score: f64,
    /// Score candidates are ranked by (lower is better).
    pub selection_score: f64,
}

impl CandidateInfo {
    pub fn is_valid(&self) -> bool {
        self.result.is_valid
    }
}

/// Turns a [`ValidationResult`] into ranking scores and a pair type.
#[derive(Debug, Clone)]
pub struct QualityScorer<'a> {
    policy: &'a SelectionPolicy,
}

impl<'a> QualityScorer<'a> {
    pub fn new(policy: &'a SelectionPolicy) -> Self {
        Self { policy }
    }

    /// Standard hydrogen bonds whose length lies inside the policy's "good" window.
    pub fn good_hbond_count(&self, hbonds: &[HydrogenBond]) -> usize {
        hbonds
            .iter()
            .filter(|b| b.is_standard() && self.policy.good_hbond_distance.contains(b.distance))
            .count()
    }

    pub fn adjusted_score(&self, result: &ValidationResult) -> f64 {
        let good = self.good_hbond_count(&result.hbonds);
        let adjustment = if good >= GOOD_HBOND_FULL_CREDIT {
            FULL_HBOND_ADJUSTMENT
        } else {
            good as f64
        };
        result.quality_score - adjustment
    }

    /// Classifies a validated pair from its direction cosines, intra-pair parameters and
    /// base letters. `frame1`/`frame2` are the frames the result was computed from.
    pub fn classify(
        &self,
        result: &ValidationResult,
        frame1: &ReferenceFrame,
        frame2: &ReferenceFrame,
        base1: char,
        base2: char,
    ) -> BasePairType {
        if !result.is_valid {
            return BasePairType::Unknown;
        }
        if !result.is_anti_parallel_pattern() {
            return BasePairType::NonCanonical;
        }
        let (params, _) = base_pair_parameters(frame1, frame2);
        classify_anti_parallel(&params, identifiers::is_watson_crick_pair(base1, base2))
    }

    pub fn score(
        &self,
        result: ValidationResult,
        frame1: &ReferenceFrame,
        frame2: &ReferenceFrame,
        base1: char,
        base2: char,
    ) -> CandidateInfo {
        let pair_type = self.classify(&result, frame1, frame2, base1, base2);
        let adjusted_score = self.adjusted_score(&result);
        let selection_score = if pair_type == BasePairType::WatsonCrick {
            adjusted_score - self.policy.watson_crick_bonus
        } else {
            adjusted_score
        };
        CandidateInfo {
            result,
            pair_type,
            adjusted_score,
            selection_score,
        }
    }
}

fn classify_anti_parallel(params: &BasePairParameters, canonical_letters: bool) -> BasePairType {
    if !params.is_finite() {
        return BasePairType::Unknown;
    }
    if params.stretch.abs() > MAX_CANONICAL_STRETCH || params.opening.abs() > MAX_CANONICAL_OPENING {
        return BasePairType::NonCanonical;
    }
    let shear = params.shear.abs();
    if shear <= WATSON_CRICK_MAX_SHEAR && canonical_letters {
        BasePairType::WatsonCrick
    } else if (WATSON_CRICK_MAX_SHEAR..=WOBBLE_MAX_SHEAR).contains(&shear) {
        BasePairType::Wobble
    } else {
        BasePairType::NonCanonical
    }
}
