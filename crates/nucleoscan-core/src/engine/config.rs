use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Inverted range for '{name}': min {min} is greater than max {max}")]
    InvertedRange {
        name: &'static str,
        min: f64,
        max: f64,
    },

    #[error("Parameter '{0}' must be a finite number")]
    NonFinite(&'static str),

    #[error("Parameter '{name}' must not be negative (got {value})")]
    Negative { name: &'static str, value: f64 },

    #[error("Parameter '{0}' must be strictly positive")]
    NotPositive(&'static str),

    #[error("Step stride must be at least 1")]
    ZeroStride,
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid configuration in '{path}': {source}")]
    Invalid { path: String, source: ConfigError },
}

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ConfigError::NonFinite(name));
        }
        if self.min < 0.0 {
            return Err(ConfigError::Negative {
                name,
                value: self.min,
            });
        }
        if self.min > self.max {
            return Err(ConfigError::InvertedRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

fn validate_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        Err(ConfigError::NonFinite(name))
    } else if value < 0.0 {
        Err(ConfigError::Negative { name, value })
    } else {
        Ok(())
    }
}

fn validate_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    validate_non_negative(name, value)?;
    if value == 0.0 {
        return Err(ConfigError::NotPositive(name));
    }
    Ok(())
}

/// Thresholds deciding whether two bases form a pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ValidationParameters {
    /// Distance between the two base origins (Å).
    pub origin_distance: Range,
    /// Origin displacement projected onto the mean base normal (Å).
    pub vertical_distance: Range,
    /// Angle between base normals folded into 0–90 (degrees).
    pub plane_angle: Range,
    /// Minimum N1/N9–N1/N9 distance (Å).
    pub min_base_nitrogen_distance: f64,
    /// Minimum number of base–base hydrogen bonds.
    pub min_hbond_count: usize,
    /// Donor–acceptor distance window for hydrogen bonds (Å).
    pub hbond_distance: Range,
    /// Ring overlap area at or above which the bases count as stacked (Å²).
    pub overlap_threshold: f64,
}

impl Default for ValidationParameters {
    fn default() -> Self {
        Self {
            origin_distance: Range::new(0.0, 15.0),
            vertical_distance: Range::new(0.0, 2.5),
            plane_angle: Range::new(0.0, 65.0),
            min_base_nitrogen_distance: 4.5,
            min_hbond_count: 1,
            hbond_distance: Range::new(1.8, 4.0),
            overlap_threshold: 0.01,
        }
    }
}

impl ValidationParameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.origin_distance.validate("origin-distance")?;
        self.vertical_distance.validate("vertical-distance")?;
        self.plane_angle.validate("plane-angle")?;
        self.hbond_distance.validate("hbond-distance")?;
        validate_non_negative("min-base-nitrogen-distance", self.min_base_nitrogen_distance)?;
        validate_non_negative("overlap-threshold", self.overlap_threshold)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderingMode {
    /// Backbone linkage first, then base-frame heuristics, chain data late.
    #[default]
    LegacyFiveToThree,
    /// Chain-connectivity evidence takes precedence over every other source.
    ChainBased,
}

/// Options for reordering pairs into helices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct HelixOrganizerConfig {
    /// Pair-center distance above which a step is flagged as a break (Å).
    pub helix_break: f64,
    /// Maximum pair-center distance for two pairs to be spatial neighbors (Å).
    pub neighbor_cutoff: f64,
    /// Maximum O3'–P distance for a covalent link (Å).
    pub max_backbone_link_distance: f64,
    /// Maximum angle between the x-axes of two stacked pairs (degrees).
    pub end_stack_angle: f64,
    pub ordering_mode: OrderingMode,
}

impl Default for HelixOrganizerConfig {
    fn default() -> Self {
        Self {
            helix_break: 7.8,
            neighbor_cutoff: 9.0,
            max_backbone_link_distance: 2.5,
            end_stack_angle: 125.0,
            ordering_mode: OrderingMode::LegacyFiveToThree,
        }
    }
}

impl HelixOrganizerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_positive("helix-break", self.helix_break)?;
        validate_positive("neighbor-cutoff", self.neighbor_cutoff)?;
        validate_positive("max-backbone-link-distance", self.max_backbone_link_distance)?;
        validate_non_negative("end-stack-angle", self.end_stack_angle)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// Equal scores go to the partner with the lower legacy index (reference behaviour).
    #[default]
    LowestLegacyIndex,
    /// Deliberate deviation: equal scores go to the higher legacy index.
    HighestLegacyIndex,
}

/// Compatibility policy for candidate ranking: everything that exists to reproduce the
/// reference pair lists bit-for-bit lives here rather than in the algorithms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct SelectionPolicy {
    /// Scores closer than this are ties.
    pub score_tolerance: f64,
    pub tie_break: TieBreak,
    /// Distance window for a "good" standard hydrogen bond (Å).
    pub good_hbond_distance: Range,
    /// Score bonus subtracted for Watson–Crick pairs.
    pub watson_crick_bonus: f64,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            score_tolerance: 1e-10,
            tie_break: TieBreak::LowestLegacyIndex,
            good_hbond_distance: Range::new(2.5, 3.5),
            watson_crick_bonus: 2.0,
        }
    }
}

impl SelectionPolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_non_negative("score-tolerance", self.score_tolerance)?;
        self.good_hbond_distance.validate("good-hbond-distance")?;
        if !self.watson_crick_bonus.is_finite() {
            return Err(ConfigError::NonFinite("watson-crick-bonus"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionStrategyKind {
    /// Mutual-best-match: each residue in at most one pair.
    #[default]
    BestPair,
    /// Every valid candidate, unconditionally.
    AllPairs,
}

/// Which consecutive pairs of the final order get step/helical parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ParameterOptions {
    /// Offset of the first step within each helix.
    pub start: usize,
    /// Distance between successive steps.
    pub stride: usize,
    /// Add the closing last→first step of circular helices.
    pub wrap_circular: bool,
}

impl Default for ParameterOptions {
    fn default() -> Self {
        Self {
            start: 0,
            stride: 1,
            wrap_circular: true,
        }
    }
}

impl ParameterOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stride == 0 {
            return Err(ConfigError::ZeroStride);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct AnalysisConfig {
    pub validation: ValidationParameters,
    pub helix: HelixOrganizerConfig,
    pub selection: SelectionPolicy,
    pub parameters: ParameterOptions,
    pub strategy: SelectionStrategyKind,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validation.validate()?;
        self.helix.validate()?;
        self.selection.validate()?;
        self.parameters.validate()?;
        Ok(())
    }

    /// Loads and validates a TOML configuration; missing sections take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let path_str = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        let config: AnalysisConfig =
            toml::from_str(&content).map_err(|e| ConfigLoadError::Toml {
                path: path_str.clone(),
                source: e,
            })?;
        config.validate().map_err(|e| ConfigLoadError::Invalid {
            path: path_str,
            source: e,
        })?;
        Ok(config)
    }
}

#[derive(Default)]
pub struct AnalysisConfigBuilder {
    validation: Option<ValidationParameters>,
    helix: Option<HelixOrganizerConfig>,
    selection: Option<SelectionPolicy>,
    parameters: Option<ParameterOptions>,
    strategy: Option<SelectionStrategyKind>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validation(mut self, params: ValidationParameters) -> Self {
        self.validation = Some(params);
        self
    }
    pub fn helix(mut self, config: HelixOrganizerConfig) -> Self {
        self.helix = Some(config);
        self
    }
    pub fn selection_policy(mut self, policy: SelectionPolicy) -> Self {
        self.selection = Some(policy);
        self
    }
    pub fn parameters(mut self, options: ParameterOptions) -> Self {
        self.parameters = Some(options);
        self
    }
    pub fn strategy(mut self, strategy: SelectionStrategyKind) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        let config = AnalysisConfig {
            validation: self.validation.unwrap_or_default(),
            helix: self.helix.unwrap_or_default(),
            selection: self.selection.unwrap_or_default(),
            parameters: self.parameters.unwrap_or_default(),
            strategy: self.strategy.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
        assert!(AnalysisConfigBuilder::new().build().is_ok());
    }

    #[test]
    fn inverted_range_is_rejected_at_build_time() {
        let validation = ValidationParameters {
            vertical_distance: Range::new(3.0, 1.0),
            ..Default::default()
        };
        let result = AnalysisConfigBuilder::new().validation(validation).build();
        assert_eq!(
            result.unwrap_err(),
            ConfigError::InvertedRange {
                name: "vertical-distance",
                min: 3.0,
                max: 1.0
            }
        );
    }

    #[test]
    fn zero_stride_is_rejected() {
        let options = ParameterOptions {
            stride: 0,
            ..Default::default()
        };
        assert_eq!(
            AnalysisConfigBuilder::new().parameters(options).build().unwrap_err(),
            ConfigError::ZeroStride
        );
    }

    #[test]
    fn non_positive_cutoff_is_rejected() {
        let helix = HelixOrganizerConfig {
            neighbor_cutoff: 0.0,
            ..Default::default()
        };
        assert_eq!(helix.validate(), Err(ConfigError::NotPositive("neighbor-cutoff")));
    }

    #[test]
    fn range_contains_is_inclusive() {
        let r = Range::new(1.0, 2.0);
        assert!(r.contains(1.0));
        assert!(r.contains(2.0));
        assert!(!r.contains(2.0000001));
    }

    #[test]
    fn load_reads_partial_toml_with_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
strategy = "all-pairs"

[validation]
min-hbond-count = 2
plane-angle = {{ min = 0.0, max = 50.0 }}

[helix]
ordering-mode = "chain-based"
"#
        )
        .unwrap();

        let config = AnalysisConfig::load(file.path()).unwrap();
        assert_eq!(config.strategy, SelectionStrategyKind::AllPairs);
        assert_eq!(config.validation.min_hbond_count, 2);
        assert_eq!(config.validation.plane_angle, Range::new(0.0, 50.0));
        assert_eq!(config.validation.origin_distance, Range::new(0.0, 15.0));
        assert_eq!(config.helix.ordering_mode, OrderingMode::ChainBased);
        assert_eq!(config.parameters.stride, 1);
    }

    #[test]
    fn load_reports_invalid_configuration() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[validation]\norigin-distance = {{ min = 20.0, max = 15.0 }}"
        )
        .unwrap();
        assert!(matches!(
            AnalysisConfig::load(file.path()),
            Err(ConfigLoadError::Invalid { .. })
        ));
    }

    #[test]
    fn load_rejects_unknown_keys() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[validation]\nbogus = 1").unwrap();
        assert!(matches!(
            AnalysisConfig::load(file.path()),
            Err(ConfigLoadError::Toml { .. })
        ));
    }
}
