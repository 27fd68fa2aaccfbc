use crate::cli::AnalyzeArgs;
use crate::error::{CliError, Result};
use nucleoscan::engine::config::{self as core_config, OrderingMode, Range, SelectionStrategyKind, TieBreak};
use serde::Deserialize;
use serde::de::value::{Error as ValueError, StrDeserializer};
use serde::de::{DeserializeOwned, IntoDeserializer};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialValidationConfig {
    origin_distance: Option<Range>,
    vertical_distance: Option<Range>,
    plane_angle: Option<Range>,
    min_base_nitrogen_distance: Option<f64>,
    min_hbond_count: Option<usize>,
    hbond_distance: Option<Range>,
    overlap_threshold: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialHelixConfig {
    helix_break: Option<f64>,
    neighbor_cutoff: Option<f64>,
    max_backbone_link_distance: Option<f64>,
    end_stack_angle: Option<f64>,
    ordering_mode: Option<OrderingMode>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialSelectionConfig {
    score_tolerance: Option<f64>,
    tie_break: Option<TieBreak>,
    good_hbond_distance: Option<Range>,
    watson_crick_bonus: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialParameterConfig {
    start: Option<usize>,
    stride: Option<usize>,
    wrap_circular: Option<bool>,
}

/// Configuration as read from a TOML file: every section and every key is optional.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct PartialAnalysisConfig {
    strategy: Option<SelectionStrategyKind>,
    validation: Option<PartialValidationConfig>,
    helix: Option<PartialHelixConfig>,
    selection: Option<PartialSelectionConfig>,
    parameters: Option<PartialParameterConfig>,
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: {}", key, value))
    })
}

/// Parses a kebab-case enum keyword such as `chain-based`.
fn parse_keyword<T: DeserializeOwned>(key: &str, value: &str) -> Result<T> {
    let deserializer: StrDeserializer<'_, ValueError> = value.trim().into_deserializer();
    T::deserialize(deserializer)
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}

impl PartialAnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_optional_file(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Applies `-S section.key=value` overrides on top of the file values.
    pub fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();

            match key {
                "validation.min-base-nitrogen-distance" => {
                    self.validation.get_or_insert_with(Default::default).min_base_nitrogen_distance =
                        Some(parse_value(key, value)?);
                }
                "validation.min-hbond-count" => {
                    self.validation.get_or_insert_with(Default::default).min_hbond_count =
                        Some(parse_value(key, value)?);
                }
                "validation.overlap-threshold" => {
                    self.validation.get_or_insert_with(Default::default).overlap_threshold =
                        Some(parse_value(key, value)?);
                }
                "helix.helix-break" => {
                    self.helix.get_or_insert_with(Default::default).helix_break = Some(parse_value(key, value)?);
                }
                "helix.neighbor-cutoff" => {
                    self.helix.get_or_insert_with(Default::default).neighbor_cutoff = Some(parse_value(key, value)?);
                }
                "helix.max-backbone-link-distance" => {
                    self.helix.get_or_insert_with(Default::default).max_backbone_link_distance =
                        Some(parse_value(key, value)?);
                }
                "helix.end-stack-angle" => {
                    self.helix.get_or_insert_with(Default::default).end_stack_angle = Some(parse_value(key, value)?);
                }
                "helix.ordering-mode" => {
                    self.helix.get_or_insert_with(Default::default).ordering_mode = Some(parse_keyword(key, value)?);
                }
                "selection.score-tolerance" => {
                    self.selection.get_or_insert_with(Default::default).score_tolerance =
                        Some(parse_value(key, value)?);
                }
                "selection.watson-crick-bonus" => {
                    self.selection.get_or_insert_with(Default::default).watson_crick_bonus =
                        Some(parse_value(key, value)?);
                }
                "selection.tie-break" => {
                    self.selection.get_or_insert_with(Default::default).tie_break = Some(parse_keyword(key, value)?);
                }
                "strategy" => {
                    self.strategy = Some(parse_keyword(key, value)?);
                }
                "parameters.start" => {
                    self.parameters.get_or_insert_with(Default::default).start = Some(parse_value(key, value)?);
                }
                "parameters.stride" => {
                    self.parameters.get_or_insert_with(Default::default).stride = Some(parse_value(key, value)?);
                }
                "parameters.wrap-circular" => {
                    self.parameters.get_or_insert_with(Default::default).wrap_circular =
                        Some(parse_value(key, value)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }

    /// Resolves file values over the library defaults and validates the result.
    pub fn build(self) -> Result<core_config::AnalysisConfig> {
        let mut validation = core_config::ValidationParameters::default();
        if let Some(v) = self.validation {
            validation.origin_distance = v.origin_distance.unwrap_or(validation.origin_distance);
            validation.vertical_distance = v.vertical_distance.unwrap_or(validation.vertical_distance);
            validation.plane_angle = v.plane_angle.unwrap_or(validation.plane_angle);
            validation.min_base_nitrogen_distance = v
                .min_base_nitrogen_distance
                .unwrap_or(validation.min_base_nitrogen_distance);
            validation.min_hbond_count = v.min_hbond_count.unwrap_or(validation.min_hbond_count);
            validation.hbond_distance = v.hbond_distance.unwrap_or(validation.hbond_distance);
            validation.overlap_threshold = v.overlap_threshold.unwrap_or(validation.overlap_threshold);
        }

        let mut helix = core_config::HelixOrganizerConfig::default();
        if let Some(h) = self.helix {
            helix.helix_break = h.helix_break.unwrap_or(helix.helix_break);
            helix.neighbor_cutoff = h.neighbor_cutoff.unwrap_or(helix.neighbor_cutoff);
            helix.max_backbone_link_distance = h
                .max_backbone_link_distance
                .unwrap_or(helix.max_backbone_link_distance);
            helix.end_stack_angle = h.end_stack_angle.unwrap_or(helix.end_stack_angle);
            helix.ordering_mode = h.ordering_mode.unwrap_or(helix.ordering_mode);
        }

        let mut policy = core_config::SelectionPolicy::default();
        let strategy = self.strategy.unwrap_or_default();
        if let Some(s) = self.selection {
            policy.score_tolerance = s.score_tolerance.unwrap_or(policy.score_tolerance);
            policy.tie_break = s.tie_break.unwrap_or(policy.tie_break);
            policy.good_hbond_distance = s.good_hbond_distance.unwrap_or(policy.good_hbond_distance);
            policy.watson_crick_bonus = s.watson_crick_bonus.unwrap_or(policy.watson_crick_bonus);
        }

        let mut parameters = core_config::ParameterOptions::default();
        if let Some(p) = self.parameters {
            parameters.start = p.start.unwrap_or(parameters.start);
            parameters.stride = p.stride.unwrap_or(parameters.stride);
            parameters.wrap_circular = p.wrap_circular.unwrap_or(parameters.wrap_circular);
        }

        core_config::AnalysisConfigBuilder::new()
            .validation(validation)
            .helix(helix)
            .selection_policy(policy)
            .parameters(parameters)
            .strategy(strategy)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// File values, then `-S` overrides, then dedicated flags; dedicated flags win.
    pub fn merge_with_cli(mut self, args: &AnalyzeArgs) -> Result<core_config::AnalysisConfig> {
        self.apply_set_values(&args.set_values)?;

        if let Some(strategy) = args.strategy {
            self.strategy = Some(strategy.into());
        }
        if let Some(tie_break) = args.tie_break {
            self.selection.get_or_insert_with(Default::default).tie_break = Some(tie_break.into());
        }
        if let Some(ordering) = args.ordering {
            self.helix.get_or_insert_with(Default::default).ordering_mode = Some(ordering.into());
        }

        let parameters = self.parameters.get_or_insert_with(Default::default);
        parameters.start = args.start.or(parameters.start);
        parameters.stride = args.stride.or(parameters.stride);
        if args.no_wrap {
            parameters.wrap_circular = Some(false);
        }

        self.build()
    }
}
