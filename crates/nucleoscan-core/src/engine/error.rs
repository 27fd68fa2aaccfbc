use super::config::ConfigError;
use crate::core::models::ids::LegacyIndex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Residue {index} not found in structure")]
    ResidueNotFound { index: LegacyIndex },

    #[error("Residue {index} has no reference frame")]
    MissingFrame { index: LegacyIndex },

    #[error("Pair index {index} is out of range for {count} selected pairs")]
    PairOutOfRange { index: usize, count: usize },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_convert_into_engine_errors() {
        let err: EngineError = ConfigError::ZeroStride.into();
        assert!(matches!(err, EngineError::Config { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid configuration: Step stride must be at least 1"
        );
    }

    #[test]
    fn missing_frame_names_the_residue() {
        let err = EngineError::MissingFrame {
            index: LegacyIndex::new(12).unwrap(),
        };
        assert_eq!(err.to_string(), "Residue 12 has no reference frame");
    }
}
