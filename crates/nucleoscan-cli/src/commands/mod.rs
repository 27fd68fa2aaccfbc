pub mod analyze;
pub mod validate_config;
