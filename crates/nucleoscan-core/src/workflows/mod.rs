//! # Workflows Module
//!
//! High-level entry points that tie the [`core`](crate::core) models and the
//! [`engine`](crate::engine) together.
//!
//! - **Analysis Workflow** ([`analyze`]) - Candidate validation, mutual-best-match pair
//!   selection, helix organization with strand assignment, and base-pair, step and helical
//!   parameters, reported phase by phase through a
//!   [`ProgressReporter`](crate::engine::progress::ProgressReporter).
//! - **Reports** ([`report`]) - CSV output of pairs, step parameters and helical parameters

pub mod analyze;
pub mod report;
