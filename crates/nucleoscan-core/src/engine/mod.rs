//! # Engine Module
//!
//! The analysis engine: everything between a loaded [`Structure`](crate::core::models::structure::Structure)
//! and the final list of ordered base pairs with their parameters.
//!
//! ## Architecture
//!
//! - **Validation** ([`validation`]) - Geometric and hydrogen-bond checks for one residue pair
//! - **Quality** ([`quality`]) - Adjusted scores and base-pair type classification
//! - **Candidate Cache** ([`cache`]) - Every validated pair of a structure, computed once
//! - **Selection** ([`selection`]) - Mutual-best-match and other pair selection strategies
//! - **Helix Organization** ([`helix`]) - Neighbor search, helix ordering and strand assignment
//! - **Parameters** ([`parameters`]) - Base-pair, step and helical parameters
//! - **Configuration** ([`config`]) - Thresholds and policies, loadable from TOML
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine-specific error types
//!
//! Candidate scoring and the per-round best-partner search run in parallel when the
//! `parallel` feature is enabled; results never depend on thread count.

pub mod cache;
pub mod config;
pub mod error;
pub mod helix;
pub mod parameters;
pub mod progress;
pub mod quality;
pub mod selection;
pub mod validation;

#[cfg(test)]
pub(crate) mod fixtures;
