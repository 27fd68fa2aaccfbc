//! # NucleoScan Core Library
//!
//! Base-pair identification and helix analysis for 3-D nucleic-acid structures whose
//! per-base reference frames are already known.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Structure`, `ReferenceFrame`,
//!   `BasePair`), nucleotide chemistry tables, geometry helpers, hydrogen-bond detection,
//!   and snapshot I/O.
//!
//! - **[`engine`]: The Logic Core.** Pair validation, quality scoring and classification,
//!   the candidate cache, mutual-best-match selection, helix organization with strand
//!   assignment, and the step/helical parameter calculator.
//!
//! - **[`workflows`]: The Public API.** The end-to-end `analyze` pipeline and its CSV
//!   reports.
//!
//! ```ignore
//! use nucleoscan::core::io::{snapshot::SnapshotFile, traits::StructureFile};
//! use nucleoscan::engine::{config::AnalysisConfig, progress::ProgressReporter};
//! use nucleoscan::workflows::analyze;
//!
//! let structure = SnapshotFile::read_from_path("duplex.toml")?;
//! let result = analyze::run(&structure, &AnalysisConfig::default(), &ProgressReporter::new())?;
//! for (_, pair) in result.ordered_pairs() {
//!     println!("{} {}", pair.label(), pair.pair_type);
//! }
//! ```

pub mod core;
pub mod engine;
pub mod workflows;
