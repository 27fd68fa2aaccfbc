//! # Core Models Module
//!
//! Data structures describing a nucleic-acid structure as the pairing engine sees it.
//!
//! - [`ids`] - Legacy (1-based) residue indices and order-independent pair keys
//! - [`frame`] - Per-base reference frames supplied by the frame calculator
//! - [`residue`] - Residues with base letter, frame and named atom coordinates, and the
//!   [`NucleotideChecker`](residue::NucleotideChecker) seam
//! - [`structure`] - The legacy-index-keyed residue arena
//! - [`backbone`] - O3'/P linkage data and chain connectivity used for strand direction
//! - [`pair`] - Selected base pairs and their classification
//!
//! ```ignore
//! use nucleoscan::core::models::{frame::ReferenceFrame, structure::Structure};
//!
//! let mut structure = Structure::new();
//! let g = structure.add_residue("G", 'A', 1, 'G');
//! structure.set_frame(g, ReferenceFrame::identity_at(Point3::origin()));
//! ```

pub mod backbone;
pub mod frame;
pub mod ids;
pub mod pair;
pub mod residue;
pub mod structure;
