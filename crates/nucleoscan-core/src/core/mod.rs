//! # Core Module
//!
//! Stateless building blocks of the pairing engine.
//!
//! - **Structure Representation** ([`models`]) - Residues, reference frames, backbone
//!   linkage, and selected base pairs
//! - **Hydrogen Bonds** ([`hbond`]) - The detector seam and a distance-based default
//! - **Chemistry and Geometry** ([`utils`]) - Base atom tables, donor/acceptor roles, and
//!   the vector and polygon helpers the validator and parameter calculator share
//! - **File I/O** ([`io`]) - TOML structure snapshots

pub mod hbond;
pub mod io;
pub mod models;
pub mod utils;
