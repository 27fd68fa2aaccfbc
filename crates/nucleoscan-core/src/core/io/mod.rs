//! Reading and writing structure snapshots.
//!
//! A snapshot carries what the pairing engine needs from an upstream frame calculator:
//! residue identity, base letter, the fitted base reference frame and named atom
//! coordinates. [`traits::StructureFile`] is the format seam; [`snapshot::SnapshotFile`]
//! implements it for TOML.

pub mod snapshot;
pub mod traits;
