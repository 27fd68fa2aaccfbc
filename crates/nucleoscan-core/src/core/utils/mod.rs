//! Geometric helpers and static nucleotide chemistry tables shared across the crate.

pub mod geometry;
pub mod identifiers;
