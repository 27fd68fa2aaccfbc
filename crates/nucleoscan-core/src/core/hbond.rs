//! Hydrogen bonds between two residues.
//!
//! The engine only consumes H-bond lists; [`HydrogenBondDetector`] is the seam where a
//! dedicated detector can be plugged in. [`DistanceHydrogenBondDetector`] is the default:
//! a purely geometric donor/acceptor distance search with one bond per atom.

use crate::core::models::residue::Residue;
use crate::core::utils::identifiers::{self, HBondRole};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HBondKind {
    /// Donor/acceptor roles of the two atoms are compatible.
    Standard,
    /// Both atoms are polar but their roles are unknown or incompatible.
    NonStandard,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HydrogenBond {
    /// Atom on the first residue of the queried pair.
    pub atom1: String,
    /// Atom on the second residue of the queried pair.
    pub atom2: String,
    pub distance: f64,
    pub kind: HBondKind,
}

impl HydrogenBond {
    /// Both atoms belong to the bases (not sugar or phosphate).
    pub fn is_base_base(&self) -> bool {
        identifiers::is_base_atom(&self.atom1) && identifiers::is_base_atom(&self.atom2)
    }

    pub fn is_standard(&self) -> bool {
        self.kind == HBondKind::Standard
    }
}

pub trait HydrogenBondDetector: Send + Sync {
    /// Lists hydrogen bonds between `residue1` and `residue2` whose donor–acceptor
    /// distance falls inside `[min_distance, max_distance]`.
    fn detect(
        &self,
        residue1: &Residue,
        residue2: &Residue,
        min_distance: f64,
        max_distance: f64,
    ) -> Vec<HydrogenBond>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceHydrogenBondDetector {
    /// Also consider the ribose O2' hydroxyl as a donor/acceptor.
    pub include_o2_prime: bool,
}

impl DistanceHydrogenBondDetector {
    pub fn new(include_o2_prime: bool) -> Self {
        Self { include_o2_prime }
    }

    fn is_candidate_atom(&self, atom_name: &str) -> bool {
        identifiers::is_polar_atom(atom_name)
            && (identifiers::is_base_atom(atom_name) || (self.include_o2_prime && atom_name == "O2'"))
    }

    fn role(residue: &Residue, atom_name: &str) -> Option<HBondRole> {
        identifiers::hbond_role(residue.base, atom_name)
    }
}

impl HydrogenBondDetector for DistanceHydrogenBondDetector {
    fn detect(
        &self,
        residue1: &Residue,
        residue2: &Residue,
        min_distance: f64,
        max_distance: f64,
    ) -> Vec<HydrogenBond> {
        let mut candidates: Vec<HydrogenBond> = Vec::new();
        for (name1, pos1) in residue1.atoms().filter(|(n, _)| self.is_candidate_atom(n)) {
            for (name2, pos2) in residue2.atoms().filter(|(n, _)| self.is_candidate_atom(n)) {
                let distance = (pos1 - pos2).norm();
                if distance < min_distance || distance > max_distance {
                    continue;
                }
                let kind = if identifiers::is_donor_acceptor_compatible(
                    Self::role(residue1, name1),
                    Self::role(residue2, name2),
                ) {
                    HBondKind::Standard
                } else {
                    HBondKind::NonStandard
                };
                candidates.push(HydrogenBond {
                    atom1: name1.to_string(),
                    atom2: name2.to_string(),
                    distance,
                    kind,
                });
            }
        }

        // Shortest contact wins an atom; names make the order independent of map iteration.
        candidates.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.atom1.cmp(&b.atom1))
                .then_with(|| a.atom2.cmp(&b.atom2))
        });

        let mut used1: HashSet<String> = HashSet::new();
        let mut used2: HashSet<String> = HashSet::new();
        let mut bonds = Vec::new();
        for bond in candidates {
            if used1.contains(&bond.atom1) || used2.contains(&bond.atom2) {
                continue;
            }
            used1.insert(bond.atom1.clone());
            used2.insert(bond.atom2.clone());
            bonds.push(bond);
        }
        bonds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::structure::Structure;
    use nalgebra::Point3;

    fn watson_crick_like_pair() -> Structure {
        let mut structure = Structure::new();
        let a = structure.add_residue("A", 'A', 1, 'A');
        let u = structure.add_residue("U", 'B', 1, 'U');
        structure.add_atom(a, "N6", Point3::new(0.0, 0.0, 0.0));
        structure.add_atom(a, "N1", Point3::new(0.0, 2.5, 0.0));
        structure.add_atom(a, "C2", Point3::new(0.0, 4.0, 0.0));
        structure.add_atom(a, "O3'", Point3::new(0.0, -1.0, 0.0));
        structure.add_atom(u, "O4", Point3::new(2.9, 0.0, 0.0));
        structure.add_atom(u, "N3", Point3::new(2.9, 2.5, 0.0));
        structure.add_atom(u, "OP1", Point3::new(0.5, -1.0, 0.0));
        structure
    }

    #[test]
    fn finds_both_watson_crick_bonds() {
        let structure = watson_crick_like_pair();
        let a = structure.residue(crate::core::models::ids::LegacyIndex::new(1).unwrap()).unwrap();
        let u = structure.residue(crate::core::models::ids::LegacyIndex::new(2).unwrap()).unwrap();
        let bonds = DistanceHydrogenBondDetector::default().detect(a, u, 1.8, 4.0);

        assert_eq!(bonds.len(), 2);
        assert!(bonds.iter().all(|b| b.is_standard() && b.is_base_base()));
        assert!(bonds.iter().any(|b| b.atom1 == "N6" && b.atom2 == "O4"));
        assert!(bonds.iter().any(|b| b.atom1 == "N1" && b.atom2 == "N3"));
    }

    #[test]
    fn each_atom_takes_part_in_at_most_one_bond() {
        let mut structure = Structure::new();
        let g = structure.add_residue("G", 'A', 1, 'G');
        let c = structure.add_residue("C", 'B', 1, 'C');
        structure.add_atom(g, "O6", Point3::new(0.0, 0.0, 0.0));
        structure.add_atom(c, "N4", Point3::new(2.8, 0.0, 0.0));
        structure.add_atom(c, "N3", Point3::new(3.2, 0.5, 0.0));
        let g = structure.residue(g).unwrap();
        let c = structure.residue(c).unwrap();

        let bonds = DistanceHydrogenBondDetector::default().detect(g, c, 1.8, 4.0);
        assert_eq!(bonds.len(), 1);
        assert_eq!(bonds[0].atom2, "N4");
        assert_eq!(bonds[0].kind, HBondKind::Standard);
    }

    #[test]
    fn incompatible_roles_are_non_standard() {
        let mut structure = Structure::new();
        let a = structure.add_residue("A", 'A', 1, 'A');
        let u = structure.add_residue("U", 'B', 1, 'U');
        structure.add_atom(a, "N1", Point3::new(0.0, 0.0, 0.0));
        structure.add_atom(u, "O4", Point3::new(3.0, 0.0, 0.0));
        let a = structure.residue(a).unwrap();
        let u = structure.residue(u).unwrap();

        let bonds = DistanceHydrogenBondDetector::default().detect(a, u, 1.8, 4.0);
        assert_eq!(bonds.len(), 1);
        assert_eq!(bonds[0].kind, HBondKind::NonStandard);
    }

    #[test]
    fn contacts_outside_the_window_are_ignored() {
        let mut structure = Structure::new();
        let a = structure.add_residue("A", 'A', 1, 'A');
        let u = structure.add_residue("U", 'B', 1, 'U');
        structure.add_atom(a, "N6", Point3::new(0.0, 0.0, 0.0));
        structure.add_atom(u, "O4", Point3::new(4.5, 0.0, 0.0));
        let a = structure.residue(a).unwrap();
        let u = structure.residue(u).unwrap();
        assert!(DistanceHydrogenBondDetector::default().detect(a, u, 1.8, 4.0).is_empty());
    }

    #[test]
    fn o2_prime_is_opt_in() {
        let mut structure = Structure::new();
        let a = structure.add_residue("A", 'A', 1, 'A');
        let u = structure.add_residue("U", 'B', 1, 'U');
        structure.add_atom(a, "O2'", Point3::new(0.0, 0.0, 0.0));
        structure.add_atom(u, "O2", Point3::new(2.7, 0.0, 0.0));
        let a = structure.residue(a).unwrap();
        let u = structure.residue(u).unwrap();

        assert!(DistanceHydrogenBondDetector::default().detect(a, u, 1.8, 4.0).is_empty());
        let bonds = DistanceHydrogenBondDetector::new(true).detect(a, u, 1.8, 4.0);
        assert_eq!(bonds.len(), 1);
        assert!(!bonds[0].is_base_base());
    }
}
