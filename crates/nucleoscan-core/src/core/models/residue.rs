use super::frame::ReferenceFrame;
use super::ids::LegacyIndex;
use crate::core::utils::identifiers;
use nalgebra::Point3;
use std::collections::HashMap;

/// A residue as seen by the pairing engine: identity, base letter, its precomputed
/// reference frame (if the frame calculator produced one) and named atom coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub legacy_index: LegacyIndex,
    pub name: String,        // Residue name from the source structure (e.g., "DG", "A")
    pub chain_id: char,      // Chain identifier
    pub residue_number: isize, // Residue sequence number from source file
    pub base: char,          // One-letter base code; lower-case marks a modified base
    pub frame: Option<ReferenceFrame>,
    atoms: HashMap<String, Point3<f64>>,
}

impl Residue {
    pub(crate) fn new(
        legacy_index: LegacyIndex,
        name: &str,
        chain_id: char,
        residue_number: isize,
        base: char,
    ) -> Self {
        Self {
            legacy_index,
            name: name.to_string(),
            chain_id,
            residue_number,
            base,
            frame: None,
            atoms: HashMap::new(),
        }
    }

    pub fn add_atom(&mut self, atom_name: &str, position: Point3<f64>) {
        self.atoms.insert(atom_name.trim().to_string(), position);
    }

    pub fn atom(&self, name: &str) -> Option<&Point3<f64>> {
        self.atoms.get(name)
    }

    pub fn atoms(&self) -> impl Iterator<Item = (&str, &Point3<f64>)> {
        self.atoms.iter().map(|(name, pos)| (name.as_str(), pos))
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Coordinates of the ring atoms present on this residue, in ring order.
    pub fn ring_atoms(&self) -> Vec<Point3<f64>> {
        identifiers::ring_atom_names(self.base)
            .iter()
            .filter_map(|name| self.atoms.get(*name).copied())
            .collect()
    }

    /// The glycosidic ring nitrogen (N9 purine / N1 pyrimidine), if present.
    pub fn glycosidic_nitrogen(&self) -> Option<&Point3<f64>> {
        identifiers::glycosidic_nitrogen(self.base).and_then(|name| self.atoms.get(name))
    }

    pub fn o3_prime(&self) -> Option<&Point3<f64>> {
        self.atoms.get(identifiers::O3_PRIME)
    }

    pub fn phosphorus(&self) -> Option<&Point3<f64>> {
        self.atoms.get(identifiers::PHOSPHORUS)
    }
}

/// Decides whether a residue takes part in base pairing.
pub trait NucleotideChecker {
    fn is_nucleotide(&self, residue: &Residue) -> bool;
}

/// Accepts residues that carry a reference frame and either a recognised base letter or
/// enough ring atoms to be a base.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardNucleotideChecker;

impl NucleotideChecker for StandardNucleotideChecker {
    fn is_nucleotide(&self, residue: &Residue) -> bool {
        if residue.frame.is_none() {
            return false;
        }
        identifiers::is_known_base(residue.base) || residue.ring_atoms().len() >= 6
    }
}

impl<F> NucleotideChecker for F
where
    F: Fn(&Residue) -> bool,
{
    fn is_nucleotide(&self, residue: &Residue) -> bool {
        self(residue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residue(base: char) -> Residue {
        Residue::new(LegacyIndex::new(1).unwrap(), "G", 'A', 1, base)
    }

    #[test]
    fn new_residue_initializes_fields_correctly() {
        let res = residue('G');
        assert_eq!(res.legacy_index.get(), 1);
        assert_eq!(res.name, "G");
        assert_eq!(res.chain_id, 'A');
        assert!(res.frame.is_none());
        assert_eq!(res.atom_count(), 0);
    }

    #[test]
    fn add_atom_trims_names() {
        let mut res = residue('G');
        res.add_atom(" N9 ", Point3::new(1.0, 0.0, 0.0));
        assert_eq!(res.glycosidic_nitrogen(), Some(&Point3::new(1.0, 0.0, 0.0)));
        assert!(res.o3_prime().is_none());
    }

    #[test]
    fn pyrimidine_uses_n1_as_glycosidic_nitrogen() {
        let mut res = residue('C');
        res.add_atom("N9", Point3::new(1.0, 0.0, 0.0));
        assert!(res.glycosidic_nitrogen().is_none());
        res.add_atom("N1", Point3::new(2.0, 0.0, 0.0));
        assert_eq!(res.glycosidic_nitrogen(), Some(&Point3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn ring_atoms_follow_ring_order_and_skip_missing() {
        let mut res = residue('C');
        res.add_atom("N1", Point3::new(1.0, 0.0, 0.0));
        res.add_atom("C4", Point3::new(0.0, 0.0, 0.0));
        let ring = res.ring_atoms();
        assert_eq!(ring, vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)]);
    }

    #[test]
    fn standard_checker_requires_a_frame() {
        let mut res = residue('A');
        assert!(!StandardNucleotideChecker.is_nucleotide(&res));
        res.frame = Some(ReferenceFrame::identity_at(Point3::origin()));
        assert!(StandardNucleotideChecker.is_nucleotide(&res));
        res.base = 'X';
        assert!(!StandardNucleotideChecker.is_nucleotide(&res));
    }

    #[test]
    fn closures_act_as_checkers() {
        let res = residue('A');
        let always = |_: &Residue| true;
        assert!(always.is_nucleotide(&res));
    }
}
