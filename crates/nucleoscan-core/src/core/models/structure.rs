use super::frame::ReferenceFrame;
use super::ids::LegacyIndex;
use super::residue::{NucleotideChecker, Residue};
use nalgebra::Point3;

/// Contiguous, legacy-index-keyed residue arena.
///
/// Residues receive legacy indices `1..=n` in insertion order; lookups are O(1) slot
/// accesses and nothing holds references into the arena across mutations.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    residues: Vec<Residue>,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a residue and returns its legacy index.
    pub fn add_residue(
        &mut self,
        name: &str,
        chain_id: char,
        residue_number: isize,
        base: char,
    ) -> LegacyIndex {
        let index = LegacyIndex::from_slot(self.residues.len());
        self.residues
            .push(Residue::new(index, name, chain_id, residue_number, base));
        index
    }

    pub fn residue(&self, index: LegacyIndex) -> Option<&Residue> {
        self.residues.get(index.slot())
    }

    pub fn residue_mut(&mut self, index: LegacyIndex) -> Option<&mut Residue> {
        self.residues.get_mut(index.slot())
    }

    pub fn set_frame(&mut self, index: LegacyIndex, frame: ReferenceFrame) -> bool {
        match self.residue_mut(index) {
            Some(residue) => {
                residue.frame = Some(frame);
                true
            }
            None => false,
        }
    }

    pub fn add_atom(&mut self, index: LegacyIndex, atom_name: &str, position: Point3<f64>) -> bool {
        match self.residue_mut(index) {
            Some(residue) => {
                residue.add_atom(atom_name, position);
                true
            }
            None => false,
        }
    }

    /// Residues in ascending legacy-index order.
    pub fn residues(&self) -> impl Iterator<Item = &Residue> {
        self.residues.iter()
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// Legacy indices of residues accepted by `checker`, ascending.
    pub fn nucleotide_indices(&self, checker: &dyn NucleotideChecker) -> Vec<LegacyIndex> {
        self.residues
            .iter()
            .filter(|r| checker.is_nucleotide(r))
            .map(|r| r.legacy_index)
            .collect()
    }
}
