use super::ids::LegacyIndex;
use super::structure::Structure;
use nalgebra::Point3;
use std::collections::HashMap;

/// Backbone atoms whose proximity indicates a covalent 5'→3' link: the O3' of one residue
/// and the P of the next.
#[derive(Debug, Clone, Default)]
pub struct Backbone {
    o3_prime: HashMap<LegacyIndex, Point3<f64>>,
    phosphorus: HashMap<LegacyIndex, Point3<f64>>,
}

impl Backbone {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_structure(structure: &Structure) -> Self {
        let mut backbone = Self::new();
        for residue in structure.residues() {
            if let Some(o3) = residue.o3_prime() {
                backbone.o3_prime.insert(residue.legacy_index, *o3);
            }
            if let Some(p) = residue.phosphorus() {
                backbone.phosphorus.insert(residue.legacy_index, *p);
            }
        }
        backbone
    }

    pub fn insert_o3_prime(&mut self, index: LegacyIndex, position: Point3<f64>) {
        self.o3_prime.insert(index, position);
    }

    pub fn insert_phosphorus(&mut self, index: LegacyIndex, position: Point3<f64>) {
        self.phosphorus.insert(index, position);
    }

    pub fn o3_prime(&self, index: LegacyIndex) -> Option<&Point3<f64>> {
        self.o3_prime.get(&index)
    }

    pub fn phosphorus(&self, index: LegacyIndex) -> Option<&Point3<f64>> {
        self.phosphorus.get(&index)
    }

    pub fn is_empty(&self) -> bool {
        self.o3_prime.is_empty() || self.phosphorus.is_empty()
    }

    /// O3'(`from`)–P(`to`) distance, if both atoms are known.
    pub fn link_distance(&self, from: LegacyIndex, to: LegacyIndex) -> Option<f64> {
        let o3 = self.o3_prime.get(&from)?;
        let p = self.phosphorus.get(&to)?;
        Some((o3 - p).norm())
    }

    /// True when `from` is covalently linked 5'→3' to `to`.
    pub fn is_linked(&self, from: LegacyIndex, to: LegacyIndex, max_distance: f64) -> bool {
        self.link_distance(from, to)
            .is_some_and(|d| d <= max_distance)
    }

    /// O3'–O3' distance between two residues, if both are known.
    pub fn o3_distance(&self, a: LegacyIndex, b: LegacyIndex) -> Option<f64> {
        Some((self.o3_prime.get(&a)? - self.o3_prime.get(&b)?).norm())
    }
}

/// Chain membership and 5'→3' position of residues, as found by a chain detector.
#[derive(Debug, Clone, Default)]
pub struct ChainConnectivity {
    positions: HashMap<LegacyIndex, (usize, usize)>,
}

impl ChainConnectivity {
    /// Builds connectivity from chains listed 5'→3'.
    pub fn from_chains(chains: &[Vec<LegacyIndex>]) -> Self {
        let positions = chains
            .iter()
            .enumerate()
            .flat_map(|(chain, members)| {
                members
                    .iter()
                    .enumerate()
                    .map(move |(pos, &index)| (index, (chain, pos)))
            })
            .collect();
        Self { positions }
    }

    /// Groups residues by chain identifier in legacy-index order.
    pub fn from_structure(structure: &Structure) -> Self {
        let mut chain_order: Vec<char> = Vec::new();
        let mut chains: Vec<Vec<LegacyIndex>> = Vec::new();
        for residue in structure.residues() {
            let slot = match chain_order.iter().position(|&c| c == residue.chain_id) {
                Some(slot) => slot,
                None => {
                    chain_order.push(residue.chain_id);
                    chains.push(Vec::new());
                    chain_order.len() - 1
                }
            };
            chains[slot].push(residue.legacy_index);
        }
        Self::from_chains(&chains)
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn same_chain(&self, a: LegacyIndex, b: LegacyIndex) -> Option<bool> {
        Some(self.positions.get(&a)?.0 == self.positions.get(&b)?.0)
    }

    /// Signed chain-position offset from `a` to `b`, if both lie on the same chain.
    pub fn offset(&self, a: LegacyIndex, b: LegacyIndex) -> Option<isize> {
        let (chain_a, pos_a) = self.positions.get(&a)?;
        let (chain_b, pos_b) = self.positions.get(&b)?;
        (chain_a == chain_b).then(|| *pos_b as isize - *pos_a as isize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(n: usize) -> LegacyIndex {
        LegacyIndex::new(n).unwrap()
    }

    #[test]
    fn link_requires_o3_of_source_and_p_of_target() {
        let mut backbone = Backbone::new();
        backbone.insert_o3_prime(idx(1), Point3::new(0.0, 0.0, 0.0));
        backbone.insert_phosphorus(idx(2), Point3::new(1.6, 0.0, 0.0));
        assert!(backbone.is_linked(idx(1), idx(2), 2.5));
        assert!(!backbone.is_linked(idx(2), idx(1), 2.5));
        assert!(!backbone.is_linked(idx(1), idx(2), 1.0));
    }

    #[test]
    fn backbone_is_collected_from_structure_atoms() {
        let mut structure = Structure::new();
        let a = structure.add_residue("DA", 'A', 1, 'A');
        let b = structure.add_residue("DA", 'A', 2, 'A');
        structure.add_atom(a, "O3'", Point3::new(0.0, 0.0, 0.0));
        structure.add_atom(b, "P", Point3::new(1.6, 0.0, 0.0));
        let backbone = Backbone::from_structure(&structure);
        assert!(!backbone.is_empty());
        assert!(backbone.is_linked(a, b, 2.5));
        assert!(backbone.o3_distance(a, b).is_none());
    }

    #[test]
    fn chain_offsets_follow_listed_order() {
        let conn = ChainConnectivity::from_chains(&[vec![idx(1), idx(2), idx(3)], vec![idx(6), idx(5)]]);
        assert_eq!(conn.offset(idx(1), idx(3)), Some(2));
        assert_eq!(conn.offset(idx(6), idx(5)), Some(1));
        assert_eq!(conn.offset(idx(1), idx(5)), None);
        assert_eq!(conn.same_chain(idx(2), idx(5)), Some(false));
        assert_eq!(conn.same_chain(idx(2), idx(9)), None);
    }

    #[test]
    fn connectivity_from_structure_groups_by_chain_id() {
        let mut structure = Structure::new();
        let a1 = structure.add_residue("DA", 'A', 1, 'A');
        let b1 = structure.add_residue("DT", 'B', 1, 'T');
        let a2 = structure.add_residue("DA", 'A', 2, 'A');
        let conn = ChainConnectivity::from_structure(&structure);
        assert_eq!(conn.offset(a1, a2), Some(1));
        assert_eq!(conn.same_chain(a1, b1), Some(false));
    }
}
