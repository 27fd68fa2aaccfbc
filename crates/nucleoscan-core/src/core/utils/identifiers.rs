use phf::{Map, Set, phf_map, phf_set};

static PURINE_BASES: Set<char> = phf_set! { 'A', 'G', 'I', 'P' };
static PYRIMIDINE_BASES: Set<char> = phf_set! { 'C', 'T', 'U' };

/// Canonical Watson–Crick base-letter combinations (strand I letter first).
static WATSON_CRICK_PAIRS: Set<&'static str> = phf_set! {
    "AT", "AU", "TA", "UA", "GC", "CG", "IC", "CI",
};

static PHOSPHATE_ATOM_NAMES: Set<&'static str> = phf_set! {
    "P", "OP1", "OP2", "OP3", "O1P", "O2P", "O3P",
};

pub const PURINE_RING_ATOMS: [&str; 9] = ["C4", "N3", "C2", "N1", "C6", "C5", "N7", "C8", "N9"];
pub const PYRIMIDINE_RING_ATOMS: [&str; 6] = ["C4", "N3", "C2", "N1", "C6", "C5"];

pub const O3_PRIME: &str = "O3'";
pub const PHOSPHORUS: &str = "P";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HBondRole {
    Donor,
    Acceptor,
    Either,
}

static BASE_HBOND_ROLES: Map<&'static str, HBondRole> = phf_map! {
    "A:N1" => HBondRole::Acceptor, "A:N3" => HBondRole::Acceptor,
    "A:N6" => HBondRole::Donor, "A:N7" => HBondRole::Acceptor,
    "G:N1" => HBondRole::Donor, "G:N2" => HBondRole::Donor, "G:N3" => HBondRole::Acceptor,
    "G:O6" => HBondRole::Acceptor, "G:N7" => HBondRole::Acceptor,
    "I:N1" => HBondRole::Donor, "I:N3" => HBondRole::Acceptor,
    "I:O6" => HBondRole::Acceptor, "I:N7" => HBondRole::Acceptor,
    "C:O2" => HBondRole::Acceptor, "C:N3" => HBondRole::Acceptor, "C:N4" => HBondRole::Donor,
    "T:O2" => HBondRole::Acceptor, "T:N3" => HBondRole::Donor, "T:O4" => HBondRole::Acceptor,
    "U:O2" => HBondRole::Acceptor, "U:N3" => HBondRole::Donor, "U:O4" => HBondRole::Acceptor,
};

/// Normalizes a one-letter base code; modified bases are conventionally lower-case.
pub fn parent_base(base: char) -> char {
    base.to_ascii_uppercase()
}

pub fn is_purine(base: char) -> bool {
    PURINE_BASES.contains(&parent_base(base))
}

pub fn is_pyrimidine(base: char) -> bool {
    PYRIMIDINE_BASES.contains(&parent_base(base))
}

pub fn is_known_base(base: char) -> bool {
    is_purine(base) || is_pyrimidine(base)
}

pub fn is_watson_crick_pair(base1: char, base2: char) -> bool {
    let key: String = [parent_base(base1), parent_base(base2)].iter().collect();
    WATSON_CRICK_PAIRS.contains(key.as_str())
}

/// Ring atoms used for base overlap, in ring order.
pub fn ring_atom_names(base: char) -> &'static [&'static str] {
    if is_purine(base) {
        &PURINE_RING_ATOMS
    } else {
        &PYRIMIDINE_RING_ATOMS
    }
}

/// N9 for purines, N1 for pyrimidines.
pub fn glycosidic_nitrogen(base: char) -> Option<&'static str> {
    if is_purine(base) {
        Some("N9")
    } else if is_pyrimidine(base) {
        Some("N1")
    } else {
        None
    }
}

pub fn is_hydrogen(atom_name: &str) -> bool {
    let first_char = atom_name
        .trim()
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase());
    matches!(first_char, Some('H') | Some('D'))
}

/// Base atoms exclude the sugar (primed names) and the phosphate group.
pub fn is_base_atom(atom_name: &str) -> bool {
    let name = atom_name.trim();
    !name.contains('\'') && !name.contains('*') && !PHOSPHATE_ATOM_NAMES.contains(name) && !is_hydrogen(name)
}

pub fn is_polar_atom(atom_name: &str) -> bool {
    matches!(atom_name.trim().chars().next(), Some('N') | Some('O'))
}

pub fn hbond_role(base: char, atom_name: &str) -> Option<HBondRole> {
    let name = atom_name.trim();
    if name == "O2'" {
        return Some(HBondRole::Either);
    }
    let key = format!("{}:{}", parent_base(base), name);
    BASE_HBOND_ROLES.get(key.as_str()).copied()
}

/// True when one side can donate what the other accepts.
pub fn is_donor_acceptor_compatible(role1: Option<HBondRole>, role2: Option<HBondRole>) -> bool {
    match (role1, role2) {
        (Some(HBondRole::Either), Some(_)) | (Some(_), Some(HBondRole::Either)) => true,
        (Some(HBondRole::Donor), Some(HBondRole::Acceptor))
        | (Some(HBondRole::Acceptor), Some(HBondRole::Donor)) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_purines_and_pyrimidines() {
        assert!(is_purine('A'));
        assert!(is_purine('g'));
        assert!(is_pyrimidine('U'));
        assert!(!is_known_base('X'));
        assert_eq!(glycosidic_nitrogen('G'), Some("N9"));
        assert_eq!(glycosidic_nitrogen('c'), Some("N1"));
        assert_eq!(glycosidic_nitrogen('X'), None);
    }

    #[test]
    fn watson_crick_list_is_letter_based() {
        assert!(is_watson_crick_pair('G', 'C'));
        assert!(is_watson_crick_pair('a', 'U'));
        assert!(!is_watson_crick_pair('G', 'U'));
        assert!(!is_watson_crick_pair('A', 'A'));
    }

    #[test]
    fn base_atom_filter_excludes_sugar_phosphate_and_hydrogens() {
        assert!(is_base_atom("N1"));
        assert!(is_base_atom("O6"));
        assert!(!is_base_atom("O3'"));
        assert!(!is_base_atom("OP1"));
        assert!(!is_base_atom("H61"));
        assert!(!is_base_atom("1H2"));
    }

    #[test]
    fn donor_acceptor_compatibility() {
        let n6 = hbond_role('A', "N6");
        let o4 = hbond_role('U', "O4");
        let n1 = hbond_role('A', "N1");
        assert!(is_donor_acceptor_compatible(n6, o4));
        assert!(!is_donor_acceptor_compatible(n1, o4));
        assert!(is_donor_acceptor_compatible(hbond_role('G', "O2'"), o4));
        assert!(!is_donor_acceptor_compatible(None, o4));
    }
}
