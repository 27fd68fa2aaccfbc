//! Synthetic structures shared by engine tests.

use crate::core::models::frame::ReferenceFrame;
use crate::core::models::ids::LegacyIndex;
use crate::core::models::structure::Structure;
use nalgebra::{Matrix3, Point3, Rotation3, Vector3};

/// Standard guanine base atoms in its own reference frame (z = 0).
pub const GUANINE: [(&str, f64, f64); 11] = [
    ("N9", -1.289, 4.551),
    ("C8", 0.023, 4.962),
    ("N7", 0.870, 3.969),
    ("C5", 0.071, 2.833),
    ("C6", 0.424, 1.460),
    ("O6", 1.554, 0.955),
    ("N1", -0.700, 0.641),
    ("C2", -1.999, 1.087),
    ("N2", -2.949, 0.139),
    ("N3", -2.342, 2.364),
    ("C4", -1.265, 3.177),
];

/// Standard cytosine base atoms in its own reference frame (z = 0).
pub const CYTOSINE: [(&str, f64, f64); 8] = [
    ("N1", -1.285, 4.542),
    ("C2", -1.472, 3.158),
    ("O2", -2.628, 2.709),
    ("N3", -0.391, 2.344),
    ("C4", 0.837, 2.868),
    ("N4", 1.875, 2.027),
    ("C5", 1.056, 4.275),
    ("C6", -0.023, 5.068),
];

pub const RISE: f64 = 3.38;
pub const TWIST: f64 = 36.0;

pub fn rot_z(degrees: f64) -> Matrix3<f64> {
    *Rotation3::from_axis_angle(&Vector3::z_axis(), degrees.to_radians()).matrix()
}

/// Frame of pair `k` in an ideal straight duplex along global z.
pub fn duplex_pair_frame(k: usize) -> ReferenceFrame {
    ReferenceFrame::new(rot_z(TWIST * k as f64), Point3::new(0.0, 0.0, RISE * k as f64))
}

/// Adds a residue whose base atoms are placed through `frame`.
pub fn add_base(
    structure: &mut Structure,
    chain: char,
    number: isize,
    base: char,
    frame: ReferenceFrame,
) -> LegacyIndex {
    let template: &[(&str, f64, f64)] = match base {
        'G' => &GUANINE,
        _ => &CYTOSINE,
    };
    let name = base.to_string();
    let index = structure.add_residue(&name, chain, number, base);
    for (atom, x, y) in template {
        let position = frame.origin + frame.rotation * Vector3::new(*x, *y, 0.0);
        structure.add_atom(index, atom, position);
    }
    structure.set_frame(index, frame);
    index
}

/// An isolated G–C Watson–Crick pair in the standard pair frame at `origin`.
pub fn watson_crick_pair(origin: Point3<f64>) -> (Structure, LegacyIndex, LegacyIndex) {
    let mut structure = Structure::new();
    let frame = ReferenceFrame::identity_at(origin);
    let g = add_base(&mut structure, 'A', 1, 'G', frame);
    let c = add_base(&mut structure, 'B', 1, 'C', frame.flipped());
    (structure, g, c)
}

/// Legacy index of the strand II residue of pair `k` in [`ideal_duplex`].
pub fn strand2_index(n: usize, k: usize) -> LegacyIndex {
    LegacyIndex::new(2 * n - k).unwrap()
}

/// An ideal G·C duplex of `n` pairs. Strand I (chain A, residues 1..=n) runs up the z-axis,
/// strand II (chain B) runs back down, and both carry O3'/P atoms forming 5'→3' links.
pub fn ideal_duplex(n: usize) -> Structure {
    let mut structure = Structure::new();
    let strand1_p = |k: usize| {
        let f = duplex_pair_frame(k);
        f.origin + f.rotation * Vector3::new(-2.5, 6.5, 0.0)
    };
    let strand2_p = |k: usize| {
        let f = duplex_pair_frame(k);
        f.origin + f.rotation * Vector3::new(-2.5, -6.5, 0.0)
    };

    for k in 0..n {
        let idx = add_base(&mut structure, 'A', k as isize + 1, 'G', duplex_pair_frame(k));
        structure.add_atom(idx, "P", strand1_p(k));
        if k + 1 < n {
            structure.add_atom(idx, "O3'", strand1_p(k + 1) - Vector3::new(0.0, 0.0, 1.6));
        }
    }
    for k in (0..n).rev() {
        let idx = add_base(
            &mut structure,
            'B',
            (n - k) as isize,
            'C',
            duplex_pair_frame(k).flipped(),
        );
        structure.add_atom(idx, "P", strand2_p(k));
        if k > 0 {
            structure.add_atom(idx, "O3'", strand2_p(k - 1) + Vector3::new(0.0, 0.0, 1.6));
        }
    }
    structure
}
