use crate::core::io::traits::StructureFile;
use crate::core::models::frame::ReferenceFrame;
use crate::core::models::structure::Structure;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// TOML snapshot of a structure whose base frames were already computed.
///
/// ```toml
/// [[residues]]
/// name = "DG"
/// chain = "A"
/// number = 1
/// base = "G"
/// frame = { origin = [0.0, 0.0, 0.0], x-axis = [1.0, 0.0, 0.0], y-axis = [0.0, 1.0, 0.0], z-axis = [0.0, 0.0, 1.0] }
///
/// [residues.atoms]
/// N9 = [-1.289, 4.551, 0.0]
/// "O3'" = [0.0, 7.1, 1.2]
/// ```
///
/// Residues receive legacy indices in file order.
pub struct SnapshotFile;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("TOML parsing error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Residue #{position}: field '{field}' must be a single character (got '{value}')")]
    InvalidChar {
        position: usize,
        field: &'static str,
        value: String,
    },
    #[error("Residue #{position}: non-finite coordinate in {what}")]
    NonFinite { position: usize, what: String },
    #[error("Residue #{position}: reference frame axes are not orthonormal and right-handed")]
    MalformedFrame { position: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct FrameRecord {
    origin: [f64; 3],
    x_axis: [f64; 3],
    y_axis: [f64; 3],
    z_axis: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResidueRecord {
    name: String,
    chain: String,
    number: isize,
    base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    frame: Option<FrameRecord>,
    #[serde(default)]
    atoms: BTreeMap<String, [f64; 3]>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotDocument {
    #[serde(default)]
    residues: Vec<ResidueRecord>,
}

fn single_char(position: usize, field: &'static str, value: &str) -> Result<char, SnapshotError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(SnapshotError::InvalidChar {
            position,
            field,
            value: value.to_string(),
        }),
    }
}

fn vector(position: usize, what: &str, v: [f64; 3]) -> Result<Vector3<f64>, SnapshotError> {
    if v.iter().all(|c| c.is_finite()) {
        Ok(Vector3::from(v))
    } else {
        Err(SnapshotError::NonFinite {
            position,
            what: what.to_string(),
        })
    }
}

impl FrameRecord {
    fn from_frame(frame: &ReferenceFrame) -> Self {
        let axis = |v: Vector3<f64>| [v.x, v.y, v.z];
        Self {
            origin: [frame.origin.x, frame.origin.y, frame.origin.z],
            x_axis: axis(frame.x_axis()),
            y_axis: axis(frame.y_axis()),
            z_axis: axis(frame.z_axis()),
        }
    }

    fn to_frame(&self, position: usize) -> Result<ReferenceFrame, SnapshotError> {
        let frame = ReferenceFrame::from_axes(
            vector(position, "frame x-axis", self.x_axis)?,
            vector(position, "frame y-axis", self.y_axis)?,
            vector(position, "frame z-axis", self.z_axis)?,
            Point3::from(vector(position, "frame origin", self.origin)?),
        );
        if !frame.is_orthonormal() {
            return Err(SnapshotError::MalformedFrame { position });
        }
        Ok(frame)
    }
}

impl SnapshotDocument {
    fn into_structure(self) -> Result<Structure, SnapshotError> {
        let mut structure = Structure::new();
        for (i, record) in self.residues.into_iter().enumerate() {
            let position = i + 1;
            let chain = single_char(position, "chain", &record.chain)?;
            let base = single_char(position, "base", &record.base)?;
            let index = structure.add_residue(&record.name, chain, record.number, base);
            if let Some(frame) = &record.frame {
                structure.set_frame(index, frame.to_frame(position)?);
            }
            for (name, coords) in record.atoms {
                let point = Point3::from(vector(position, &format!("atom {name}"), coords)?);
                structure.add_atom(index, &name, point);
            }
        }
        Ok(structure)
    }

    fn from_structure(structure: &Structure) -> Self {
        let residues = structure
            .residues()
            .map(|r| ResidueRecord {
                name: r.name.clone(),
                chain: r.chain_id.to_string(),
                number: r.residue_number,
                base: r.base.to_string(),
                frame: r.frame.as_ref().map(FrameRecord::from_frame),
                atoms: r
                    .atoms()
                    .map(|(name, p)| (name.to_string(), [p.x, p.y, p.z]))
                    .collect(),
            })
            .collect();
        Self { residues }
    }
}

impl SnapshotFile {
    pub fn parse(content: &str) -> Result<Structure, SnapshotError> {
        let document: SnapshotDocument = toml::from_str(content)?;
        document.into_structure()
    }
}

impl StructureFile for SnapshotFile {
    type Error = SnapshotError;

    fn read_from(reader: &mut impl BufRead) -> Result<Structure, Self::Error> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::parse(&content)
    }

    fn write_to(structure: &Structure, writer: &mut impl Write) -> Result<(), Self::Error> {
        let text = toml::to_string(&SnapshotDocument::from_structure(structure))?;
        writer.write_all(text.as_bytes())?;
        Ok(())
    }
}
