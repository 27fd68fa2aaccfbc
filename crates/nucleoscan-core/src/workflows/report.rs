//! CSV reports of an [`AnalysisResult`]: one row per pair in helix order, one row per
//! step for step parameters, and one row per step for helical parameters.

use crate::core::models::ids::LegacyIndex;
use crate::core::models::pair::BasePair;
use crate::core::models::structure::Structure;
use crate::engine::parameters::StepRecord;
use crate::workflows::analyze::AnalysisResult;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const PAIRS_FILE: &str = "pairs.csv";
pub const STEPS_FILE: &str = "steps.csv";
pub const HELICAL_FILE: &str = "helical.csv";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("File I/O error for '{path}': {source}")]
    Io { path: String, source: io::Error },
    #[error("CSV writing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub pairs: PathBuf,
    pub steps: PathBuf,
    pub helical: PathBuf,
}

#[derive(Debug, Serialize)]
struct PairRow {
    position: usize,
    helix: usize,
    strand1_index: usize,
    strand1_chain: char,
    strand1_number: isize,
    strand2_index: usize,
    strand2_chain: char,
    strand2_number: isize,
    pair: String,
    pair_type: String,
    bp_type_id: i8,
    hbonds: usize,
    quality_score: f64,
    selection_score: f64,
    shear: f64,
    stretch: f64,
    stagger: f64,
    buckle: f64,
    propeller: f64,
    opening: f64,
}

#[derive(Debug, Serialize)]
struct StepRow {
    helix: usize,
    pair1: usize,
    pair2: usize,
    step: String,
    wraparound: bool,
    shift: f64,
    slide: f64,
    rise: f64,
    tilt: f64,
    roll: f64,
    twist: f64,
}

#[derive(Debug, Serialize)]
struct HelicalRow {
    helix: usize,
    pair1: usize,
    pair2: usize,
    step: String,
    wraparound: bool,
    x_displacement: f64,
    y_displacement: f64,
    helical_rise: f64,
    inclination: f64,
    tip: f64,
    helical_twist: f64,
}

fn strand_bases(pair: &BasePair) -> (char, char) {
    if pair.strand_swapped {
        (pair.base2, pair.base1)
    } else {
        (pair.base1, pair.base2)
    }
}

/// Step label in the usual "5'-XY-3'/5'-Y'X'-3'" form, e.g. `GC/GC`.
fn step_label(pair1: &BasePair, pair2: &BasePair) -> String {
    let (a1, a2) = strand_bases(pair1);
    let (b1, b2) = strand_bases(pair2);
    format!("{a1}{b1}/{b2}{a2}")
}

fn identity(structure: &Structure, index: LegacyIndex) -> (char, isize) {
    structure
        .residue(index)
        .map(|r| (r.chain_id, r.residue_number))
        .unwrap_or(('?', 0))
}

/// 1-based position of each pair in the final helix order, indexed like `result.pairs`.
fn positions(result: &AnalysisResult) -> Vec<usize> {
    let mut positions = vec![0; result.pairs.len()];
    for (pos, &pair) in result.organization.order().iter().enumerate() {
        positions[pair] = pos + 1;
    }
    positions
}

fn write_rows<W: io::Write, T: Serialize>(
    writer: W,
    rows: impl IntoIterator<Item = T>,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_pairs<W: io::Write>(
    writer: W,
    structure: &Structure,
    result: &AnalysisResult,
) -> Result<(), csv::Error> {
    let helix_of = result.helix_of_pairs();
    let rows = result
        .ordered_pairs()
        .enumerate()
        .map(|(pos, (i, pair))| {
            let params = result.pair_parameters[i];
            let (s1_chain, s1_number) = identity(structure, pair.strand1());
            let (s2_chain, s2_number) = identity(structure, pair.strand2());
            PairRow {
                position: pos + 1,
                helix: helix_of[i].map_or(0, |h| h + 1),
                strand1_index: pair.strand1().get(),
                strand1_chain: s1_chain,
                strand1_number: s1_number,
                strand2_index: pair.strand2().get(),
                strand2_chain: s2_chain,
                strand2_number: s2_number,
                pair: pair.label(),
                pair_type: pair.pair_type.to_string(),
                bp_type_id: pair.pair_type.id(),
                hbonds: pair.hbonds.len(),
                quality_score: pair.quality_score,
                selection_score: pair.selection_score,
                shear: params.shear,
                stretch: params.stretch,
                stagger: params.stagger,
                buckle: params.buckle,
                propeller: params.propeller,
                opening: params.opening,
            }
        });
    write_rows(writer, rows)
}

fn step_keys(
    result: &AnalysisResult,
    positions: &[usize],
    record: &StepRecord,
) -> (usize, usize, usize, String) {
    (
        record.helix + 1,
        positions[record.pair1],
        positions[record.pair2],
        step_label(&result.pairs[record.pair1], &result.pairs[record.pair2]),
    )
}

pub fn write_steps<W: io::Write>(writer: W, result: &AnalysisResult) -> Result<(), csv::Error> {
    let positions = positions(result);
    let rows = result.steps.iter().map(|record| {
        let (helix, pair1, pair2, step) = step_keys(result, &positions, record);
        let p = &record.step;
        StepRow {
            helix,
            pair1,
            pair2,
            step,
            wraparound: record.wraparound,
            shift: p.shift,
            slide: p.slide,
            rise: p.rise,
            tilt: p.tilt,
            roll: p.roll,
            twist: p.twist,
        }
    });
    write_rows(writer, rows)
}

pub fn write_helical<W: io::Write>(writer: W, result: &AnalysisResult) -> Result<(), csv::Error> {
    let positions = positions(result);
    let rows = result.steps.iter().map(|record| {
        let (helix, pair1, pair2, step) = step_keys(result, &positions, record);
        let h = &record.helical;
        HelicalRow {
            helix,
            pair1,
            pair2,
            step,
            wraparound: record.wraparound,
            x_displacement: h.x_displacement,
            y_displacement: h.y_displacement,
            helical_rise: h.helical_rise,
            inclination: h.inclination,
            tip: h.tip,
            helical_twist: h.helical_twist,
        }
    });
    write_rows(writer, rows)
}

fn create(path: &Path) -> Result<fs::File, ReportError> {
    fs::File::create(path).map_err(|e| ReportError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}

fn csv_error(path: &Path) -> impl FnOnce(csv::Error) -> ReportError + '_ {
    move |e| ReportError::Csv {
        path: path.to_string_lossy().to_string(),
        source: e,
    }
}

/// Writes all three reports into `dir`, creating it if needed.
pub fn write_reports(
    dir: &Path,
    structure: &Structure,
    result: &AnalysisResult,
) -> Result<ReportPaths, ReportError> {
    fs::create_dir_all(dir).map_err(|e| ReportError::Io {
        path: dir.to_string_lossy().to_string(),
        source: e,
    })?;
    let paths = ReportPaths {
        pairs: dir.join(PAIRS_FILE),
        steps: dir.join(STEPS_FILE),
        helical: dir.join(HELICAL_FILE),
    };

    write_pairs(create(&paths.pairs)?, structure, result).map_err(csv_error(&paths.pairs))?;
    write_steps(create(&paths.steps)?, result).map_err(csv_error(&paths.steps))?;
    write_helical(create(&paths.helical)?, result).map_err(csv_error(&paths.helical))?;

    info!(
        dir = %dir.display(),
        pairs = result.pairs.len(),
        steps = result.steps.len(),
        "Reports written."
    );
    Ok(paths)
}
