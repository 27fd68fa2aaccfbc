//! Step, helical and base-pair parameters from pairs of reference frames.
//!
//! Step parameters use the half-angle bisector construction: both frames are rotated
//! about the hinge (z1 × z2) by half the roll-tilt angle so their z-axes coincide, the
//! mid-step frame bisects the result, and translation is read off in that frame.
//! Helical parameters instead align each frame with a common helical axis built from
//! (x2 − x1) × (y2 − y1) and measure displacement from that axis.

use crate::core::models::frame::ReferenceFrame;
use crate::core::models::pair::BasePair;
use crate::core::utils::geometry::{
    angle_between_deg, rotation_from_axis_angle, signed_angle_deg, try_normalize,
};
use crate::engine::config::ParameterOptions;
use crate::engine::error::EngineError;
use crate::engine::helix::HelixOrganization;
use nalgebra::{Matrix3, Point3, Vector3};
use serde::Serialize;
use tracing::{debug, instrument};

/// Helical twist (degrees) below which the helical origin is no longer located with the
/// circle-center construction alone.
pub const HELICAL_TWIST_CUTOFF: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StepParameters {
    pub shift: f64,
    pub slide: f64,
    pub rise: f64,
    pub tilt: f64,
    pub roll: f64,
    pub twist: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct HelicalParameters {
    pub x_displacement: f64,
    pub y_displacement: f64,
    pub helical_rise: f64,
    pub inclination: f64,
    pub tip: f64,
    pub helical_twist: f64,
}

/// Intra-pair parameters: the step decomposition applied between the two bases of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BasePairParameters {
    pub shear: f64,
    pub stretch: f64,
    pub stagger: f64,
    pub buckle: f64,
    pub propeller: f64,
    pub opening: f64,
}

impl BasePairParameters {
    pub fn is_finite(&self) -> bool {
        [
            self.shear,
            self.stretch,
            self.stagger,
            self.buckle,
            self.propeller,
            self.opening,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

fn rotate(axis: &Vector3<f64>, angle_degrees: f64, m: &Matrix3<f64>) -> Matrix3<f64> {
    rotation_from_axis_angle(axis, angle_degrees).matrix() * m
}

/// Step parameters from `frame1` to `frame2`, together with the mid-step frame.
pub fn step_parameters(
    frame1: &ReferenceFrame,
    frame2: &ReferenceFrame,
) -> (StepParameters, ReferenceFrame) {
    let z1 = frame1.z_axis();
    let z2 = frame2.z_axis();
    let roll_tilt = angle_between_deg(&z1, &z2);

    let mut hinge = z1.cross(&z2);
    if try_normalize(&hinge).is_none() {
        // z-axes (anti)parallel: any in-plane direction serves as hinge.
        hinge = frame1.x_axis() + frame2.x_axis() + frame1.y_axis() + frame2.y_axis();
    }

    let para1 = rotate(&hinge, 0.5 * roll_tilt, &frame1.rotation);
    let para2 = rotate(&hinge, -0.5 * roll_tilt, &frame2.rotation);

    let mst_z: Vector3<f64> = para2.column(2).into_owned();
    let y1: Vector3<f64> = para1.column(1).into_owned();
    let y2: Vector3<f64> = para2.column(1).into_owned();

    let twist = signed_angle_deg(&y1, &y2, &mst_z);
    let mst_y = rotation_from_axis_angle(&mst_z, 0.5 * twist) * y1;
    let mst_x = mst_y.cross(&mst_z);

    let mid_origin = Point3::from((frame1.origin.coords + frame2.origin.coords) * 0.5);
    let mid = ReferenceFrame::from_axes(mst_x, mst_y, mst_z, mid_origin);
    let displacement = frame2.origin - frame1.origin;

    let phi = signed_angle_deg(&hinge, &mst_y, &mst_z).to_radians();

    let params = StepParameters {
        shift: displacement.dot(&mst_x),
        slide: displacement.dot(&mst_y),
        rise: displacement.dot(&mst_z),
        tilt: roll_tilt * phi.sin(),
        roll: roll_tilt * phi.cos(),
        twist,
    };
    (params, mid)
}

/// Rebuilds the two frames of a step from its mid-step frame and parameters.
///
/// Inverse of [`step_parameters`]: feeding the returned frames back in reproduces
/// `params` and `mid`.
pub fn frames_from_step(
    params: &StepParameters,
    mid: &ReferenceFrame,
) -> (ReferenceFrame, ReferenceFrame) {
    let mst_y = mid.y_axis();
    let mst_z = mid.z_axis();

    let roll_tilt = params.tilt.hypot(params.roll);
    let phi = params.tilt.atan2(params.roll).to_degrees();
    let hinge = rotation_from_axis_angle(&mst_z, -phi) * mst_y;

    let para1 = rotate(&mst_z, -0.5 * params.twist, &mid.rotation);
    let para2 = rotate(&mst_z, 0.5 * params.twist, &mid.rotation);
    let rot1 = rotate(&hinge, -0.5 * roll_tilt, &para1);
    let rot2 = rotate(&hinge, 0.5 * roll_tilt, &para2);

    let half = mid.rotation * Vector3::new(params.shift, params.slide, params.rise) * 0.5;
    (
        ReferenceFrame::new(rot1, mid.origin - half),
        ReferenceFrame::new(rot2, mid.origin + half),
    )
}

/// Offset from the first origin to the helical axis point, given the chord between the two
/// origins projected perpendicular to the axis.
fn circle_center_offset(chord: &Vector3<f64>, axis: &Vector3<f64>, twist: f64) -> Vector3<f64> {
    let half = 0.5 * twist;
    let Some(direction) = try_normalize(&(rotation_from_axis_angle(axis, 90.0 - half) * chord))
    else {
        return Vector3::zeros();
    };
    direction * (0.5 * chord.norm() / half.to_radians().sin())
}

fn helical_origin_offset(chord: &Vector3<f64>, axis: &Vector3<f64>, twist: f64) -> Vector3<f64> {
    if twist.abs() >= HELICAL_TWIST_CUTOFF {
        return circle_center_offset(chord, axis, twist);
    }
    // Blend from the chord midpoint (zero twist) to the circle center at the cutoff so the
    // two regimes meet exactly at the cutoff instead of diverging as twist -> 0.
    let weight = twist.abs() / HELICAL_TWIST_CUTOFF;
    let edge = if twist < 0.0 {
        -HELICAL_TWIST_CUTOFF
    } else {
        HELICAL_TWIST_CUTOFF
    };
    chord * (0.5 * (1.0 - weight)) + circle_center_offset(chord, axis, edge) * weight
}

/// Local helical parameters from `frame1` to `frame2`, together with the helical mid frame.
pub fn helical_parameters(
    frame1: &ReferenceFrame,
    frame2: &ReferenceFrame,
) -> (HelicalParameters, ReferenceFrame) {
    let dx = frame2.x_axis() - frame1.x_axis();
    let dy = frame2.y_axis() - frame1.y_axis();
    let axis = try_normalize(&dx.cross(&dy))
        .or_else(|| try_normalize(&(frame1.z_axis() + frame2.z_axis())))
        .unwrap_or_else(|| frame1.z_axis());

    let z1 = frame1.z_axis();
    let tip_inclination1 = angle_between_deg(&axis, &z1);
    let hinge1 = axis.cross(&z1);
    let rot1_h = rotate(&hinge1, -tip_inclination1, &frame1.rotation);

    let z2 = frame2.z_axis();
    let tip_inclination2 = angle_between_deg(&axis, &z2);
    let hinge2 = axis.cross(&z2);
    let rot2_h = rotate(&hinge2, -tip_inclination2, &frame2.rotation);

    let x1_h: Vector3<f64> = rot1_h.column(0).into_owned();
    let y1_h: Vector3<f64> = rot1_h.column(1).into_owned();
    let x2_h: Vector3<f64> = rot2_h.column(0).into_owned();

    let helical_twist = signed_angle_deg(&x1_h, &x2_h, &axis);
    let mid_x = rotation_from_axis_angle(&axis, 0.5 * helical_twist) * x1_h;
    let mid_y = axis.cross(&mid_x);

    let displacement = frame2.origin - frame1.origin;
    let helical_rise = displacement.dot(&axis);

    let phi = signed_angle_deg(&hinge1, &x1_h, &axis).to_radians();

    let chord = displacement - axis * helical_rise;
    let h1 = frame1.origin + helical_origin_offset(&chord, &axis, helical_twist);
    let h2 = h1 + axis * helical_rise;
    let radial = frame1.origin - h1;

    let params = HelicalParameters {
        x_displacement: radial.dot(&x1_h),
        y_displacement: radial.dot(&y1_h),
        helical_rise,
        inclination: tip_inclination1 * phi.cos(),
        tip: tip_inclination1 * phi.sin(),
        helical_twist,
    };
    let mid = ReferenceFrame::from_axes(
        mid_x,
        mid_y,
        axis,
        Point3::from((h1.coords + h2.coords) * 0.5),
    );
    (params, mid)
}

/// The strand II frame as used against strand I: y/z reversed when the bases are
/// anti-parallel, unchanged when their z-axes already agree.
fn aligned_partner_frame(strand1: &ReferenceFrame, strand2: &ReferenceFrame) -> ReferenceFrame {
    if strand1.z_axis().dot(&strand2.z_axis()) < 0.0 {
        strand2.flipped()
    } else {
        *strand2
    }
}

/// Intra-pair parameters and the base-pair (middle) frame.
pub fn base_pair_parameters(
    strand1: &ReferenceFrame,
    strand2: &ReferenceFrame,
) -> (BasePairParameters, ReferenceFrame) {
    let partner = aligned_partner_frame(strand1, strand2);
    let (step, mid) = step_parameters(&partner, strand1);
    let params = BasePairParameters {
        shear: step.shift,
        stretch: step.slide,
        stagger: step.rise,
        buckle: step.tilt,
        propeller: step.roll,
        opening: step.twist,
    };
    (params, mid)
}

/// Reference frame of a selected pair, honouring its strand-swap flag.
pub fn pair_frame(pair: &BasePair) -> ReferenceFrame {
    let (strand1, strand2) = pair.strand_frames();
    base_pair_parameters(strand1, strand2).1
}

/// Parameters of one step between two consecutive pairs of the final order.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub helix: usize,
    /// Index of the first pair in the selected-pair list.
    pub pair1: usize,
    /// Index of the second pair in the selected-pair list.
    pub pair2: usize,
    pub step: StepParameters,
    pub step_frame: ReferenceFrame,
    pub helical: HelicalParameters,
    pub helical_frame: ReferenceFrame,
    /// The closing last→first step of a circular helix.
    pub wraparound: bool,
}

fn step_record(
    pairs: &[BasePair],
    helix: usize,
    pair1: usize,
    pair2: usize,
    wraparound: bool,
) -> Result<StepRecord, EngineError> {
    let lookup = |index: usize| {
        pairs.get(index).ok_or(EngineError::PairOutOfRange {
            index,
            count: pairs.len(),
        })
    };
    let frame1 = pair_frame(lookup(pair1)?);
    let frame2 = pair_frame(lookup(pair2)?);
    let (step, step_frame) = step_parameters(&frame1, &frame2);
    let (helical, helical_frame) = helical_parameters(&frame1, &frame2);
    Ok(StepRecord {
        helix,
        pair1,
        pair2,
        step,
        step_frame,
        helical,
        helical_frame,
        wraparound,
    })
}

/// Computes step and helical parameters for consecutive pairs of every helix.
#[instrument(skip_all, name = "parameter_batch")]
pub fn compute_step_records(
    pairs: &[BasePair],
    organization: &HelixOrganization,
    options: &ParameterOptions,
) -> Result<Vec<StepRecord>, EngineError> {
    options.validate()?;
    let mut records = Vec::new();

    for (helix_idx, helix) in organization.helices().iter().enumerate() {
        let members = &helix.pairs;
        let linear_steps = members.len().saturating_sub(1);
        let wraps = helix.is_circular && options.wrap_circular && members.len() > 2;
        // The closing step is step `len - 1` and follows the same start/stride selection.
        let total_steps = linear_steps + usize::from(wraps);
        for k in (options.start..total_steps).step_by(options.stride) {
            let next = (k + 1) % members.len();
            let wraparound = k == linear_steps;
            records.push(step_record(pairs, helix_idx, members[k], members[next], wraparound)?);
        }
    }

    debug!(steps = records.len(), "Computed step and helical parameters.");
    Ok(records)
}
