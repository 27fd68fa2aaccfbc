use crate::core::hbond::{HydrogenBond, HydrogenBondDetector};
use crate::core::models::frame::ReferenceFrame;
use crate::core::models::residue::Residue;
use crate::core::utils::geometry::{
    angle_between_deg, convex_hull, convex_intersection_area, project_onto_plane, try_normalize,
};
use crate::engine::config::ValidationParameters;
use crate::engine::error::EngineError;
use nalgebra::Point3;
use serde::Serialize;
use tracing::trace;

/// Outcome of each individual acceptance test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ValidationChecks {
    pub distance: bool,
    pub vertical: bool,
    pub plane_angle: bool,
    pub base_nitrogen: bool,
    pub hbond: bool,
    pub overlap: bool,
}

impl ValidationChecks {
    pub fn all_passed(&self) -> bool {
        self.distance
            && self.vertical
            && self.plane_angle
            && self.base_nitrogen
            && self.hbond
            && self.overlap
    }
}

/// Geometric and hydrogen-bond metrics for one candidate pair, valid or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    /// x1 · x2
    pub dir_x: f64,
    /// y1 · y2
    pub dir_y: f64,
    /// z1 · z2
    pub dir_z: f64,
    pub origin_distance: f64,
    pub vertical_distance: f64,
    /// Angle between base normals folded into [0, 90].
    pub plane_angle: f64,
    /// `None` when either glycosidic nitrogen is missing.
    pub base_nitrogen_distance: Option<f64>,
    pub overlap_area: f64,
    pub quality_score: f64,
    pub hbonds: Vec<HydrogenBond>,
    pub checks: ValidationChecks,
    pub is_valid: bool,
}

impl ValidationResult {
    /// Direction cosines of an anti-parallel (standard) pair: x aligned, y and z opposed.
    pub fn is_anti_parallel_pattern(&self) -> bool {
        self.dir_x > 0.0 && self.dir_y < 0.0 && self.dir_z < 0.0
    }

    pub fn base_base_hbond_count(&self) -> usize {
        self.hbonds.iter().filter(|b| b.is_base_base()).count()
    }
}

/// Raw quality score: lower means a better-formed pair.
pub fn raw_quality_score(origin_distance: f64, vertical_distance: f64, plane_angle: f64) -> f64 {
    origin_distance + 2.0 * vertical_distance + plane_angle / 20.0
}

/// Validates residue pairs against [`ValidationParameters`].
///
/// Hydrogen-bond detection and ring overlap are the expensive parts, so they only run for
/// pairs whose origins are close enough; for the rest both checks are reported as failed.
pub struct PairValidator<'a> {
    params: &'a ValidationParameters,
    detector: &'a dyn HydrogenBondDetector,
}

impl<'a> PairValidator<'a> {
    pub fn new(params: &'a ValidationParameters, detector: &'a dyn HydrogenBondDetector) -> Self {
        Self { params, detector }
    }

    pub fn params(&self) -> &ValidationParameters {
        self.params
    }

    /// Validates two residues. Fails only when a residue carries no reference frame.
    pub fn validate(
        &self,
        residue1: &Residue,
        residue2: &Residue,
    ) -> Result<ValidationResult, EngineError> {
        let frame1 = residue1.frame.as_ref().ok_or(EngineError::MissingFrame {
            index: residue1.legacy_index,
        })?;
        let frame2 = residue2.frame.as_ref().ok_or(EngineError::MissingFrame {
            index: residue2.legacy_index,
        })?;
        Ok(self.validate_frames(residue1, frame1, residue2, frame2))
    }

    fn validate_frames(
        &self,
        residue1: &Residue,
        frame1: &ReferenceFrame,
        residue2: &Residue,
        frame2: &ReferenceFrame,
    ) -> ValidationResult {
        let params = self.params;

        let dir_x = frame1.x_axis().dot(&frame2.x_axis());
        let dir_y = frame1.y_axis().dot(&frame2.y_axis());
        let dir_z = frame1.z_axis().dot(&frame2.z_axis());

        let z1 = frame1.z_axis();
        let z2 = frame2.z_axis();
        let z_sum = if dir_z > 0.0 { z2 + z1 } else { z2 - z1 };
        let mean_normal = try_normalize(&z_sum).unwrap_or(z1);

        let displacement = frame2.origin - frame1.origin;
        let origin_distance = displacement.norm();
        let vertical_distance = displacement.dot(&mean_normal).abs();

        let mut plane_angle = angle_between_deg(&z1, &z2);
        if plane_angle > 90.0 {
            plane_angle = 180.0 - plane_angle;
        }

        let base_nitrogen_distance = match (residue1.glycosidic_nitrogen(), residue2.glycosidic_nitrogen()) {
            (Some(n1), Some(n2)) => Some((n1 - n2).norm()),
            _ => None,
        };

        let mut checks = ValidationChecks {
            distance: params.origin_distance.contains(origin_distance),
            vertical: params.vertical_distance.contains(vertical_distance),
            plane_angle: params.plane_angle.contains(plane_angle),
            base_nitrogen: base_nitrogen_distance
                .is_some_and(|d| d >= params.min_base_nitrogen_distance),
            hbond: false,
            overlap: false,
        };

        let mut hbonds = Vec::new();
        let mut overlap_area = 0.0;
        if checks.distance {
            hbonds = self.detector.detect(
                residue1,
                residue2,
                params.hbond_distance.min,
                params.hbond_distance.max,
            );
            let base_base = hbonds.iter().filter(|b| b.is_base_base()).count();
            checks.hbond = base_base >= params.min_hbond_count;

            let mid_origin = Point3::from((frame1.origin.coords + frame2.origin.coords) * 0.5);
            overlap_area = ring_overlap_area(residue1, residue2, &mid_origin, &mean_normal);
            checks.overlap = overlap_area < params.overlap_threshold;
        }

        let is_valid = checks.all_passed();
        trace!(
            residue1 = %residue1.legacy_index,
            residue2 = %residue2.legacy_index,
            origin_distance,
            vertical_distance,
            plane_angle,
            hbonds = hbonds.len(),
            is_valid,
            "Validated candidate pair."
        );

        ValidationResult {
            dir_x,
            dir_y,
            dir_z,
            origin_distance,
            vertical_distance,
            plane_angle,
            base_nitrogen_distance,
            overlap_area,
            quality_score: raw_quality_score(origin_distance, vertical_distance, plane_angle),
            hbonds,
            checks,
            is_valid,
        }
    }
}

/// Area shared by the two base rings once projected onto the mean base plane.
fn ring_overlap_area(
    residue1: &Residue,
    residue2: &Residue,
    origin: &Point3<f64>,
    normal: &nalgebra::Vector3<f64>,
) -> f64 {
    let ring1 = residue1.ring_atoms();
    let ring2 = residue2.ring_atoms();
    if ring1.len() < 3 || ring2.len() < 3 {
        return 0.0;
    }
    let hull1 = convex_hull(&project_onto_plane(&ring1, origin, normal));
    let hull2 = convex_hull(&project_onto_plane(&ring2, origin, normal));
    convex_intersection_area(&hull1, &hull2)
}
