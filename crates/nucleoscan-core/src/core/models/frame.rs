use nalgebra::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};

const ORTHONORMAL_TOLERANCE: f64 = 1e-3;

/// A right-handed local coordinate system attached to a base (or a base pair).
///
/// The rotation matrix stores the unit x, y and z axes as its columns, expressed in the
/// global coordinate system; `origin` is the frame origin in Angstroms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFrame {
    pub rotation: Matrix3<f64>,
    pub origin: Point3<f64>,
}

impl ReferenceFrame {
    pub fn new(rotation: Matrix3<f64>, origin: Point3<f64>) -> Self {
        Self { rotation, origin }
    }

    pub fn from_axes(
        x: Vector3<f64>,
        y: Vector3<f64>,
        z: Vector3<f64>,
        origin: Point3<f64>,
    ) -> Self {
        Self {
            rotation: Matrix3::from_columns(&[x, y, z]),
            origin,
        }
    }

    pub fn identity_at(origin: Point3<f64>) -> Self {
        Self::new(Matrix3::identity(), origin)
    }

    #[inline]
    pub fn x_axis(&self) -> Vector3<f64> {
        self.rotation.column(0).into_owned()
    }

    #[inline]
    pub fn y_axis(&self) -> Vector3<f64> {
        self.rotation.column(1).into_owned()
    }

    #[inline]
    pub fn z_axis(&self) -> Vector3<f64> {
        self.rotation.column(2).into_owned()
    }

    /// The frame with its y- and z-axes reversed, the convention applied to the
    /// complementary (strand II) base of an anti-parallel pair.
    pub fn flipped(&self) -> Self {
        Self::from_axes(self.x_axis(), -self.y_axis(), -self.z_axis(), self.origin)
    }

    /// Checks that the axes are unit length, mutually orthogonal and right-handed.
    pub fn is_orthonormal(&self) -> bool {
        let product = self.rotation.transpose() * self.rotation;
        (product - Matrix3::identity()).amax() < ORTHONORMAL_TOLERANCE
            && (self.rotation.determinant() - 1.0).abs() < ORTHONORMAL_TOLERANCE
    }

    /// Expresses a global point in this frame's local coordinates.
    pub fn to_local(&self, point: &Point3<f64>) -> Vector3<f64> {
        self.rotation.transpose() * (point - self.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axes_are_matrix_columns() {
        let frame = ReferenceFrame::from_axes(
            Vector3::y(),
            Vector3::z(),
            Vector3::x(),
            Point3::new(1.0, 2.0, 3.0),
        );
        assert_eq!(frame.x_axis(), Vector3::y());
        assert_eq!(frame.y_axis(), Vector3::z());
        assert_eq!(frame.z_axis(), Vector3::x());
        assert!(frame.is_orthonormal());
    }

    #[test]
    fn flipped_reverses_y_and_z_only() {
        let frame = ReferenceFrame::identity_at(Point3::origin());
        let flipped = frame.flipped();
        assert_eq!(flipped.x_axis(), Vector3::x());
        assert_eq!(flipped.y_axis(), -Vector3::y());
        assert_eq!(flipped.z_axis(), -Vector3::z());
        assert!(flipped.is_orthonormal());
    }

    #[test]
    fn left_handed_frames_are_rejected() {
        let frame = ReferenceFrame::from_axes(
            Vector3::x(),
            Vector3::y(),
            -Vector3::z(),
            Point3::origin(),
        );
        assert!(!frame.is_orthonormal());
    }

    #[test]
    fn to_local_inverts_the_frame_placement() {
        let frame = ReferenceFrame::from_axes(
            Vector3::y(),
            -Vector3::x(),
            Vector3::z(),
            Point3::new(1.0, 0.0, 0.0),
        );
        let local = frame.to_local(&Point3::new(1.0, 2.0, 0.0));
        assert!((local - Vector3::new(2.0, 0.0, 0.0)).norm() < 1e-12);
    }
}
