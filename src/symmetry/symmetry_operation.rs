//! Affine symmetry operations.

use std::fmt;

use approx;
use nalgebra::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::auxiliary::geometry;

#[cfg(test)]
#[path = "symmetry_operation_tests.rs"]
mod symmetry_operation_tests;

// =================
// Error definitions
// =================

/// An error indicating that a supplied matrix does not describe a valid rotation/inversion
/// operation, *i.e.* it is not orthogonal within the requested threshold.
pub struct InvalidOperationError(pub String);

impl fmt::Debug for InvalidOperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvalidOperationError")
            .field("Message", &self.0)
            .finish()
    }
}

impl fmt::Display for InvalidOperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InvalidOperationError with message: {}", &self.0)
    }
}

impl std::error::Error for InvalidOperationError {}

// ======================================
// Struct definitions and implementations
// ======================================

/// A struct representing an affine symmetry operation: an orthogonal rotation/inversion
/// matrix $`\mathbf{R}`$ paired with a translation vector $`\mathbf{t}`$.
///
/// Operations act on points from the left: a point $`\mathbf{p}`$ is carried to
/// $`\mathbf{R} \mathbf{p} + \mathbf{t}`$.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SymmOp {
    /// The orthogonal rotation/inversion part.
    rotation: Matrix3<f64>,

    /// The translation part, applied after the rotation.
    translation: Vector3<f64>,

    /// A threshold for approximate comparisons and for the orthogonality requirement on
    /// [`Self::rotation`].
    threshold: f64,
}

impl SymmOp {
    /// Constructs a symmetry operation from a rotation/inversion matrix and a translation
    /// vector.
    ///
    /// # Arguments
    ///
    /// * `rotation` - An orthogonal $`3 \times 3`$ matrix.
    /// * `translation` - A translation vector.
    /// * `thresh` - A threshold for approximate comparisons and the orthogonality check.
    ///
    /// # Returns
    ///
    /// The required operation, or an [`InvalidOperationError`] if `rotation` is not
    /// orthogonal within `thresh`. A non-orthogonal matrix is a caller error, not a
    /// recoverable condition.
    pub fn new(
        rotation: Matrix3<f64>,
        translation: Vector3<f64>,
        thresh: f64,
    ) -> Result<SymmOp, InvalidOperationError> {
        if !geometry::check_orthogonality(&rotation, thresh) {
            return Err(InvalidOperationError(format!(
                "The supplied matrix is not orthogonal within the threshold {thresh:+.3e}: {rotation}"
            )));
        }
        Ok(SymmOp {
            rotation,
            translation,
            threshold: thresh,
        })
    }

    /// Constructs a purely rotational operation with no translation part.
    ///
    /// # Arguments
    ///
    /// * `rotation` - An orthogonal $`3 \times 3`$ matrix.
    /// * `thresh` - A threshold for approximate comparisons and the orthogonality check.
    ///
    /// # Returns
    ///
    /// The required operation, or an [`InvalidOperationError`] if `rotation` is not
    /// orthogonal within `thresh`.
    pub fn from_rotation(
        rotation: Matrix3<f64>,
        thresh: f64,
    ) -> Result<SymmOp, InvalidOperationError> {
        SymmOp::new(rotation, Vector3::zeros(), thresh)
    }

    /// Constructs a proper rotation about an axis.
    ///
    /// # Arguments
    ///
    /// * `angle` - The angle of rotation.
    /// * `axis` - The axis of rotation.
    /// * `thresh` - A threshold for approximate comparisons.
    ///
    /// # Returns
    ///
    /// The required operation.
    #[must_use]
    pub fn from_axis_angle(angle: f64, axis: &Vector3<f64>, thresh: f64) -> SymmOp {
        SymmOp {
            rotation: geometry::proper_rotation_matrix(angle, axis, 1),
            translation: Vector3::zeros(),
            threshold: thresh,
        }
    }

    /// Constructs the identity operation.
    #[must_use]
    pub fn identity(thresh: f64) -> SymmOp {
        SymmOp {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
            threshold: thresh,
        }
    }

    /// Constructs the inversion operation through the origin.
    #[must_use]
    pub fn inversion(thresh: f64) -> SymmOp {
        SymmOp {
            rotation: -Matrix3::identity(),
            translation: Vector3::zeros(),
            threshold: thresh,
        }
    }

    /// Returns the rotation/inversion part.
    #[must_use]
    pub fn rotation(&self) -> &Matrix3<f64> {
        &self.rotation
    }

    /// Returns the translation part.
    #[must_use]
    pub fn translation(&self) -> &Vector3<f64> {
        &self.translation
    }

    /// Returns the comparison threshold.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the determinant of the rotation/inversion part.
    #[must_use]
    pub fn determinant(&self) -> f64 {
        self.rotation.determinant()
    }

    /// Composes this operation with a subsequently applied one.
    ///
    /// Applying $`(\mathbf{R}_1, \mathbf{t}_1)`$ and then $`(\mathbf{R}_2, \mathbf{t}_2)`$
    /// yields $`(\mathbf{R}_2 \mathbf{R}_1, \mathbf{R}_2 \mathbf{t}_1 + \mathbf{t}_2)`$.
    ///
    /// # Arguments
    ///
    /// * `second` - The operation applied after `self`.
    ///
    /// # Returns
    ///
    /// The composed operation.
    #[must_use]
    pub fn compose(&self, second: &SymmOp) -> SymmOp {
        SymmOp {
            rotation: second.rotation * self.rotation,
            translation: second.rotation * self.translation + second.translation,
            threshold: (self.threshold * second.threshold).sqrt(),
        }
    }

    /// Returns the inverse operation.
    ///
    /// Orthogonality of the rotation part makes the inverse a transpose.
    #[must_use]
    pub fn inverse(&self) -> SymmOp {
        let rotation_inv = self.rotation.transpose();
        SymmOp {
            rotation: rotation_inv,
            translation: -(rotation_inv * self.translation),
            threshold: self.threshold,
        }
    }

    /// Applies the operation to a point.
    ///
    /// # Arguments
    ///
    /// * `point` - The point to be transformed.
    ///
    /// # Returns
    ///
    /// The transformed point.
    #[must_use]
    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * point.coords + self.translation)
    }

    /// Applies the rotational part of the operation to a vector. Translations do not act on
    /// vectors.
    ///
    /// # Arguments
    ///
    /// * `vec` - The vector to be transformed.
    ///
    /// # Returns
    ///
    /// The transformed vector.
    #[must_use]
    pub fn apply_vector(&self, vec: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * vec
    }

    /// Checks if this operation is the identity within its threshold.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        (self.rotation - Matrix3::identity()).norm() < self.threshold
            && self.translation.norm() < self.threshold
    }
}

impl PartialEq for SymmOp {
    fn eq(&self, other: &Self) -> bool {
        let thresh = (self.threshold * other.threshold).sqrt();
        approx::relative_eq!(
            (self.rotation - other.rotation).norm(),
            0.0,
            epsilon = thresh,
            max_relative = thresh
        ) && approx::relative_eq!(
            (self.translation - other.translation).norm(),
            0.0,
            epsilon = thresh,
            max_relative = thresh
        )
    }
}

impl fmt::Display for SymmOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rotation: {}", self.rotation)?;
        writeln!(f, "Translation: {}", self.translation)
    }
}
