//! Geometrical primitives and manipulations.
//!
//! This module provides the tolerance-parameterised vector and matrix
//! operations on which operation classification, self-symmetry detection, and
//! orientation solving are built. All tolerances are domain tolerances on the
//! ångström scale, not floating-point epsilons.

use std::fmt;

use approx;
use fraction;
use nalgebra::{Matrix3, Rotation3, SymmetricEigen, UnitVector3, Vector3};
use num_traits::ToPrimitive;

type F32 = fraction::GenericFraction<u32>;

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod geometry_tests;

/// The default threshold for geometric comparisons.
pub const DEFAULT_THRESHOLD: f64 = 1e-3;

// =================
// Error definitions
// =================

/// An error indicating that a vector-to-vector rotation is underdetermined because the two
/// vectors are antiparallel and no fallback perpendicular axis was supplied.
pub struct DegenerateAxisError(pub String);

impl fmt::Debug for DegenerateAxisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DegenerateAxisError")
            .field("Message", &self.0)
            .finish()
    }
}

impl fmt::Display for DegenerateAxisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DegenerateAxisError with message: {}", &self.0)
    }
}

impl std::error::Error for DegenerateAxisError {}

// =================
// Utility functions
// =================

/// Returns the angle between two vectors.
///
/// The normalised dot product is clamped to $`[-1, 1]`$ before the inverse cosine is taken so
/// that accumulated floating errors cannot push it outside the domain of `acos`.
///
/// # Arguments
///
/// * `vec1` - The first vector.
/// * `vec2` - The second vector.
///
/// # Returns
///
/// The angle between `vec1` and `vec2` in the interval $`[0, \pi]`$.
///
/// # Panics
///
/// Panics if either vector is a null vector.
#[must_use]
pub fn angle(vec1: &Vector3<f64>, vec2: &Vector3<f64>) -> f64 {
    let norm_product = vec1.norm() * vec2.norm();
    assert!(
        norm_product > f64::EPSILON,
        "Angles involving null vectors are not defined."
    );
    (vec1.dot(vec2) / norm_product).clamp(-1.0, 1.0).acos()
}

/// Checks if a $`3 \times 3`$ matrix is orthogonal within a threshold.
///
/// The check is $`\lVert \mathbf{M}^{\mathsf{T}} \mathbf{M} - \mathbf{I} \rVert < `$ `thresh`.
///
/// # Arguments
///
/// * `mat` - The matrix to be checked.
/// * `thresh` - A threshold for comparisons.
///
/// # Returns
///
/// A boolean indicating if `mat` is orthogonal.
#[must_use]
pub fn check_orthogonality(mat: &Matrix3<f64>, thresh: f64) -> bool {
    (mat.transpose() * mat - Matrix3::identity()).norm() < thresh
}

/// Returns a deterministic unit vector perpendicular to a given vector.
///
/// The basis vector with the smallest absolute component along `vec` seeds the cross product,
/// so the result is well-conditioned for any input direction.
///
/// # Arguments
///
/// * `vec` - A non-null vector.
///
/// # Returns
///
/// A unit vector perpendicular to `vec`.
///
/// # Panics
///
/// Panics if `vec` is a null vector.
#[must_use]
pub fn perpendicular_to(vec: &Vector3<f64>) -> Vector3<f64> {
    assert!(
        vec.norm() > f64::EPSILON,
        "Perpendiculars to null vectors are not defined."
    );
    let abs = vec.map(f64::abs);
    let seed = if abs[0] <= abs[1] && abs[0] <= abs[2] {
        Vector3::x()
    } else if abs[1] <= abs[2] {
        Vector3::y()
    } else {
        Vector3::z()
    };
    vec.cross(&seed).normalize()
}

/// Returns the rotation angle adjusted to be in the interval $`(-\pi, +\pi]`$ and the number of
/// $`2\pi`$-folds required to bring the original angle to that interval.
///
/// # Arguments
///
/// * `rot_ang` - A rotation angle.
/// * `thresh` - A threshold for comparisons.
///
/// # Returns
///
/// The normalised rotation angle and the number of folds.
#[must_use]
pub fn normalise_rotation_angle(rot_ang: f64, thresh: f64) -> (f64, u32) {
    let frac_1_2 = 1.0 / 2.0;
    let fraction = rot_ang / (2.0 * std::f64::consts::PI);
    if fraction > frac_1_2 + thresh {
        let integer_part = fraction.trunc().to_u32().unwrap_or_else(|| {
            panic!("Unable to convert the integer part of `{fraction}` to `u32`.")
        });
        let x = if fraction.fract() <= frac_1_2 + thresh {
            integer_part
        } else {
            integer_part + 1
        };
        (rot_ang - 2.0 * std::f64::consts::PI * f64::from(x), x)
    } else if fraction <= -frac_1_2 + thresh {
        let integer_part = (-fraction).trunc().to_u32().unwrap_or_else(|| {
            panic!("Unable to convert the integer part of `{fraction}` to `u32`.")
        });
        let x = if (-fraction).fract() < frac_1_2 - thresh {
            integer_part
        } else {
            integer_part + 1
        };
        (rot_ang + 2.0 * std::f64::consts::PI * f64::from(x), x)
    } else {
        (rot_ang, 0)
    }
}

/// Determines the reduced fraction $`k/n`$ where $`k`$ and $`n`$ are both integers representing a
/// proper rotation $`C_n^k`$ corresponding to a specified rotation angle.
///
/// # Arguments
///
/// * `angle` - An angle of rotation.
/// * `thresh` - A threshold for checking if a floating point number is integral.
/// * `max_trial_power` - Maximum power $`k`$ to try.
///
/// # Returns
///
/// An [`Option`] wrapping the required fraction.
///
/// # Panics
///
/// Panics if the deduced order $`n`$ is negative.
#[must_use]
pub fn get_proper_fraction(angle: f64, thresh: f64, max_trial_power: u32) -> Option<F32> {
    let (normalised_angle, _) = normalise_rotation_angle(angle, thresh);
    let rational_order = (2.0 * std::f64::consts::PI) / normalised_angle.abs();
    let mut power: u32 = 1;
    while approx::relative_ne!(
        rational_order * (f64::from(power)),
        (rational_order * (f64::from(power))).round(),
        max_relative = thresh,
        epsilon = thresh
    ) && power < max_trial_power
    {
        power += 1;
    }
    if approx::relative_eq!(
        rational_order * (f64::from(power)),
        (rational_order * (f64::from(power))).round(),
        max_relative = thresh,
        epsilon = thresh
    ) {
        let orderf64 = (rational_order * (f64::from(power))).round();
        assert!(orderf64.is_sign_positive());
        assert!(orderf64 <= f64::from(u32::MAX));
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let order = orderf64 as u32;
        if normalised_angle > 0.0 {
            Some(F32::new(power, order))
        } else {
            Some(F32::new_neg(power, order))
        }
    } else {
        None
    }
}

/// Returns a $`3 \times 3`$ rotation matrix in $`\mathbb{R}^3`$ corresponding to a rotation
/// through `angle` about `axis` raised to the power `power`.
///
/// # Arguments
///
/// * `angle` - The angle of rotation.
/// * `axis` - The axis of rotation.
/// * `power` - The power of rotation.
///
/// # Returns
///
/// The rotation matrix.
#[must_use]
pub fn proper_rotation_matrix(angle: f64, axis: &Vector3<f64>, power: i8) -> Matrix3<f64> {
    let normalised_axis = UnitVector3::new_normalize(*axis);
    Rotation3::from_axis_angle(&normalised_axis, (f64::from(power)) * angle).into_inner()
}

/// Returns a $`3 \times 3`$ transformation matrix in $`\mathbb{R}^3`$ corresponding to an improper
/// rotation through `angle` about `axis` raised to the power `power`.
///
/// The improper rotation is a rotation by the specified angle and axis followed by an
/// inversion through the centre of inversion; even powers are thus proper. A mirror plane
/// perpendicular to `axis` is the improper rotation through $`\pi`$ in this convention.
///
/// # Arguments
///
/// * `angle` - The angle of rotation.
/// * `axis` - The axis of rotation.
/// * `power` - The power of transformation.
///
/// # Returns
///
/// The transformation matrix.
#[must_use]
pub fn improper_rotation_matrix(angle: f64, axis: &Vector3<f64>, power: i8) -> Matrix3<f64> {
    let rotmat = proper_rotation_matrix(angle, axis, power);
    if power % 2 == 1 {
        -rotmat
    } else {
        rotmat
    }
}

/// Extracts the axis and angle of a proper rotation matrix.
///
/// The rotation angle $`\theta \in [0, \pi]`$ is recovered from
/// $`\mathrm{tr}\ \mathbf{R} = 1 + 2\cos\theta`$. Away from $`\theta \approx 0`$ and
/// $`\theta \approx \pi`$, the axis is read off the antisymmetric part of $`\mathbf{R}`$. At
/// $`\theta \approx \pi`$ the antisymmetric part vanishes and the axis is instead obtained as
/// the $`+1`$-eigenvector of the symmetrised matrix.
///
/// # Arguments
///
/// * `mat` - A proper rotation matrix.
/// * `thresh` - A threshold for comparisons.
///
/// # Returns
///
/// The unit rotation axis and the rotation angle. The axis is the null vector when the angle
/// vanishes, in which case it is undetermined.
///
/// # Panics
///
/// Panics if `mat` is not a proper rotation matrix within `thresh`, or if the
/// $`\theta \approx \pi`$ eigenpath fails to produce a $`+1`$-eigenvector.
#[must_use]
pub fn rotation_axis_angle(mat: &Matrix3<f64>, thresh: f64) -> (Vector3<f64>, f64) {
    assert!(
        check_orthogonality(mat, thresh) && (mat.determinant() - 1.0).abs() < thresh,
        "Axis-angle extraction requires a proper rotation matrix."
    );
    let rot_angle = ((mat.trace() - 1.0) / 2.0).clamp(-1.0, 1.0).acos();
    if rot_angle < thresh {
        return (Vector3::zeros(), 0.0);
    }
    if (std::f64::consts::PI - rot_angle).abs() > thresh {
        let axis = Vector3::new(
            mat[(2, 1)] - mat[(1, 2)],
            mat[(0, 2)] - mat[(2, 0)],
            mat[(1, 0)] - mat[(0, 1)],
        ) / (2.0 * rot_angle.sin());
        (axis.normalize(), rot_angle)
    } else {
        // The antisymmetric part vanishes at θ = π. The axis spans the +1-eigenspace of the
        // symmetrised matrix, which remains well-conditioned here.
        let eig = SymmetricEigen::new((mat + mat.transpose()) / 2.0);
        let axis_index = eig
            .eigenvalues
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (**a - 1.0)
                    .abs()
                    .partial_cmp(&(**b - 1.0).abs())
                    .expect("Unable to compare eigenvalue distances from +1.")
            })
            .map(|(i, _)| i)
            .expect("Unable to locate the +1-eigenvalue of the symmetrised rotation matrix.");
        assert!(
            (eig.eigenvalues[axis_index] - 1.0).abs() < thresh.sqrt(),
            "No eigenvalue of the symmetrised rotation matrix is close to +1."
        );
        let mut axis: Vector3<f64> = eig.eigenvectors.column(axis_index).into();
        // A π-rotation axis is sign-ambiguous. Fix the sign so that the largest-magnitude
        // component is positive.
        let max_index = axis
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                a.abs()
                    .partial_cmp(&b.abs())
                    .expect("Unable to compare axis components.")
            })
            .map(|(i, _)| i)
            .expect("Unable to locate the largest axis component.");
        if axis[max_index] < 0.0 {
            axis = -axis;
        }
        (axis.normalize(), rot_angle)
    }
}

/// Returns the proper rotation matrix that carries one vector onto the direction of another.
///
/// The rotation is performed about the mutual perpendicular of the two vectors. When the
/// vectors are parallel, the identity is returned. When they are antiparallel, the rotation
/// axis is underdetermined: any perpendicular axis gives a valid π-rotation, so a fallback
/// axis must be supplied by the caller, otherwise the function fails.
///
/// # Arguments
///
/// * `vec1` - The vector to be rotated.
/// * `vec2` - The target direction.
/// * `fallback_axis` - An axis perpendicular to `vec1` to be used when `vec1` and `vec2` are
///     antiparallel.
/// * `thresh` - A threshold for detecting parallelism.
///
/// # Returns
///
/// The rotation matrix $`\mathbf{T}`$ such that $`\mathbf{T} \hat{\mathbf{v}}_1 =
/// \hat{\mathbf{v}}_2`$, or a [`DegenerateAxisError`] in the unresolvable antiparallel case.
///
/// # Panics
///
/// Panics if either vector is a null vector.
pub fn rotate_vector_onto(
    vec1: &Vector3<f64>,
    vec2: &Vector3<f64>,
    fallback_axis: Option<&Vector3<f64>>,
    thresh: f64,
) -> Result<Matrix3<f64>, DegenerateAxisError> {
    let unit1 = vec1.normalize();
    let unit2 = vec2.normalize();
    let cross = unit1.cross(&unit2);
    if cross.norm() < thresh {
        if unit1.dot(&unit2) > 0.0 {
            Ok(Matrix3::identity())
        } else if let Some(fallback) = fallback_axis {
            Ok(proper_rotation_matrix(std::f64::consts::PI, fallback, 1))
        } else {
            Err(DegenerateAxisError(format!(
                "The rotation axis between the antiparallel vectors {vec1} and {vec2} is underdetermined."
            )))
        }
    } else {
        Ok(proper_rotation_matrix(angle(&unit1, &unit2), &cross, 1))
    }
}

// ============================
// Trait definitions: Transform
// ============================

/// Geometrical transformability in three dimensions.
pub trait Transform {
    /// Transforms in-place the coordinates about the origin by a given
    /// transformation.
    ///
    /// # Arguments
    ///
    /// * `mat` - A three-dimensional transformation matrix.
    fn transform_mut(&mut self, mat: &Matrix3<f64>);

    /// Rotates in-place the coordinates through `angle` about `axis`.
    ///
    /// # Arguments
    ///
    /// * `angle` - The angle of rotation.
    /// * `axis` - The axis of rotation.
    fn rotate_mut(&mut self, angle: f64, axis: &Vector3<f64>);

    /// Translates in-place the coordinates by a specified translation vector in
    /// three dimensions.
    ///
    /// # Arguments
    ///
    /// * `tvec` - The translation vector.
    fn translate_mut(&mut self, tvec: &Vector3<f64>);

    /// Recentres in-place to put the centroid at the origin.
    fn recentre_mut(&mut self);

    /// Clones and transforms the coordinates about the origin by a given
    /// transformation.
    ///
    /// # Arguments
    ///
    /// * `mat` - A three-dimensional transformation matrix.
    ///
    /// # Returns
    ///
    /// A transformed copy.
    #[must_use]
    fn transform(&self, mat: &Matrix3<f64>) -> Self;

    /// Clones and rotates the coordinates through `angle` about `axis`.
    ///
    /// # Arguments
    ///
    /// * `angle` - The angle of rotation.
    /// * `axis` - The axis of rotation.
    ///
    /// # Returns
    ///
    /// A rotated copy.
    #[must_use]
    fn rotate(&self, angle: f64, axis: &Vector3<f64>) -> Self;

    /// Clones and translates the coordinates by a specified translation in
    /// three dimensions.
    ///
    /// # Arguments
    ///
    /// * `tvec` - The translation vector.
    ///
    /// # Returns
    ///
    /// A translated copy.
    #[must_use]
    fn translate(&self, tvec: &Vector3<f64>) -> Self;

    /// Clones and recentres to put the centroid at the origin.
    ///
    /// # Returns
    ///
    /// A recentred copy.
    #[must_use]
    fn recentre(&self) -> Self;
}
