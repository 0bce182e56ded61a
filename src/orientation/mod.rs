//! Orientational degrees of freedom of rigid bodies at symmetry sites.

use std::fmt;

use nalgebra::{Matrix3, Vector3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::auxiliary::geometry::{self, DegenerateAxisError};
use crate::symmetry::symmetry_operation::SymmOp;


// ================
// Enum definitions
// ================

/// An enum specifying how the free rotational parameter of a partially constrained
/// orientation is chosen when its matrix is realised.
#[derive(Clone, Copy, Debug)]
pub enum RotationAngle {
    /// A caller-supplied angle in radians.
    Fixed(f64),

    /// An angle drawn uniformly from $`[0, 2\pi)`$.
    Random,
}

// ======================================
// Struct definitions and implementations
// ======================================

/// A struct describing an allowed orientation of a rigid body together with its remaining
/// rotational freedom.
///
/// The stored matrix carries the body from its canonical principal-axis frame into the site
/// frame. The degrees of freedom count the rotational parameters left unconstrained by the
/// site: zero for a fully fixed orientation, one for a free rotation about [`Self::axis`],
/// and two for a completely free orientation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Orientation {
    /// The base orientation matrix.
    matrix: Matrix3<f64>,

    /// The number of remaining rotational degrees of freedom: 0, 1, or 2.
    dof: u8,

    /// The unit axis of the remaining free rotation. Present if and only if
    /// [`Self::dof`] is 1.
    axis: Option<Vector3<f64>>,
}

impl Orientation {
    /// Constructs a fully determined orientation with no remaining freedom.
    ///
    /// # Arguments
    ///
    /// * `matrix` - The orientation matrix.
    #[must_use]
    pub fn fixed(matrix: Matrix3<f64>) -> Orientation {
        Orientation {
            matrix,
            dof: 0,
            axis: None,
        }
    }

    /// Constructs an orientation with one remaining rotational degree of freedom.
    ///
    /// # Arguments
    ///
    /// * `matrix` - The base orientation matrix.
    /// * `axis` - The axis about which the body may still rotate freely, in the site frame.
    #[must_use]
    pub fn constrained(matrix: Matrix3<f64>, axis: Vector3<f64>) -> Orientation {
        Orientation {
            matrix,
            dof: 1,
            axis: Some(axis.normalize()),
        }
    }

    /// Constructs a completely free orientation.
    ///
    /// # Arguments
    ///
    /// * `matrix` - The base orientation matrix.
    #[must_use]
    pub fn free(matrix: Matrix3<f64>) -> Orientation {
        Orientation {
            matrix,
            dof: 2,
            axis: None,
        }
    }

    /// Constructs the axially constrained orientation that carries a body axis onto a site
    /// axis.
    ///
    /// The base matrix is the rotation taking `body_axis` onto `site_axis`; the body retains
    /// one degree of freedom, the rotation about `site_axis`. In the antiparallel case the
    /// carrying rotation is the π-rotation about a deterministic perpendicular of
    /// `body_axis`.
    ///
    /// # Arguments
    ///
    /// * `body_axis` - A symmetry axis of the body in its canonical frame.
    /// * `site_axis` - The site axis the body axis must be aligned with.
    /// * `thresh` - A threshold for detecting parallelism.
    ///
    /// # Returns
    ///
    /// The required orientation. [`DegenerateAxisError`] cannot occur because a fallback
    /// perpendicular is always supplied, but the signature mirrors the underlying rotation
    /// construction.
    pub fn from_constraint(
        body_axis: &Vector3<f64>,
        site_axis: &Vector3<f64>,
        thresh: f64,
    ) -> Result<Orientation, DegenerateAxisError> {
        let fallback = geometry::perpendicular_to(body_axis);
        let matrix = geometry::rotate_vector_onto(body_axis, site_axis, Some(&fallback), thresh)?;
        Ok(Orientation::constrained(matrix, *site_axis))
    }

    /// Returns the orientation that places the mirror image of the body.
    ///
    /// The base matrix is negated, so every realisation of the result has negative
    /// determinant. The remaining freedom and its axis are unchanged: twists about the axis
    /// commute with the inversion.
    ///
    /// # Returns
    ///
    /// The inverted orientation.
    #[must_use]
    pub fn inverted(&self) -> Orientation {
        Orientation {
            matrix: -self.matrix,
            dof: self.dof,
            axis: self.axis,
        }
    }

    /// Returns the number of remaining rotational degrees of freedom.
    #[must_use]
    pub fn degrees_of_freedom(&self) -> u8 {
        self.dof
    }

    /// Returns the axis of the remaining free rotation, if there is exactly one.
    #[must_use]
    pub fn axis(&self) -> Option<&Vector3<f64>> {
        self.axis.as_ref()
    }

    /// Returns the base orientation matrix without realising any free parameter.
    #[must_use]
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Realises the orientation as a rotation matrix, resolving any remaining freedom.
    ///
    /// With no remaining freedom the stored matrix is returned unchanged. With one degree of
    /// freedom the free rotation about the stored axis is applied after the base matrix. With
    /// two degrees of freedom a uniformly random rotation is applied when `angle` is
    /// [`RotationAngle::Random`]; a [`RotationAngle::Fixed`] angle is meaningless there and
    /// the base matrix is returned unchanged, which keeps repeated realisations
    /// deterministic.
    ///
    /// # Arguments
    ///
    /// * `angle` - The policy for choosing the free rotational parameter.
    /// * `rng` - A source of randomness for [`RotationAngle::Random`].
    ///
    /// # Returns
    ///
    /// The realised orientation matrix.
    #[must_use]
    pub fn get_matrix<R: Rng + ?Sized>(&self, angle: RotationAngle, rng: &mut R) -> Matrix3<f64> {
        match (self.dof, &self.axis) {
            (0, _) => self.matrix,
            (1, Some(axis)) => {
                let phi = match angle {
                    RotationAngle::Fixed(phi) => phi,
                    RotationAngle::Random => rng.gen_range(0.0..2.0 * std::f64::consts::PI),
                };
                geometry::proper_rotation_matrix(phi, axis, 1) * self.matrix
            }
            (2, _) => match angle {
                RotationAngle::Fixed(_) => self.matrix,
                RotationAngle::Random => random_rotation(rng) * self.matrix,
            },
            (dof, axis) => panic!(
                "Encountered an orientation with {dof} degrees of freedom and axis {axis:?}."
            ),
        }
    }

    /// Realises the orientation as a purely rotational symmetry operation.
    ///
    /// # Arguments
    ///
    /// * `angle` - The policy for choosing the free rotational parameter.
    /// * `rng` - A source of randomness for [`RotationAngle::Random`].
    /// * `thresh` - A threshold for the constructed operation.
    ///
    /// # Returns
    ///
    /// The realised operation.
    #[must_use]
    pub fn get_op<R: Rng + ?Sized>(
        &self,
        angle: RotationAngle,
        rng: &mut R,
        thresh: f64,
    ) -> SymmOp {
        SymmOp::from_rotation(self.get_matrix(angle, rng), thresh)
            .expect("A realised orientation matrix is always orthogonal.")
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.dof, &self.axis) {
            (0, _) => write!(f, "Fixed orientation"),
            (1, Some(axis)) => write!(
                f,
                "Orientation free about [{:+.6}, {:+.6}, {:+.6}]",
                axis[0], axis[1], axis[2]
            ),
            _ => write!(f, "Free orientation"),
        }
    }
}

// =================
// Utility functions
// =================

/// Draws a uniformly random proper rotation matrix.
///
/// The axis is drawn uniformly on the unit sphere via a uniform polar cosine and azimuth, and
/// the angle uniformly from $`[0, 2\pi)`$.
///
/// # Arguments
///
/// * `rng` - A source of randomness.
///
/// # Returns
///
/// A proper rotation matrix.
#[must_use]
pub fn random_rotation<R: Rng + ?Sized>(rng: &mut R) -> Matrix3<f64> {
    let z: f64 = rng.gen_range(-1.0..1.0);
    let azimuth: f64 = rng.gen_range(0.0..2.0 * std::f64::consts::PI);
    let radial = (1.0 - z * z).sqrt();
    let axis = if radial > f64::EPSILON {
        Vector3::new(radial * azimuth.cos(), radial * azimuth.sin(), z)
    } else {
        Vector3::z()
    };
    let angle: f64 = rng.gen_range(0.0..2.0 * std::f64::consts::PI);
    geometry::proper_rotation_matrix(angle, &axis, 1)
}
