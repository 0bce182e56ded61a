//! Algebraic classification of symmetry operations.

use std::fmt;

use approx;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::auxiliary::geometry;
use crate::symmetry::symmetry_operation::{InvalidOperationError, SymmOp};

#[cfg(test)]
#[path = "operation_analysis_tests.rs"]
mod operation_analysis_tests;

/// The largest rotation order searched for before an angle is deemed irrational.
///
/// Crystallographic site symmetries only ever contain orders in $`\{1, 2, 3, 4, 6\}`$, but
/// molecular self-symmetry operations are unrestricted, so irrational orders are a valid
/// classification outcome rather than an error.
pub const MAX_TRIAL_ORDER: u32 = 12;

// ================
// Enum definitions
// ================

/// An enum to handle rotation orders which can be positive integers or irrational.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationOrder {
    /// Positive integer order.
    Int(u32),

    /// Sentinel for angles that are no rational fraction of a full turn within the search
    /// bound.
    Irrational,
}

impl fmt::Display for RotationOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationOrder::Int(order) => write!(f, "{order}"),
            RotationOrder::Irrational => write!(f, "irrational"),
        }
    }
}

/// An enum to classify the rotational part of an affine operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// The operation leaves every point fixed.
    Identity,

    /// The operation maps every point through the origin, $`\mathbf{R} = -\mathbf{I}`$.
    Inversion,

    /// A proper rotation by a non-zero angle.
    Rotation,

    /// A rotation combined with the spatial inversion (improper rotation).
    Rotoinversion,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Identity => write!(f, "identity"),
            OperationKind::Inversion => write!(f, "inversion"),
            OperationKind::Rotation => write!(f, "rotation"),
            OperationKind::Rotoinversion => write!(f, "rotoinversion"),
        }
    }
}

// ======================================
// Struct definitions and implementations
// ======================================

/// A read-only classification of the rotational part of an affine operation.
///
/// The translation part is ignored: only the rotational block determines the type, order,
/// axis, and angle. All fields are computed once at construction and immutable afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OperationAnalysis {
    /// The analysed operation.
    op: SymmOp,

    /// The classification of the rotational part.
    pub kind: OperationKind,

    /// The sign of the determinant of the rotational part, $`\pm 1`$.
    pub det: i8,

    /// The order of the proper-rotation part.
    pub rotation_order: RotationOrder,

    /// The overall order of the operation. Rotoinversions whose proper part has odd order
    /// must be applied twice as many times as that order to return to the identity, so their
    /// overall order is doubled.
    pub order: RotationOrder,

    /// The unit rotation axis. `None` for the identity and the inversion, whose axes are
    /// undetermined.
    pub axis: Option<Vector3<f64>>,

    /// The rotation angle of the proper-rotation part, in $`[0, \pi]`$. Zero for the identity
    /// and the inversion.
    pub angle: f64,
}

impl OperationAnalysis {
    /// Classifies the rotational part of an affine operation.
    ///
    /// The determinant selects the proper or improper branch; improper operations are
    /// factored as $`\mathbf{R} = -\mathbf{R}'`$ with $`\mathbf{R}'`$ proper and classified
    /// through their proper factor. The rotation angle follows from
    /// $`\mathrm{tr}\ \mathbf{R}' = 1 + 2\cos\theta`$, and the order from the reduced
    /// fraction of $`\theta`$ against a full turn.
    ///
    /// # Arguments
    ///
    /// * `op` - The operation to be classified.
    ///
    /// # Returns
    ///
    /// The classification, or an [`InvalidOperationError`] if the rotational part is not
    /// orthogonal with determinant $`\pm 1`$ within the operation's threshold.
    pub fn analyze(op: &SymmOp) -> Result<OperationAnalysis, InvalidOperationError> {
        let thresh = op.threshold();
        let rotation = *op.rotation();
        if !geometry::check_orthogonality(&rotation, thresh) {
            return Err(InvalidOperationError(format!(
                "The rotational part is not orthogonal within the threshold {thresh:+.3e}: {rotation}"
            )));
        }
        let det = rotation.determinant();
        if (det.abs() - 1.0).abs() >= thresh {
            return Err(InvalidOperationError(format!(
                "The rotational part has determinant {det:+.6}, which is neither +1 nor -1."
            )));
        }
        let improper = det < 0.0;
        let proper_part = if improper { -rotation } else { rotation };
        let (axis, angle) = geometry::rotation_axis_angle(&proper_part, thresh);

        let rotation_order = rotation_order_from_angle(angle, thresh);
        let kind = match (improper, angle < thresh) {
            (false, true) => OperationKind::Identity,
            (true, true) => OperationKind::Inversion,
            (false, false) => OperationKind::Rotation,
            (true, false) => OperationKind::Rotoinversion,
        };
        let order = match rotation_order {
            RotationOrder::Int(n) if improper && n % 2 == 1 => RotationOrder::Int(2 * n),
            other => other,
        };
        let axis = match kind {
            OperationKind::Identity | OperationKind::Inversion => None,
            OperationKind::Rotation | OperationKind::Rotoinversion => Some(axis),
        };
        Ok(OperationAnalysis {
            op: op.clone(),
            kind,
            det: if improper { -1 } else { 1 },
            rotation_order,
            order,
            axis,
            angle: if axis.is_some() { angle } else { 0.0 },
        })
    }

    /// Returns the analysed operation.
    #[must_use]
    pub fn op(&self) -> &SymmOp {
        &self.op
    }

    /// Checks if two operations represent the same transformation in possibly different
    /// reference frames.
    ///
    /// Two operations are conjugate when their proper parts have the same `rotation_order`
    /// (not merely the same overall `order`), their rotation angles agree in magnitude up to
    /// the discrete order, and their determinants have the same sign. Matching on the overall
    /// order alone would wrongly identify, for instance, a $`1/12`$-turn with a
    /// $`5/12`$-turn, both of which have order 12.
    ///
    /// # Arguments
    ///
    /// * `other` - The operation classification to compare against.
    ///
    /// # Returns
    ///
    /// A boolean indicating conjugacy.
    #[must_use]
    pub fn are_conjugate(&self, other: &OperationAnalysis) -> bool {
        let thresh = (self.op.threshold() * other.op.threshold()).sqrt();
        self.det == other.det
            && self.rotation_order == other.rotation_order
            && approx::relative_eq!(
                self.angle,
                other.angle,
                epsilon = thresh,
                max_relative = thresh
            )
    }
}

impl fmt::Display for OperationAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (rotation order {}, overall order {})",
            self.kind, self.rotation_order, self.order
        )
    }
}

/// Determines the order of a proper rotation from its angle.
///
/// # Arguments
///
/// * `angle` - A proper rotation angle in $`[0, \pi]`$.
/// * `thresh` - A threshold for comparisons.
///
/// # Returns
///
/// The rotation order: the smallest $`n \le`$ [`MAX_TRIAL_ORDER`] for which $`n \theta`$ is a
/// multiple of $`2\pi`$ within tolerance, or [`RotationOrder::Irrational`] if no such $`n`$
/// exists.
fn rotation_order_from_angle(angle: f64, thresh: f64) -> RotationOrder {
    if angle.abs() < thresh {
        return RotationOrder::Int(1);
    }
    geometry::get_proper_fraction(angle, thresh, MAX_TRIAL_ORDER)
        .and_then(|fraction| fraction.denom().copied())
        .and_then(|order| (order <= MAX_TRIAL_ORDER).then_some(order))
        .map_or(RotationOrder::Irrational, RotationOrder::Int)
}
