//! Self-symmetry detection for rigid molecular bodies.
//!
//! A body is first canonicalised into its principal-inertia-axis frame; its point-symmetry
//! operations are then found by testing small-order rotations and improper rotations about a
//! finite set of candidate axes derived from the geometry.

use derive_builder::Builder;
use log;
use nalgebra::{Matrix3, Point3, SymmetricEigen, Vector3};

use crate::auxiliary::geometry::{self, Transform};
use crate::auxiliary::molecule::Molecule;
use crate::symmetry::symmetry_operation::SymmOp;

#[cfg(test)]
#[path = "symmetry_detection_tests.rs"]
mod symmetry_detection_tests;

/// Proper rotation orders tested about each candidate axis.
///
/// Crystallographic site symmetries only contain finite axis orders up to 6, so the search is
/// capped there: in particular, the continuous axial symmetry of a linear body is deliberately
/// approximated by the rotations of order up to 6 about its axis, the largest order the
/// orientation solver can ever need to match.
const TRIAL_ORDERS: [u32; 5] = [2, 3, 4, 5, 6];

/// Calculates the absolute difference between two floats.
fn diff(a: f64, b: f64) -> f64 {
    (a - b).abs()
}

// ================
// Enum definitions
// ================

/// An enum to classify the types of rotational symmetry of a rigid body based on its
/// principal moments of inertia.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationalSymmetry {
    /// All three principal moments of inertia are identical.
    Spherical,

    /// The unique principal moment of inertia is zero, the other two are equal: all atoms lie
    /// on a line.
    Linear,

    /// Exactly two principal moments of inertia are equal.
    SymmetricTop,

    /// All principal moments of inertia are distinct.
    Asymmetric,
}

impl std::fmt::Display for RotationalSymmetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RotationalSymmetry::Spherical => write!(f, "Spherical"),
            RotationalSymmetry::Linear => write!(f, "Linear"),
            RotationalSymmetry::SymmetricTop => write!(f, "Symmetric top"),
            RotationalSymmetry::Asymmetric => write!(f, "Asymmetric"),
        }
    }
}

/// Determines the rotational symmetry given the principal moments of inertia.
///
/// # Arguments
///
/// * `moments` - The three principal moments of inertia in ascending order.
/// * `thresh` - A threshold for comparing moments of inertia.
///
/// # Returns
///
/// The rotational symmetry as one of the [`RotationalSymmetry`] variants.
#[must_use]
pub fn calc_rotational_symmetry(moments: &[f64; 3], thresh: f64) -> RotationalSymmetry {
    if diff(moments[0], moments[1]) < thresh && diff(moments[1], moments[2]) < thresh {
        return RotationalSymmetry::Spherical;
    }
    if moments[0].abs() < thresh && diff(moments[1], moments[2]) < thresh {
        return RotationalSymmetry::Linear;
    }
    if diff(moments[0], moments[1]) < thresh || diff(moments[1], moments[2]) < thresh {
        return RotationalSymmetry::SymmetricTop;
    }
    RotationalSymmetry::Asymmetric
}

// ===========================
// Principal-axis reorientation
// ===========================

/// Diagonalises an inertia tensor into ascending principal moments and a proper rotation
/// carrying the principal axes onto the coordinate axes.
///
/// # Arguments
///
/// * `inertia_tensor` - A symmetric $`3 \times 3`$ inertia tensor.
///
/// # Returns
///
/// The principal moments in ascending order and the rotation matrix whose rows are the
/// corresponding principal axes. The rows are sign-fixed so that their largest-magnitude
/// components are positive, then the last row is negated if needed to make the rotation
/// proper; this makes the decomposition deterministic for non-degenerate spectra.
#[must_use]
pub fn principal_frame(inertia_tensor: &Matrix3<f64>) -> ([f64; 3], Matrix3<f64>) {
    let eig = SymmetricEigen::new(*inertia_tensor);
    let mut indices = [0usize, 1, 2];
    indices.sort_by(|&i, &j| {
        eig.eigenvalues[i]
            .partial_cmp(&eig.eigenvalues[j])
            .expect("Unable to compare principal moments of inertia.")
    });
    let moments = [
        eig.eigenvalues[indices[0]],
        eig.eigenvalues[indices[1]],
        eig.eigenvalues[indices[2]],
    ];
    let mut frame = Matrix3::zeros();
    for (row, &i) in indices.iter().enumerate() {
        let mut axis: Vector3<f64> = eig.eigenvectors.column(i).into();
        let max_index = axis
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                a.abs()
                    .partial_cmp(&b.abs())
                    .expect("Unable to compare principal-axis components.")
            })
            .map(|(k, _)| k)
            .expect("Unable to locate the largest principal-axis component.");
        if axis[max_index] < 0.0 {
            axis = -axis;
        }
        frame.set_row(row, &axis.transpose());
    }
    if frame.determinant() < 0.0 {
        let last_row = -frame.row(2);
        frame.set_row(2, &last_row.clone_owned());
    }
    (moments, frame)
}

/// Produces a copy of a molecule recentred at its centroid and rotated into its
/// principal-inertia-axis frame.
///
/// The principal axis with the smallest moment of inertia is aligned with $`x`$ and that with
/// the largest with $`z`$. The canonicalisation is idempotent within tolerance: reorienting an
/// already-reoriented body leaves it unchanged.
///
/// # Arguments
///
/// * `molecule` - The molecule to be reoriented. The original is not modified.
///
/// # Returns
///
/// The reoriented copy and the rotation matrix that was applied to the recentred coordinates.
#[must_use]
pub fn reoriented(molecule: &Molecule) -> (Molecule, Matrix3<f64>) {
    let recentred = molecule.recentre();
    let inertia_tensor = recentred.calc_moi(&Point3::origin(), false);
    let (_, frame) = principal_frame(&inertia_tensor);
    (recentred.transform(&frame), frame)
}

// ======================================
// Struct definitions and implementations
// ======================================

/// A struct for detecting and storing the self-symmetry operations of a rigid body.
#[derive(Builder, Clone, Debug)]
pub struct MolecularSymmetry {
    /// The molecule whose self-symmetry is sought. Stored recentred at its centroid.
    #[builder(setter(custom))]
    molecule: Molecule,

    /// Threshold for geometric comparisons during the symmetry search.
    #[builder(setter(custom))]
    threshold: f64,

    /// Threshold for comparisons of moments of inertia.
    #[builder(setter(custom))]
    moi_threshold: f64,

    /// The rotational symmetry of [`Self::molecule`] based on its moments of inertia.
    #[builder(setter(skip), default = "None")]
    rotational_symmetry: Option<RotationalSymmetry>,

    /// The detected self-symmetry operations, all purely rotational and expressed about the
    /// centroid. Always contains the identity.
    #[builder(setter(skip), default = "Vec::new()")]
    operations: Vec<SymmOp>,
}

impl MolecularSymmetryBuilder {
    pub fn molecule(&mut self, molecule: &Molecule) -> &mut Self {
        self.molecule = Some(molecule.recentre());
        self
    }

    pub fn threshold(&mut self, thresh: f64) -> &mut Self {
        if thresh >= f64::EPSILON {
            self.threshold = Some(thresh);
        } else {
            log::error!(
                "Threshold value {} is invalid. Threshold must be at least the machine epsilon.",
                thresh
            );
            self.threshold = None;
        }
        self
    }

    pub fn moi_threshold(&mut self, thresh: f64) -> &mut Self {
        if thresh >= f64::EPSILON {
            self.moi_threshold = Some(thresh);
        } else {
            log::error!(
                "Threshold value {} is invalid. Threshold must be at least the machine epsilon.",
                thresh
            );
            self.moi_threshold = None;
        }
        self
    }
}

impl MolecularSymmetry {
    /// Returns a builder to construct a new [`MolecularSymmetry`] struct.
    #[must_use]
    pub fn builder() -> MolecularSymmetryBuilder {
        MolecularSymmetryBuilder::default()
    }

    /// Returns the detected self-symmetry operations. Empty until [`Self::analyze`] has run.
    #[must_use]
    pub fn operations(&self) -> &[SymmOp] {
        &self.operations
    }

    /// Returns the rotational symmetry classification, if [`Self::analyze`] has run.
    #[must_use]
    pub fn rotational_symmetry(&self) -> Option<RotationalSymmetry> {
        self.rotational_symmetry
    }

    /// Detects the self-symmetry operations of the molecule.
    ///
    /// Candidate rotation axes are built from the coordinate axes, atom-centroid directions,
    /// and atom-pair difference and midpoint directions. About each candidate axis, proper
    /// rotations and rotoinversions of the orders in [`TRIAL_ORDERS`] are tested; the
    /// inversion is tested once. An operation is accepted when it maps the molecule onto
    /// itself within tolerance under species-constrained assignment.
    pub fn analyze(&mut self) {
        let mol = &self.molecule;
        let inertia_tensor = mol.calc_moi(&Point3::origin(), false);
        let (moments, frame) = principal_frame(&inertia_tensor);
        let rotsym = calc_rotational_symmetry(&moments, self.moi_threshold);
        self.rotational_symmetry = Some(rotsym);
        log::debug!("Rotational symmetry: {rotsym}");

        let axes = self.candidate_axes(&frame);
        log::debug!("Number of candidate symmetry axes: {}", axes.len());

        let mut operations = vec![SymmOp::identity(self.threshold)];
        let inversion = SymmOp::inversion(self.threshold);
        if mol
            .transform(inversion.rotation())
            .coincides_with(mol)
        {
            operations.push(inversion);
        }
        for axis in &axes {
            for &order in &TRIAL_ORDERS {
                let angle = 2.0 * std::f64::consts::PI / f64::from(order);
                if mol.rotate(angle, axis).coincides_with(mol) {
                    let op = SymmOp::from_axis_angle(angle, axis, self.threshold);
                    if !operations.contains(&op) {
                        operations.push(op);
                    }
                }
                let impropmat = geometry::improper_rotation_matrix(angle, axis, 1);
                if mol.transform(&impropmat).coincides_with(mol) {
                    let op = SymmOp::from_rotation(impropmat, self.threshold)
                        .expect("An improper rotation matrix is always orthogonal.");
                    if !operations.contains(&op) {
                        operations.push(op);
                    }
                }
            }
        }
        log::debug!("Number of self-symmetry operations: {}", operations.len());
        self.operations = operations;
    }

    /// Enumerates candidate rotation axes from the molecular geometry.
    ///
    /// The principal axes of inertia seed the list: any rotation axis or mirror normal of a
    /// rigid body is a principal axis or lies in a degenerate principal plane, and the
    /// atom-centroid, atom-pair difference, and atom-pair midpoint directions cover the
    /// degenerate cases. The list is bounded by the square of the atom count; colinear
    /// duplicates are merged.
    fn candidate_axes(&self, frame: &Matrix3<f64>) -> Vec<Vector3<f64>> {
        let mol = &self.molecule;
        let mut axes: Vec<Vector3<f64>> = (0..3)
            .map(|row| frame.row(row).transpose())
            .collect();
        for axis in [Vector3::x(), Vector3::y(), Vector3::z()] {
            if !axes
                .iter()
                .any(|existing| existing.dot(&axis).abs() > 1.0 - self.threshold)
            {
                axes.push(axis);
            }
        }
        let mut push_axis = |axes: &mut Vec<Vector3<f64>>, axis: Vector3<f64>| {
            if axis.norm() < self.threshold {
                return;
            }
            let unit = axis.normalize();
            if !axes
                .iter()
                .any(|existing| existing.dot(&unit).abs() > 1.0 - self.threshold)
            {
                axes.push(unit);
            }
        };
        for atom in &mol.atoms {
            push_axis(&mut axes, atom.coordinates.coords);
        }
        for (i, atom_i) in mol.atoms.iter().enumerate() {
            for atom_j in mol.atoms.iter().skip(i + 1) {
                push_axis(
                    &mut axes,
                    atom_i.coordinates.coords - atom_j.coordinates.coords,
                );
                push_axis(
                    &mut axes,
                    atom_i.coordinates.coords + atom_j.coordinates.coords,
                );
            }
        }
        axes
    }
}

/// Detects the self-symmetry group of a molecule.
///
/// This is a convenience wrapper around [`MolecularSymmetry`] with a shared threshold for
/// geometric and moment-of-inertia comparisons.
///
/// # Arguments
///
/// * `molecule` - The molecule whose self-symmetry is sought. The original is not modified.
/// * `thresh` - A threshold for approximate comparisons.
///
/// # Returns
///
/// The purely rotational operations, identity included, mapping the recentred molecule onto
/// itself.
#[must_use]
pub fn self_symmetry_group(molecule: &Molecule, thresh: f64) -> Vec<SymmOp> {
    let mut molsym = MolecularSymmetry::builder()
        .molecule(molecule)
        .threshold(thresh)
        .moi_threshold(thresh)
        .build()
        .expect("Unable to construct a `MolecularSymmetry` struct.");
    molsym.analyze();
    molsym.operations().to_vec()
}
