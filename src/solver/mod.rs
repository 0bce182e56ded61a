//! Enumeration of the symmetry-compatible orientations of a rigid body at a symmetry site.

use anyhow::{self, Context};
use derive_builder::Builder;
use itertools::Itertools;
use log;
use nalgebra::{Matrix3, Vector3};
use rand::Rng;

use crate::auxiliary::geometry::{self, Transform};
use crate::auxiliary::molecule::Molecule;
use crate::orientation::{Orientation, RotationAngle};
use crate::symmetry::operation_analysis::OperationAnalysis;
use crate::symmetry::symmetry_detection::{reoriented, self_symmetry_group};
use crate::symmetry::symmetry_operation::SymmOp;


// ======================================
// Struct definitions and implementations
// ======================================

/// A structure containing control parameters for the orientation solver.
#[derive(Builder, Clone, Debug)]
pub struct SolverOptions {
    /// A boolean indicating if free rotational parameters are realised randomly during the
    /// final verification of each candidate. When `false`, free parameters are verified at
    /// angle zero, which makes the whole solve deterministic.
    #[builder(default = "true")]
    pub randomize: bool,

    /// A boolean indicating if only the already-given orientation is to be checked, instead
    /// of the full family of symmetry-compatible orientations being enumerated. The supplied
    /// body is then verified exactly as given, up to recentring.
    #[builder(default = "false")]
    pub exact_orientation: bool,

    /// A boolean indicating if the supplied molecule is already expressed in its canonical
    /// principal-axis frame, in which case only recentring is performed.
    #[builder(default = "false")]
    pub already_oriented: bool,

    /// A boolean indicating if the mirror image of a chiral body may be placed as well. When
    /// `true`, every orientation found for a chiral body is accompanied by its
    /// negative-determinant counterpart placing the enantiomer; when `false`, a chiral body
    /// at a site with improper operations yields no orientations.
    #[builder(default = "false")]
    pub allow_inversion: bool,

    /// A threshold for all geometric comparisons during the solve.
    #[builder(default = "geometry::DEFAULT_THRESHOLD")]
    pub threshold: f64,
}

impl SolverOptions {
    /// Returns a builder to construct a new [`SolverOptions`] struct.
    #[must_use]
    pub fn builder() -> SolverOptionsBuilder {
        SolverOptionsBuilder::default()
    }
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions::builder()
            .build()
            .expect("Unable to construct default solver options.")
    }
}

// =================
// Solver definition
// =================

/// Enumerates the orientations in which a rigid body satisfies every operation of a site
/// symmetry group.
///
/// The body is first canonicalised into its principal-axis frame and its self-symmetry group
/// detected. Each non-trivial site operation must then be conjugate to some self-symmetry
/// operation; a first axial site operation pins a body axis onto the site axis, leaving one
/// degree of freedom, and a second, non-parallel axial site operation collapses that freedom
/// to a discrete set of angles. Redundant candidates related by a self-symmetry of the body
/// are merged, and every surviving candidate is verified against the full list of site
/// operations.
///
/// In exact mode ([`SolverOptions::exact_orientation`]) no enumeration takes place: the body
/// is recentred and verified in the orientation it was supplied in.
///
/// An empty result is the valid statement that the body cannot sit at the site, not an
/// error; errors are reserved for malformed inputs.
///
/// # Arguments
///
/// * `molecule` - The rigid body. The original is not modified.
/// * `site_ops` - The operations of the site symmetry group. Only their rotational parts act
///     on a body placed at the site point.
/// * `options` - Control parameters for the solve.
/// * `rng` - A source of randomness for the final verification when
///     [`SolverOptions::randomize`] is set.
///
/// # Returns
///
/// The distinct symmetry-compatible orientations of the body at the site, each carrying its
/// remaining rotational degrees of freedom.
pub fn orientations_in_site<R: Rng + ?Sized>(
    molecule: &Molecule,
    site_ops: &[SymmOp],
    options: &SolverOptions,
    rng: &mut R,
) -> anyhow::Result<Vec<Orientation>> {
    let thresh = options.threshold;

    let site_analyses = site_ops
        .iter()
        .map(OperationAnalysis::analyze)
        .collect::<Result<Vec<_>, _>>()
        .context("Unable to classify the site symmetry operations.")?;
    let nontrivial: Vec<&OperationAnalysis> = site_analyses
        .iter()
        .filter(|g| !g.op().is_identity())
        .collect();

    // Exact mode verifies the supplied orientation as given: the body is recentred onto the
    // site point but never reoriented.
    if options.exact_orientation {
        let placed = molecule.recentre();
        let placed_ok = site_analyses
            .iter()
            .all(|g| placed.transform(g.op().rotation()).coincides_with(&placed));
        return Ok(if placed_ok {
            vec![Orientation::fixed(Matrix3::identity())]
        } else {
            vec![]
        });
    }

    let mol = if options.already_oriented {
        molecule.recentre()
    } else {
        reoriented(molecule).0
    };

    // A trivial site places no constraint at all.
    if nontrivial.is_empty() {
        let mut orientations = vec![Orientation::free(Matrix3::identity())];
        // The mirror image of a chiral body is a distinct placement even at a free site.
        if options.allow_inversion
            && self_symmetry_group(&mol, thresh)
                .iter()
                .all(|s| s.determinant() > 0.0)
        {
            orientations.push(Orientation::free(-Matrix3::identity()));
        }
        return Ok(orientations);
    }

    let self_ops = self_symmetry_group(&mol, thresh);
    let mol_analyses = self_ops
        .iter()
        .map(OperationAnalysis::analyze)
        .collect::<Result<Vec<_>, _>>()
        .context("Unable to classify the self-symmetry operations.")?;

    let chiral = mol_analyses.iter().all(|m| m.det > 0);
    if chiral && !options.allow_inversion && nontrivial.iter().any(|g| g.det < 0) {
        log::warn!(
            "A chiral body cannot satisfy improper site operations without inversion being \
             allowed. No orientations are possible."
        );
        return Ok(vec![]);
    }

    // Every non-trivial site operation must be conjugate to a self-symmetry operation for any
    // orientation to exist at all.
    for g in &nontrivial {
        if !mol_analyses.iter().any(|m| m.are_conjugate(g)) {
            log::debug!(
                "Site operation {g} has no conjugate self-symmetry counterpart. No \
                 orientations are possible."
            );
            return Ok(vec![]);
        }
    }

    let constraint1 = nontrivial.iter().find(|g| g.axis.is_some());
    let candidates = match constraint1 {
        None => {
            // Only the inversion remains: it constrains no axis, so the orientation is free.
            vec![Orientation::free(Matrix3::identity())]
        }
        Some(g1) => {
            let g1_axis = g1
                .axis
                .expect("An axial site operation must carry an axis.");
            let constraint2 = nontrivial.iter().find(|g| {
                g.axis
                    .is_some_and(|axis| axis.dot(&g1_axis).abs() < 1.0 - thresh)
            });
            axial_candidates(&mol_analyses, g1, &g1_axis, constraint2.copied(), thresh)?
        }
    };

    let candidates = remove_redundant(candidates, &mol, &self_ops, thresh);

    // A chiral body satisfies proper site operations equally well as its mirror image, which
    // is a distinct placement.
    let candidates = if options.allow_inversion && chiral {
        let inverted = candidates.iter().map(Orientation::inverted).collect_vec();
        candidates.into_iter().chain(inverted).collect_vec()
    } else {
        candidates
    };

    let angle_policy = if options.randomize {
        RotationAngle::Random
    } else {
        RotationAngle::Fixed(0.0)
    };
    let verified = candidates
        .into_iter()
        .filter(|orientation| {
            let placed = mol.transform(&orientation.get_matrix(angle_policy, rng));
            site_analyses
                .iter()
                .all(|g| placed.transform(g.op().rotation()).coincides_with(&placed))
        })
        .collect_vec();
    log::debug!("Number of verified orientations: {}", verified.len());
    Ok(verified)
}

/// Builds candidate orientations satisfying the first axial site constraint, collapsing the
/// remaining axial freedom against a second, non-parallel axial constraint when one exists.
///
/// # Arguments
///
/// * `mol_analyses` - The classified self-symmetry operations of the body.
/// * `g1` - The first axial site operation.
/// * `g1_axis` - The axis of `g1`.
/// * `constraint2` - A site operation whose axis is not parallel to `g1_axis`, if any.
/// * `thresh` - A threshold for geometric comparisons.
///
/// # Returns
///
/// The candidate orientations prior to redundancy removal and verification.
fn axial_candidates(
    mol_analyses: &[OperationAnalysis],
    g1: &OperationAnalysis,
    g1_axis: &Vector3<f64>,
    constraint2: Option<&OperationAnalysis>,
    thresh: f64,
) -> anyhow::Result<Vec<Orientation>> {
    let mut candidates = Vec::new();
    for m1 in mol_analyses.iter().filter(|m| m.are_conjugate(g1)) {
        let Some(m1_axis) = m1.axis else {
            continue;
        };
        // Both polarities of the body axis can be pinned onto the site axis.
        for body_axis in [m1_axis, -m1_axis] {
            let aligned = Orientation::from_constraint(&body_axis, g1_axis, thresh)
                .context("Unable to align a body axis with the site axis.")?;
            match constraint2 {
                None => candidates.push(aligned),
                Some(g2) => {
                    let g2_axis = g2
                        .axis
                        .expect("A second axial site operation must carry an axis.");
                    for m2 in mol_analyses.iter().filter(|m| m.are_conjugate(g2)) {
                        let Some(m2_axis) = m2.axis else {
                            continue;
                        };
                        for second_axis in [m2_axis, -m2_axis] {
                            candidates.extend(collapse_about_axis(
                                aligned.matrix(),
                                g1_axis,
                                &second_axis,
                                &g2_axis,
                                thresh,
                            ));
                        }
                    }
                }
            }
        }
    }
    Ok(candidates)
}

/// Solves for the rotations about a pinned axis that carry a second body axis onto a second
/// site axis.
///
/// After the first alignment, the image of the second body axis traces a circle about the
/// pinned axis. The required rotation angle follows from the chord between that image and the
/// target axis: with circle radius $`r = \sin a`$, $`a`$ the angle between the two site axes,
/// and chord length $`c`$, the angle is $`\theta = \arccos(1 - c^2 / (2 r^2))`$, and both
/// senses of the rotation are candidates. The second body axis must lie on the same cone
/// about the pinned axis as the target for any solution to exist.
///
/// # Arguments
///
/// * `base` - The alignment rotation carrying the first body axis onto the pinned site axis.
/// * `pinned_axis` - The pinned site axis.
/// * `body_axis` - The second body axis, in the body frame.
/// * `target_axis` - The second site axis the body axis must reach.
/// * `thresh` - A threshold for geometric comparisons.
///
/// # Returns
///
/// Zero, one, or two fully determined candidate orientations.
fn collapse_about_axis(
    base: &Matrix3<f64>,
    pinned_axis: &Vector3<f64>,
    body_axis: &Vector3<f64>,
    target_axis: &Vector3<f64>,
    thresh: f64,
) -> Vec<Orientation> {
    let image = base * body_axis;
    let cone_target = geometry::angle(target_axis, pinned_axis);
    let cone_image = geometry::angle(&image, pinned_axis);
    // Rotations about the pinned axis preserve the cone angle; the two cones must agree.
    // The tolerance is relaxed to the square root because the cone angles accumulate error
    // from both the alignment step and the classification of the axes.
    let cone_thresh = thresh.sqrt();
    if (cone_target - cone_image).abs() > cone_thresh {
        return vec![];
    }
    let radius = cone_target.sin();
    if radius < thresh {
        return vec![];
    }
    let chord = (image - target_axis).norm();
    let theta = (1.0 - chord * chord / (2.0 * radius * radius))
        .clamp(-1.0, 1.0)
        .acos();
    [theta, -theta]
        .into_iter()
        .map(|angle| geometry::proper_rotation_matrix(angle, pinned_axis, 1) * base)
        .filter(|matrix| ((matrix * body_axis) - target_axis).norm() < cone_thresh)
        .map(Orientation::fixed)
        .collect()
}

/// Removes candidates that place the body identically to an earlier candidate.
///
/// Two fully determined orientations place the body identically when their relative rotation
/// is a self-symmetry of the body. Two orientations sharing one degree of freedom about the
/// same axis describe the same one-parameter family when some self-symmetry followed by a
/// twist about that axis relates their base matrices, so the whole family is quotiented, not
/// just the bases.
///
/// # Arguments
///
/// * `candidates` - The candidate orientations in discovery order.
/// * `mol` - The canonicalised body.
/// * `self_ops` - The self-symmetry operations of the body.
/// * `thresh` - A threshold for geometric comparisons.
///
/// # Returns
///
/// The candidates with duplicates removed, earliest representative kept.
fn remove_redundant(
    candidates: Vec<Orientation>,
    mol: &Molecule,
    self_ops: &[SymmOp],
    thresh: f64,
) -> Vec<Orientation> {
    let mut kept: Vec<Orientation> = Vec::new();
    for candidate in candidates {
        let redundant = kept.iter().any(|existing| {
            if existing.degrees_of_freedom() != candidate.degrees_of_freedom() {
                return false;
            }
            match (existing.axis(), candidate.axis()) {
                (Some(axis), Some(_)) => self_ops.iter().any(|s| {
                    let relative = candidate.matrix()
                        * s.rotation().transpose()
                        * existing.matrix().transpose();
                    // The relative transformation must be a proper twist about the shared
                    // axis for the two families to coincide.
                    relative.determinant() > 0.0 && ((relative * axis) - axis).norm() < thresh
                }),
                _ => mol
                    .transform(&(existing.matrix().transpose() * candidate.matrix()))
                    .coincides_with(mol),
            }
        });
        if !redundant {
            kept.push(candidate);
        }
    }
    kept
}
