//! # xtalsym: symmetry-compatible orientations of rigid bodies at crystallographic sites
//!
//! xtalsym analyses the point-symmetry content of rigid molecular bodies and determines the
//! orientations in which such a body can occupy a Wyckoff site of a given site symmetry:
//! - classification of affine symmetry operations by kind, order, axis, and angle,
//! - detection of the rotational self-symmetry group of a rigid body,
//! - canonicalisation of bodies into their principal-inertia-axis frames, and
//! - enumeration of the symmetry-compatible orientations at a site, each with its remaining
//!   rotational degrees of freedom.
//!
//! Crystallographic tables themselves are out of scope: site symmetry groups enter through
//! the [`interfaces::SiteSymmetryProvider`] trait, and rigid-body geometries through
//! [`interfaces::RigidBodyProvider`].

pub mod auxiliary;
pub mod interfaces;
pub mod orientation;
pub mod solver;
pub mod symmetry;
