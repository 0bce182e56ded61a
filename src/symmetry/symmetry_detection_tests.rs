use std::f64::consts::PI;

use approx;
use nalgebra::{Matrix3, Point3, Vector3};

use crate::auxiliary::geometry::{self, Transform};
use crate::auxiliary::molecule::Molecule;
use crate::symmetry::symmetry_detection::{
    calc_rotational_symmetry, principal_frame, reoriented, self_symmetry_group,
    MolecularSymmetry, RotationalSymmetry,
};
use crate::symmetry::symmetry_operation::SymmOp;

fn water(thresh: f64) -> Molecule {
    Molecule::from_species_coords(
        &[
            ("O", [0.0, 0.0, 0.0]),
            ("H", [0.757, 0.586, 0.0]),
            ("H", [-0.757, 0.586, 0.0]),
        ],
        thresh,
    )
}

#[test]
fn test_symmetry_detection_rotational_symmetry() {
    assert_eq!(
        calc_rotational_symmetry(&[1.0, 1.0, 1.0], 1e-3),
        RotationalSymmetry::Spherical
    );
    assert_eq!(
        calc_rotational_symmetry(&[0.0, 1.5, 1.5], 1e-3),
        RotationalSymmetry::Linear
    );
    assert_eq!(
        calc_rotational_symmetry(&[1.0, 1.0, 2.0], 1e-3),
        RotationalSymmetry::SymmetricTop
    );
    assert_eq!(
        calc_rotational_symmetry(&[1.0, 1.5, 2.0], 1e-3),
        RotationalSymmetry::Asymmetric
    );
}

#[test]
fn test_symmetry_detection_principal_frame() {
    let (moments, frame) = principal_frame(&Matrix3::from_diagonal(&Vector3::new(3.0, 1.0, 2.0)));
    approx::assert_relative_eq!(moments[0], 1.0, epsilon = 1e-12);
    approx::assert_relative_eq!(moments[1], 2.0, epsilon = 1e-12);
    approx::assert_relative_eq!(moments[2], 3.0, epsilon = 1e-12);
    assert!((frame.determinant() - 1.0).abs() < 1e-12);
    // The smallest-moment principal axis becomes x.
    assert!((frame * Vector3::y() - Vector3::x()).norm() < 1e-12);
}

#[test]
fn test_symmetry_detection_reoriented() {
    let mol = water(1e-6).rotate(0.7, &Vector3::new(1.0, 2.0, 3.0));
    let (canonical, frame) = reoriented(&mol);
    assert!(geometry::check_orthogonality(&frame, 1e-10));
    assert!(canonical.calc_com(false).coords.norm() < 1e-10);

    let moi = canonical.calc_moi(&Point3::origin(), false);
    for i in 0..3 {
        for j in 0..3 {
            if i != j {
                approx::assert_relative_eq!(moi[(i, j)], 0.0, epsilon = 1e-10);
            }
        }
    }
    assert!(moi[(0, 0)] < moi[(1, 1)]);
    assert!(moi[(1, 1)] < moi[(2, 2)]);

    // Canonicalisation is idempotent.
    let (canonical_again, frame_again) = reoriented(&canonical);
    assert!(canonical_again.coincides_with(&canonical));
    assert!((frame_again - Matrix3::identity()).norm() < 1e-7);
}

#[test]
fn test_symmetry_detection_water() {
    let group = self_symmetry_group(&water(1e-6), 1e-6);

    // Water has the four operations of C2v: the identity, the twofold rotation, and two
    // mirror planes.
    assert_eq!(group.len(), 4);
    assert!(group.contains(&SymmOp::identity(1e-6)));
    assert!(group.contains(&SymmOp::from_axis_angle(PI, &Vector3::y(), 1e-6)));
    let sigma_z = SymmOp::from_rotation(
        geometry::improper_rotation_matrix(PI, &Vector3::z(), 1),
        1e-6,
    )
    .expect("Unable to construct a mirror plane.");
    let sigma_x = SymmOp::from_rotation(
        geometry::improper_rotation_matrix(PI, &Vector3::x(), 1),
        1e-6,
    )
    .expect("Unable to construct a mirror plane.");
    assert!(group.contains(&sigma_z));
    assert!(group.contains(&sigma_x));
    assert!(!group.contains(&SymmOp::inversion(1e-6)));
}

#[test]
fn test_symmetry_detection_linear() {
    let co = Molecule::from_species_coords(
        &[("C", [0.0, 0.0, 0.0]), ("O", [0.0, 0.0, 1.128])],
        1e-6,
    );
    let mut molsym = MolecularSymmetry::builder()
        .molecule(&co)
        .threshold(1e-6)
        .moi_threshold(1e-6)
        .build()
        .expect("Unable to construct a `MolecularSymmetry` struct.");
    molsym.analyze();
    assert_eq!(molsym.rotational_symmetry(), Some(RotationalSymmetry::Linear));

    // The continuous axial rotations are represented by the finite orders up to 6.
    let group = molsym.operations();
    for order in [2u32, 3, 4, 5, 6] {
        let cn = SymmOp::from_axis_angle(2.0 * PI / f64::from(order), &Vector3::z(), 1e-6);
        assert!(group.contains(&cn));
    }
    // A heteronuclear diatomic has no operation reversing its axis.
    assert!(!group.contains(&SymmOp::from_axis_angle(PI, &Vector3::x(), 1e-6)));
    assert!(!group.contains(&SymmOp::inversion(1e-6)));
}

#[test]
fn test_symmetry_detection_asymmetric_chiral() {
    let mol = Molecule::from_species_coords(
        &[
            ("C", [0.0, 0.0, 0.0]),
            ("N", [1.1, 0.0, 0.0]),
            ("O", [0.0, 1.3, 0.1]),
            ("S", [-0.4, -0.2, 1.7]),
        ],
        1e-6,
    );
    let group = self_symmetry_group(&mol, 1e-6);
    assert_eq!(group.len(), 1);
    assert!(group[0].is_identity());
}

#[test]
fn test_symmetry_detection_invalid_threshold() {
    assert!(MolecularSymmetry::builder()
        .molecule(&water(1e-6))
        .threshold(-1.0)
        .moi_threshold(1e-6)
        .build()
        .is_err());
}
