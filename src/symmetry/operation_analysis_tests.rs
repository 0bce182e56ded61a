use std::f64::consts::PI;

use approx;
use nalgebra::Vector3;

use crate::auxiliary::geometry;
use crate::symmetry::operation_analysis::{OperationAnalysis, OperationKind, RotationOrder};
use crate::symmetry::symmetry_operation::SymmOp;

fn analyze(op: &SymmOp) -> OperationAnalysis {
    OperationAnalysis::analyze(op).expect("Unable to classify a valid operation.")
}

#[test]
fn test_operation_analysis_identity() {
    let ana = analyze(&SymmOp::identity(1e-7));
    assert_eq!(ana.kind, OperationKind::Identity);
    assert_eq!(ana.det, 1);
    assert_eq!(ana.rotation_order, RotationOrder::Int(1));
    assert_eq!(ana.order, RotationOrder::Int(1));
    assert!(ana.axis.is_none());
    approx::assert_relative_eq!(ana.angle, 0.0);
}

#[test]
fn test_operation_analysis_inversion() {
    let ana = analyze(&SymmOp::inversion(1e-7));
    assert_eq!(ana.kind, OperationKind::Inversion);
    assert_eq!(ana.det, -1);
    assert_eq!(ana.rotation_order, RotationOrder::Int(1));
    // Applying the inversion twice restores the identity.
    assert_eq!(ana.order, RotationOrder::Int(2));
    assert!(ana.axis.is_none());
}

#[test]
fn test_operation_analysis_proper_rotations() {
    let c2z = analyze(&SymmOp::from_axis_angle(PI, &Vector3::z(), 1e-7));
    assert_eq!(c2z.kind, OperationKind::Rotation);
    assert_eq!(c2z.det, 1);
    assert_eq!(c2z.rotation_order, RotationOrder::Int(2));
    assert_eq!(c2z.order, RotationOrder::Int(2));
    let axis = c2z.axis.expect("A twofold rotation must carry an axis.");
    assert!((axis - Vector3::z()).norm() < 1e-7);
    approx::assert_relative_eq!(c2z.angle, PI, epsilon = 1e-6);

    let axis_111 = Vector3::new(1.0, 1.0, 1.0);
    let c3 = analyze(&SymmOp::from_axis_angle(2.0 * PI / 3.0, &axis_111, 1e-7));
    assert_eq!(c3.rotation_order, RotationOrder::Int(3));
    assert_eq!(c3.order, RotationOrder::Int(3));
    let axis = c3.axis.expect("A threefold rotation must carry an axis.");
    assert!((axis - axis_111.normalize()).norm() < 1e-7);

    let c6y = analyze(&SymmOp::from_axis_angle(PI / 3.0, &Vector3::y(), 1e-7));
    assert_eq!(c6y.rotation_order, RotationOrder::Int(6));
}

#[test]
fn test_operation_analysis_rotoinversions() {
    let s4mat = geometry::improper_rotation_matrix(0.5 * PI, &Vector3::z(), 1);
    let s4 = analyze(
        &SymmOp::from_rotation(s4mat, 1e-7).expect("Unable to construct a fourfold rotoinversion."),
    );
    assert_eq!(s4.kind, OperationKind::Rotoinversion);
    assert_eq!(s4.det, -1);
    assert_eq!(s4.rotation_order, RotationOrder::Int(4));
    assert_eq!(s4.order, RotationOrder::Int(4));

    // A mirror plane is the twofold rotoinversion about its normal.
    let sigma_z_mat = geometry::improper_rotation_matrix(PI, &Vector3::z(), 1);
    let sigma_z = analyze(
        &SymmOp::from_rotation(sigma_z_mat, 1e-7).expect("Unable to construct a mirror plane."),
    );
    assert_eq!(sigma_z.kind, OperationKind::Rotoinversion);
    assert_eq!(sigma_z.rotation_order, RotationOrder::Int(2));
    assert_eq!(sigma_z.order, RotationOrder::Int(2));
    let axis = sigma_z.axis.expect("A mirror plane must carry an axis.");
    assert!((axis - Vector3::z()).norm() < 1e-7);

    // A threefold rotoinversion only restores the identity after six applications.
    let s3mat = geometry::improper_rotation_matrix(2.0 * PI / 3.0, &Vector3::x(), 1);
    let s3 = analyze(
        &SymmOp::from_rotation(s3mat, 1e-7).expect("Unable to construct a threefold rotoinversion."),
    );
    assert_eq!(s3.rotation_order, RotationOrder::Int(3));
    assert_eq!(s3.order, RotationOrder::Int(6));
}

#[test]
fn test_operation_analysis_irrational() {
    let irr = analyze(&SymmOp::from_axis_angle(1.0, &Vector3::z(), 1e-4));
    assert_eq!(irr.kind, OperationKind::Rotation);
    assert_eq!(irr.rotation_order, RotationOrder::Irrational);
    assert_eq!(irr.order, RotationOrder::Irrational);

    // At a loose threshold one radian matches 7/44 of a turn; the denominator exceeds the
    // largest trial order and the operation must still classify as irrational.
    let loose = analyze(&SymmOp::from_axis_angle(1.0, &Vector3::z(), 1e-3));
    assert_eq!(loose.rotation_order, RotationOrder::Irrational);
}

#[test]
fn test_operation_analysis_conjugacy() {
    let c2z = analyze(&SymmOp::from_axis_angle(PI, &Vector3::z(), 1e-6));
    let c2x = analyze(&SymmOp::from_axis_angle(PI, &Vector3::x(), 1e-6));
    assert!(c2z.are_conjugate(&c2x));
    assert!(c2x.are_conjugate(&c2z));

    // Proper and improper twofold operations are never conjugate.
    let sigma_z = analyze(
        &SymmOp::from_rotation(
            geometry::improper_rotation_matrix(PI, &Vector3::z(), 1),
            1e-6,
        )
        .expect("Unable to construct a mirror plane."),
    );
    assert!(!c2z.are_conjugate(&sigma_z));

    // A twelfth-turn and five twelfth-turns share the overall order 12 but are distinct
    // conjugacy classes.
    let c12 = analyze(&SymmOp::from_axis_angle(PI / 6.0, &Vector3::z(), 1e-6));
    let c12_5 = analyze(&SymmOp::from_axis_angle(5.0 * PI / 6.0, &Vector3::z(), 1e-6));
    assert_eq!(c12.rotation_order, RotationOrder::Int(12));
    assert_eq!(c12_5.rotation_order, RotationOrder::Int(12));
    assert!(!c12.are_conjugate(&c12_5));

    // Irrational rotations are conjugate only when their angles agree.
    let irr_a = analyze(&SymmOp::from_axis_angle(1.0, &Vector3::z(), 1e-4));
    let irr_b = analyze(&SymmOp::from_axis_angle(1.0, &Vector3::x(), 1e-4));
    let irr_c = analyze(&SymmOp::from_axis_angle(1.3, &Vector3::z(), 1e-4));
    assert!(irr_a.are_conjugate(&irr_b));
    assert!(!irr_a.are_conjugate(&irr_c));
}
