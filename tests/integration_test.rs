use std::collections::HashMap;
use std::f64::consts::PI;

use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use xtalsym::auxiliary::molecule::Molecule;
use xtalsym::interfaces::{RigidBodyProvider, SiteSymmetryProvider, UnknownPositionError};
use xtalsym::solver::{orientations_in_site, SolverOptions};
use xtalsym::symmetry::symmetry_operation::SymmOp;

/// A minimal in-memory site-symmetry table covering a handful of positions.
struct TinySiteTable;

impl SiteSymmetryProvider for TinySiteTable {
    fn operations_for(
        &self,
        space_group: u16,
        wyckoff_index: usize,
    ) -> Result<Vec<SymmOp>, UnknownPositionError> {
        match (space_group, wyckoff_index) {
            // P1, general position.
            (1, 0) => Ok(vec![SymmOp::identity(1e-6)]),
            // P-1, inversion centre at the origin.
            (2, 1) => Ok(vec![SymmOp::identity(1e-6), SymmOp::inversion(1e-6)]),
            // P2, twofold axis along z in this toy setting.
            (3, 1) => Ok(vec![
                SymmOp::identity(1e-6),
                SymmOp::from_axis_angle(PI, &Vector3::z(), 1e-6),
            ]),
            _ => Err(UnknownPositionError(format!(
                "Wyckoff position {wyckoff_index} of space group {space_group} is not tabulated."
            ))),
        }
    }
}

struct BodyLibrary {
    bodies: HashMap<String, Molecule>,
}

impl BodyLibrary {
    fn new() -> Self {
        let mut bodies = HashMap::new();
        bodies.insert(
            "CO".to_string(),
            Molecule::from_species_coords(
                &[("C", [0.0, 0.0, 0.0]), ("O", [0.0, 0.0, 1.128])],
                1e-6,
            ),
        );
        bodies.insert(
            "N2".to_string(),
            Molecule::from_species_coords(
                &[("N", [0.0, 0.0, -0.55]), ("N", [0.0, 0.0, 0.55])],
                1e-6,
            ),
        );
        BodyLibrary { bodies }
    }
}

impl RigidBodyProvider for BodyLibrary {
    fn geometry_of(&self, body_id: &str) -> Option<Molecule> {
        self.bodies.get(body_id).cloned()
    }
}

#[test]
fn test_general_position_is_unconstrained() {
    let mut rng = StdRng::seed_from_u64(0);
    let library = BodyLibrary::new();
    let co = library
        .geometry_of("CO")
        .expect("The body library must know CO.");
    let site_ops = TinySiteTable
        .operations_for(1, 0)
        .expect("The table must know the general position of P1.");
    let orientations = orientations_in_site(&co, &site_ops, &SolverOptions::default(), &mut rng)
        .expect("The solve at a general position failed.");
    assert_eq!(orientations.len(), 1);
    assert_eq!(orientations[0].degrees_of_freedom(), 2);
}

#[test]
fn test_inversion_centre_occupancy() {
    let mut rng = StdRng::seed_from_u64(1);
    let library = BodyLibrary::new();
    let site_ops = TinySiteTable
        .operations_for(2, 1)
        .expect("The table must know the inversion centre of P-1.");

    // A homonuclear diatomic is centrosymmetric and sits freely at the inversion centre.
    let n2 = library
        .geometry_of("N2")
        .expect("The body library must know N2.");
    let orientations = orientations_in_site(&n2, &site_ops, &SolverOptions::default(), &mut rng)
        .expect("The solve for N2 at an inversion centre failed.");
    assert_eq!(orientations.len(), 1);
    assert_eq!(orientations[0].degrees_of_freedom(), 2);

    // A heteronuclear diatomic cannot.
    let co = library
        .geometry_of("CO")
        .expect("The body library must know CO.");
    let orientations = orientations_in_site(&co, &site_ops, &SolverOptions::default(), &mut rng)
        .expect("The solve for CO at an inversion centre failed.");
    assert!(orientations.is_empty());
}

#[test]
fn test_twofold_axis_occupancy() {
    let mut rng = StdRng::seed_from_u64(2);
    let library = BodyLibrary::new();
    let site_ops = TinySiteTable
        .operations_for(3, 1)
        .expect("The table must know the twofold axis of P2.");

    let co = library
        .geometry_of("CO")
        .expect("The body library must know CO.");
    let orientations = orientations_in_site(&co, &site_ops, &SolverOptions::default(), &mut rng)
        .expect("The solve for CO on a twofold axis failed.");
    assert_eq!(orientations.len(), 2);
    assert!(orientations
        .iter()
        .all(|orientation| orientation.degrees_of_freedom() == 1));

    // For a homonuclear diatomic the two polarities along the axis coincide, but lying
    // perpendicular to the twofold axis is a second, distinct way of satisfying it.
    let n2 = library
        .geometry_of("N2")
        .expect("The body library must know N2.");
    let orientations = orientations_in_site(&n2, &site_ops, &SolverOptions::default(), &mut rng)
        .expect("The solve for N2 on a twofold axis failed.");
    assert_eq!(orientations.len(), 2);
    assert!(orientations
        .iter()
        .all(|orientation| orientation.degrees_of_freedom() == 1));
}

#[test]
fn test_unknown_position() {
    assert!(TinySiteTable.operations_for(230, 99).is_err());
}
