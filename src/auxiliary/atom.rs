//! Atoms and element data.

use std::collections::HashMap;
use std::fmt;

use approx;
use nalgebra::{Matrix3, Point3, Vector3};
use periodic_table;
use serde::{Deserialize, Serialize};

use crate::auxiliary::geometry::{self, Transform};

/// A struct storing a look-up of element symbols to give atomic numbers
/// and atomic masses.
pub struct ElementMap<'a> {
    /// A [`HashMap`] from a symbol string to a tuple of atomic number and atomic
    /// mass.
    map: HashMap<&'a str, (u32, f64)>,
}

impl Default for ElementMap<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementMap<'static> {
    /// Creates a new [`ElementMap`] for all elements in the periodic table.
    #[must_use]
    pub fn new() -> ElementMap<'static> {
        let mut map = HashMap::new();
        let elements = periodic_table::periodic_table();
        for element in elements {
            let mass = parse_atomic_mass(element.atomic_mass);
            map.insert(element.symbol, (element.atomic_number, mass));
        }
        ElementMap { map }
    }
}

impl<'a> ElementMap<'a> {
    /// Looks up an element symbol.
    ///
    /// # Arguments
    ///
    /// * `symbol` - An element symbol.
    ///
    /// # Returns
    ///
    /// The atomic number and atomic mass of the element, if the symbol is known.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<(u32, f64)> {
        self.map.get(symbol).copied()
    }
}

/// An auxiliary function that parses the atomic mass string in the format of
/// [`periodic_table`] to a single float value.
///
/// # Arguments
///
/// * `mass_str` - A string of mass value that is either `x.y(z)` where the
///     uncertain digit `z` is enclosed in parentheses, or `[x]` where `x`
///     is the mass number in place of precise experimental values.
///
/// # Returns
///
/// The numeric mass value.
fn parse_atomic_mass(mass_str: &str) -> f64 {
    let mass = mass_str.replace(&['(', ')', '[', ']'][..], "");
    mass.parse::<f64>()
        .unwrap_or_else(|_| panic!("Unable to parse atomic mass string {mass}."))
}

/// A struct representing an atom of a rigid body.
///
/// Symmetry testing treats atoms as labelled points: the species label constrains which atoms
/// may be mapped onto which, and the mass only matters when a mass-weighted inertia tensor is
/// explicitly requested.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Atom {
    /// The species label of the atom, usually an element symbol.
    pub species: String,

    /// The mass of the atom. Unity unless an element mass map has been applied.
    pub mass: f64,

    /// The position of the atom.
    pub coordinates: Point3<f64>,

    /// A threshold for approximate equality comparisons.
    pub threshold: f64,
}

impl Atom {
    /// Creates a unit-mass atom.
    ///
    /// # Arguments
    ///
    /// * `species` - A species label.
    /// * `coordinates` - The position of the atom.
    /// * `thresh` - A threshold for approximate equality comparisons.
    ///
    /// # Returns
    ///
    /// The required atom.
    #[must_use]
    pub fn new(species: &str, coordinates: Point3<f64>, thresh: f64) -> Atom {
        Atom {
            species: species.to_string(),
            mass: 1.0,
            coordinates,
            threshold: thresh,
        }
    }

    /// Sets the atomic mass from an element map, should the species label be a known element
    /// symbol.
    ///
    /// # Arguments
    ///
    /// * `emap` - A map from element symbols to atomic numbers and masses.
    pub fn set_mass(&mut self, emap: &ElementMap) {
        if let Some((_, mass)) = emap.get(&self.species) {
            self.mass = mass;
        } else {
            log::warn!(
                "Species `{}` is not a known element symbol; its unit mass is kept.",
                self.species
            );
        }
    }
}

impl Transform for Atom {
    fn transform_mut(&mut self, mat: &Matrix3<f64>) {
        let new_coordinates = mat * self.coordinates.coords;
        self.coordinates = Point3::from(new_coordinates);
    }

    fn rotate_mut(&mut self, angle: f64, axis: &Vector3<f64>) {
        let rotmat = geometry::proper_rotation_matrix(angle, axis, 1);
        self.transform_mut(&rotmat);
    }

    fn translate_mut(&mut self, tvec: &Vector3<f64>) {
        self.coordinates += tvec;
    }

    fn recentre_mut(&mut self) {
        self.coordinates = Point3::origin();
    }

    fn transform(&self, mat: &Matrix3<f64>) -> Self {
        let mut transformed_atom = self.clone();
        transformed_atom.transform_mut(mat);
        transformed_atom
    }

    fn rotate(&self, angle: f64, axis: &Vector3<f64>) -> Self {
        let mut rotated_atom = self.clone();
        rotated_atom.rotate_mut(angle, axis);
        rotated_atom
    }

    fn translate(&self, tvec: &Vector3<f64>) -> Self {
        let mut translated_atom = self.clone();
        translated_atom.translate_mut(tvec);
        translated_atom
    }

    fn recentre(&self) -> Self {
        let mut recentred_atom = self.clone();
        recentred_atom.recentre_mut();
        recentred_atom
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        let thresh = (self.threshold * other.threshold).sqrt();
        self.species == other.species
            && approx::relative_eq!(
                (self.coordinates - other.coordinates).norm(),
                0.0,
                epsilon = thresh,
                max_relative = thresh
            )
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:+.6} {:+.6} {:+.6}",
            self.species, self.coordinates[0], self.coordinates[1], self.coordinates[2]
        )
    }
}
