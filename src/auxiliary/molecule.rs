//! Rigid molecular bodies.

use std::fmt;

use nalgebra::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::auxiliary::atom::{Atom, ElementMap};
use crate::auxiliary::geometry::Transform;

#[cfg(test)]
#[path = "molecule_tests.rs"]
mod molecule_tests;

/// A struct containing the atoms constituting a rigid molecular body.
///
/// The atom ordering carries no symmetry meaning: all symmetry comparisons are performed by
/// species-constrained assignment, not by index. Callers' molecules are never mutated by the
/// rest of the crate; transformations always act on clones via [`Transform`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Molecule {
    /// The atoms constituting this molecule.
    pub atoms: Vec<Atom>,

    /// A threshold for approximate equality comparisons.
    pub threshold: f64,
}

impl Molecule {
    /// Constructs a molecule from a list of atoms.
    ///
    /// # Arguments
    ///
    /// * `atoms` - The atoms constituting the molecule.
    /// * `thresh` - A threshold for approximate equality comparisons.
    ///
    /// # Returns
    ///
    /// The required molecule.
    ///
    /// # Panics
    ///
    /// Panics if `atoms` is empty.
    #[must_use]
    pub fn new(atoms: Vec<Atom>, thresh: f64) -> Molecule {
        assert!(!atoms.is_empty(), "A molecule must contain at least one atom.");
        Molecule {
            atoms,
            threshold: thresh,
        }
    }

    /// Constructs a molecule from species labels and Cartesian coordinate triples.
    ///
    /// # Arguments
    ///
    /// * `pairs` - Species labels paired with Cartesian coordinates.
    /// * `thresh` - A threshold for approximate equality comparisons.
    ///
    /// # Returns
    ///
    /// The required molecule with unit-mass atoms.
    #[must_use]
    pub fn from_species_coords(pairs: &[(&str, [f64; 3])], thresh: f64) -> Molecule {
        let atoms = pairs
            .iter()
            .map(|(species, xyz)| Atom::new(species, Point3::new(xyz[0], xyz[1], xyz[2]), thresh))
            .collect();
        Molecule::new(atoms, thresh)
    }

    /// Applies an element mass map to all atoms whose species labels are known element
    /// symbols.
    ///
    /// # Arguments
    ///
    /// * `emap` - A map from element symbols to atomic numbers and masses.
    pub fn set_masses(&mut self, emap: &ElementMap) {
        for atom in &mut self.atoms {
            atom.set_mass(emap);
        }
    }

    /// Calculates the centroid of the molecule.
    ///
    /// # Arguments
    ///
    /// * `mass_weighted` - A flag indicating if atomic masses are used as weights. With the
    ///     default unit masses this makes no difference.
    ///
    /// # Returns
    ///
    /// The centroid.
    #[must_use]
    pub fn calc_com(&self, mass_weighted: bool) -> Point3<f64> {
        let mut com: Point3<f64> = Point3::origin();
        let mut tot_m: f64 = 0.0;
        for atom in &self.atoms {
            let m: f64 = if mass_weighted { atom.mass } else { 1.0 };
            com += atom.coordinates * m - Point3::origin();
            tot_m += m;
        }
        com *= 1.0 / tot_m;
        com
    }

    /// Calculates the inertia tensor of the molecule.
    ///
    /// # Arguments
    ///
    /// * `origin` - An origin about which the inertia tensor is evaluated.
    /// * `mass_weighted` - A flag indicating if atomic masses are used as weights. Point
    ///     masses are unity otherwise.
    ///
    /// # Returns
    ///
    /// The inertia tensor as a $`3 \times 3`$ matrix.
    #[must_use]
    pub fn calc_moi(&self, origin: &Point3<f64>, mass_weighted: bool) -> Matrix3<f64> {
        let mut inertia_tensor = Matrix3::zeros();
        for atom in &self.atoms {
            let mass = if mass_weighted { atom.mass } else { 1.0 };
            let rel_coordinates: Vector3<f64> = atom.coordinates - origin;
            for i in 0..3 {
                for j in 0..=i {
                    if i == j {
                        inertia_tensor[(i, j)] += mass
                            * (rel_coordinates.norm_squared()
                                - rel_coordinates[i] * rel_coordinates[j]);
                    } else {
                        inertia_tensor[(i, j)] -=
                            mass * rel_coordinates[i] * rel_coordinates[j];
                        inertia_tensor[(j, i)] -=
                            mass * rel_coordinates[j] * rel_coordinates[i];
                    }
                }
            }
        }
        inertia_tensor
    }

    /// Checks if this molecule occupies the same set of labelled points as another, within
    /// tolerance.
    ///
    /// Matching is performed by nearest-neighbour species-constrained assignment so that atom
    /// ordering plays no role.
    ///
    /// # Arguments
    ///
    /// * `other` - The molecule to compare against.
    ///
    /// # Returns
    ///
    /// A boolean indicating whether a one-to-one species-preserving assignment exists between
    /// the two sets of atoms within tolerance.
    #[must_use]
    pub fn coincides_with(&self, other: &Molecule) -> bool {
        if self.atoms.len() != other.atoms.len() {
            return false;
        }
        let thresh = (self.threshold * other.threshold).sqrt();
        let mut assigned = vec![false; other.atoms.len()];
        for atom in &self.atoms {
            let nearest = other
                .atoms
                .iter()
                .enumerate()
                .filter(|(j, other_atom)| {
                    !assigned[*j] && other_atom.species == atom.species
                })
                .map(|(j, other_atom)| {
                    ((other_atom.coordinates - atom.coordinates).norm(), j)
                })
                .min_by(|(dist_a, _), (dist_b, _)| {
                    dist_a
                        .partial_cmp(dist_b)
                        .expect("Unable to compare interatomic distances.")
                });
            match nearest {
                Some((dist, j)) if dist < thresh => {
                    assigned[j] = true;
                }
                _ => return false,
            }
        }
        true
    }
}

impl Transform for Molecule {
    fn transform_mut(&mut self, mat: &Matrix3<f64>) {
        for atom in &mut self.atoms {
            atom.transform_mut(mat);
        }
    }

    fn rotate_mut(&mut self, angle: f64, axis: &Vector3<f64>) {
        for atom in &mut self.atoms {
            atom.rotate_mut(angle, axis);
        }
    }

    fn translate_mut(&mut self, tvec: &Vector3<f64>) {
        for atom in &mut self.atoms {
            atom.translate_mut(tvec);
        }
    }

    fn recentre_mut(&mut self) {
        let com = self.calc_com(false);
        let tvec = -Vector3::new(com[0], com[1], com[2]);
        self.translate_mut(&tvec);
    }

    fn transform(&self, mat: &Matrix3<f64>) -> Self {
        let mut transformed_mol = self.clone();
        transformed_mol.transform_mut(mat);
        transformed_mol
    }

    fn rotate(&self, angle: f64, axis: &Vector3<f64>) -> Self {
        let mut rotated_mol = self.clone();
        rotated_mol.rotate_mut(angle, axis);
        rotated_mol
    }

    fn translate(&self, tvec: &Vector3<f64>) -> Self {
        let mut translated_mol = self.clone();
        translated_mol.translate_mut(tvec);
        translated_mol
    }

    fn recentre(&self) -> Self {
        let mut recentred_mol = self.clone();
        recentred_mol.recentre_mut();
        recentred_mol
    }
}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for atom in &self.atoms {
            writeln!(f, "{atom}")?;
        }
        Ok(())
    }
}
