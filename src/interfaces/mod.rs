//! Traits decoupling the orientation solver from sources of site-symmetry data and rigid-body
//! geometries.

use std::fmt;

use crate::auxiliary::molecule::Molecule;
use crate::symmetry::symmetry_operation::SymmOp;

// =================
// Error definitions
// =================

/// An error indicating that a requested space-group and Wyckoff-position combination is not
/// known to a site-symmetry provider.
pub struct UnknownPositionError(pub String);

impl fmt::Debug for UnknownPositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnknownPositionError")
            .field("Message", &self.0)
            .finish()
    }
}

impl fmt::Display for UnknownPositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnknownPositionError with message: {}", &self.0)
    }
}

impl std::error::Error for UnknownPositionError {}

// =================
// Trait definitions
// =================

/// A trait for sources of site-symmetry groups of Wyckoff positions.
///
/// Implementors typically wrap crystallographic tables or an external database; the solver
/// itself carries no such tables.
pub trait SiteSymmetryProvider {
    /// Returns the operations of the site symmetry group of a Wyckoff position.
    ///
    /// # Arguments
    ///
    /// * `space_group` - A space-group number in $`[1, 230]`$.
    /// * `wyckoff_index` - The index of the Wyckoff position within the space group, `0`
    ///     denoting the general position.
    ///
    /// # Returns
    ///
    /// The site symmetry operations, or an [`UnknownPositionError`] if the combination is not
    /// known to this provider.
    fn operations_for(
        &self,
        space_group: u16,
        wyckoff_index: usize,
    ) -> Result<Vec<SymmOp>, UnknownPositionError>;
}

/// A trait for sources of rigid-body geometries addressed by name.
pub trait RigidBodyProvider {
    /// Returns the geometry of a named rigid body.
    ///
    /// # Arguments
    ///
    /// * `body_id` - The identifier of the body.
    ///
    /// # Returns
    ///
    /// The geometry, or `None` if the identifier is not known to this provider.
    fn geometry_of(&self, body_id: &str) -> Option<Molecule>;
}
