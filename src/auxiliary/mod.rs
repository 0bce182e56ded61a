//! Foundational geometric and molecular items.

pub mod atom;
pub mod geometry;
pub mod molecule;
