//! Symmetry operations, their classification, and rigid-body self-symmetry detection.

pub mod operation_analysis;
pub mod symmetry_detection;
pub mod symmetry_operation;
