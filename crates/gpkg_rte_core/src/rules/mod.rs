//! Conformance rules for the Related Tables Extension.
//!
//! # Responsibility
//! - Decide whether the extension and each requirements class are in use.
//! - Cross-check declared relations against `gpkg_contents`.
//! - Check user-defined related tables against their class's table contract.
//!
//! # Invariants
//! - Conformance violations become verdicts; only catalog errors propagate.
//! - No rule stops at its first violation.
//!
//! # See also
//! - OGC 18-000, GeoPackage Related Tables Extension

pub mod classes;
pub mod contract;
pub mod gate;
pub mod walker;
