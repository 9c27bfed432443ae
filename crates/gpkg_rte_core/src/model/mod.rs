//! Read-only catalog snapshots and the verdicts produced from them.
//!
//! # Responsibility
//! - Define the records read from GeoPackage system tables.
//! - Define the verdict shape consumed by reporters.
//!
//! # Invariants
//! - Catalog records are snapshots; nothing in this crate writes them back.
//! - Verdict arguments are positional and keep the order their message expects.

pub mod catalog;
pub mod verdict;
