//! Conformance use-case services.
//!
//! # Responsibility
//! - Orchestrate gate, walker and contract rules into validation runs.
//! - Shape verdicts into per-class reports for callers.

pub mod engine;
pub mod report;
