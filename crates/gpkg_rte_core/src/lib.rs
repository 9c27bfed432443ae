//! Conformance checks for the GeoPackage Related Tables Extension.
//! This crate only reads containers; it never writes to them.

pub mod catalog;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod rules;
pub mod service;

pub use catalog::{Catalog, CatalogError, CatalogResult, ColumnFilter, SqliteCatalog};
pub use config::{ConfigError, ValidationOptions};
pub use db::{open_container, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::catalog::{
    ColumnDescriptor, ContentEntry, ExtensionRecord, Relation, SchemaObjectKind, StorageClass,
};
pub use model::verdict::{MessageKind, Verdict};
pub use rules::classes::{builtin_classes, find_class, RequirementsClass};
pub use rules::contract::TableContract;
pub use rules::gate::{
    is_extension_active, is_requirements_class_active, RELATED_TABLES_EXTENSION_NAMES,
};
pub use rules::walker::validate_related_type;
pub use service::engine::{ActivationState, ClassActivation, ConformanceService};
pub use service::report::{
    Applicability, ClassReport, SkipReason, ValidationReport, VerdictSink,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
