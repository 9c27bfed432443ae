//! Extension and requirements-class activation gate.

use crate::catalog::{
    Catalog, CatalogError, CatalogResult, ColumnFilter, GPKGEXT_RELATIONS, GPKG_EXTENSIONS,
};
use log::debug;

/// Names the Related Tables Extension has been registered under.
///
/// `related_tables` comes from drafts of OGC 18-000; `gpkg_related_tables` is
/// the adopted name. Both mark the extension as in use.
pub const RELATED_TABLES_EXTENSION_NAMES: &[&str] = &["related_tables", "gpkg_related_tables"];

/// Returns whether `gpkg_extensions` registers any of `accepted_names`.
///
/// A container without `gpkg_extensions` uses no extensions, so this returns
/// `false` rather than an error.
pub fn is_extension_active<C: Catalog + ?Sized>(
    catalog: &C,
    accepted_names: &[&str],
) -> CatalogResult<bool> {
    if accepted_names.is_empty() {
        return Ok(false);
    }
    if !catalog.table_or_view_exists(GPKG_EXTENSIONS)? {
        debug!("event=extension_gate module=rules status=skip reason=no_extensions_table");
        return Ok(false);
    }

    let count = catalog.count_where(
        GPKG_EXTENSIONS,
        &ColumnFilter::AnyOf {
            column: "extension_name",
            values: accepted_names,
        },
    )?;
    Ok(count > 0)
}

/// Returns whether any relation is declared under `relation_name`.
///
/// Only meaningful once the base extension is active. An active extension
/// without `gpkgext_relations` is an environment failure and yields
/// [`CatalogError::MissingSystemTable`].
pub fn is_requirements_class_active<C: Catalog + ?Sized>(
    catalog: &C,
    relation_name: &str,
) -> CatalogResult<bool> {
    if !catalog.table_or_view_exists(GPKGEXT_RELATIONS)? {
        return Err(CatalogError::MissingSystemTable(GPKGEXT_RELATIONS));
    }

    let count = catalog.count_where(
        GPKGEXT_RELATIONS,
        &ColumnFilter::Equals {
            column: "relation_name",
            value: relation_name,
        },
    )?;
    Ok(count > 0)
}
