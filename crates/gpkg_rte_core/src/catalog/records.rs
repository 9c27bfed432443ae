//! Typed readers for the GeoPackage registry tables.
//!
//! Each reader issues a fresh query; nothing is cached between calls.

use super::{
    Catalog, CatalogError, CatalogResult, ColumnFilter, GPKGEXT_RELATIONS, GPKG_CONTENTS,
    GPKG_EXTENSIONS,
};
use crate::model::catalog::{ContentEntry, ExtensionRecord, Relation};

/// Reads `gpkg_extensions` rows whose `extension_name` is one of `accepted`.
///
/// Returns an empty list when the registry table itself is absent.
pub fn extension_records<C: Catalog + ?Sized>(
    catalog: &C,
    accepted: &[&str],
) -> CatalogResult<Vec<ExtensionRecord>> {
    if !catalog.table_or_view_exists(GPKG_EXTENSIONS)? {
        return Ok(Vec::new());
    }

    catalog
        .query_rows(
            GPKG_EXTENSIONS,
            &ColumnFilter::AnyOf {
                column: "extension_name",
                values: accepted,
            },
            &["extension_name", "table_name"],
        )?
        .into_iter()
        .map(|row| {
            let mut values = row.into_iter();
            let extension_name =
                required(values.next().flatten(), GPKG_EXTENSIONS, "extension_name")?;
            Ok(ExtensionRecord {
                extension_name,
                table_name: values.next().flatten(),
            })
        })
        .collect()
}

/// Reads every `gpkgext_relations` row declared under `relation_name`.
///
/// A NULL `related_table_name` reads as an empty string, which no contents
/// row matches, so the walker reports it instead of the run aborting.
pub fn relations<C: Catalog + ?Sized>(
    catalog: &C,
    relation_name: &str,
) -> CatalogResult<Vec<Relation>> {
    let related = catalog.query_column(
        GPKGEXT_RELATIONS,
        &ColumnFilter::Equals {
            column: "relation_name",
            value: relation_name,
        },
        "related_table_name",
    )?;

    Ok(related
        .into_iter()
        .map(|related| Relation {
            relation_name: relation_name.to_string(),
            related_table_name: related.unwrap_or_default(),
        })
        .collect())
}

/// Looks up the `gpkg_contents` row for `table_name`.
///
/// Returns `None` when no row exists. A NULL `data_type` reads as an empty
/// string so it fails exact type comparison instead of aborting the check.
pub fn content_entry<C: Catalog + ?Sized>(
    catalog: &C,
    table_name: &str,
) -> CatalogResult<Option<ContentEntry>> {
    let data_type = catalog
        .query_column(
            GPKG_CONTENTS,
            &ColumnFilter::Equals {
                column: "table_name",
                value: table_name,
            },
            "data_type",
        )?
        .into_iter()
        .next();

    Ok(data_type.map(|data_type| ContentEntry {
        table_name: table_name.to_string(),
        data_type: data_type.unwrap_or_default(),
    }))
}

fn required(value: Option<String>, table: &str, column: &str) -> CatalogResult<String> {
    value.ok_or_else(|| CatalogError::InvalidData(format!("NULL value in {table}.{column}")))
}
