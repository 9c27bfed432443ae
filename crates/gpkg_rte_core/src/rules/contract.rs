//! Table contracts for user-defined related tables.
//!
//! # Responsibility
//! - Check the column shape a requirements class demands of its related
//!   tables.
//!
//! # Invariants
//! - Every column of every table is checked; violations accumulate.
//! - A table absent from the database but registered in `gpkg_contents`
//!   fails with a `sqlite_master` missing reference. Without a contents row
//!   it is skipped with a warning; the walker already reported it.
//! - Table names resolve case-insensitively, as SQLite identifiers do.
//! - SQLite never reports primary keys on views, so a view satisfies the key
//!   rule when its first column is declared `INTEGER`.

use crate::catalog::records::content_entry;
use crate::catalog::{Catalog, CatalogResult, SQLITE_MASTER};
use crate::model::catalog::{ColumnDescriptor, SchemaObjectKind, StorageClass};
use crate::model::verdict::{MessageKind, Verdict};
use log::warn;
use serde::Serialize;

/// Column shape required of a requirements class's related tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableContract {
    /// The related table is a core GeoPackage table checked elsewhere.
    Unconstrained,
    /// Primary key plus mandatory TEXT/INTEGER/REAL columns only.
    SimpleAttributes,
    /// Primary key plus `data BLOB NOT NULL` and `content_type TEXT NOT NULL`.
    Media,
}

impl TableContract {
    /// Checks `table_name` against this contract.
    pub fn check<C: Catalog + ?Sized>(
        self,
        catalog: &C,
        table_name: &str,
    ) -> CatalogResult<Vec<Verdict>> {
        match self {
            Self::Unconstrained => Ok(Vec::new()),
            Self::SimpleAttributes => validate_simple_attributes_table(catalog, table_name),
            Self::Media => validate_media_table(catalog, table_name),
        }
    }
}

/// Checks one user-defined simple attributes table or view.
pub fn validate_simple_attributes_table<C: Catalog + ?Sized>(
    catalog: &C,
    table_name: &str,
) -> CatalogResult<Vec<Verdict>> {
    let (object, columns) = match load_table(catalog, table_name)? {
        LoadedTable::Found(object, columns) => (object, columns),
        LoadedTable::Unresolved(verdict) => return Ok(vec![verdict]),
        LoadedTable::Skipped => return Ok(Vec::new()),
    };

    let mut verdicts = Vec::new();
    verdicts.extend(check_primary_key(object, &columns, table_name));

    for column in &columns {
        if !column.storage_class.is_simple_attribute() {
            verdicts.push(invalid_type(column, table_name));
        }
        verdicts.extend(check_not_null(column, table_name));
    }

    Ok(verdicts)
}

/// Checks one user-defined media table or view.
pub fn validate_media_table<C: Catalog + ?Sized>(
    catalog: &C,
    table_name: &str,
) -> CatalogResult<Vec<Verdict>> {
    let (object, columns) = match load_table(catalog, table_name)? {
        LoadedTable::Found(object, columns) => (object, columns),
        LoadedTable::Unresolved(verdict) => return Ok(vec![verdict]),
        LoadedTable::Skipped => return Ok(Vec::new()),
    };

    let mut verdicts = Vec::new();
    verdicts.extend(check_primary_key(object, &columns, table_name));

    let required_columns = [
        ("data", StorageClass::Blob),
        ("content_type", StorageClass::Text),
    ];
    for (required, storage_class) in required_columns {
        let Some(column) = columns
            .iter()
            .find(|column| column.name.eq_ignore_ascii_case(required))
        else {
            verdicts.push(Verdict::fail(
                MessageKind::MissingColumn,
                [required, table_name],
            ));
            continue;
        };

        if column.storage_class != storage_class {
            verdicts.push(invalid_type(column, table_name));
        }
        verdicts.extend(check_not_null(column, table_name));
    }

    Ok(verdicts)
}

enum LoadedTable {
    Found(SchemaObjectKind, Vec<ColumnDescriptor>),
    Unresolved(Verdict),
    Skipped,
}

fn load_table<C: Catalog + ?Sized>(
    catalog: &C,
    table_name: &str,
) -> CatalogResult<LoadedTable> {
    if let Some(object) = catalog.schema_object(table_name)? {
        return Ok(LoadedTable::Found(object, catalog.table_schema(table_name)?));
    }

    if content_entry(catalog, table_name)?.is_some() {
        return Ok(LoadedTable::Unresolved(Verdict::fail(
            MessageKind::MissingReference,
            [SQLITE_MASTER, "name", table_name],
        )));
    }

    warn!("event=table_contract module=rules status=skip reason=table_absent table={table_name}");
    Ok(LoadedTable::Skipped)
}

fn check_primary_key(
    object: SchemaObjectKind,
    columns: &[ColumnDescriptor],
    table_name: &str,
) -> Option<Verdict> {
    let satisfied = match object {
        SchemaObjectKind::Table => {
            columns
                .iter()
                .filter(|column| column.is_primary_key())
                .count()
                == 1
        }
        SchemaObjectKind::View => columns
            .first()
            .is_some_and(|column| column.storage_class == StorageClass::Integer),
    };

    (!satisfied).then(|| Verdict::fail(MessageKind::MissingPrimaryKey, [table_name]))
}

fn check_not_null(column: &ColumnDescriptor, table_name: &str) -> Option<Verdict> {
    (!column.not_null).then(|| {
        Verdict::fail(
            MessageKind::InvalidColumnDefinition,
            [column.name.as_str(), table_name, "notnull", "1", "0"],
        )
    })
}

fn invalid_type(column: &ColumnDescriptor, table_name: &str) -> Verdict {
    let declared = if column.declared_type.is_empty() {
        column.storage_class.to_string()
    } else {
        column.declared_type.clone()
    };
    Verdict::fail(
        MessageKind::InvalidDataType,
        [declared.as_str(), column.name.as_str(), table_name],
    )
}

#[cfg(test)]
mod tests {
    use super::{check_primary_key, invalid_type};
    use crate::model::catalog::{ColumnDescriptor, SchemaObjectKind, StorageClass};
    use crate::model::verdict::MessageKind;

    fn column(name: &str, declared: &str, pk: u32) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            declared_type: declared.to_string(),
            storage_class: StorageClass::from_declared(declared),
            not_null: true,
            primary_key_position: pk,
        }
    }

    #[test]
    fn composite_primary_key_is_rejected() {
        let columns = [column("a", "INTEGER", 1), column("b", "INTEGER", 2)];
        let verdict = check_primary_key(SchemaObjectKind::Table, &columns, "t")
            .expect("composite key must fail");
        assert_eq!(verdict.kind, MessageKind::MissingPrimaryKey);
    }

    #[test]
    fn view_uses_leading_integer_column_as_key() {
        let keyed = [column("id", "INTEGER", 0), column("name", "TEXT", 0)];
        assert!(check_primary_key(SchemaObjectKind::View, &keyed, "v").is_none());

        let unkeyed = [column("name", "TEXT", 0), column("id", "INTEGER", 0)];
        assert!(check_primary_key(SchemaObjectKind::View, &unkeyed, "v").is_some());
    }

    #[test]
    fn untyped_column_reports_null_storage_class() {
        let verdict = invalid_type(&column("anything", "", 0), "t");
        assert_eq!(verdict.args, vec!["NULL", "anything", "t"]);
    }
}
