//! Read-only catalog access for GeoPackage system tables.
//!
//! # Responsibility
//! - Define the query contract the rule engine depends on.
//! - Keep SQL details behind the [`Catalog`] trait boundary.
//!
//! # Invariants
//! - Every operation is a pure read; write statements are never issued.
//! - Values are bound as parameters. Identifiers that must be spliced into
//!   SQL pass [`validate_identifier`] first.
//! - Driver errors propagate unchanged; they are never folded into verdicts.

use crate::db::DbError;
use crate::model::catalog::{ColumnDescriptor, SchemaObjectKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod records;
mod sqlite;

pub use sqlite::SqliteCatalog;

/// Extension registry table.
pub const GPKG_EXTENSIONS: &str = "gpkg_extensions";
/// Contents registry table.
pub const GPKG_CONTENTS: &str = "gpkg_contents";
/// Related Tables Extension relations table.
pub const GPKGEXT_RELATIONS: &str = "gpkgext_relations";
/// SQLite schema table consulted to resolve user tables and views.
pub const SQLITE_MASTER: &str = "sqlite_master";

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised while reading the container catalog.
///
/// All variants describe a broken environment, not a non-conformant container.
#[derive(Debug)]
pub enum CatalogError {
    Db(DbError),
    /// Identifier rejected before it could be spliced into SQL.
    InvalidIdentifier(String),
    /// A system table required by an active extension is absent.
    MissingSystemTable(&'static str),
    InvalidData(String),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidIdentifier(value) => {
                write!(f, "refusing to query with invalid identifier `{value}`")
            }
            Self::MissingSystemTable(table) => {
                write!(f, "required system table `{table}` does not exist")
            }
            Self::InvalidData(message) => write!(f, "invalid catalog data: {message}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidIdentifier(_) => None,
            Self::MissingSystemTable(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for CatalogError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for CatalogError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Row predicate for catalog reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFilter<'a> {
    All,
    Equals { column: &'a str, value: &'a str },
    /// Matches nothing when `values` is empty.
    AnyOf { column: &'a str, values: &'a [&'a str] },
}

/// Read-only query contract over a container's catalog.
pub trait Catalog {
    /// Resolves `name` against `sqlite_master` tables and views, ignoring
    /// ASCII case the way SQLite resolves identifiers.
    fn schema_object(&self, name: &str) -> CatalogResult<Option<SchemaObjectKind>>;
    fn count_where(&self, table: &str, filter: &ColumnFilter<'_>) -> CatalogResult<u64>;
    /// Reads `columns` for every matching row, rendering values as text.
    fn query_rows(
        &self,
        table: &str,
        filter: &ColumnFilter<'_>,
        columns: &[&str],
    ) -> CatalogResult<Vec<Vec<Option<String>>>>;
    /// Column facts in declaration order; empty when `name` does not exist.
    fn table_schema(&self, name: &str) -> CatalogResult<Vec<ColumnDescriptor>>;

    fn table_or_view_exists(&self, name: &str) -> CatalogResult<bool> {
        Ok(self.schema_object(name)?.is_some())
    }

    fn query_column(
        &self,
        table: &str,
        filter: &ColumnFilter<'_>,
        column: &str,
    ) -> CatalogResult<Vec<Option<String>>> {
        let rows = self.query_rows(table, filter, &[column])?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_iter().next().flatten())
            .collect())
    }
}

/// Checks `name` against the identifier allow-list and returns it unchanged.
pub fn validate_identifier(name: &str) -> CatalogResult<&str> {
    if IDENTIFIER_RE.is_match(name) {
        Ok(name)
    } else {
        Err(CatalogError::InvalidIdentifier(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_identifier, CatalogError};

    #[test]
    fn accepts_plain_identifiers() {
        assert_eq!(
            validate_identifier("gpkgext_relations").expect("plain identifier"),
            "gpkgext_relations"
        );
        assert!(validate_identifier("_private1").is_ok());
    }

    #[test]
    fn rejects_identifiers_with_sql_metacharacters() {
        for value in ["", "1abc", "a b", "t\"; DROP TABLE x; --", "name'"] {
            let err = validate_identifier(value).expect_err("identifier must be rejected");
            assert!(matches!(err, CatalogError::InvalidIdentifier(_)));
        }
    }
}
