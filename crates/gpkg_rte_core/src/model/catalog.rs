//! Catalog record snapshots.
//!
//! # Responsibility
//! - Mirror the rows of `gpkg_extensions`, `gpkg_contents` and
//!   `gpkgext_relations` the rule engine reads.
//! - Classify declared column types into SQLite storage classes.
//!
//! # Invariants
//! - Storage class parsing is case-sensitive; `integer` is not `INTEGER`.
//! - Unknown declared types are preserved verbatim for diagnostics.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

static SIZED_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(TEXT|BLOB)\s*\(\s*[0-9]+\s*\)$").expect("sized type pattern is valid")
});

/// One row of `gpkg_extensions` matched by an accepted extension name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionRecord {
    pub extension_name: String,
    /// `None` when the extension is registered container-wide.
    pub table_name: Option<String>,
}

/// One row of `gpkgext_relations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Requirements class discriminator, e.g. `simple_attributes`.
    pub relation_name: String,
    pub related_table_name: String,
}

/// One row of `gpkg_contents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub table_name: String,
    /// Free-form semantic role such as `features` or `attributes`.
    pub data_type: String,
}

/// Kind of schema object a name resolves to in `sqlite_master`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaObjectKind {
    Table,
    View,
}

/// SQLite storage class derived from a column's declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageClass {
    Integer,
    Real,
    Text,
    Blob,
    /// Declared without a type; the column has no affinity.
    Untyped,
    /// Any declared type outside the GeoPackage storage classes.
    Other(String),
}

impl StorageClass {
    /// Classifies a declared column type as reported by `pragma_table_info`.
    ///
    /// `TEXT(n)` and `BLOB(n)` are the GeoPackage length-limited forms and map
    /// onto their base class.
    pub fn from_declared(declared: &str) -> Self {
        match declared.trim() {
            "" => Self::Untyped,
            "INTEGER" => Self::Integer,
            "REAL" => Self::Real,
            "TEXT" => Self::Text,
            "BLOB" => Self::Blob,
            other => match SIZED_TYPE.captures(other) {
                Some(captures) if &captures[1] == "TEXT" => Self::Text,
                Some(_) => Self::Blob,
                None => Self::Other(other.to_string()),
            },
        }
    }

    /// Whether values of this class may appear in a simple attributes table.
    pub fn is_simple_attribute(&self) -> bool {
        matches!(self, Self::Integer | Self::Real | Self::Text)
    }
}

impl Display for StorageClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer => write!(f, "INTEGER"),
            Self::Real => write!(f, "REAL"),
            Self::Text => write!(f, "TEXT"),
            Self::Blob => write!(f, "BLOB"),
            Self::Untyped => write!(f, "NULL"),
            Self::Other(value) => write!(f, "{value}"),
        }
    }
}

/// Per-column schema fact for a user table or view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Declared type exactly as written in the table definition.
    pub declared_type: String,
    pub storage_class: StorageClass,
    pub not_null: bool,
    /// 1-based position within the primary key, 0 when not part of it.
    pub primary_key_position: u32,
}

impl ColumnDescriptor {
    pub fn is_primary_key(&self) -> bool {
        self.primary_key_position > 0
    }
}
