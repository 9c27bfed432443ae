//! GeoPackage container connection bootstrap.
//!
//! # Responsibility
//! - Open GeoPackage containers for read-only conformance checks.
//! - Configure connection pragmas required by the rule engine.
//!
//! # Invariants
//! - Returned connections never write: `query_only` is enabled.
//! - Opening a path that does not exist is an error, never an implicit create.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod open;

pub use open::{open_container, GPKG_APPLICATION_ID};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    MissingFile(PathBuf),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::MissingFile(path) => {
                write!(f, "geopackage container not found: {}", path.display())
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::MissingFile(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
