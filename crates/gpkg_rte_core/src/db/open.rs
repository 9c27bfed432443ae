//! Read-only connection bootstrap for GeoPackage containers.
//!
//! # Responsibility
//! - Open container files without the create flag.
//! - Configure connection pragmas before any catalog query runs.
//!
//! # Invariants
//! - Returned connections have `query_only=ON`.
//! - The header `application_id` is inspected but never enforced.

use super::{DbError, DbResult};
use log::{error, info, warn};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

/// `application_id` written by GeoPackage 1.2+ writers (ASCII `GPKG`).
pub const GPKG_APPLICATION_ID: i32 = 0x4750_4B47;

/// Opens a GeoPackage container for read-only validation.
///
/// # Side effects
/// - Emits `container_open` logging events with duration and status.
/// - Logs a warning when the header does not carry the GeoPackage
///   `application_id`; conformance of the header is not this crate's concern.
pub fn open_container(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!("event=container_open module=db status=start");

    if !path.is_file() {
        error!(
            "event=container_open module=db status=error duration_ms={} error_code=missing_file",
            started_at.elapsed().as_millis()
        );
        return Err(DbError::MissingFile(path.to_path_buf()));
    }

    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = match Connection::open_with_flags(path, flags) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=container_open module=db status=error duration_ms={} error_code=open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&conn) {
        Ok(application_id) => {
            if application_id != GPKG_APPLICATION_ID {
                warn!(
                    "event=container_open module=db status=ok application_id={application_id:#x} note=not_gpkg_application_id"
                );
            }
            info!(
                "event=container_open module=db status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=container_open module=db status=error duration_ms={} error_code=bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Applies read-only pragmas and returns the header `application_id`.
///
/// Reading `application_id` also forces SQLite to parse the file header, so a
/// non-database file fails here rather than on the first catalog query.
fn bootstrap_connection(conn: &Connection) -> DbResult<i32> {
    conn.execute_batch("PRAGMA query_only = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    let application_id = conn.query_row("PRAGMA application_id;", [], |row| row.get(0))?;
    Ok(application_id)
}
