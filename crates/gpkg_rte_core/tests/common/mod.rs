#![allow(dead_code)]

use gpkg_rte_core::Verdict;
use rusqlite::{params, Connection};

const SYSTEM_TABLES_SQL: &str = "
CREATE TABLE gpkg_contents (
    table_name TEXT NOT NULL PRIMARY KEY,
    data_type TEXT NOT NULL,
    identifier TEXT UNIQUE,
    description TEXT DEFAULT '',
    last_change DATETIME NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    srs_id INTEGER
);
CREATE TABLE gpkg_extensions (
    table_name TEXT,
    column_name TEXT,
    extension_name TEXT NOT NULL,
    definition TEXT NOT NULL,
    scope TEXT NOT NULL,
    CONSTRAINT ge_tce UNIQUE (table_name, column_name, extension_name)
);
CREATE TABLE gpkgext_relations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    base_table_name TEXT NOT NULL,
    base_primary_column TEXT NOT NULL DEFAULT 'id',
    related_table_name TEXT NOT NULL,
    related_primary_column TEXT NOT NULL DEFAULT 'id',
    relation_name TEXT NOT NULL,
    mapping_table_name TEXT NOT NULL UNIQUE
);
";

/// In-memory container with the GeoPackage system tables and no rows.
pub fn empty_container() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(SYSTEM_TABLES_SQL).unwrap();
    conn
}

pub fn register_extension(conn: &Connection, extension_name: &str, table_name: Option<&str>) {
    conn.execute(
        "INSERT INTO gpkg_extensions (table_name, column_name, extension_name, definition, scope)
         VALUES (?1, NULL, ?2, 'OGC 18-000', 'read-write');",
        params![table_name, extension_name],
    )
    .unwrap();
}

pub fn add_relation(conn: &Connection, relation_name: &str, related_table_name: &str) {
    let existing: i64 = conn
        .query_row("SELECT COUNT(*) FROM gpkgext_relations;", [], |row| row.get(0))
        .unwrap();
    conn.execute(
        "INSERT INTO gpkgext_relations
            (base_table_name, related_table_name, relation_name, mapping_table_name)
         VALUES ('base_tbl', ?1, ?2, ?3);",
        params![
            related_table_name,
            relation_name,
            format!("base_tbl_{related_table_name}_{existing}")
        ],
    )
    .unwrap();
}

pub fn add_contents(conn: &Connection, table_name: &str, data_type: &str) {
    conn.execute(
        "INSERT INTO gpkg_contents (table_name, data_type, identifier) VALUES (?1, ?2, ?1);",
        params![table_name, data_type],
    )
    .unwrap();
}

/// Related tables extension registered container-wide under its draft name.
pub fn related_tables_container() -> Connection {
    let conn = empty_container();
    register_extension(&conn, "related_tables", None);
    conn
}

/// A valid simple attributes relation whose table uses `attr_tbl_sql`.
pub fn simple_attributes_container(attr_tbl_sql: &str) -> Connection {
    let conn = related_tables_container();
    add_relation(&conn, "simple_attributes", "attr_tbl");
    add_contents(&conn, "attr_tbl", "attributes");
    conn.execute_batch(attr_tbl_sql).unwrap();
    conn
}

/// Valid simple attributes container.
pub fn scenario_a() -> Connection {
    simple_attributes_container(
        "CREATE TABLE attr_tbl (id INTEGER PRIMARY KEY NOT NULL, name TEXT NOT NULL);",
    )
}

pub fn sorted(mut verdicts: Vec<Verdict>) -> Vec<Verdict> {
    verdicts.sort();
    verdicts
}
