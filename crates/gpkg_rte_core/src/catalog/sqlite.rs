//! SQLite implementation of the catalog contract.

use super::{validate_identifier, Catalog, CatalogError, CatalogResult, ColumnFilter};
use crate::model::catalog::{ColumnDescriptor, SchemaObjectKind, StorageClass};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};

/// Catalog reader over a borrowed connection.
pub struct SqliteCatalog<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalog<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl Catalog for SqliteCatalog<'_> {
    fn schema_object(&self, name: &str) -> CatalogResult<Option<SchemaObjectKind>> {
        let kind = self
            .conn
            .query_row(
                "SELECT type
                 FROM sqlite_master
                 WHERE name = ?1 COLLATE NOCASE AND type IN ('table', 'view');",
                [name],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        match kind.as_deref() {
            None => Ok(None),
            Some("table") => Ok(Some(SchemaObjectKind::Table)),
            Some("view") => Ok(Some(SchemaObjectKind::View)),
            Some(other) => Err(CatalogError::InvalidData(format!(
                "unexpected sqlite_master type `{other}` for `{name}`"
            ))),
        }
    }

    fn count_where(&self, table: &str, filter: &ColumnFilter<'_>) -> CatalogResult<u64> {
        let table = validate_identifier(table)?;
        let (where_sql, bind_values) = where_clause(filter)?;
        let sql = format!("SELECT COUNT(*) FROM \"{table}\"{where_sql};");

        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        debug!("event=catalog_count module=catalog table={table} count={count}");

        u64::try_from(count)
            .map_err(|_| CatalogError::InvalidData(format!("negative count {count} for {table}")))
    }

    fn query_rows(
        &self,
        table: &str,
        filter: &ColumnFilter<'_>,
        columns: &[&str],
    ) -> CatalogResult<Vec<Vec<Option<String>>>> {
        let table = validate_identifier(table)?;
        if columns.is_empty() {
            return Err(CatalogError::InvalidData(format!(
                "query on `{table}` selects no columns"
            )));
        }
        let projection = columns
            .iter()
            .map(|column| validate_identifier(column).map(|column| format!("\"{column}\"")))
            .collect::<CatalogResult<Vec<_>>>()?
            .join(", ");
        let (where_sql, bind_values) = where_clause(filter)?;
        let sql = format!("SELECT {projection} FROM \"{table}\"{where_sql};");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut values = Vec::new();

        while let Some(row) = rows.next()? {
            let mut record = Vec::with_capacity(columns.len());
            for index in 0..columns.len() {
                record.push(value_to_text(row.get::<_, Value>(index)?));
            }
            values.push(record);
        }

        debug!(
            "event=catalog_query module=catalog table={table} rows={}",
            values.len()
        );
        Ok(values)
    }

    fn table_schema(&self, name: &str) -> CatalogResult<Vec<ColumnDescriptor>> {
        // The table-valued pragma binds the name, so user table names are
        // never spliced into SQL.
        let mut stmt = self.conn.prepare(
            "SELECT name, type, \"notnull\", pk
             FROM pragma_table_info(?1)
             ORDER BY cid;",
        )?;
        let mut rows = stmt.query([name])?;
        let mut columns = Vec::new();

        while let Some(row) = rows.next()? {
            columns.push(parse_column_row(row)?);
        }

        Ok(columns)
    }
}

fn parse_column_row(row: &Row<'_>) -> CatalogResult<ColumnDescriptor> {
    let name: String = row.get("name")?;
    let declared_type = row.get::<_, Option<String>>("type")?.unwrap_or_default();
    let not_null = match row.get::<_, i64>("notnull")? {
        0 => false,
        1 => true,
        other => {
            return Err(CatalogError::InvalidData(format!(
                "invalid notnull value `{other}` for column `{name}`"
            )));
        }
    };
    let pk: i64 = row.get("pk")?;
    let primary_key_position = u32::try_from(pk).map_err(|_| {
        CatalogError::InvalidData(format!("invalid pk value `{pk}` for column `{name}`"))
    })?;

    Ok(ColumnDescriptor {
        storage_class: StorageClass::from_declared(&declared_type),
        name,
        declared_type,
        not_null,
        primary_key_position,
    })
}

fn where_clause(filter: &ColumnFilter<'_>) -> CatalogResult<(String, Vec<Value>)> {
    match filter {
        ColumnFilter::All => Ok((String::new(), Vec::new())),
        ColumnFilter::Equals { column, value } => {
            let column = validate_identifier(column)?;
            Ok((
                format!(" WHERE \"{column}\" = ?"),
                vec![Value::Text((*value).to_string())],
            ))
        }
        ColumnFilter::AnyOf { column, values } => {
            let column = validate_identifier(column)?;
            if values.is_empty() {
                return Ok((" WHERE 0".to_string(), Vec::new()));
            }
            let placeholders = vec!["?"; values.len()].join(", ");
            Ok((
                format!(" WHERE \"{column}\" IN ({placeholders})"),
                values
                    .iter()
                    .map(|value| Value::Text((*value).to_string()))
                    .collect(),
            ))
        }
    }
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(number) => Some(number.to_string()),
        Value::Real(number) => Some(number.to_string()),
        Value::Text(text) => Some(text),
        Value::Blob(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteCatalog;
    use crate::catalog::{Catalog, CatalogError, ColumnFilter};
    use crate::model::catalog::{SchemaObjectKind, StorageClass};
    use rusqlite::Connection;

    fn fixture() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory connection");
        conn.execute_batch(
            "CREATE TABLE gpkg_contents (table_name TEXT NOT NULL PRIMARY KEY, data_type TEXT NOT NULL);
             INSERT INTO gpkg_contents VALUES ('a', 'attributes'), ('b', 'features'), ('c', 'attributes');
             CREATE TABLE sample (id INTEGER PRIMARY KEY, label TEXT(16) NOT NULL, blob_col, score REAL);
             CREATE VIEW sample_view AS SELECT id, label FROM sample;",
        )
        .expect("fixture schema");
        conn
    }

    #[test]
    fn resolves_tables_and_views() {
        let conn = fixture();
        let catalog = SqliteCatalog::new(&conn);

        assert_eq!(
            catalog.schema_object("sample").expect("lookup"),
            Some(SchemaObjectKind::Table)
        );
        assert_eq!(
            catalog.schema_object("sample_view").expect("lookup"),
            Some(SchemaObjectKind::View)
        );
        assert!(!catalog.table_or_view_exists("nope").expect("lookup"));
    }

    #[test]
    fn schema_lookups_ignore_identifier_case() {
        let conn = fixture();
        let catalog = SqliteCatalog::new(&conn);

        assert_eq!(
            catalog.schema_object("SAMPLE").expect("lookup"),
            Some(SchemaObjectKind::Table)
        );
        assert_eq!(
            catalog.schema_object("Sample_View").expect("lookup"),
            Some(SchemaObjectKind::View)
        );
        assert_eq!(catalog.table_schema("SAMPLE").expect("schema").len(), 4);
    }

    #[test]
    fn counts_with_equality_and_membership_filters() {
        let conn = fixture();
        let catalog = SqliteCatalog::new(&conn);

        let all = catalog
            .count_where("gpkg_contents", &ColumnFilter::All)
            .expect("count all");
        assert_eq!(all, 3);

        let attributes = catalog
            .count_where(
                "gpkg_contents",
                &ColumnFilter::Equals {
                    column: "data_type",
                    value: "attributes",
                },
            )
            .expect("count equals");
        assert_eq!(attributes, 2);

        let any_of = catalog
            .count_where(
                "gpkg_contents",
                &ColumnFilter::AnyOf {
                    column: "table_name",
                    values: &["a", "b", "zzz"],
                },
            )
            .expect("count any of");
        assert_eq!(any_of, 2);

        let none = catalog
            .count_where(
                "gpkg_contents",
                &ColumnFilter::AnyOf {
                    column: "table_name",
                    values: &[],
                },
            )
            .expect("count empty any of");
        assert_eq!(none, 0);
    }

    #[test]
    fn query_column_binds_values_instead_of_splicing() {
        let conn = fixture();
        let catalog = SqliteCatalog::new(&conn);

        let values = catalog
            .query_column(
                "gpkg_contents",
                &ColumnFilter::Equals {
                    column: "table_name",
                    value: "a' OR '1'='1",
                },
                "data_type",
            )
            .expect("query");
        assert!(values.is_empty());
    }

    #[test]
    fn rejects_unsafe_table_identifiers() {
        let conn = fixture();
        let catalog = SqliteCatalog::new(&conn);

        let err = catalog
            .count_where("gpkg_contents; DROP TABLE sample", &ColumnFilter::All)
            .expect_err("unsafe identifier must be rejected");
        assert!(matches!(err, CatalogError::InvalidIdentifier(_)));
    }

    #[test]
    fn missing_table_propagates_driver_error() {
        let conn = fixture();
        let catalog = SqliteCatalog::new(&conn);

        let err = catalog
            .count_where("gpkg_extensions", &ColumnFilter::All)
            .expect_err("missing table must fail");
        assert!(matches!(err, CatalogError::Db(_)));
    }

    #[test]
    fn table_schema_reports_declared_types_and_flags() {
        let conn = fixture();
        let catalog = SqliteCatalog::new(&conn);

        let columns = catalog.table_schema("sample").expect("schema");
        let names = columns
            .iter()
            .map(|column| column.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["id", "label", "blob_col", "score"]);

        assert!(columns[0].is_primary_key());
        assert_eq!(columns[0].storage_class, StorageClass::Integer);
        assert_eq!(columns[1].declared_type, "TEXT(16)");
        assert_eq!(columns[1].storage_class, StorageClass::Text);
        assert!(columns[1].not_null);
        assert_eq!(columns[2].storage_class, StorageClass::Untyped);
        assert!(!columns[3].not_null);
    }

    #[test]
    fn table_schema_of_unknown_table_is_empty() {
        let conn = fixture();
        let catalog = SqliteCatalog::new(&conn);

        assert!(catalog.table_schema("does_not_exist").expect("schema").is_empty());
    }
}
