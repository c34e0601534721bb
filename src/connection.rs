//! DuckDB connection wrapper with table registration and query execution.
//!
//! Tables are created from an explicit column schema and filled from
//! newline-delimited JSON, so column types never depend on DuckDB's
//! auto-detection of the input.

use std::collections::HashMap;
use std::io::Write;

use duckdb::{types::ValueRef, Connection as DuckDbConnection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{OptimizerError, Result};

/// A `(column name, DuckDB type)` schema entry.
pub type Column = (&'static str, &'static str);

/// Wraps an in-memory DuckDB connection.
pub struct Connection {
    conn: DuckDbConnection,
}

impl Connection {
    /// Open an in-memory DuckDB database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Create (or recreate) an empty table with the given schema.
    pub fn create_table(&self, table_name: &str, columns: &[Column]) -> Result<()> {
        let cols_sql = columns
            .iter()
            .map(|(name, ty)| format!("\"{}\" {}", name, ty))
            .collect::<Vec<_>>()
            .join(", ");
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {}; CREATE TABLE {} ({})",
            table_name, table_name, cols_sql
        ))?;
        debug!(table = table_name, columns = columns.len(), "Created table");
        Ok(())
    }

    /// Append rows from a newline-delimited JSON file to an existing table.
    ///
    /// The file is read with the table's schema, so keys missing from a row
    /// load as NULL.
    pub fn insert_from_ndjson(
        &self,
        table_name: &str,
        columns: &[Column],
        ndjson_path: &str,
    ) -> Result<()> {
        let path_fwd = ndjson_path.replace('\\', "/").replace('\'', "''");
        let column_defs = columns
            .iter()
            .map(|(name, ty)| format!("'{}': '{}'", name, ty))
            .collect::<Vec<_>>()
            .join(", ");
        self.conn.execute_batch(&format!(
            "INSERT INTO {} SELECT * FROM read_json('{}', format='newline_delimited', columns={{{}}})",
            table_name, path_fwd, column_defs
        ))?;
        debug!(table = table_name, path = %path_fwd, "Loaded NDJSON rows");
        Ok(())
    }

    /// Serialize `records` to a temporary NDJSON file and append them.
    pub fn insert_records<T: Serialize>(
        &self,
        table_name: &str,
        columns: &[Column],
        records: &[T],
    ) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let mut file = NamedTempFile::new()?;
        for record in records {
            writeln!(file, "{}", serde_json::to_string(record)?)?;
        }
        file.flush()?;

        let path = file.path().to_string_lossy().to_string();
        self.insert_from_ndjson(table_name, columns, &path)
        // The temp file is removed on drop; DuckDB has copied the rows.
    }

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    ///
    /// Each row is represented as a `HashMap<String, serde_json::Value>`.
    pub fn execute(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows_result = stmt.query(param_values.as_slice())?;

        // Column metadata is only available after the query has executed.
        let column_names: Vec<String> = rows_result
            .as_ref()
            .ok_or_else(|| OptimizerError::InvalidArgument("statement has no result columns".into()))?
            .column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows_result.next()? {
            let mut map = HashMap::with_capacity(column_names.len());
            for (i, col_name) in column_names.iter().enumerate() {
                map.insert(col_name.clone(), convert_value_ref(row.get_ref(i)?));
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and deserialize each row into type `T`.
    pub fn execute_into<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(row.into_iter().collect());
            results.push(serde_json::from_value(value)?);
        }
        Ok(results)
    }

    /// Execute SQL and return the first column of the first row.
    ///
    /// Returns `None` if the result set is empty.
    pub fn execute_scalar(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Option<serde_json::Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        if let Some(row) = rows.next()? {
            Ok(Some(convert_value_ref(row.get_ref(0)?)))
        } else {
            Ok(None)
        }
    }
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    match val {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::SmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::Int(n) => serde_json::Value::Number(n.into()),
        ValueRef::BigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UBigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::HugeInt(n) => match i64::try_from(n) {
            Ok(i) => serde_json::Value::Number(i.into()),
            Err(_) => serde_json::Value::String(n.to_string()),
        },
        ValueRef::Float(f) => serde_json::Number::from_f64(f64::from(f))
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) => {
            serde_json::Value::String(String::from_utf8_lossy(bytes).to_string())
        }
        // Catalog tables only use scalar column types.
        _ => serde_json::Value::Null,
    }
}
