//! DuckDB warehouse load
//!
//! Pushes the cleaned sales snapshot into a DuckDB table. The load is a bulk
//! replace inside one transaction: the old table is dropped, recreated from
//! the `TransactionRow` schema and refilled, so readers see either the
//! previous contents or the complete new snapshot.

use duckdb::{params, Connection};
use insights_ir::{Record, Schema, TransactionRow};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_TABLE: &str = "furniture_sales";

#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    #[error("Invalid table name: {0:?}")]
    InvalidTable(String),
}

pub struct Warehouse {
    conn: Connection,
}

impl Warehouse {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WarehouseError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "Opened warehouse");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, WarehouseError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Replace `table` wholesale with `rows`. Returns the number of rows loaded.
    pub fn replace_table(&mut self, table: &str, rows: &[TransactionRow]) -> Result<usize, WarehouseError> {
        validate_table_name(table)?;

        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS \"{table}\"; {}",
            create_table_sql(table, &TransactionRow::schema())
        ))?;

        {
            let mut stmt = tx.prepare(&insert_sql(table))?;
            for row in rows {
                stmt.execute(params![
                    row.order_id,
                    row.order_date.to_string(),
                    row.ship_date.map(|d| d.to_string()),
                    row.ship_mode,
                    row.customer_id,
                    row.customer_name,
                    row.segment,
                    row.country,
                    row.city,
                    row.state,
                    row.postal_code,
                    row.region,
                    row.product_id,
                    row.category,
                    row.sub_category,
                    row.product_name,
                    row.sales,
                    row.quantity,
                    row.discount,
                    row.profit,
                    row.row_id,
                ])?;
            }
        }
        tx.commit()?;

        info!(table, rows = rows.len(), "Replaced warehouse table");
        Ok(rows.len())
    }

    pub fn row_count(&self, table: &str) -> Result<usize, WarehouseError> {
        validate_table_name(table)?;
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Table names are interpolated into SQL, so only plain identifiers pass
fn validate_table_name(table: &str) -> Result<(), WarehouseError> {
    let mut chars = table.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(WarehouseError::InvalidTable(table.to_string()))
    }
}

fn create_table_sql(table: &str, schema: &Schema) -> String {
    let columns: Vec<String> = schema
        .fields
        .iter()
        .map(|field| {
            let null = if field.nullable { "" } else { " NOT NULL" };
            format!("\"{}\" {}{}", field.name, field.data_type.sql_name(), null)
        })
        .collect();
    format!("CREATE TABLE \"{table}\" ({});", columns.join(", "))
}

fn insert_sql(table: &str) -> String {
    let placeholders: Vec<&str> = TransactionRow::schema()
        .fields
        .iter()
        .map(|field| {
            if field.data_type == insights_ir::DataType::Date {
                "CAST(? AS DATE)"
            } else {
                "?"
            }
        })
        .collect();
    format!("INSERT INTO \"{table}\" VALUES ({})", placeholders.join(", "))
}
