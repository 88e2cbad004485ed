//! Database schema definitions.

use crate::storage::db::SqlitePool;

/// SQL statement for creating the readings table.
///
/// `timestamp` is epoch milliseconds. `id` is internal only and never leaves
/// the storage layer.
pub const READINGS_TABLE_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS readings (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    frequency_hz   REAL    NOT NULL,
    signal_dbm     REAL    NOT NULL,
    classification TEXT    NOT NULL,
    timestamp      INTEGER NOT NULL
);
"#;

/// SQL statement for the timestamp index backing range queries.
pub const READINGS_TS_INDEX_DDL: &str = r#"
CREATE INDEX IF NOT EXISTS idx_readings_timestamp ON readings (timestamp);
"#;

/// Initialize the database schema.
///
/// Creates the readings table and its index if they don't exist. Runs as part
/// of the connect sequence, so failures surface as connect failures.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(READINGS_TABLE_DDL).execute(pool.inner()).await?;
    sqlx::query(READINGS_TS_INDEX_DDL)
        .execute(pool.inner())
        .await?;

    tracing::info!("Database schema initialized");
    Ok(())
}
