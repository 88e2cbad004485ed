//! Reading persistence facade.
//!
//! Provides insert and range-query operations over the shared connector.

use std::sync::Arc;

use strum_macros::{AsRefStr, EnumString};

use crate::reading::Reading;
use crate::storage::{Connector, StorageError};

// =============================================================================
// Constants
// =============================================================================

/// Result cap applied when the caller does not request a limit.
pub const DEFAULT_LIMIT: i64 = 1000;

/// Smallest accepted result cap.
pub const MIN_LIMIT: i64 = 1;

/// Largest accepted result cap.
pub const MAX_LIMIT: i64 = 5000;

// =============================================================================
// Query Types
// =============================================================================

/// Sort order for queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Time-range query over stored readings.
///
/// `from`/`to` are inclusive epoch-millisecond bounds; either may be omitted.
#[derive(Debug, Clone, Default)]
pub struct ReadingQuery {
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub limit: Option<i64>,
    pub order: SortOrder,
}

/// Clamp a requested limit into `[MIN_LIMIT, MAX_LIMIT]`, defaulting when
/// absent.
pub(crate) fn effective_limit(requested: Option<i64>) -> i64 {
    requested.unwrap_or(DEFAULT_LIMIT).clamp(MIN_LIMIT, MAX_LIMIT)
}

// =============================================================================
// Reading Store
// =============================================================================

/// Storage facade for readings.
///
/// All operations connect lazily through the shared [`Connector`].
#[derive(Clone)]
pub struct ReadingStore {
    connector: Arc<Connector>,
}

impl std::fmt::Debug for ReadingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadingStore").finish_non_exhaustive()
    }
}

impl ReadingStore {
    /// Create a new reading store over a shared connector.
    pub fn new(connector: Arc<Connector>) -> Self {
        Self { connector }
    }

    /// Insert one reading as a single atomic row write.
    pub async fn insert(&self, reading: &Reading) -> Result<(), StorageError> {
        let pool = self.connector.ensure_connected().await?;

        sqlx::query(
            "INSERT INTO readings (frequency_hz, signal_dbm, classification, timestamp)
             VALUES (?, ?, ?, ?)",
        )
        .bind(reading.frequency_hz)
        .bind(reading.signal_dbm)
        .bind(&reading.classification)
        .bind(reading.timestamp)
        .execute(pool.inner())
        .await?;

        Ok(())
    }

    /// Query readings filtered by time range, ordered by timestamp.
    ///
    /// The result cap is clamped into `[MIN_LIMIT, MAX_LIMIT]` and defaults
    /// to [`DEFAULT_LIMIT`]. An empty match is an empty vector, not an error.
    pub async fn query(&self, q: ReadingQuery) -> Result<Vec<Reading>, StorageError> {
        let pool = self.connector.ensure_connected().await?;
        let limit = effective_limit(q.limit);

        let mut sql = String::from(
            "SELECT frequency_hz, signal_dbm, classification, timestamp FROM readings WHERE 1=1",
        );
        let mut binds: Vec<i64> = Vec::new();

        if let Some(from) = q.from {
            sql.push_str(" AND timestamp >= ?");
            binds.push(from);
        }
        if let Some(to) = q.to {
            sql.push_str(" AND timestamp <= ?");
            binds.push(to);
        }

        sql.push_str(&format!(
            " ORDER BY timestamp {} LIMIT {}",
            q.order.as_sql(),
            limit
        ));

        let mut query = sqlx::query_as::<_, Reading>(&sql);
        for bind in binds {
            query = query.bind(bind);
        }

        let readings = query.fetch_all(pool.inner()).await?;
        Ok(readings)
    }
}
