//! Lazy, process-wide database connection management.
//!
//! The deployment target is request-per-call: the first operation of a
//! process pays the connect cost and every later operation reuses the same
//! handle. [`Connector::ensure_connected`] is the single guarded entry point.

use tokio::sync::OnceCell;

use crate::storage::StorageError;
use crate::storage::db::SqlitePool;
use crate::storage::schema::init_schema;

/// Environment variable holding the database URL when no explicit URL is set.
pub const DB_URL_ENV: &str = "RFCLOUD_DB_URL";

/// Lazily-initialized, shared database handle.
///
/// Exactly one [`SqlitePool`] is created per connector, on the first
/// successful [`ensure_connected`](Self::ensure_connected) call. A failed
/// attempt leaves the connector unconnected, so the next call retries the
/// full connect sequence.
pub struct Connector {
    url: Option<String>,
    pool: OnceCell<SqlitePool>,
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl Connector {
    /// Create a connector that resolves the database URL from the
    /// `RFCLOUD_DB_URL` environment variable at first use.
    pub fn from_env() -> Self {
        Self {
            url: None,
            pool: OnceCell::new(),
        }
    }

    /// Create a connector with an explicit database URL.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            pool: OnceCell::new(),
        }
    }

    /// Ensure the database connection is established, connecting on first use.
    ///
    /// Idempotent: the first successful call connects and initializes the
    /// schema; all later calls return the same handle without I/O. Concurrent
    /// first calls are serialized, so exactly one connect attempt is made.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Configuration`] when no URL is configured.
    /// - [`StorageError::Connection`] when the database is unreachable.
    pub async fn ensure_connected(&self) -> Result<&SqlitePool, StorageError> {
        self.pool
            .get_or_try_init(|| async {
                let url = self.resolve_url()?;
                let pool = SqlitePool::connect(&url)
                    .await
                    .map_err(StorageError::Connection)?;
                init_schema(&pool).await.map_err(StorageError::Connection)?;
                tracing::info!(url = %url, "Database connected");
                Ok(pool)
            })
            .await
    }

    /// Whether the connection has been established.
    pub fn is_connected(&self) -> bool {
        self.pool.initialized()
    }

    fn resolve_url(&self) -> Result<String, StorageError> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }
        match std::env::var(DB_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Ok(url),
            _ => Err(StorageError::Configuration(format!(
                "set {DB_URL_ENV} or pass --db-url"
            ))),
        }
    }
}
