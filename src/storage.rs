//! Storage Layer
//!
//! SQLite persistence for readings behind a lazily-initialized, process-wide
//! connection handle.
//!
//! # Components
//!
//! - [`Connector`]: Guarded lazy initialization; explicit URL or environment
//! - [`ReadingStore`]: Insert and range-query facade over the connector
//! - [`SqlitePool`](db::SqlitePool): Pooled SQLite handle with WAL defaults

mod connector;
pub mod db;
mod error;
mod schema;
mod store;

pub use connector::{Connector, DB_URL_ENV};
pub use error::StorageError;
pub use store::{DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT, ReadingQuery, ReadingStore, SortOrder};
