//! rfcloud - RF Reading Ingestion & Query Service
//!
//! Accepts RF spectrum readings over HTTP, normalizes tolerant sensor
//! payloads into a canonical record, and serves time-range queries over
//! the stored history.
//!
//! ## Architecture
//!
//! - `config`: YAML configuration with validation
//! - `reading`: canonical reading record and payload normalization
//! - `server`: Axum HTTP API, CORS, and health probes
//! - `storage`: SQLite persistence behind a lazy connector

pub mod config;
pub mod reading;
pub mod server;
pub mod storage;

pub use config::AppConfig;
pub use reading::Reading;
pub use server::{AppState, create_router};
pub use storage::{Connector, ReadingQuery, ReadingStore, SortOrder, StorageError};
