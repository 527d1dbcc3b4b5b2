//! SQLite persistence layer for simulation timeseries.
//!
//! This crate owns the store the alignment engine reads raw points from and
//! writes regularized series back to. It implements the
//! [`SeriesSource`](hts_series::SeriesSource) and
//! [`SeriesSink`](hts_series::SeriesSink) collaborator traits on top of a
//! single `rusqlite` connection.
//!
//! # Architecture
//!
//! - `Arc<Mutex<Connection>>` wrapper so batch tasks on the blocking pool can
//!   share one connection
//! - In-memory SQLite for tests and fixtures, file-backed for real runs
//! - CSV loaders for raw points and station lists
//! - Typed query methods for run metadata, observation watermarks and the
//!   station registry
//!
//! # Usage
//!
//! ```rust
//! use hts_db::Database;
//! use hts_series::SeriesSource;
//! use hts_utils::dates::parse_timestamp;
//!
//! let db = Database::new().unwrap();
//! db.load_raw_points("rain_gauge_1,2019-08-22 01:00:00,1.8\n").unwrap();
//!
//! let start = parse_timestamp("2019-08-22 00:00:00").unwrap();
//! let points = db.fetch_series("rain_gauge_1", start, None).unwrap();
//! assert_eq!(points.len(), 1);
//! ```
//!
//! # Tables
//!
//! See [`schema::create_schema`] for the full SQL schema.
//!
//! - `station` - Station registry with per-kind id namespaces
//! - `run` - One row per simulation timeseries, keyed by its hash id
//! - `data` - `(id, time, value)` points; a NULL value is a missing tick

pub mod schema;
mod loader;
mod queries;
mod stations;
pub mod models;

use anyhow::anyhow;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// SQLite database holding runs, stations and timeseries data.
///
/// This struct is cheaply cloneable (via `Arc`); clones share the same
/// connection.
///
/// # Example
///
/// ```rust
/// use hts_db::Database;
///
/// let db = Database::new().unwrap();
/// db.load_stations("id,station_type,name,latitude,longitude,description\n100001,CUrW_WeatherStation,colombo,6.9,79.86,\n").unwrap();
/// let stations = db.query_stations().unwrap();
/// assert_eq!(stations.len(), 1);
/// ```
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Create a new in-memory database with the full schema applied.
    pub fn new() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    /// Open (or create) a database file and apply the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        log::info!(
            "[HTS Debug] db: opened {}",
            path.as_ref().display()
        );
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) fn conn(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))
    }
}
