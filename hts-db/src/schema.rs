//! SQL schema definitions for the simulation store.
//!
//! The schema is applied as a single batch when the database is opened.

/// Returns the full SQL schema as a single batch string.
///
/// This creates the following tables:
///
/// - `station` - Station registry (numeric id inside the kind's namespace,
///   kind label, name, coordinates, description)
/// - `run` - Timeseries metadata (hash id, coordinates, model, method, grid id,
///   end of the last persisted observation)
/// - `data` - Timeseries points keyed by `(id, time)`; `value` is NULL for a
///   tick that was persisted without a value
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS station (
        id INTEGER PRIMARY KEY,
        station_type TEXT NOT NULL,
        name TEXT NOT NULL,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        description TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_station_coords ON station(station_type, latitude, longitude);

    CREATE TABLE IF NOT EXISTS run (
        id TEXT PRIMARY KEY,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        model TEXT NOT NULL,
        method TEXT NOT NULL,
        grid_id TEXT NOT NULL,
        obs_end TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_run_grid ON run(grid_id, method);

    CREATE TABLE IF NOT EXISTS data (
        id TEXT NOT NULL,
        time TEXT NOT NULL,
        value REAL,
        PRIMARY KEY (id, time)
    );
    "#
}
