use std::path::Path;

use anyhow::{Context as _, Result};
use log::debug;
use rusqlite::Connection;

const SCHEMA: &str = include_str!("schema.sql");

/// Apply the schema to the database.
///
/// Must be called once on a new database before the database can be used.
/// The statements are all `IF NOT EXISTS`, so applying it to a database which already has the tables is a no-op.
pub fn apply_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(SCHEMA)
        .context("applying schema")?;
    debug!("applied schema");
    Ok(())
}

/// Open a connection to the database at `path`, creating the file if necessary.
///
/// Foreign key enforcement is per-connection in sqlite, so every connection must come through here
/// or through [`open_in_memory`].
pub fn open(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    let connection = Connection::open(path)
        .with_context(|| format!("opening database at {}", path.display()))?;
    enable_foreign_keys(&connection)?;
    Ok(connection)
}

/// Open a fresh in-memory database with foreign keys enabled.
pub fn open_in_memory() -> Result<Connection> {
    let connection = Connection::open_in_memory().context("opening in-memory database")?;
    enable_foreign_keys(&connection)?;
    Ok(connection)
}

fn enable_foreign_keys(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "foreign_keys", true)
        .context("enabling foreign keys")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_can_be_applied_twice() {
        let connection = open_in_memory().unwrap();
        apply_schema(&connection).unwrap();
        apply_schema(&connection).unwrap();

        let tables = connection
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map((), |row| row.get::<_, String>(0))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap();
        assert_eq!(tables, ["Destinations", "Flights", "Pilots"]);
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let connection = open_in_memory().unwrap();
        apply_schema(&connection).unwrap();

        let enabled: bool = connection
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .unwrap();
        assert!(enabled);

        let result = connection.execute(
            "INSERT INTO Flights (flight_num, departure_date, status, pilot_id)
            VALUES ('FL-1', '2026-01-01', 'Scheduled', 999)",
            (),
        );
        assert!(result.is_err());
    }

    #[test]
    fn open_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("airline.db");
        let connection = open(&path).unwrap();
        apply_schema(&connection).unwrap();
        assert!(path.exists());
    }
}
