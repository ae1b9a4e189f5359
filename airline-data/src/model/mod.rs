mod destination;
mod flight;
mod pilot;

pub use destination::{Destination, DestinationId};
pub use flight::{Flight, FlightId, NewFlight};
pub use pilot::{Pilot, PilotId, ScheduledFlight};

use anyhow::{Context as _, Result};
use rusqlite::{Connection, Params, ffi};

/// `true` if anywhere in this error's chain sqlite rejected a write because of a `UNIQUE` constraint.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    has_extended_code(err, ffi::SQLITE_CONSTRAINT_UNIQUE)
}

/// `true` if anywhere in this error's chain sqlite rejected a write because of a `FOREIGN KEY` constraint.
pub fn is_foreign_key_violation(err: &anyhow::Error) -> bool {
    has_extended_code(err, ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}

fn has_extended_code(err: &anyhow::Error, code: std::ffi::c_int) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<rusqlite::Error>(),
            Some(rusqlite::Error::SqliteFailure(inner, _)) if inner.extended_code == code
        )
    })
}

/// Run a `SELECT COUNT(*) ...` style query.
fn count(connection: &Connection, sql: &str, params: impl Params) -> Result<u32> {
    let mut stmt = connection
        .prepare_cached(sql)
        .context("count: preparing statement")?;
    stmt.query_row(params, |row| row.get(0))
        .context("count: querying row")
}

/// Run a `SELECT EXISTS (...)` style query.
fn exists(connection: &Connection, sql: &str, params: impl Params) -> Result<bool> {
    let mut stmt = connection
        .prepare_cached(sql)
        .context("exists: preparing statement")?;
    stmt.query_row(params, |row| row.get(0))
        .context("exists: querying row")
}
