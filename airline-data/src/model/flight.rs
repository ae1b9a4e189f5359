use anyhow::{Context as _, Result};
use log::debug;
use rusqlite::{
    Connection, Row, named_params,
    types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use time::Date;

use crate::{DestinationId, FlightNumber, FlightStatus, PilotId};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    derive_more::Display,
    derive_more::From,
    derive_more::Into,
)]
pub struct FlightId(i64);

impl ToSql for FlightId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for FlightId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Self)
    }
}

impl log::kv::ToValue for FlightId {
    fn to_value(&self) -> log::kv::Value<'_> {
        self.0.to_value()
    }
}

/// Everything needed to insert a flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFlight {
    pub flight_num: FlightNumber,
    pub departure_date: Date,
    pub status: FlightStatus,
    pub pilot_id: Option<PilotId>,
    pub dest_id: Option<DestinationId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, accessory::Accessors)]
#[access(get, defaults(all(cp)))]
pub struct Flight {
    id: FlightId,
    #[access(get(cp = false))]
    flight_num: FlightNumber,
    departure_date: Date,
    #[access(get(cp = false))]
    status: FlightStatus,
    pilot_id: Option<PilotId>,
    dest_id: Option<DestinationId>,
    dirty: bool,
}

// accessors
impl Flight {
    /// Set the departure date
    pub fn set_departure_date(&mut self, departure_date: Date) {
        self.dirty |= departure_date != self.departure_date;
        self.departure_date = departure_date;
    }

    /// Set the status
    pub fn set_status(&mut self, status: FlightStatus) {
        self.dirty |= status != self.status;
        self.status = status;
    }

    /// Assign or unassign the pilot
    pub fn set_pilot_id(&mut self, pilot_id: Option<PilotId>) {
        self.dirty |= pilot_id != self.pilot_id;
        self.pilot_id = pilot_id;
    }

    /// Set or clear the destination
    pub fn set_dest_id(&mut self, dest_id: Option<DestinationId>) {
        self.dirty |= dest_id != self.dest_id;
        self.dest_id = dest_id;
    }
}

// db impls
impl Flight {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            flight_num: row.get(1)?,
            departure_date: row.get(2)?,
            status: row.get(3)?,
            pilot_id: row.get(4)?,
            dest_id: row.get(5)?,
            dirty: false,
        })
    }

    /// Create a new flight and insert it into the DB
    ///
    /// Fails with a constraint violation if the flight number is taken
    /// or the pilot or destination does not exist.
    pub fn new(connection: &Connection, flight: NewFlight) -> Result<Self> {
        let NewFlight {
            flight_num,
            departure_date,
            status,
            pilot_id,
            dest_id,
        } = flight;

        let mut stmt = connection
            .prepare_cached(
                "INSERT INTO Flights (flight_num, departure_date, status, pilot_id, dest_id)
                VALUES (:flight_num, :departure_date, :status, :pilot_id, :dest_id)
                RETURNING flight_id",
            )
            .context("Flight::new: preparing statement")?;
        let id: FlightId = stmt
            .query_row(
                named_params! {
                    ":flight_num": &flight_num,
                    ":departure_date": departure_date,
                    ":status": &status,
                    ":pilot_id": pilot_id,
                    ":dest_id": dest_id,
                },
                |row| row.get(0),
            )
            .context("Flight::new: inserting row")?;

        debug!(id, "flight_num" = flight_num.as_str(), departure_date:display; "inserted new Flight into the db");

        Ok(Self {
            id,
            flight_num,
            departure_date,
            status,
            pilot_id,
            dest_id,
            dirty: false,
        })
    }

    /// Load a flight by its id
    pub fn load(connection: &Connection, id: FlightId) -> Result<Self> {
        let mut stmt = connection
            .prepare_cached(
                "SELECT flight_id, flight_num, departure_date, status, pilot_id, dest_id
                FROM Flights WHERE flight_id = ?",
            )
            .context("Flight::load: preparing statement")?;
        let flight = stmt
            .query_row((id,), Self::from_row)
            .context("Flight::load: loading row")?;

        debug!(id; "loaded a flight by its id");
        Ok(flight)
    }

    /// Get all flights, in id order
    pub fn list_all(connection: &Connection) -> Result<Vec<Self>> {
        let mut stmt = connection
            .prepare_cached(
                "SELECT flight_id, flight_num, departure_date, status, pilot_id, dest_id
                FROM Flights ORDER BY flight_id",
            )
            .context("Flight::list_all: preparing statement")?;
        let mut rows = stmt
            .query(())
            .context("Flight::list_all: getting rows iterator")?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().context("Flight::list_all: fetching row")? {
            out.push(Self::from_row(row).context("Flight::list_all: parsing row")?);
        }

        debug!("count" = out.len(); "got all flights");
        Ok(out)
    }

    /// `true` if a flight with this number already exists
    pub fn number_taken(connection: &Connection, flight_num: &FlightNumber) -> Result<bool> {
        super::exists(
            connection,
            "SELECT EXISTS (SELECT 1 FROM Flights WHERE flight_num = ?)",
            (flight_num,),
        )
        .context("Flight::number_taken")
    }

    /// Update this flight in the DB, but only if it's dirty.
    ///
    /// Fails with a foreign key violation if the assigned pilot or destination does not exist.
    pub fn save(&mut self, connection: &Connection) -> Result<()> {
        if !self.dirty {
            debug!("id" = self.id; "returning early from saving Flight in db because it is not dirty");
            return Ok(());
        }

        let mut stmt = connection
            .prepare_cached(
                "UPDATE Flights
                SET departure_date = :departure_date,
                    status = :status,
                    pilot_id = :pilot_id,
                    dest_id = :dest_id
                WHERE flight_id = :id",
            )
            .context("Flight::save: prepare statement")?;
        let affected_rows = stmt
            .execute(named_params! {
                ":departure_date": self.departure_date,
                ":status": &self.status,
                ":pilot_id": self.pilot_id,
                ":dest_id": self.dest_id,
                ":id": self.id,
            })
            .context("Flight::save: execute query")?;

        debug!("id" = self.id, "status" = self.status.as_str(); "saved Flight in the db");
        debug_assert_eq!(affected_rows, 1, "each flight should affect exactly one row");

        self.dirty = false;
        Ok(())
    }

    /// Delete a flight by its id
    ///
    /// Returns true if deleting removed an actual flight.
    pub fn delete(connection: &Connection, id: FlightId) -> Result<bool> {
        let mut stmt = connection
            .prepare_cached("DELETE FROM Flights WHERE flight_id = ?")
            .context("Flight::delete: preparing statement")?;
        let affected_rows = stmt
            .execute((id,))
            .context("Flight::delete: executing delete")?;

        debug!(id, "was_present" = affected_rows > 0; "deleted a flight by its id");

        Ok(affected_rows > 0)
    }
}
