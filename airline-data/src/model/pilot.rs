use anyhow::{Context as _, Result};
use log::debug;
use rusqlite::{
    Connection, Row, named_params,
    types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use time::Date;

use crate::FlightNumber;

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
pub struct PilotId(i64);

impl ToSql for PilotId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for PilotId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Self)
    }
}

impl log::kv::ToValue for PilotId {
    fn to_value(&self) -> log::kv::Value<'_> {
        self.0.to_value()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, accessory::Accessors)]
#[access(get, defaults(all(cp)))]
pub struct Pilot {
    id: PilotId,
    #[access(get(cp = false))]
    name: String,
    #[access(get(cp = false))]
    license_num: String,
    dirty: bool,
}

/// One flight on a pilot's schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledFlight {
    pub flight_num: FlightNumber,
    pub departure_date: Date,
    /// `None` when the flight has no destination yet
    pub city: Option<String>,
}

// accessors
impl Pilot {
    /// Set the name
    pub fn set_name(&mut self, name: String) {
        self.dirty |= name != self.name;
        self.name = name;
    }

    /// Set the license number
    pub fn set_license_num(&mut self, license_num: String) {
        self.dirty |= license_num != self.license_num;
        self.license_num = license_num;
    }
}

// db impls
impl Pilot {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            license_num: row.get(2)?,
            dirty: false,
        })
    }

    /// Create a new pilot and insert it into the DB
    pub fn new(connection: &Connection, name: String, license_num: String) -> Result<Self> {
        let mut stmt = connection
            .prepare_cached(
                "INSERT INTO Pilots (name, license_num)
                VALUES (:name, :license_num)
                RETURNING pilot_id",
            )
            .context("Pilot::new: preparing statement")?;
        let id: PilotId = stmt
            .query_row(
                named_params! {":name": name, ":license_num": license_num},
                |row| row.get(0),
            )
            .context("Pilot::new: inserting row")?;

        debug!(id, "license_num" = license_num.as_str(); "inserted new Pilot into the db");

        Ok(Self {
            id,
            name,
            license_num,
            dirty: false,
        })
    }

    /// Load a pilot by id
    pub fn load(connection: &Connection, id: PilotId) -> Result<Self> {
        let mut stmt = connection
            .prepare_cached("SELECT pilot_id, name, license_num FROM Pilots WHERE pilot_id = ?")
            .context("Pilot::load: preparing statement")?;
        let pilot = stmt
            .query_row((id,), Self::from_row)
            .context("Pilot::load: loading row")?;

        debug!(id; "loaded a pilot by its id");
        Ok(pilot)
    }

    /// Get all pilots, in id order
    pub fn list_all(connection: &Connection) -> Result<Vec<Self>> {
        let mut stmt = connection
            .prepare_cached("SELECT pilot_id, name, license_num FROM Pilots ORDER BY pilot_id")
            .context("Pilot::list_all: preparing statement")?;
        let mut rows = stmt
            .query(())
            .context("Pilot::list_all: getting rows iterator")?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().context("Pilot::list_all: fetching row")? {
            out.push(Self::from_row(row).context("Pilot::list_all: parsing row")?);
        }

        debug!("count" = out.len(); "got all pilots");
        Ok(out)
    }

    /// Get all pilots along with how many flights each is assigned to
    pub fn list_with_flight_counts(connection: &Connection) -> Result<Vec<(Self, u32)>> {
        let mut stmt = connection
            .prepare_cached(
                "SELECT p.pilot_id, p.name, p.license_num, COUNT(f.flight_id)
                FROM Pilots p
                LEFT JOIN Flights f ON p.pilot_id = f.pilot_id
                GROUP BY p.pilot_id, p.name, p.license_num
                ORDER BY p.pilot_id",
            )
            .context("Pilot::list_with_flight_counts: preparing statement")?;
        let mut rows = stmt
            .query(())
            .context("Pilot::list_with_flight_counts: getting rows iterator")?;

        let mut out = Vec::new();
        while let Some(row) = rows
            .next()
            .context("Pilot::list_with_flight_counts: fetching row")?
        {
            let pilot = Self::from_row(row).context("Pilot::list_with_flight_counts: parsing row")?;
            let flights = row
                .get(3)
                .context("Pilot::list_with_flight_counts: getting flight count")?;
            out.push((pilot, flights));
        }

        Ok(out)
    }

    /// `true` if some pilot other than `except` already holds this license number
    pub fn license_taken(
        connection: &Connection,
        license_num: &str,
        except: Option<PilotId>,
    ) -> Result<bool> {
        super::exists(
            connection,
            "SELECT EXISTS (
                SELECT 1 FROM Pilots
                WHERE license_num = :license_num AND pilot_id IS NOT :except
            )",
            named_params! {":license_num": license_num, ":except": except},
        )
        .context("Pilot::license_taken")
    }

    /// How many flights this pilot is assigned to
    pub fn flight_count(connection: &Connection, id: PilotId) -> Result<u32> {
        super::count(
            connection,
            "SELECT COUNT(*) FROM Flights WHERE pilot_id = ?",
            (id,),
        )
        .context("Pilot::flight_count")
    }

    /// The flights assigned to this pilot, earliest first
    pub fn schedule(connection: &Connection, id: PilotId) -> Result<Vec<ScheduledFlight>> {
        let mut stmt = connection
            .prepare_cached(
                "SELECT f.flight_num, f.departure_date, d.city
                FROM Flights f
                LEFT JOIN Destinations d ON f.dest_id = d.dest_id
                WHERE f.pilot_id = ?
                ORDER BY f.departure_date, f.flight_num",
            )
            .context("Pilot::schedule: preparing statement")?;
        let mut rows = stmt
            .query((id,))
            .context("Pilot::schedule: getting rows iterator")?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().context("Pilot::schedule: fetching row")? {
            let flight_num = row.get(0).context("Pilot::schedule: getting flight_num")?;
            let departure_date = row
                .get(1)
                .context("Pilot::schedule: getting departure_date")?;
            let city = row.get(2).context("Pilot::schedule: getting city")?;
            out.push(ScheduledFlight {
                flight_num,
                departure_date,
                city,
            });
        }

        debug!(id, "count" = out.len(); "loaded pilot schedule");
        Ok(out)
    }

    /// Update this pilot in the DB, but only if it's dirty.
    pub fn save(&mut self, connection: &Connection) -> Result<()> {
        if !self.dirty {
            debug!("id" = self.id; "returning early from saving Pilot in db because it is not dirty");
            return Ok(());
        }

        let mut stmt = connection
            .prepare_cached(
                "UPDATE Pilots
                SET name = :name, license_num = :license_num
                WHERE pilot_id = :id",
            )
            .context("Pilot::save: prepare statement")?;
        let affected_rows = stmt
            .execute(named_params! {
                ":name": self.name.as_str(),
                ":license_num": self.license_num.as_str(),
                ":id": self.id,
            })
            .context("Pilot::save: execute query")?;

        debug!("id" = self.id; "saved Pilot in the db");
        debug_assert_eq!(affected_rows, 1, "each pilot should affect exactly one row");

        self.dirty = false;
        Ok(())
    }

    /// Delete a pilot by its id
    ///
    /// Flights assigned to the pilot become unassigned due to `ON DELETE SET NULL` in the schema.
    ///
    /// Returns true if deleting removed an actual pilot.
    pub fn delete(connection: &Connection, id: PilotId) -> Result<bool> {
        let mut stmt = connection
            .prepare_cached("DELETE FROM Pilots WHERE pilot_id = ?")
            .context("Pilot::delete: preparing statement")?;
        let affected_rows = stmt
            .execute((id,))
            .context("Pilot::delete: executing delete")?;

        debug!(id, "was_present" = affected_rows > 0; "deleted a pilot by its id");

        Ok(affected_rows > 0)
    }
}
