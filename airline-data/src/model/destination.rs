use anyhow::{Context as _, Result};
use log::debug;
use rusqlite::{
    Connection, Row, named_params,
    types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};

use crate::AirportCode;

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
pub struct DestinationId(i64);

impl ToSql for DestinationId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for DestinationId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Self)
    }
}

impl log::kv::ToValue for DestinationId {
    fn to_value(&self) -> log::kv::Value<'_> {
        self.0.to_value()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, accessory::Accessors)]
#[access(get, defaults(all(cp)))]
pub struct Destination {
    /// ID of this destination
    id: DestinationId,
    /// City served by the airport
    #[access(get(cp = false))]
    city: String,
    /// IATA code; unique across destinations
    #[access(get(cp = false))]
    airport_code: AirportCode,
    /// Whether the destination has been modified since being successfully saved
    dirty: bool,
}

// accessors
impl Destination {
    /// Set the city
    pub fn set_city(&mut self, city: String) {
        self.dirty |= city != self.city;
        self.city = city;
    }

    /// Set the airport code
    pub fn set_airport_code(&mut self, airport_code: AirportCode) {
        self.dirty |= airport_code != self.airport_code;
        self.airport_code = airport_code;
    }
}

// db impls
impl Destination {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            city: row.get(1)?,
            airport_code: row.get(2)?,
            dirty: false,
        })
    }

    /// Create a destination
    pub fn new(connection: &Connection, city: String, airport_code: AirportCode) -> Result<Self> {
        let mut stmt = connection
            .prepare_cached(
                "INSERT INTO Destinations (city, airport_code) VALUES (?, ?) RETURNING dest_id",
            )
            .context("Destination::new: preparing statement")?;
        let id: DestinationId = stmt
            .query_row((city.as_str(), &airport_code), |row| row.get(0))
            .context("Destination::new: getting insertion result row")?;

        debug!(id, "airport_code" = airport_code.as_str(); "created a new destination");

        Ok(Self {
            id,
            city,
            airport_code,
            dirty: false,
        })
    }

    /// Retrieve a destination by its id
    pub fn load(connection: &Connection, id: DestinationId) -> Result<Self> {
        let mut stmt = connection
            .prepare_cached(
                "SELECT dest_id, city, airport_code FROM Destinations WHERE dest_id = ?",
            )
            .context("Destination::load: preparing statement")?;
        let destination = stmt
            .query_row((id,), Self::from_row)
            .context("Destination::load: querying row")?;

        debug!("dest_id" = id; "loaded destination by id");
        Ok(destination)
    }

    /// Get all destinations, ordered by city
    pub fn list_all(connection: &Connection) -> Result<Vec<Self>> {
        let mut stmt = connection
            .prepare_cached(
                "SELECT dest_id, city, airport_code FROM Destinations ORDER BY city, dest_id",
            )
            .context("Destination::list_all: preparing statement")?;
        let mut rows = stmt
            .query(())
            .context("Destination::list_all: getting rows iterator")?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().context("Destination::list_all: fetching row")? {
            out.push(Self::from_row(row).context("Destination::list_all: parsing row")?);
        }

        debug!("count" = out.len(); "got all destinations");
        Ok(out)
    }

    /// Get all destinations, ordered by city, along with how many flights arrive at each
    pub fn list_with_flight_counts(connection: &Connection) -> Result<Vec<(Self, u32)>> {
        let mut stmt = connection
            .prepare_cached(
                "SELECT d.dest_id, d.city, d.airport_code, COUNT(f.flight_id)
                FROM Destinations d
                LEFT JOIN Flights f ON d.dest_id = f.dest_id
                GROUP BY d.dest_id, d.airport_code, d.city
                ORDER BY d.city, d.dest_id",
            )
            .context("Destination::list_with_flight_counts: preparing statement")?;
        let mut rows = stmt
            .query(())
            .context("Destination::list_with_flight_counts: getting rows iterator")?;

        let mut out = Vec::new();
        while let Some(row) = rows
            .next()
            .context("Destination::list_with_flight_counts: fetching row")?
        {
            let destination =
                Self::from_row(row).context("Destination::list_with_flight_counts: parsing row")?;
            let flights = row
                .get(3)
                .context("Destination::list_with_flight_counts: getting flight count")?;
            out.push((destination, flights));
        }

        Ok(out)
    }

    /// `true` if a destination other than `except` already uses this airport code
    pub fn code_taken(
        connection: &Connection,
        airport_code: &AirportCode,
        except: Option<DestinationId>,
    ) -> Result<bool> {
        super::exists(
            connection,
            "SELECT EXISTS (
                SELECT 1 FROM Destinations
                WHERE airport_code = :code AND dest_id IS NOT :except
            )",
            named_params! {":code": airport_code, ":except": except},
        )
        .context("Destination::code_taken")
    }

    /// How many flights arrive at this destination
    pub fn flight_count(connection: &Connection, id: DestinationId) -> Result<u32> {
        super::count(
            connection,
            "SELECT COUNT(*) FROM Flights WHERE dest_id = ?",
            (id,),
        )
        .context("Destination::flight_count")
    }

    /// Persist this destination's current state, skipping the write if nothing changed.
    pub fn save(&mut self, connection: &Connection) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        let mut stmt = connection
            .prepare_cached(
                "UPDATE Destinations SET city = :city, airport_code = :code WHERE dest_id = :id",
            )
            .context("Destination::save: preparing statement")?;
        let affected_rows = stmt
            .execute(named_params! {
                ":city": self.city.as_str(),
                ":code": &self.airport_code,
                ":id": self.id,
            })
            .context("Destination::save: executing query")?;

        debug!("dest_id" = self.id; "saved destination");
        debug_assert_eq!(
            affected_rows, 1,
            "there must always exist exactly one row in our DB for an existing Destination"
        );

        self.dirty = false;
        Ok(())
    }

    /// Delete a destination by its id
    ///
    /// Returns `true` if this existed or `false` if the id had already been deleted.
    ///
    /// Flights arriving here lose their destination due to `ON DELETE SET NULL` in the schema.
    pub fn delete(connection: &Connection, id: DestinationId) -> Result<bool> {
        let mut stmt = connection
            .prepare_cached("DELETE FROM Destinations WHERE dest_id = ?")
            .context("Destination::delete: preparing statement")?;
        let affected_rows = stmt
            .execute((id,))
            .context("Destination::delete: deleting")?;

        debug!("dest_id" = id, "was_present" = affected_rows > 0; "deleted destination by id");

        Ok(affected_rows > 0)
    }
}
