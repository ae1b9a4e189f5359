//! Read-only queries which span tables: flight filters and summaries.

use anyhow::{Context as _, Result};
use log::debug;
use rusqlite::{Connection, Params, Row};
use time::Date;

use crate::{FlightNumber, FlightStatus};

/// How to narrow down the flight listing.
///
/// Text criteria match anywhere in the column, case-insensitively for ASCII, as sqlite's `LIKE` does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlightFilter {
    DestinationCity(String),
    Status(String),
    DepartureDate(String),
    All,
}

/// One row of the flight listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightRow {
    pub flight_num: FlightNumber,
    /// `None` when the flight has no destination
    pub city: Option<String>,
    pub status: FlightStatus,
    pub departure_date: Date,
}

impl FlightRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            flight_num: row.get(0)?,
            city: row.get(1)?,
            status: row.get(2)?,
            departure_date: row.get(3)?,
        })
    }
}

const FLIGHT_LISTING: &str = "SELECT f.flight_num, d.city, f.status, f.departure_date
    FROM Flights f
    LEFT JOIN Destinations d ON f.dest_id = d.dest_id";

/// Find the flights matching `filter`, in id order.
pub fn flights_matching(connection: &Connection, filter: &FlightFilter) -> Result<Vec<FlightRow>> {
    let (condition, needle) = match filter {
        FlightFilter::DestinationCity(city) => (r"WHERE d.city LIKE ?1 ESCAPE '\'", Some(city)),
        FlightFilter::Status(status) => (r"WHERE f.status LIKE ?1 ESCAPE '\'", Some(status)),
        FlightFilter::DepartureDate(date) => {
            (r"WHERE f.departure_date LIKE ?1 ESCAPE '\'", Some(date))
        }
        FlightFilter::All => ("", None),
    };
    let sql = format!("{FLIGHT_LISTING} {condition} ORDER BY f.flight_id");

    let mut stmt = connection
        .prepare_cached(&sql)
        .context("flights_matching: preparing statement")?;
    let mut rows = match needle {
        Some(needle) => stmt.query((contains_pattern(needle),)),
        None => stmt.query(()),
    }
    .context("flights_matching: getting rows iterator")?;

    let mut out = Vec::new();
    while let Some(row) = rows.next().context("flights_matching: fetching row")? {
        out.push(FlightRow::from_row(row).context("flights_matching: parsing row")?);
    }

    debug!(filter:debug, "count" = out.len(); "filtered flights");
    Ok(out)
}

/// A `LIKE` pattern matching `needle` anywhere, with its own wildcards taken literally
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn distinct_strings(connection: &Connection, sql: &str) -> Result<Vec<String>> {
    let mut stmt = connection
        .prepare_cached(sql)
        .context("distinct_strings: preparing statement")?;
    let mut rows = stmt
        .query(())
        .context("distinct_strings: getting rows iterator")?;

    let mut out = Vec::new();
    while let Some(row) = rows.next().context("distinct_strings: fetching row")? {
        out.push(row.get(0).context("distinct_strings: getting value")?);
    }
    Ok(out)
}

/// Every destination city, alphabetically
pub fn destination_cities(connection: &Connection) -> Result<Vec<String>> {
    distinct_strings(
        connection,
        "SELECT DISTINCT city FROM Destinations ORDER BY city",
    )
}

/// Every status currently in use, alphabetically
pub fn flight_statuses(connection: &Connection) -> Result<Vec<String>> {
    distinct_strings(
        connection,
        "SELECT DISTINCT status FROM Flights ORDER BY status",
    )
}

/// Every departure date currently in use, earliest first
pub fn departure_dates(connection: &Connection) -> Result<Vec<String>> {
    distinct_strings(
        connection,
        "SELECT DISTINCT departure_date FROM Flights ORDER BY departure_date",
    )
}

fn labelled_counts(
    connection: &Connection,
    sql: &str,
    params: impl Params,
) -> Result<Vec<(String, u32)>> {
    let mut stmt = connection
        .prepare_cached(sql)
        .context("labelled_counts: preparing statement")?;
    let mut rows = stmt
        .query(params)
        .context("labelled_counts: getting rows iterator")?;

    let mut out = Vec::new();
    while let Some(row) = rows.next().context("labelled_counts: fetching row")? {
        let label = row.get(0).context("labelled_counts: getting label")?;
        let count = row.get(1).context("labelled_counts: getting count")?;
        out.push((label, count));
    }
    Ok(out)
}

/// Number of flights arriving at each destination, including destinations with none.
///
/// Rows are labelled `City (CODE)`, since one city may have several airports.
pub fn flights_per_destination(connection: &Connection) -> Result<Vec<(String, u32)>> {
    labelled_counts(
        connection,
        "SELECT d.city || ' (' || d.airport_code || ')', COUNT(f.flight_id)
        FROM Destinations d
        LEFT JOIN Flights f ON d.dest_id = f.dest_id
        GROUP BY d.dest_id
        ORDER BY d.city, d.dest_id",
        (),
    )
    .context("flights_per_destination")
}

/// Number of flights assigned to each pilot, including idle pilots
pub fn flights_per_pilot(connection: &Connection) -> Result<Vec<(String, u32)>> {
    labelled_counts(
        connection,
        "SELECT p.name, COUNT(f.flight_id)
        FROM Pilots p
        LEFT JOIN Flights f ON p.pilot_id = f.pilot_id
        GROUP BY p.pilot_id, p.name
        ORDER BY p.pilot_id",
        (),
    )
    .context("flights_per_pilot")
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::{Destination, Flight, NewFlight, model::test_support::*};

    fn numbers(rows: &[FlightRow]) -> Vec<&str> {
        rows.iter().map(|row| row.flight_num.as_str()).collect()
    }

    #[test]
    fn filter_by_city_is_a_substring_match() {
        let connection = seeded_db();
        let rows = flights_matching(&connection, &FlightFilter::DestinationCity("york".into()))
            .unwrap();
        assert_eq!(
            rows,
            [FlightRow {
                flight_num: "FL-102".parse().unwrap(),
                city: Some("New York".into()),
                status: FlightStatus::OnTime,
                departure_date: date!(2026 - 05 - 10),
            }]
        );
    }

    #[test]
    fn filter_by_status() {
        let connection = seeded_db();
        let rows = flights_matching(&connection, &FlightFilter::Status("delayed".into())).unwrap();
        assert_eq!(numbers(&rows), ["FL-103", "FL-108"]);
    }

    #[test]
    fn filter_by_partial_date() {
        let connection = seeded_db();
        let rows =
            flights_matching(&connection, &FlightFilter::DepartureDate("2026-05-12".into()))
                .unwrap();
        assert_eq!(numbers(&rows), ["FL-105", "FL-106"]);

        let rows =
            flights_matching(&connection, &FlightFilter::DepartureDate("2026-05".into())).unwrap();
        assert_eq!(rows.len(), 10);
    }

    #[test]
    fn all_includes_flights_without_destination() {
        let connection = seeded_db();
        Flight::new(
            &connection,
            NewFlight {
                flight_num: "BA123".parse().unwrap(),
                departure_date: date!(2026 - 07 - 01),
                status: FlightStatus::Scheduled,
                pilot_id: None,
                dest_id: None,
            },
        )
        .unwrap();

        let rows = flights_matching(&connection, &FlightFilter::All).unwrap();
        assert_eq!(rows.len(), 11);
        assert_eq!(rows[10].city, None);

        let none = flights_matching(&connection, &FlightFilter::DestinationCity("Atlantis".into()))
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn distinct_values() {
        let connection = seeded_db();
        assert_eq!(
            flight_statuses(&connection).unwrap(),
            ["Cancelled", "Delayed", "On Time", "Scheduled"]
        );
        assert_eq!(departure_dates(&connection).unwrap().len(), 5);
        let cities = destination_cities(&connection).unwrap();
        assert_eq!(cities.first().map(String::as_str), Some("Berlin"));
        assert_eq!(cities.len(), 10);
    }

    #[test]
    fn summaries_count_flights() {
        let connection = seeded_db();
        Destination::new(&connection, "Auckland".into(), "AKL".parse().unwrap()).unwrap();
        Flight::new(
            &connection,
            NewFlight {
                flight_num: "BA123".parse().unwrap(),
                departure_date: date!(2026 - 07 - 01),
                status: FlightStatus::Scheduled,
                pilot_id: Some(1.into()),
                dest_id: Some(1.into()),
            },
        )
        .unwrap();

        let per_destination = flights_per_destination(&connection).unwrap();
        assert_eq!(per_destination[0], ("Auckland (AKL)".into(), 0));
        assert!(per_destination.contains(&("London (LHR)".into(), 2)));

        let per_pilot = flights_per_pilot(&connection).unwrap();
        assert_eq!(per_pilot[0], ("Mark Jones".into(), 2));
        assert_eq!(per_pilot[1], ("Jenny Smith".into(), 1));
    }

    #[test]
    fn destinations_sharing_a_city_are_summarised_apart() {
        let connection = seeded_db();
        let gatwick =
            Destination::new(&connection, "London".into(), "LGW".parse().unwrap()).unwrap();
        Flight::new(
            &connection,
            NewFlight {
                flight_num: "BA2490".parse().unwrap(),
                departure_date: date!(2026 - 07 - 01),
                status: FlightStatus::Scheduled,
                pilot_id: None,
                dest_id: Some(gatwick.id()),
            },
        )
        .unwrap();

        let per_destination = flights_per_destination(&connection).unwrap();
        assert_eq!(per_destination.len(), 11);
        let london = per_destination
            .iter()
            .filter(|(label, _)| label.starts_with("London"))
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(
            london,
            [("London (LHR)".into(), 1), ("London (LGW)".into(), 1)]
        );
    }

    #[test]
    fn filter_wildcards_are_literal() {
        let connection = seeded_db();
        assert!(
            flights_matching(&connection, &FlightFilter::Status("_".into()))
                .unwrap()
                .is_empty()
        );

        Flight::new(
            &connection,
            NewFlight {
                flight_num: "BA123".parse().unwrap(),
                departure_date: date!(2026 - 07 - 01),
                status: "50% boarded".parse().unwrap(),
                pilot_id: None,
                dest_id: None,
            },
        )
        .unwrap();
        let rows = flights_matching(&connection, &FlightFilter::Status("0%".into())).unwrap();
        assert_eq!(numbers(&rows), ["BA123"]);
    }
}
