//! Sample data for a freshly created database.

use anyhow::{Context as _, Result};
use log::info;
use rusqlite::Connection;

const PILOTS: [(&str, &str); 10] = [
    ("Mark Jones", "LIC-1001"),
    ("Jenny Smith", "LIC-1002"),
    ("David Chen", "LIC-1003"),
    ("Sarah Williams", "LIC-1004"),
    ("Michael Brown", "LIC-1005"),
    ("Emma Davis", "LIC-1006"),
    ("James Wilson", "LIC-1007"),
    ("Lisa Anderson", "LIC-1008"),
    ("Robert Taylor", "LIC-1009"),
    ("Maria Garcia", "LIC-1010"),
];

const DESTINATIONS: [(&str, &str); 10] = [
    ("London", "LHR"),
    ("New York", "JFK"),
    ("Paris", "CDG"),
    ("Tokyo", "NRT"),
    ("Dubai", "DXB"),
    ("Sydney", "SYD"),
    ("Rome", "FCO"),
    ("Berlin", "BER"),
    ("Toronto", "YYZ"),
    ("Singapore", "SIN"),
];

/// (flight_id, flight_num, departure_date, status, pilot_id, dest_id)
const FLIGHTS: [(i64, &str, &str, &str, i64, i64); 10] = [
    (101, "FL-101", "2026-05-10", "Scheduled", 1, 1),
    (102, "FL-102", "2026-05-10", "On Time", 2, 2),
    (103, "FL-103", "2026-05-11", "Delayed", 3, 3),
    (104, "FL-104", "2026-05-11", "Scheduled", 4, 4),
    (105, "FL-105", "2026-05-12", "Cancelled", 5, 5),
    (106, "FL-106", "2026-05-12", "On Time", 6, 6),
    (107, "FL-107", "2026-05-13", "Scheduled", 7, 7),
    (108, "FL-108", "2026-05-13", "Delayed", 8, 8),
    (109, "FL-109", "2026-05-14", "On Time", 9, 9),
    (110, "FL-110", "2026-05-14", "Scheduled", 10, 10),
];

/// Populate the database with ten pilots, ten destinations and ten flights.
///
/// Rows whose unique keys already exist are skipped, so seeding twice changes nothing.
/// The flights reference pilots and destinations by id, so this expects the pilot and destination tables
/// to start out empty.
pub fn seed_sample_data(connection: &Connection) -> Result<()> {
    let tx = connection
        .unchecked_transaction()
        .context("seed_sample_data: starting transaction")?;

    {
        let mut stmt = tx
            .prepare_cached("INSERT OR IGNORE INTO Pilots (name, license_num) VALUES (?, ?)")
            .context("seed_sample_data: preparing pilot insert")?;
        for pilot in PILOTS {
            stmt.execute(pilot)
                .context("seed_sample_data: inserting pilot")?;
        }

        let mut stmt = tx
            .prepare_cached("INSERT OR IGNORE INTO Destinations (city, airport_code) VALUES (?, ?)")
            .context("seed_sample_data: preparing destination insert")?;
        for destination in DESTINATIONS {
            stmt.execute(destination)
                .context("seed_sample_data: inserting destination")?;
        }

        let mut stmt = tx
            .prepare_cached(
                "INSERT OR IGNORE INTO Flights
                (flight_id, flight_num, departure_date, status, pilot_id, dest_id)
                VALUES (?, ?, ?, ?, ?, ?)",
            )
            .context("seed_sample_data: preparing flight insert")?;
        for flight in FLIGHTS {
            stmt.execute(flight)
                .context("seed_sample_data: inserting flight")?;
        }
    }

    tx.commit().context("seed_sample_data: committing")?;

    info!(
        "pilots" = PILOTS.len(),
        "destinations" = DESTINATIONS.len(),
        "flights" = FLIGHTS.len();
        "seeded sample data"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Destination, Flight, Pilot, model::test_support::empty_db};

    #[test]
    fn seeds_ten_of_each() {
        let connection = empty_db();
        seed_sample_data(&connection).unwrap();

        assert_eq!(Pilot::list_all(&connection).unwrap().len(), 10);
        assert_eq!(Destination::list_all(&connection).unwrap().len(), 10);

        let flights = Flight::list_all(&connection).unwrap();
        assert_eq!(flights.len(), 10);
        assert_eq!(flights[0].id(), 101.into());
        assert_eq!(flights[9].flight_num().as_str(), "FL-110");
    }

    #[test]
    fn seeding_twice_is_harmless() {
        let connection = empty_db();
        seed_sample_data(&connection).unwrap();
        seed_sample_data(&connection).unwrap();

        assert_eq!(Pilot::list_all(&connection).unwrap().len(), 10);
        assert_eq!(Flight::list_all(&connection).unwrap().len(), 10);
    }

    #[test]
    fn seeded_flights_reference_their_pilot_and_destination() {
        let connection = empty_db();
        seed_sample_data(&connection).unwrap();

        let flight = Flight::load(&connection, 104.into()).unwrap();
        let pilot = Pilot::load(&connection, flight.pilot_id().unwrap()).unwrap();
        let destination = Destination::load(&connection, flight.dest_id().unwrap()).unwrap();
        assert_eq!(pilot.name(), "Sarah Williams");
        assert_eq!(destination.airport_code().as_str(), "NRT");
    }
}
