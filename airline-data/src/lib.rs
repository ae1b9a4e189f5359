//! Airline scheduling data: pilots, destinations and the flights between them, kept in sqlite.

mod model;
pub mod report;
mod schema;
mod seed;
mod values;

pub use model::{
    Destination, DestinationId, Flight, FlightId, NewFlight, Pilot, PilotId, ScheduledFlight,
    is_foreign_key_violation, is_unique_violation,
};
pub use schema::{apply_schema, open, open_in_memory};
pub use seed::seed_sample_data;
pub use values::{
    AirportCode, FlightNumber, FlightStatus, ValidationError, license_number, non_empty,
    parse_departure_date,
};
