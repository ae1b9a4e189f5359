//! Validated values entered at the prompt.
//!
//! Everything the user types goes through one of these before it reaches a query.

use std::{fmt, str::FromStr};

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use time::{Date, format_description::StaticFormatDescription, macros::format_description};

static DATE_FORMAT: StaticFormatDescription = format_description!("[year]-[month]-[day]");

/// Why a piece of user input was rejected.
///
/// The display text is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ValidationError {
    #[display("{_0} must not be empty")]
    Empty(&'static str),
    #[display("flight number {_0:?} must look like BA123 or FL-101")]
    FlightNumber(String),
    #[display("airport code {_0:?} must be exactly 3 letters")]
    AirportCode(String),
    #[display("departure date {_0:?} must be a real date written YYYY-MM-DD")]
    DepartureDate(String),
}

impl std::error::Error for ValidationError {}

/// Trim `input` and reject it if nothing remains.
pub fn non_empty(field: &'static str, input: &str) -> Result<String, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ValidationError::Empty(field));
    }
    Ok(input.to_owned())
}

/// A pilot license number: non-empty, upper-cased.
pub fn license_number(input: &str) -> Result<String, ValidationError> {
    non_empty("license number", input).map(|license| license.to_ascii_uppercase())
}

/// Parse a `YYYY-MM-DD` departure date.
pub fn parse_departure_date(input: &str) -> Result<Date, ValidationError> {
    let input = input.trim();
    Date::parse(input, DATE_FORMAT).map_err(|_| ValidationError::DepartureDate(input.to_owned()))
}

/// A human-readable flight number such as `BA123` or `FL-101`.
///
/// Two or three letters or digits (the first a letter), an optional hyphen, then one to four digits.
/// Input is trimmed and upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub struct FlightNumber(String);

impl FlightNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_well_formed(number: &str) -> bool {
        let designator_ok = |designator: &str| {
            designator.starts_with(|c: char| c.is_ascii_uppercase())
                && designator
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        };
        let digits_ok = |digits: &str| {
            (1..=4).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
        };

        // the designator may itself end in a digit (`U2`), so try both lengths
        [2, 3].into_iter().any(|len| {
            let Some((designator, rest)) = number.split_at_checked(len) else {
                return false;
            };
            let digits = rest.strip_prefix('-').unwrap_or(rest);
            designator_ok(designator) && digits_ok(digits)
        })
    }
}

impl FromStr for FlightNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = s.trim().to_ascii_uppercase();
        if number.is_empty() {
            return Err(ValidationError::Empty("flight number"));
        }
        if !Self::is_well_formed(&number) {
            return Err(ValidationError::FlightNumber(number));
        }
        Ok(Self(number))
    }
}

impl ToSql for FlightNumber {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.as_str()))
    }
}

impl FromSql for FlightNumber {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(Self)
    }
}

/// A three-letter IATA airport code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub struct AirportCode(String);

impl AirportCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AirportCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        if code.is_empty() {
            return Err(ValidationError::Empty("airport code"));
        }
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::AirportCode(code));
        }
        Ok(Self(code))
    }
}

impl ToSql for AirportCode {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.as_str()))
    }
}

impl FromSql for AirportCode {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(Self)
    }
}

/// Flight status.
///
/// The well-known statuses are recognised case-insensitively; anything else is kept as typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FlightStatus {
    Scheduled,
    OnTime,
    Delayed,
    Cancelled,
    Other(String),
}

impl FlightStatus {
    pub const KNOWN: [FlightStatus; 4] = [
        FlightStatus::Scheduled,
        FlightStatus::OnTime,
        FlightStatus::Delayed,
        FlightStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::OnTime => "On Time",
            Self::Delayed => "Delayed",
            Self::Cancelled => "Cancelled",
            Self::Other(status) => status,
        }
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlightStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status = non_empty("status", s)?;
        let known = Self::KNOWN
            .into_iter()
            .find(|known| known.as_str().eq_ignore_ascii_case(&status));
        Ok(known.unwrap_or(Self::Other(status)))
    }
}

impl ToSql for FlightStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for FlightStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let status = String::column_result(value)?;
        // an empty status can only come from another writer; keep it verbatim
        Ok(status.parse().unwrap_or(Self::Other(status)))
    }
}
