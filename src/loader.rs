//! Reads flights from CSV exports or JSON snapshots.
//!
//! CSV files carry a header row with the columns
//! `date,scheduled_time,code,city,airport_code,carrier,aircraft_model,aircraft_id,status,actual_time,direction`.
//! Dates are `YYYY-MM-DD`, times `HH:MM` or `HH:MM:SS`. `actual_time` may be
//! empty only for canceled flights.

use crate::aircraft::Aircraft;
use crate::airport::Direction;
use crate::delay::DelayConvention;
use crate::flight::{Flight, FlightStatus};
use crate::registry::FlightRegistry;
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::io::{self, Read};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid flight record at line {line}: {message}")]
    InvalidRecord { line: u64, message: String },
}

#[derive(Debug, Deserialize)]
struct RawFlight {
    date: String,
    scheduled_time: String,
    code: String,
    city: String,
    airport_code: String,
    carrier: String,
    aircraft_model: String,
    aircraft_id: String,
    status: String,
    actual_time: Option<String>,
    direction: String,
}

impl RawFlight {
    fn into_flight(self) -> Result<Flight, String> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|e| format!("bad date '{}': {}", self.date, e))?;
        let scheduled_time = parse_time(&self.scheduled_time)?;
        let status = self.status.parse::<FlightStatus>()?;
        let direction = self.direction.parse::<Direction>()?;
        let actual_time = match self.actual_time.as_deref().map(str::trim) {
            None | Some("") if status.is_canceled() => None,
            None | Some("") => return Err(missing_actual_time(&self.code, &status)),
            Some(s) => Some(parse_time(s)?),
        };

        Ok(Flight::new(
            date,
            scheduled_time,
            &self.code,
            &self.city,
            &self.airport_code,
            &self.carrier,
            Aircraft::new(&self.aircraft_model, &self.aircraft_id),
            status,
            actual_time,
            direction,
        ))
    }
}

fn missing_actual_time(code: &str, status: &FlightStatus) -> String {
    format!("flight {} is {} but has no actual time", code, status)
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|e| format!("bad time '{}': {}", s, e))
}

pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Flight>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut flights = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let raw: RawFlight = record.deserialize(Some(&headers))?;
        let flight = raw
            .into_flight()
            .map_err(|message| LoadError::InvalidRecord { line, message })?;
        flights.push(flight);
    }
    Ok(flights)
}

/// Reads a JSON array of flights. For rejected entries, `line` is the
/// 1-based position in the array.
pub fn read_json(data: &str) -> Result<Vec<Flight>, LoadError> {
    let flights: Vec<Flight> = serde_json::from_str(data)?;
    if let Some((index, flight)) = flights
        .iter()
        .enumerate()
        .find(|(_, f)| f.actual_time.is_none() && !f.status.is_canceled())
    {
        return Err(LoadError::InvalidRecord {
            line: index as u64 + 1,
            message: missing_actual_time(&flight.code, &flight.status),
        });
    }
    Ok(flights)
}

/// Builds a registry from `.json` snapshots or CSV files (any other extension).
pub fn load_from_file(path: &Path, convention: DelayConvention) -> Result<FlightRegistry, LoadError> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let flights = if is_json {
        read_json(&std::fs::read_to_string(path)?)?
    } else {
        read_csv(std::fs::File::open(path)?)?
    };

    let read = flights.len();
    let mut registry = FlightRegistry::new().with_convention(convention);
    registry.extend(flights);
    if registry.len() < read {
        warn!(
            duplicates = read - registry.len(),
            "collapsed flights sharing code, date and scheduled time"
        );
    }
    info!(path = %path.display(), flights = registry.len(), %convention, "loaded flights");
    Ok(registry)
}
