use crate::aircraft::Aircraft;
use crate::airport::{AirportCode, Carrier, City, Direction};
use crate::delay::minutes_between;
use crate::error::QueryError;
use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

pub type FlightId = Arc<str>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightStatus {
    Scheduled,
    Departed,
    Landed,
    Delayed,
    #[serde(alias = "CANCELLED")]
    Canceled,
}

impl FlightStatus {
    pub fn is_canceled(&self) -> bool {
        *self == FlightStatus::Canceled
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlightStatus::Scheduled => "SCHEDULED",
            FlightStatus::Departed => "DEPARTED",
            FlightStatus::Landed => "LANDED",
            FlightStatus::Delayed => "DELAYED",
            FlightStatus::Canceled => "CANCELED",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for FlightStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SCHEDULED" => Ok(FlightStatus::Scheduled),
            "DEPARTED" => Ok(FlightStatus::Departed),
            "LANDED" => Ok(FlightStatus::Landed),
            "DELAYED" => Ok(FlightStatus::Delayed),
            "CANCELED" | "CANCELLED" => Ok(FlightStatus::Canceled),
            other => Err(format!("unknown flight status '{}'", other)),
        }
    }
}

/// Identity of a flight: `(date, scheduled_time, code)`.
///
/// The derived ordering is the natural order of flights.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlightKey(pub NaiveDate, pub NaiveTime, pub FlightId);

/// One flight operating at the airport.
///
/// Equality, hashing and ordering only look at [`FlightKey`]; every other
/// field can change without affecting where the flight sorts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub code: FlightId,
    /// The other endpoint of the route.
    pub city: City,
    pub airport_code: AirportCode,
    pub carrier: Carrier,
    pub aircraft: Aircraft,
    pub status: FlightStatus,
    /// Ignored when the flight is canceled.
    pub actual_time: Option<NaiveTime>,
    pub direction: Direction,
}

impl Flight {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: NaiveDate,
        scheduled_time: NaiveTime,
        code: &str,
        city: &str,
        airport_code: &str,
        carrier: &str,
        aircraft: Aircraft,
        status: FlightStatus,
        actual_time: Option<NaiveTime>,
        direction: Direction,
    ) -> Flight {
        Flight {
            date,
            scheduled_time,
            code: Arc::from(code),
            city: Arc::from(city),
            airport_code: Arc::from(airport_code),
            carrier: Arc::from(carrier),
            aircraft,
            status,
            actual_time,
            direction,
        }
    }

    pub fn key(&self) -> FlightKey {
        FlightKey(self.date, self.scheduled_time, self.code.clone())
    }

    /// `scheduled - actual` in minutes; `None` for canceled flights or when
    /// no actual time was recorded.
    pub fn delay_minutes(&self) -> Option<i64> {
        if self.status.is_canceled() {
            return None;
        }
        self.actual_time
            .map(|actual| minutes_between(actual, self.scheduled_time))
    }

    pub fn try_delay_minutes(&self) -> Result<i64, QueryError> {
        self.delay_minutes().ok_or_else(|| QueryError::UndefinedDelay {
            code: self.code.clone(),
        })
    }

    pub fn scheduled_hour(&self) -> u32 {
        self.scheduled_time.hour()
    }

    pub fn is_outbound(&self) -> bool {
        self.direction.is_outbound()
    }

    pub fn is_outbound_to(&self, city: &str) -> bool {
        self.is_outbound() && *self.city == *city
    }

    pub fn is_operated_by(&self, carrier: &str) -> bool {
        *self.carrier == *carrier
    }
}

impl PartialEq for Flight {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
            && self.date == other.date
            && self.scheduled_time == other.scheduled_time
    }
}

impl Eq for Flight {}

impl Hash for Flight {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
        self.date.hash(state);
        self.scheduled_time.hash(state);
    }
}

impl Ord for Flight {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date
            .cmp(&other.date)
            .then_with(|| self.scheduled_time.cmp(&other.scheduled_time))
            .then_with(|| self.code.cmp(&other.code))
    }
}

impl PartialOrd for Flight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Flight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.code,
            self.date,
            self.scheduled_time.format("%H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn flight(code: &str, date: (i32, u32, u32), time: (u32, u32), city: &str) -> Flight {
        Flight::new(
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            NaiveTime::from_hms_opt(time.0, time.1, 0).unwrap(),
            code,
            city,
            "SVQ",
            "Iberia",
            Aircraft::new("A320", "EC-ABC"),
            FlightStatus::Landed,
            NaiveTime::from_hms_opt(time.0, time.1, 0),
            Direction::Out,
        )
    }

    #[test]
    fn test_equality_ignores_non_key_fields() {
        let a = flight("IB100", (2024, 1, 10), (8, 0), "Madrid");
        let mut b = a.clone();
        b.city = Arc::from("Paris");
        b.status = FlightStatus::Canceled;
        b.carrier = Arc::from("Vueling");
        assert_eq!(a, b);
        assert_eq!(Ordering::Equal, a.cmp(&b));

        let mut set = HashSet::new();
        set.insert(a);
        assert!(!set.insert(b));
    }

    #[test]
    fn test_natural_order() {
        let early_day = flight("ZZ1", (2024, 1, 9), (23, 0), "Madrid");
        let early_time = flight("ZZ1", (2024, 1, 10), (7, 0), "Madrid");
        let code_a = flight("AA1", (2024, 1, 10), (8, 0), "Madrid");
        let code_b = flight("BB1", (2024, 1, 10), (8, 0), "Madrid");

        let mut flights = vec![code_b.clone(), code_a.clone(), early_time.clone(), early_day.clone()];
        flights.sort();
        assert_eq!(vec![early_day, early_time, code_a, code_b], flights);
    }

    #[test]
    fn test_key_matches_order() {
        let a = flight("AA1", (2024, 1, 10), (8, 0), "Madrid");
        let b = flight("BB1", (2024, 1, 10), (8, 0), "Madrid");
        assert_eq!(a.cmp(&b), a.key().cmp(&b.key()));
    }

    #[test]
    fn test_canceled_has_no_delay() {
        let mut f = flight("IB100", (2024, 1, 10), (8, 0), "Madrid");
        f.actual_time = NaiveTime::from_hms_opt(8, 30, 0);
        assert_eq!(Some(-30), f.delay_minutes());

        f.status = FlightStatus::Canceled;
        assert_eq!(None, f.delay_minutes());
        assert_eq!(
            Err(QueryError::UndefinedDelay { code: Arc::from("IB100") }),
            f.try_delay_minutes()
        );
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(Ok(FlightStatus::Canceled), "cancelled".parse());
        assert_eq!(Ok(FlightStatus::Canceled), " CANCELED ".parse());
        assert!("BOARDING".parse::<FlightStatus>().is_err());
    }

    #[test]
    fn test_display() {
        let f = flight("IB100", (2024, 1, 10), (8, 5), "Madrid");
        assert_eq!("IB100 2024-01-10 08:05", f.to_string());
        assert_eq!(8, f.scheduled_hour());
    }
}
