use crate::aircraft::Aircraft;
use crate::airport::Direction;
use crate::flight::{Flight, FlightStatus};
use crate::registry::FlightRegistry;
use chrono::{NaiveDate, NaiveTime};
use proptest::prelude::*;
use proptest::prop_oneof;
use proptest::strategy::Just;
use std::sync::Arc;

pub fn id(s: &str) -> Arc<str> {
    Arc::from(s)
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

/// A flight that is canceled when `actual` is `None`.
pub fn flight(
    code: &str,
    day: &str,
    scheduled: &str,
    city: &str,
    carrier: &str,
    actual: Option<&str>,
    direction: Direction,
) -> Flight {
    let status = match (actual, direction) {
        (None, _) => FlightStatus::Canceled,
        (Some(_), Direction::Out) => FlightStatus::Departed,
        (Some(_), Direction::In) => FlightStatus::Landed,
    };
    Flight::new(
        date(day),
        time(scheduled),
        code,
        city,
        "SVQ",
        carrier,
        Aircraft::new("A320", "EC-AAA"),
        status,
        actual.map(time),
        direction,
    )
}

pub fn departure(
    code: &str,
    day: &str,
    scheduled: &str,
    city: &str,
    carrier: &str,
    actual: Option<&str>,
) -> Flight {
    flight(code, day, scheduled, city, carrier, actual, Direction::Out)
}

pub fn arrival(
    code: &str,
    day: &str,
    scheduled: &str,
    city: &str,
    carrier: &str,
    actual: Option<&str>,
) -> Flight {
    flight(code, day, scheduled, city, carrier, actual, Direction::In)
}

pub fn with_model(mut flight: Flight, model: &str) -> Flight {
    flight.aircraft.model = id(model);
    flight
}

/// Nine flights over four carriers.
///
/// | code | carrier    | dir | date       | sched | delay |
/// |------|------------|-----|------------|-------|-------|
/// | IB1  | Iberia     | OUT | 2024-01-10 | 08:00 | -10   |
/// | IB2  | Iberia     | OUT | 2024-01-10 | 09:00 | +5    |
/// | IB3  | Iberia     | OUT | 2024-01-11 | 07:00 | canc. |
/// | VY1  | Vueling    | OUT | 2024-01-10 | 08:00 | -30   |
/// | VY2  | Vueling    | IN  | 2024-01-11 | 10:00 | +10   |
/// | UX1  | Air Europa | OUT | 2024-01-12 | 12:00 | -20   |
/// | RY1  | Ryanair    | OUT | 2024-02-05 | 06:15 | 0     |
/// | RY2  | Ryanair    | IN  | 2024-02-05 | 22:40 | +20   |
/// | RY3  | Ryanair    | OUT | 2024-02-06 | 06:00 | -45   |
pub fn sample_registry() -> FlightRegistry {
    vec![
        departure("IB1", "2024-01-10", "08:00", "Madrid", "Iberia", Some("08:10")),
        with_model(
            departure("IB2", "2024-01-10", "09:00", "Paris", "Iberia", Some("08:55")),
            "A321",
        ),
        departure("IB3", "2024-01-11", "07:00", "Madrid", "Iberia", None),
        departure("VY1", "2024-01-10", "08:00", "Madrid", "Vueling", Some("08:30")),
        arrival("VY2", "2024-01-11", "10:00", "Paris", "Vueling", Some("09:50")),
        with_model(
            departure("UX1", "2024-01-12", "12:00", "Lisbon", "Air Europa", Some("12:20")),
            "E195",
        ),
        with_model(
            departure("RY1", "2024-02-05", "06:15", "London", "Ryanair", Some("06:15")),
            "B738",
        ),
        with_model(
            arrival("RY2", "2024-02-05", "22:40", "Rome", "Ryanair", Some("22:20")),
            "B738",
        ),
        with_model(
            departure("RY3", "2024-02-06", "06:00", "Rome", "Ryanair", Some("06:45")),
            "B738",
        ),
    ]
    .into_iter()
    .collect()
}

pub fn codes<'a>(flights: impl IntoIterator<Item = &'a Flight>) -> Vec<String> {
    flights.into_iter().map(|f| f.code.to_string()).collect()
}

pub fn arb_name(prefix: &'static str) -> impl Strategy<Value = Arc<str>> {
    prop_oneof![
        Just(Arc::from(format!("{}_1", prefix))),
        Just(Arc::from(format!("{}_2", prefix))),
        Just(Arc::from(format!("{}_3", prefix))),
    ]
}

pub fn arb_flight() -> impl Strategy<Value = Flight> {
    (
        arb_name("FL"),
        arb_name("CITY"),
        arb_name("CARRIER"),
        1..4u32,
        0..24u32,
        prop_oneof![Just(0u32), Just(30u32)],
        prop::option::of(-90..90i64),
        any::<bool>(),
    )
        .prop_map(|(code, city, carrier, day, hour, minute, offset, outbound)| {
            let scheduled = NaiveTime::from_hms_opt(hour, minute, 0).unwrap();
            let direction = if outbound { Direction::Out } else { Direction::In };
            let (status, actual_time) = match offset {
                Some(minutes) => (
                    FlightStatus::Departed,
                    Some(scheduled.overflowing_add_signed(chrono::TimeDelta::minutes(minutes)).0),
                ),
                None => (FlightStatus::Canceled, None),
            };
            Flight {
                date: NaiveDate::from_ymd_opt(2024, day, 1).unwrap(),
                scheduled_time: scheduled,
                code,
                city,
                airport_code: id("SVQ"),
                carrier,
                aircraft: Aircraft::new("A320", "EC-AAA"),
                status,
                actual_time,
                direction,
            }
        })
}
