//! Ordering keys and tie-break rules shared by the ranking queries.
//!
//! Every comparator falls back to the natural order of flights, so the
//! result of a `min_by`/`sort_by` never depends on iteration order.

use crate::flight::Flight;
use chrono::{NaiveDate, NaiveTime};
use std::cmp::{Ordering, Reverse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HourOrder {
    Ascending,
    Descending,
}

/// Earlier scheduled time of day first, regardless of date.
pub fn scheduled_then_natural(a: &Flight, b: &Flight) -> Ordering {
    a.scheduled_time
        .cmp(&b.scheduled_time)
        .then_with(|| a.cmp(b))
}

/// Smallest delay first. Flights without a delay sort after all others.
pub fn delay_then_natural(a: &Flight, b: &Flight) -> Ordering {
    match (a.delay_minutes(), b.delay_minutes()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.cmp(b))
}

pub fn departure_instant(flight: &Flight) -> (NaiveDate, NaiveTime) {
    (flight.date, flight.scheduled_time)
}

/// Sorts `(name, count)` pairs by count, highest first. Equal counts keep
/// their input order.
pub fn rank_by_count_desc<K>(counts: impl IntoIterator<Item = (K, usize)>) -> Vec<(K, usize)> {
    let mut ranked: Vec<(K, usize)> = counts.into_iter().collect();
    ranked.sort_by_key(|(_, count)| Reverse(*count));
    ranked
}
