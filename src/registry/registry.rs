use crate::aircraft::AircraftModel;
use crate::airport::{Carrier, City};
use crate::delay::{DelayConvention, DelaySide};
use crate::error::QueryError;
use crate::flight::{Flight, FlightKey};
use crate::registry::keys::{self, HourOrder};
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tracing::debug;

/// The flights operating at one airport, deduplicated and kept in natural
/// order.
///
/// Queries borrow the registry immutably and hand back owned values, so a
/// result never aliases the stored flights.
#[derive(Debug, Clone, Default)]
pub struct FlightRegistry {
    flights: BTreeMap<FlightKey, Flight>,
    convention: DelayConvention,
}

impl FlightRegistry {
    pub fn new() -> FlightRegistry {
        FlightRegistry::default()
    }

    pub fn with_convention(mut self, convention: DelayConvention) -> FlightRegistry {
        self.convention = convention;
        self
    }

    pub fn convention(&self) -> DelayConvention {
        self.convention
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// Read-only view in natural order.
    pub fn iter(&self) -> impl Iterator<Item = &Flight> {
        self.flights.values()
    }

    /// Snapshot of every stored flight.
    pub fn flights(&self) -> BTreeSet<Flight> {
        self.flights.values().cloned().collect()
    }

    /// Inserts `flight` unless an equal flight is already stored. Returns
    /// whether the registry changed.
    pub fn add_flight(&mut self, flight: Flight) -> bool {
        let inserted = match self.flights.entry(flight.key()) {
            Entry::Occupied(_) => {
                debug!(flight = %flight, "ignoring duplicate flight");
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(flight);
                true
            }
        };
        self.assert_invariants();
        inserted
    }

    /// Reroutes every outbound flight to `from` so that it goes to `to`.
    /// Inbound flights from `from` are left alone. Returns the number of
    /// flights rerouted.
    pub fn divert_flights(&mut self, from: &str, to: &str) -> usize {
        let to: City = Arc::from(to);
        let mut diverted = 0;
        self.flights
            .values_mut()
            .filter(|f| f.is_outbound_to(from))
            .for_each(|f| {
                f.city = to.clone();
                diverted += 1;
            });
        debug!(from, to = %to, diverted, "diverted outbound flights");
        self.assert_invariants();
        diverted
    }

    // Non-canceled flights whose delay lies on the side a query filters on.
    fn qualifying(&self, literal: DelaySide) -> impl Iterator<Item = (&Flight, i64)> {
        let side = self.convention.side(literal);
        self.flights.values().filter_map(move |f| {
            f.delay_minutes()
                .filter(|minutes| side.holds(*minutes))
                .map(|minutes| (f, minutes))
        })
    }

    fn outbound(&self) -> impl Iterator<Item = &Flight> {
        self.flights.values().filter(|f| f.is_outbound())
    }

    pub fn has_flight_to(&self, city: &str) -> bool {
        self.flights.values().any(|f| f.is_outbound_to(city))
    }

    pub fn count_outbound(&self) -> usize {
        self.outbound().count()
    }

    pub fn count_to(&self, city: &str) -> usize {
        self.flights
            .values()
            .filter(|f| f.is_outbound_to(city))
            .count()
    }

    pub fn count_canceled(&self) -> usize {
        self.flights
            .values()
            .filter(|f| f.status.is_canceled())
            .count()
    }

    pub fn count_by_carrier(&self, carrier: &str) -> usize {
        self.flights
            .values()
            .filter(|f| f.is_operated_by(carrier))
            .count()
    }

    /// Literal convention: flights that operated ahead of schedule.
    pub fn count_delayed(&self) -> usize {
        self.qualifying(DelaySide::Ahead).count()
    }

    /// Literal convention: every flight of `carrier` has `delay <= 0`.
    /// Canceled flights are skipped; an unknown carrier yields `true`.
    pub fn all_on_time_or_early(&self, carrier: &str) -> bool {
        let side = self.convention.side(DelaySide::Ahead);
        self.flights
            .values()
            .filter(|f| f.is_operated_by(carrier))
            .filter_map(|f| f.delay_minutes())
            .all(|minutes| !side.holds(minutes))
    }

    pub fn distinct_carriers(&self) -> BTreeSet<Carrier> {
        self.flights.values().map(|f| f.carrier.clone()).collect()
    }

    pub fn distinct_aircraft_models_of(&self, carrier: &str) -> BTreeSet<AircraftModel> {
        self.flights
            .values()
            .filter(|f| f.is_operated_by(carrier))
            .map(|f| f.aircraft.model.clone())
            .collect()
    }

    pub fn count_distinct_destination_cities(&self) -> usize {
        self.outbound()
            .map(|f| &f.city)
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn weekdays_with_departure_to(&self, city: &str) -> HashSet<Weekday> {
        self.flights
            .values()
            .filter(|f| f.is_outbound_to(city))
            .map(|f| f.date.weekday())
            .collect()
    }

    pub fn flights_by_city(&self) -> BTreeMap<City, Vec<Flight>> {
        let mut by_city = BTreeMap::<City, Vec<Flight>>::new();
        self.flights.values().for_each(|f| {
            by_city.entry(f.city.clone()).or_default().push(f.clone())
        });
        by_city
    }

    pub fn flights_by_date(&self) -> BTreeMap<NaiveDate, Vec<Flight>> {
        let mut by_date = BTreeMap::<NaiveDate, Vec<Flight>>::new();
        self.flights
            .values()
            .for_each(|f| by_date.entry(f.date).or_default().push(f.clone()));
        by_date
    }

    pub fn aircraft_models_by_carrier(&self) -> BTreeMap<Carrier, BTreeSet<AircraftModel>> {
        let mut models = BTreeMap::<Carrier, BTreeSet<AircraftModel>>::new();
        self.flights.values().for_each(|f| {
            models
                .entry(f.carrier.clone())
                .or_default()
                .insert(f.aircraft.model.clone());
        });
        models
    }

    /// Flights in either direction per city.
    pub fn flight_count_by_city(&self) -> BTreeMap<City, usize> {
        let mut counts = BTreeMap::<City, usize>::new();
        self.flights
            .values()
            .for_each(|f| *counts.entry(f.city.clone()).or_default() += 1);
        counts
    }

    /// Flights behind schedule per carrier. Every carrier is present, with
    /// zero when none of its flights qualifies.
    pub fn delayed_count_by_carrier(&self) -> BTreeMap<Carrier, usize> {
        let side = self.convention.side(DelaySide::Behind);
        let mut counts = BTreeMap::<Carrier, usize>::new();
        self.flights.values().for_each(|f| {
            let count = counts.entry(f.carrier.clone()).or_default();
            if f.delay_minutes().is_some_and(|minutes| side.holds(minutes)) {
                *count += 1;
            }
        });
        counts
    }

    /// Literal convention: sums the delays of flights ahead of schedule.
    pub fn accumulated_delay_by_carrier(&self) -> BTreeMap<Carrier, i64> {
        let mut totals = BTreeMap::<Carrier, i64>::new();
        self.qualifying(DelaySide::Ahead)
            .for_each(|(f, minutes)| *totals.entry(f.carrier.clone()).or_default() += minutes);
        totals
    }

    /// Literal convention: averages the delays of flights ahead of schedule.
    pub fn average_delay_by_carrier(&self) -> BTreeMap<Carrier, f64> {
        let mut totals = BTreeMap::<Carrier, (i64, usize)>::new();
        self.qualifying(DelaySide::Ahead).for_each(|(f, minutes)| {
            let (sum, count) = totals.entry(f.carrier.clone()).or_default();
            *sum += minutes;
            *count += 1;
        });
        totals
            .into_iter()
            .map(|(carrier, (sum, count))| (carrier, sum as f64 / count as f64))
            .collect()
    }

    /// For each carrier, the qualifying flight with the smallest delay.
    ///
    /// # Errors
    ///
    /// [`QueryError::NoQualifyingFlight`] for the first carrier (by name)
    /// that has no qualifying flight.
    pub fn worst_delay_by_carrier(&self) -> Result<BTreeMap<Carrier, Flight>, QueryError> {
        let side = self.convention.side(DelaySide::Ahead);
        let mut by_carrier = BTreeMap::<Carrier, Vec<&Flight>>::new();
        self.flights
            .values()
            .for_each(|f| by_carrier.entry(f.carrier.clone()).or_default().push(f));

        by_carrier
            .into_iter()
            .map(|(carrier, flights)| {
                let worst = flights
                    .into_iter()
                    .filter(|f| f.delay_minutes().is_some_and(|minutes| side.holds(minutes)))
                    .min_by(|a, b| keys::delay_then_natural(a, b));
                match worst {
                    Some(flight) => Ok((carrier, flight.clone())),
                    None => Err(QueryError::NoQualifyingFlight { carrier }),
                }
            })
            .collect()
    }

    /// For each city with arrivals, the qualifying arrival scheduled
    /// earliest in the day.
    ///
    /// # Errors
    ///
    /// [`QueryError::NoQualifyingArrival`] for the first city (by name)
    /// whose arrivals all fail the delay filter.
    pub fn earliest_inbound_by_city(&self) -> Result<BTreeMap<City, Flight>, QueryError> {
        let side = self.convention.side(DelaySide::Ahead);
        let mut by_city = BTreeMap::<City, Vec<&Flight>>::new();
        self.flights
            .values()
            .filter(|f| !f.is_outbound())
            .for_each(|f| by_city.entry(f.city.clone()).or_default().push(f));

        by_city
            .into_iter()
            .map(|(city, flights)| {
                let earliest = flights
                    .into_iter()
                    .filter(|f| f.delay_minutes().is_some_and(|minutes| side.holds(minutes)))
                    .min_by(|a, b| keys::scheduled_then_natural(a, b));
                match earliest {
                    Some(flight) => Ok((city, flight.clone())),
                    None => Err(QueryError::NoQualifyingArrival { city }),
                }
            })
            .collect()
    }

    /// Share of each carrier in the flights behind schedule, in percent.
    pub fn delay_percentage_by_carrier(&self) -> BTreeMap<Carrier, f64> {
        let mut counts = BTreeMap::<Carrier, usize>::new();
        self.qualifying(DelaySide::Behind)
            .for_each(|(f, _)| *counts.entry(f.carrier.clone()).or_default() += 1);
        let total: usize = counts.values().sum();
        counts
            .into_iter()
            .map(|(carrier, count)| (carrier, count as f64 / total as f64 * 100.0))
            .collect()
    }

    /// Distinct destinations per month number (1 = January).
    pub fn monthly_distinct_destination_counts(&self) -> BTreeMap<u32, usize> {
        let mut cities = BTreeMap::<u32, HashSet<&City>>::new();
        self.outbound()
            .for_each(|f| {
                cities.entry(f.date.month()).or_default().insert(&f.city);
            });
        cities
            .into_iter()
            .map(|(month, cities)| (month, cities.len()))
            .collect()
    }

    /// The flight furthest behind schedule.
    pub fn worst_delay(&self) -> Option<Flight> {
        self.qualifying(DelaySide::Behind)
            .map(|(f, _)| f)
            .min_by(|a, b| keys::delay_then_natural(a, b))
            .cloned()
    }

    pub fn earliest_departure_to(&self, city: &str) -> Result<Flight, QueryError> {
        self.flights
            .values()
            .filter(|f| f.is_outbound_to(city))
            .min_by(|a, b| keys::scheduled_then_natural(a, b))
            .cloned()
            .ok_or_else(|| QueryError::NoDepartureTo(Arc::from(city)))
    }

    pub fn first_flight_of(&self, carrier: &str) -> Result<Flight, QueryError> {
        self.flights
            .values()
            .filter(|f| f.is_operated_by(carrier))
            .min_by(|a, b| keys::scheduled_then_natural(a, b))
            .cloned()
            .ok_or_else(|| QueryError::UnknownCarrier(Arc::from(carrier)))
    }

    /// Destinations of the first `n` departures by date and time.
    pub fn first_n_destinations(&self, n: usize) -> Vec<City> {
        let mut departures = self.outbound().collect::<Vec<_>>();
        departures.sort_by_key(|f| keys::departure_instant(f));
        departures
            .into_iter()
            .take(n)
            .map(|f| f.city.clone())
            .collect()
    }

    pub fn first_n_cities_per_date(&self, n: usize) -> BTreeMap<NaiveDate, Vec<City>> {
        let mut by_date = BTreeMap::<NaiveDate, Vec<&Flight>>::new();
        self.outbound()
            .for_each(|f| by_date.entry(f.date).or_default().push(f));
        by_date
            .into_iter()
            .map(|(date, mut flights)| {
                flights.sort_by(|a, b| keys::scheduled_then_natural(a, b));
                let cities = flights.into_iter().take(n).map(|f| f.city.clone()).collect();
                (date, cities)
            })
            .collect()
    }

    /// Departures per hour of day.
    pub fn departure_count_by_hour(&self, order: HourOrder) -> Vec<(u32, usize)> {
        let mut counts = BTreeMap::<u32, usize>::new();
        self.outbound()
            .for_each(|f| *counts.entry(f.scheduled_hour()).or_default() += 1);
        let mut hours = counts.into_iter().collect::<Vec<_>>();
        if order == HourOrder::Descending {
            hours.reverse();
        }
        hours
    }

    /// The carrier with the second most flights. Carriers with equal counts
    /// rank by name.
    pub fn second_most_active_carrier(&self) -> Result<Carrier, QueryError> {
        let mut counts = BTreeMap::<Carrier, usize>::new();
        self.flights
            .values()
            .for_each(|f| *counts.entry(f.carrier.clone()).or_default() += 1);
        let found = counts.len();
        keys::rank_by_count_desc(counts)
            .into_iter()
            .nth(1)
            .map(|(carrier, _)| carrier)
            .ok_or(QueryError::NotEnoughCarriers { found })
    }

    /// Sum of the behind-schedule delays of one carrier, as a negative
    /// number of minutes.
    pub fn accumulated_delay_of(&self, carrier: &str) -> i64 {
        self.qualifying(DelaySide::Behind)
            .filter(|(f, _)| f.is_operated_by(carrier))
            .map(|(_, minutes)| minutes)
            .sum()
    }

    /// Mean delay of the non-canceled departures to `city`, on either side
    /// of zero.
    pub fn average_delay_to(&self, city: &str) -> Result<f64, QueryError> {
        let delays = self
            .flights
            .values()
            .filter(|f| f.is_outbound_to(city))
            .filter_map(|f| f.delay_minutes())
            .collect::<Vec<_>>();
        if delays.is_empty() {
            return Err(QueryError::NoDepartureTo(Arc::from(city)));
        }
        Ok(delays.iter().sum::<i64>() as f64 / delays.len() as f64)
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.flights.iter().all(|(key, f)| *key == f.key()),
            "Stored key <-> flight identity invariant violated"
        );
    }
}

impl FromIterator<Flight> for FlightRegistry {
    fn from_iter<I: IntoIterator<Item = Flight>>(iter: I) -> Self {
        let mut registry = FlightRegistry::new();
        registry.extend(iter);
        registry
    }
}

impl Extend<Flight> for FlightRegistry {
    fn extend<I: IntoIterator<Item = Flight>>(&mut self, iter: I) {
        iter.into_iter().for_each(|f| {
            self.add_flight(f);
        });
    }
}

impl From<BTreeSet<Flight>> for FlightRegistry {
    fn from(flights: BTreeSet<Flight>) -> Self {
        flights.into_iter().collect()
    }
}
