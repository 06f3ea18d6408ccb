use crate::airport::{Carrier, City};
use crate::flight::FlightId;

/// Failures of registry queries that need at least one matching flight.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("no outbound flight to {0}")]
    NoDepartureTo(City),
    #[error("no flight operated by {0}")]
    UnknownCarrier(Carrier),
    #[error("carrier {carrier} has no flight matching the delay filter")]
    NoQualifyingFlight { carrier: Carrier },
    #[error("no arrival from {city} matches the delay filter")]
    NoQualifyingArrival { city: City },
    #[error("at least two carriers are required, found {found}")]
    NotEnoughCarriers { found: usize },
    #[error("flight {code} has no defined delay")]
    UndefinedDelay { code: FlightId },
}

impl QueryError {
    pub fn is_not_found(&self) -> bool {
        !matches!(self, QueryError::UndefinedDelay { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_undefined_delay_is_not_a_lookup_miss() {
        assert!(QueryError::UnknownCarrier(Arc::from("Iberia")).is_not_found());
        assert!(QueryError::NotEnoughCarriers { found: 1 }.is_not_found());
        assert!(!QueryError::UndefinedDelay { code: Arc::from("IB1") }.is_not_found());
    }
}
