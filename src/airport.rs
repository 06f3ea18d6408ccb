use std::fmt;
use std::fmt::Formatter;
use std::sync::Arc;
use serde::{Deserialize, Serialize};

pub type AirportCode = Arc<str>;
pub type City = Arc<str>;
pub type Carrier = Arc<str>;

/// Direction of a flight relative to the modeled airport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Arriving at this airport, `city` is the origin.
    In,
    /// Departing from this airport, `city` is the destination.
    Out,
}

impl Direction {
    pub fn is_outbound(&self) -> bool {
        *self == Direction::Out
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "IN"),
            Direction::Out => write!(f, "OUT"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IN" => Ok(Direction::In),
            "OUT" => Ok(Direction::Out),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}
