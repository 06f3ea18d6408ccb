use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub type AircraftId = Arc<str>;
pub type AircraftModel = Arc<str>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Aircraft {
    pub model: AircraftModel,
    /// Tail number.
    pub id: AircraftId,
}

impl Aircraft {
    pub fn new(model: &str, id: &str) -> Aircraft {
        Aircraft {
            model: Arc::from(model),
            id: Arc::from(id),
        }
    }
}

impl fmt::Display for Aircraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.model, self.id)
    }
}
