pub mod keys;
pub mod registry;
#[cfg(test)]
pub(crate) mod tests;

pub use keys::HourOrder;
pub use registry::FlightRegistry;
