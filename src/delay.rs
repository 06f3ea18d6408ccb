//! Delay arithmetic and the sign predicates the registry filters on.
//!
//! A delay is `scheduled - actual` in whole minutes: positive when a flight
//! ran ahead of schedule, negative when it ran behind. Several registry
//! queries historically filter on the "ahead" side while reporting "delayed"
//! flights. [`DelayConvention::Literal`] keeps that behaviour so existing
//! outputs stay reproducible; [`DelayConvention::Corrected`] is the labeled
//! alternative where every "delayed" filter means behind schedule.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whole minutes from `actual` to `scheduled`, truncated toward zero.
/// Both times are taken to be on the same day.
pub fn minutes_between(actual: NaiveTime, scheduled: NaiveTime) -> i64 {
    scheduled.signed_duration_since(actual).num_minutes()
}

/// A side of zero on the delay axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelaySide {
    /// `delay > 0`, the flight operated before its scheduled time.
    Ahead,
    /// `delay < 0`, the flight operated after its scheduled time.
    Behind,
}

impl DelaySide {
    pub fn holds(self, minutes: i64) -> bool {
        match self {
            DelaySide::Ahead => minutes > 0,
            DelaySide::Behind => minutes < 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DelayConvention {
    /// Each query filters on the side it always has, inverted or not.
    #[default]
    Literal,
    /// Every "delayed" filter is [`DelaySide::Behind`].
    Corrected,
}

impl DelayConvention {
    /// Resolves the side a query filters on, given the side it uses literally.
    pub fn side(self, literal: DelaySide) -> DelaySide {
        match self {
            DelayConvention::Literal => literal,
            DelayConvention::Corrected => DelaySide::Behind,
        }
    }
}

impl fmt::Display for DelayConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelayConvention::Literal => write!(f, "literal"),
            DelayConvention::Corrected => write!(f, "corrected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_behind_schedule_is_negative() {
        assert_eq!(-10, minutes_between(hm(8, 10), hm(8, 0)));
        assert_eq!(5, minutes_between(hm(8, 55), hm(9, 0)));
        assert_eq!(0, minutes_between(hm(12, 0), hm(12, 0)));
    }

    #[test]
    fn test_partial_minutes_truncate_toward_zero() {
        let actual = NaiveTime::from_hms_opt(8, 0, 59).unwrap();
        assert_eq!(0, minutes_between(actual, hm(8, 0)));
        let actual = NaiveTime::from_hms_opt(7, 58, 30).unwrap();
        assert_eq!(1, minutes_between(actual, hm(8, 0)));
    }

    #[test]
    fn test_no_wrap_around_midnight() {
        assert_eq!(-1430, minutes_between(hm(23, 50), hm(0, 0)));
    }

    #[test]
    fn test_sides() {
        assert!(DelaySide::Ahead.holds(1));
        assert!(!DelaySide::Ahead.holds(0));
        assert!(DelaySide::Behind.holds(-1));
        assert!(!DelaySide::Behind.holds(0));
    }

    #[test]
    fn test_corrected_always_behind() {
        assert_eq!(DelaySide::Ahead, DelayConvention::Literal.side(DelaySide::Ahead));
        assert_eq!(DelaySide::Behind, DelayConvention::Corrected.side(DelaySide::Ahead));
        assert_eq!(DelaySide::Behind, DelayConvention::Corrected.side(DelaySide::Behind));
    }
}
