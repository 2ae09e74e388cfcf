//! Window length configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Time unit for a gate window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
}

impl TimeUnit {
    /// Get the duration of one unit.
    pub fn duration(&self) -> Duration {
        match self {
            TimeUnit::Millisecond => Duration::from_millis(1),
            TimeUnit::Second => Duration::from_secs(1),
            TimeUnit::Minute => Duration::from_secs(60),
            TimeUnit::Hour => Duration::from_secs(3600),
            TimeUnit::Day => Duration::from_secs(86400),
        }
    }
}

/// A window length expressed as a magnitude of some unit, e.g. `5 second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    /// The time unit
    #[serde(default = "default_unit")]
    pub unit: TimeUnit,
    /// Number of units per window
    #[serde(default = "default_magnitude")]
    pub magnitude: u32,
}

fn default_unit() -> TimeUnit {
    TimeUnit::Minute
}

fn default_magnitude() -> u32 {
    1
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self {
            unit: default_unit(),
            magnitude: default_magnitude(),
        }
    }
}

impl TimeWindow {
    /// Create a new window of `magnitude` units.
    pub fn new(unit: TimeUnit, magnitude: u32) -> Self {
        Self { unit, magnitude }
    }

    /// A window of exactly one unit.
    pub fn one(unit: TimeUnit) -> Self {
        Self::new(unit, 1)
    }

    /// Get the duration of this window.
    pub fn duration(&self) -> Duration {
        self.unit.duration() * self.magnitude
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.magnitude, self.unit)
    }
}
