// TimeUnit - exact rational positions and durations in beats
// All scheduling math stays in this integer domain; conversion to wall-clock
// time happens only at the dispatch boundary.

use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sequencer::SequencerError;

/// Number of units in one beat. A unit is the finest subdivision the engine
/// can address (1/256 of a beat).
pub const UNITS_PER_BEAT: u32 = 256;

/// An exact position or duration expressed in beats.
///
/// Stored as a flat count of 1/256-beat units, so equality, ordering and
/// addition are exact integer operations with no floating-point drift.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TimeUnit {
    units: u64,
}

impl TimeUnit {
    /// Creates a time value of `amount / unit` beats.
    ///
    /// `unit` must be a power of two no finer than the engine resolution;
    /// anything else fails with `InvalidTimeUnit`.
    pub fn new(amount: u64, unit: u32) -> Result<Self, SequencerError> {
        if !unit.is_power_of_two() || unit > UNITS_PER_BEAT {
            return Err(SequencerError::InvalidTimeUnit { amount, unit });
        }
        Ok(Self {
            units: amount * (UNITS_PER_BEAT / unit) as u64,
        })
    }

    /// A whole number of beats.
    pub fn beats(amount: u64) -> Self {
        Self {
            units: amount * UNITS_PER_BEAT as u64,
        }
    }

    /// Builds directly from a raw unit count.
    pub fn from_units(units: u64) -> Self {
        Self { units }
    }

    /// Raw unit count (1/256 beats).
    pub fn units(&self) -> u64 {
        self.units
    }

    /// Reduced numerator of the value expressed in beats.
    pub fn amount(&self) -> u64 {
        self.units / gcd(self.units, UNITS_PER_BEAT as u64)
    }

    /// Reduced denominator; always a power of two <= `UNITS_PER_BEAT`.
    pub fn unit(&self) -> u32 {
        (UNITS_PER_BEAT as u64 / gcd(self.units, UNITS_PER_BEAT as u64)) as u32
    }

    pub fn is_zero(&self) -> bool {
        self.units == 0
    }

    /// Milliseconds spanned by this many beats at the given tempo.
    pub fn to_millis(&self, bpm: f64) -> f64 {
        self.units as f64 * 60_000.0 / (UNITS_PER_BEAT as f64 * bpm)
    }

    /// Wall-clock duration at the given tempo.
    pub fn to_duration(&self, bpm: f64) -> Duration {
        Duration::from_secs_f64(self.to_millis(bpm) / 1000.0)
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl Add for TimeUnit {
    type Output = TimeUnit;

    fn add(self, rhs: TimeUnit) -> TimeUnit {
        TimeUnit {
            units: self.units + rhs.units,
        }
    }
}

impl AddAssign for TimeUnit {
    fn add_assign(&mut self, rhs: TimeUnit) {
        self.units += rhs.units;
    }
}

impl Sub for TimeUnit {
    type Output = TimeUnit;

    fn sub(self, rhs: TimeUnit) -> TimeUnit {
        TimeUnit {
            units: self.units - rhs.units,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (amount, unit) = (self.amount(), self.unit());
        if unit == 1 {
            write!(f, "{}", amount)
        } else {
            write!(f, "{}/{}", amount, unit)
        }
    }
}
