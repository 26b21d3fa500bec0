//! Delivery Slots
//!
//! A slot is one bookable `(date, time window)` bucket with an integer capacity.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Raised when a stored time window label is not recognised.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown time window: {0}")]
pub struct UnknownTimeWindow(pub String);

/// The fixed set of delivery windows a day is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeWindow {
    /// 08:00 to 12:00
    Morning,

    /// 12:00 to 16:00
    Afternoon,

    /// 16:00 to 20:00
    Evening,
}

impl TimeWindow {
    /// Every window, in the order they occur during the day.
    pub const ALL: [TimeWindow; 3] = [Self::Morning, Self::Afternoon, Self::Evening];

    /// The `HH:MM-HH:MM` label stored and displayed for this window.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "08:00-12:00",
            Self::Afternoon => "12:00-16:00",
            Self::Evening => "16:00-20:00",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = UnknownTimeWindow;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|window| window.as_str() == value.trim())
            .ok_or_else(|| UnknownTimeWindow(value.to_string()))
    }
}

/// Capacity snapshot of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotAvailability {
    /// Total units that may be reserved.
    pub capacity: u32,

    /// Units currently held by live reservations.
    pub reserved_count: u32,

    /// Units still free, never negative.
    pub remaining: u32,

    /// Whether at least one unit is free.
    pub available: bool,
}

impl SlotAvailability {
    /// Derive remaining capacity from raw counts.
    pub fn from_counts(capacity: u32, reserved_count: u32) -> Self {
        let remaining = capacity.saturating_sub(reserved_count);

        Self {
            capacity,
            reserved_count,
            remaining,
            available: remaining > 0,
        }
    }

    /// Whether every unit has been claimed.
    pub fn is_full(&self) -> bool {
        self.reserved_count >= self.capacity
    }
}
