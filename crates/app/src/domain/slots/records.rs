//! Slot Records

use despatch::slots::{SlotAvailability, TimeWindow};
use jiff::civil::Date;

use crate::uuids::TypedUuid;

/// Slot UUID
pub type SlotUuid = TypedUuid<SlotRecord>;

/// One persisted `(date, time window)` capacity bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRecord {
    pub uuid: SlotUuid,
    pub delivery_date: Date,
    pub time_window: TimeWindow,
    pub capacity: u32,
    pub reserved_count: u32,
}

impl SlotRecord {
    pub fn availability(&self) -> SlotAvailability {
        SlotAvailability::from_counts(self.capacity, self.reserved_count)
    }
}

/// One window of a listed day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowAvailability {
    pub slot: SlotUuid,
    pub time_window: TimeWindow,
    pub availability: SlotAvailability,
}

/// Every window of one upcoming working day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayAvailability {
    pub date: Date,

    /// Whether the day can currently be chosen for delivery.
    pub selectable: bool,

    pub windows: Vec<WindowAvailability>,
}

impl DayAvailability {
    /// Whether any window on this day still has room.
    pub fn has_room(&self) -> bool {
        self.windows
            .iter()
            .any(|window| window.availability.available)
    }
}
