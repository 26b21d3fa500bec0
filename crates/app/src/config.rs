//! Delivery configuration
//!
//! A single value handed to every service at construction.

use std::time::Duration;

use despatch::{
    calendar::WorkingCalendar, options::TierPricing, rates::NextDayPolicy, slots::TimeWindow,
};
use jiff::{
    SignedDuration,
    civil::{Date, date},
    tz::TimeZone,
};

use crate::domain::rates::models::{Address, Parcel, RateRequest};

pub mod args;

/// Default delivery time zone.
pub const DEFAULT_TIME_ZONE: &str = "Europe/London";

/// England and Wales bank holidays, 2025 to 2027, including substitute days.
pub const ENGLAND_AND_WALES_BANK_HOLIDAYS: [Date; 24] = [
    date(2025, 1, 1),
    date(2025, 4, 18),
    date(2025, 4, 21),
    date(2025, 5, 5),
    date(2025, 5, 26),
    date(2025, 8, 25),
    date(2025, 12, 25),
    date(2025, 12, 26),
    date(2026, 1, 1),
    date(2026, 4, 3),
    date(2026, 4, 6),
    date(2026, 5, 4),
    date(2026, 5, 25),
    date(2026, 8, 31),
    date(2026, 12, 25),
    date(2026, 12, 28),
    date(2027, 1, 1),
    date(2027, 3, 26),
    date(2027, 3, 29),
    date(2027, 5, 3),
    date(2027, 5, 31),
    date(2027, 8, 30),
    date(2027, 12, 27),
    date(2027, 12, 28),
];

#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// Customer-facing price of each tier, in pence.
    pub pricing: TierPricing,

    /// Capacity given to newly materialised slots.
    pub slot_capacity: u32,

    /// How long a reservation holds its slot before it may be swept.
    pub hold: SignedDuration,

    /// Local hour after which same-day offers move forward a day.
    pub cutoff_hour: i8,

    pub bank_holidays: Vec<Date>,

    pub time_zone: TimeZone,

    /// Working days of slots kept materialised ahead of today.
    pub window_days: usize,

    pub time_windows: Vec<TimeWindow>,

    /// Longest wait for another request's hold on the same slot.
    pub lock_wait: Duration,

    /// Services that may be sold as next day, in priority order.
    pub next_day: NextDayPolicy,

    /// Where parcels are shipped from.
    pub origin: Address,

    /// Parcel quoted when the order does not say otherwise.
    pub parcel: Parcel,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            pricing: TierPricing {
                standard: 399,
                next_day: 799,
                timed: 1_299,
            },
            slot_capacity: 10,
            hold: SignedDuration::from_mins(15),
            cutoff_hour: 16,
            bank_holidays: ENGLAND_AND_WALES_BANK_HOLIDAYS.to_vec(),
            time_zone: TimeZone::get(DEFAULT_TIME_ZONE).unwrap_or(TimeZone::UTC),
            window_days: 14,
            time_windows: TimeWindow::ALL.to_vec(),
            lock_wait: Duration::from_secs(5),
            next_day: NextDayPolicy::default(),
            origin: Address {
                name: Some("Despatch Warehouse".to_string()),
                street1: Some("1 Dock Road".to_string()),
                city: Some("London".to_string()),
                postcode: Some("E16 1AA".to_string()),
                country: Some("GB".to_string()),
            },
            parcel: Parcel::default(),
        }
    }
}

impl DeliveryConfig {
    /// The working-day calendar these settings describe.
    pub fn calendar(&self) -> WorkingCalendar {
        WorkingCalendar::new(
            self.time_zone.clone(),
            self.cutoff_hour,
            self.bank_holidays.iter().copied(),
        )
    }

    /// A quote request for the default parcel from the origin to `to`.
    pub fn rate_request(&self, to: &Address, ship_date: Option<Date>) -> RateRequest {
        RateRequest {
            from: self.origin.clone(),
            to: to.clone(),
            parcel: self.parcel,
            ship_date,
        }
    }
}
