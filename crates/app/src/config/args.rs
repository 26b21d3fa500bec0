//! Delivery settings from the environment and command line, shared by every binary.

use std::time::Duration;

use clap::Args;
use despatch::options::TierPricing;
use jiff::{SignedDuration, civil::Date, tz::TimeZone};
use thiserror::Error;

use super::{DEFAULT_TIME_ZONE, DeliveryConfig, ENGLAND_AND_WALES_BANK_HOLIDAYS};

/// Errors turning delivery arguments into a [`DeliveryConfig`].
#[derive(Debug, Error)]
pub enum DeliveryConfigError {
    /// The configured time zone is not in the zone database.
    #[error("unknown delivery time zone {name:?}: {source}")]
    TimeZone {
        /// Zone name as configured.
        name: String,

        /// Lookup failure.
        #[source]
        source: jiff::Error,
    },

    /// Slots must hold at least one order.
    #[error("slot capacity must be at least 1")]
    ZeroCapacity,
}

/// Delivery scheduling settings.
#[derive(Debug, Args)]
pub struct DeliveryArgs {
    /// Price of standard delivery in pence
    #[arg(long, env = "STANDARD_PRICE_PENCE", default_value_t = 399)]
    pub standard_price_pence: u32,

    /// Price of next day delivery in pence
    #[arg(long, env = "NEXT_DAY_PRICE_PENCE", default_value_t = 799)]
    pub next_day_price_pence: u32,

    /// Price of timed delivery in pence
    #[arg(long, env = "TIMED_PRICE_PENCE", default_value_t = 1_299)]
    pub timed_price_pence: u32,

    /// Capacity given to newly created slots
    #[arg(long, env = "SLOT_CAPACITY", default_value_t = 10)]
    pub slot_capacity: u32,

    /// Minutes a reservation holds its slot
    #[arg(
        long,
        env = "HOLD_MINUTES",
        default_value_t = 15,
        value_parser = clap::value_parser!(i64).range(1..)
    )]
    pub hold_minutes: i64,

    /// Local hour after which same-day dispatch is closed
    #[arg(
        long,
        env = "CUTOFF_HOUR",
        default_value_t = 16,
        value_parser = clap::value_parser!(i8).range(0..=23)
    )]
    pub cutoff_hour: i8,

    /// Comma separated bank holidays (YYYY-MM-DD); England and Wales dates when empty
    #[arg(long, env = "BANK_HOLIDAYS", value_delimiter = ',')]
    pub bank_holidays: Vec<Date>,

    /// IANA time zone deliveries are scheduled in
    #[arg(long, env = "DELIVERY_TIMEZONE", default_value = DEFAULT_TIME_ZONE)]
    pub delivery_timezone: String,

    /// Working days of slots offered ahead of today
    #[arg(long, env = "SLOT_WINDOW_DAYS", default_value_t = 14)]
    pub slot_window_days: usize,

    /// Longest wait in milliseconds for a busy slot
    #[arg(long, env = "SLOT_LOCK_WAIT_MS", default_value_t = 5_000)]
    pub slot_lock_wait_ms: u64,
}

impl DeliveryArgs {
    /// Build the delivery settings shared by every service.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown time zone or a zero slot capacity.
    pub fn to_delivery_config(&self) -> Result<DeliveryConfig, DeliveryConfigError> {
        if self.slot_capacity == 0 {
            return Err(DeliveryConfigError::ZeroCapacity);
        }

        let time_zone = TimeZone::get(&self.delivery_timezone).map_err(|source| {
            DeliveryConfigError::TimeZone {
                name: self.delivery_timezone.clone(),
                source,
            }
        })?;

        let bank_holidays = if self.bank_holidays.is_empty() {
            ENGLAND_AND_WALES_BANK_HOLIDAYS.to_vec()
        } else {
            self.bank_holidays.clone()
        };

        Ok(DeliveryConfig {
            pricing: TierPricing {
                standard: self.standard_price_pence,
                next_day: self.next_day_price_pence,
                timed: self.timed_price_pence,
            },
            slot_capacity: self.slot_capacity,
            hold: SignedDuration::from_mins(self.hold_minutes),
            cutoff_hour: self.cutoff_hour,
            bank_holidays,
            time_zone,
            window_days: self.slot_window_days,
            lock_wait: Duration::from_millis(self.slot_lock_wait_ms),
            ..DeliveryConfig::default()
        })
    }
}
