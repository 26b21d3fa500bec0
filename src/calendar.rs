//! Working-day calendar
//!
//! All date arithmetic for delivery planning goes through [`WorkingCalendar`]. A working day
//! is any day that is neither a Sunday nor a configured bank holiday; Saturdays count.

use std::collections::BTreeSet;

use jiff::{
    Timestamp, ToSpan,
    civil::{Date, Weekday},
    tz::TimeZone,
};
use thiserror::Error;

/// Errors raised by calendar arithmetic.
#[derive(Debug, Error)]
pub enum CalendarError {
    /// Stepping a date fell outside the supported civil date range.
    #[error("date arithmetic out of range: {0}")]
    OutOfRange(#[from] jiff::Error),
}

/// Timezone-aware UK working-day calendar.
#[derive(Debug, Clone)]
pub struct WorkingCalendar {
    time_zone: TimeZone,
    cutoff_hour: i8,
    bank_holidays: BTreeSet<Date>,
}

impl WorkingCalendar {
    /// Create a calendar for the given zone, same-day cutoff hour and bank holidays.
    pub fn new<I>(time_zone: TimeZone, cutoff_hour: i8, bank_holidays: I) -> Self
    where
        I: IntoIterator<Item = Date>,
    {
        Self {
            time_zone,
            cutoff_hour,
            bank_holidays: bank_holidays.into_iter().collect(),
        }
    }

    /// The zone all local dates and hours are computed in.
    pub fn time_zone(&self) -> &TimeZone {
        &self.time_zone
    }

    /// The local hour from which same-day offers move forward a day.
    pub fn cutoff_hour(&self) -> i8 {
        self.cutoff_hour
    }

    /// Whether `date` is neither a Sunday nor a bank holiday.
    pub fn is_working_day(&self, date: Date) -> bool {
        date.weekday() != Weekday::Sunday && !self.bank_holidays.contains(&date)
    }

    /// The local calendar date at `now`.
    pub fn local_date(&self, now: Timestamp) -> Date {
        now.to_zoned(self.time_zone.clone()).date()
    }

    /// Whether the local hour at `now` has reached the cutoff.
    pub fn is_past_cutoff(&self, now: Timestamp) -> bool {
        now.to_zoned(self.time_zone.clone()).hour() >= self.cutoff_hour
    }

    /// The earliest delivery date a customer may pick at `now`.
    ///
    /// Before the cutoff the earliest offer is tomorrow, from the cutoff onwards it is the day
    /// after; either is then rolled forward onto a working day.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::OutOfRange`] if the date cannot be stepped.
    pub fn min_selectable_delivery_date(&self, now: Timestamp) -> Result<Date, CalendarError> {
        let offset: i64 = if self.is_past_cutoff(now) { 2 } else { 1 };
        let earliest = self.local_date(now).checked_add(offset.days())?;

        self.next_working_day_on_or_after(earliest)
    }

    /// Whether `date` is a working day no earlier than the minimum selectable date.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::OutOfRange`] if the date cannot be stepped.
    pub fn is_selectable_delivery_date(
        &self,
        date: Date,
        now: Timestamp,
    ) -> Result<bool, CalendarError> {
        Ok(self.is_working_day(date) && date >= self.min_selectable_delivery_date(now)?)
    }

    /// Step forward `days` working days from `date`.
    ///
    /// With `days == 0` this returns `date` when it is a working day and the next working day
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::OutOfRange`] if the date cannot be stepped.
    pub fn add_working_days(&self, date: Date, days: u32) -> Result<Date, CalendarError> {
        if days == 0 {
            return self.next_working_day_on_or_after(date);
        }

        let mut current = date;
        let mut remaining = days;

        while remaining > 0 {
            current = current.tomorrow()?;

            if self.is_working_day(current) {
                remaining -= 1;
            }
        }

        Ok(current)
    }

    /// Step backward `days` working days from `date`.
    ///
    /// With `days == 0` this returns `date` unchanged, working day or not, so a zero-transit
    /// ship date on a Sunday or bank holiday is caught by [`Self::calculate_ship_date`].
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::OutOfRange`] if the date cannot be stepped.
    pub fn subtract_working_days(&self, date: Date, days: u32) -> Result<Date, CalendarError> {
        if days == 0 {
            return Ok(date);
        }

        let mut current = date;
        let mut remaining = days;

        while remaining > 0 {
            current = current.yesterday()?;

            if self.is_working_day(current) {
                remaining -= 1;
            }
        }

        Ok(current)
    }

    /// Work backwards from a delivery date to the day the parcel must ship.
    ///
    /// Returns `None` when that ship date is already in the past, is today but after the
    /// cutoff, or is not itself a working day.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::OutOfRange`] if the date cannot be stepped.
    pub fn calculate_ship_date(
        &self,
        delivery_date: Date,
        transit_days: u32,
        now: Timestamp,
    ) -> Result<Option<Date>, CalendarError> {
        let ship_date = self.subtract_working_days(delivery_date, transit_days)?;
        let today = self.local_date(now);

        if ship_date < today
            || (ship_date == today && self.is_past_cutoff(now))
            || !self.is_working_day(ship_date)
        {
            return Ok(None);
        }

        Ok(Some(ship_date))
    }

    /// The date a next-day parcel handed over at `now` would arrive, if one can still ship
    /// today.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::OutOfRange`] if the date cannot be stepped.
    pub fn next_day_delivery_date(&self, now: Timestamp) -> Result<Option<Date>, CalendarError> {
        let today = self.local_date(now);

        if self.is_past_cutoff(now) || !self.is_working_day(today) {
            return Ok(None);
        }

        self.add_working_days(today, 1).map(Some)
    }

    /// The next `count` working days after the local date at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::OutOfRange`] if the date cannot be stepped.
    pub fn upcoming_working_days(
        &self,
        now: Timestamp,
        count: usize,
    ) -> Result<Vec<Date>, CalendarError> {
        let mut days = Vec::with_capacity(count);
        let mut current = self.local_date(now);

        while days.len() < count {
            current = current.tomorrow()?;

            if self.is_working_day(current) {
                days.push(current);
            }
        }

        Ok(days)
    }

    fn next_working_day_on_or_after(&self, date: Date) -> Result<Date, CalendarError> {
        let mut current = date;

        while !self.is_working_day(current) {
            current = current.tomorrow()?;
        }

        Ok(current)
    }
}
