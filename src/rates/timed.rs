//! Timed-delivery qualification
//!
//! A rate qualifies for a delivery date when a feasible ship date exists for it and shipping
//! on that date lands the parcel no later than the date the customer chose.

use jiff::{Timestamp, civil::Date};

use crate::{
    calendar::{CalendarError, WorkingCalendar},
    rates::CarrierRate,
};

const ONE_DAY_NAME_HINTS: [&str; 4] = ["next day", "24", "1st class", "first class"];
const TWO_DAY_NAME_HINTS: [&str; 4] = ["48", "second class", "2nd class", "two day"];

/// A carrier rate that can meet a specific delivery date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifyingRate {
    /// The underlying quote.
    pub rate: CarrierRate,

    /// Working days in transit, stated or inferred from the service name.
    pub transit_days: u32,

    /// The day the parcel must be handed to the carrier.
    pub ship_date: Date,

    /// The working day the parcel arrives when shipped on `ship_date`.
    pub arrival_date: Date,
}

/// Working days in transit for `rate`, inferred from its name when not stated.
pub fn transit_days(rate: &CarrierRate) -> Option<u32> {
    if let Some(days) = rate.estimated_days {
        return Some(days);
    }

    let name = rate.normalised_name();

    if ONE_DAY_NAME_HINTS.iter().any(|hint| name.contains(hint)) {
        return Some(1);
    }

    if TWO_DAY_NAME_HINTS.iter().any(|hint| name.contains(hint)) {
        return Some(2);
    }

    None
}

/// Every rate able to deliver on `delivery_date`, cheapest first.
///
/// # Errors
///
/// Returns [`CalendarError`] if date stepping overflows.
pub fn qualifying_rates(
    rates: &[CarrierRate],
    delivery_date: Date,
    calendar: &WorkingCalendar,
    now: Timestamp,
) -> Result<Vec<QualifyingRate>, CalendarError> {
    let mut qualifying = Vec::with_capacity(rates.len());

    for rate in rates {
        let Some(transit_days) = transit_days(rate) else {
            continue;
        };

        let Some(ship_date) = calendar.calculate_ship_date(delivery_date, transit_days, now)?
        else {
            continue;
        };

        let arrival_date = calendar.add_working_days(ship_date, transit_days)?;

        if arrival_date > delivery_date {
            continue;
        }

        qualifying.push(QualifyingRate {
            rate: rate.clone(),
            transit_days,
            ship_date,
            arrival_date,
        });
    }

    qualifying.sort_by(|left, right| left.rate.cmp_amount(&right.rate));

    Ok(qualifying)
}

/// The cheapest rate able to deliver on `delivery_date`.
///
/// # Errors
///
/// Returns [`CalendarError`] if date stepping overflows.
pub fn cheapest_qualifying(
    rates: &[CarrierRate],
    delivery_date: Date,
    calendar: &WorkingCalendar,
    now: Timestamp,
) -> Result<Option<QualifyingRate>, CalendarError> {
    Ok(qualifying_rates(rates, delivery_date, calendar, now)?
        .into_iter()
        .next())
}

/// Choose among qualifying rates (cheapest first), preferring a previously committed service.
///
/// An exact name match wins, then a name containing (or contained by) the preferred one, then
/// the cheapest.
pub fn prefer_service(
    qualifying: Vec<QualifyingRate>,
    preferred: Option<&str>,
) -> Option<QualifyingRate> {
    let Some(preferred) = preferred
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
    else {
        return qualifying.into_iter().next();
    };

    let exact = qualifying
        .iter()
        .position(|candidate| candidate.rate.normalised_name() == preferred);

    let partial = || {
        qualifying.iter().position(|candidate| {
            let name = candidate.rate.normalised_name();

            name.contains(&preferred) || preferred.contains(&name)
        })
    };

    let index = exact.or_else(partial).unwrap_or(0);

    qualifying.into_iter().nth(index)
}
