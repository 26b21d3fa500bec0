//! Carrier Rates
//!
//! A [`CarrierRate`] is a single normalised quote from the rate-shopping provider. The
//! submodules hold the three selection policies that run over a list of them.

use std::cmp::Ordering;

use rust_decimal::Decimal;

pub mod next_day;
pub mod standard;
pub mod timed;

pub use next_day::{NextDayPolicy, ServiceNameMatcher};
pub use standard::select_standard;
pub use timed::{QualifyingRate, cheapest_qualifying, prefer_service, qualifying_rates};

/// Service name used when a quote carries neither a provider nor a service level.
pub const UNKNOWN_SERVICE_NAME: &str = "Unknown Service";

/// A normalised carrier quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierRate {
    /// Provider and service level joined, e.g. `"Royal Mail Special Delivery Guaranteed"`.
    pub service_name: String,

    /// Working days in transit, when the provider states it.
    pub estimated_days: Option<u32>,

    /// Quoted price; a missing amount sorts after every priced quote.
    pub amount: Option<Decimal>,

    /// Opaque provider reference used to buy a label against this quote.
    pub object_id: String,
}

impl CarrierRate {
    /// Build a rate from the provider's raw fields.
    pub fn from_parts(
        provider: Option<&str>,
        service_level: Option<&str>,
        estimated_days: Option<i64>,
        amount: Option<Decimal>,
        object_id: impl Into<String>,
    ) -> Self {
        Self {
            service_name: service_name(provider, service_level),
            estimated_days: estimated_days.and_then(|days| u32::try_from(days).ok()),
            amount,
            object_id: object_id.into(),
        }
    }

    /// Lower-cased service name for matching.
    pub fn normalised_name(&self) -> String {
        self.service_name.to_lowercase()
    }

    /// Compare two rates by price, treating a missing amount as infinitely expensive.
    pub fn cmp_amount(&self, other: &Self) -> Ordering {
        match (self.amount, other.amount) {
            (Some(left), Some(right)) => left.cmp(&right),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Join provider and service level into a display name.
pub fn service_name(provider: Option<&str>, service_level: Option<&str>) -> String {
    let parts: Vec<&str> = [provider, service_level]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        return UNKNOWN_SERVICE_NAME.to_string();
    }

    parts.join(" ")
}

/// The cheapest of `rates`, keeping the first on ties.
pub fn cheapest<'a, I>(rates: I) -> Option<&'a CarrierRate>
where
    I: IntoIterator<Item = &'a CarrierRate>,
{
    rates.into_iter().min_by(|left, right| left.cmp_amount(right))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::str::FromStr;

    use super::*;

    pub(crate) fn rate(name: &str, days: Option<u32>, amount: Option<&str>) -> CarrierRate {
        CarrierRate {
            service_name: name.to_string(),
            estimated_days: days,
            amount: amount.and_then(|value| Decimal::from_str(value).ok()),
            object_id: format!("rate_{}", name.to_lowercase().replace(' ', "_")),
        }
    }

    #[test]
    fn service_name_joins_provider_and_level() {
        assert_eq!(
            service_name(Some("Royal Mail"), Some("Special Delivery Guaranteed")),
            "Royal Mail Special Delivery Guaranteed"
        );
        assert_eq!(service_name(Some("  DPD "), Some("")), "DPD");
        assert_eq!(service_name(None, Some("Next Day")), "Next Day");
    }

    #[test]
    fn empty_service_name_uses_sentinel() {
        assert_eq!(service_name(None, None), UNKNOWN_SERVICE_NAME);
        assert_eq!(service_name(Some(" "), Some("")), UNKNOWN_SERVICE_NAME);
    }

    #[test]
    fn negative_estimated_days_are_discarded() {
        let rate = CarrierRate::from_parts(Some("DPD"), Some("Next Day"), Some(-1), None, "r1");

        assert_eq!(rate.estimated_days, None);
    }

    #[test]
    fn missing_amount_sorts_last() {
        let rates = [
            rate("Unpriced", Some(1), None),
            rate("Dear", Some(1), Some("9.99")),
            rate("Cheap", Some(1), Some("3.50")),
        ];

        assert_eq!(
            cheapest(&rates).map(|rate| rate.service_name.as_str()),
            Some("Cheap")
        );
    }

    #[test]
    fn cheapest_keeps_first_on_tie() {
        let rates = [
            rate("First", Some(2), Some("4.00")),
            rate("Second", Some(2), Some("4.00")),
        ];

        assert_eq!(
            cheapest(&rates).map(|rate| rate.service_name.as_str()),
            Some("First")
        );
    }
}
