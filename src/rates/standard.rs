//! Standard selection

use crate::rates::{CarrierRate, cheapest};

/// Pick the standard service: the cheapest two-to-three day quote, else the cheapest quote
/// that is not next-day (or has no stated speed), else the cheapest overall.
pub fn select_standard(rates: &[CarrierRate]) -> Option<&CarrierRate> {
    cheapest(
        rates
            .iter()
            .filter(|rate| rate.estimated_days.is_some_and(|days| (2..=3).contains(&days))),
    )
    .or_else(|| {
        cheapest(
            rates
                .iter()
                .filter(|rate| rate.estimated_days.is_none_or(|days| days > 1)),
        )
    })
    .or_else(|| cheapest(rates))
}

#[cfg(test)]
mod tests {
    use crate::rates::tests::rate;

    use super::*;

    fn selected(rates: &[CarrierRate]) -> Option<&str> {
        select_standard(rates).map(|rate| rate.service_name.as_str())
    }

    #[test]
    fn prefers_cheapest_two_to_three_day_service() {
        let rates = [
            rate("Evri 48", Some(2), Some("3.20")),
            rate("Royal Mail Tracked 48", Some(3), Some("2.90")),
            rate("Economy", Some(5), Some("1.50")),
            rate("DPD Next Day", Some(1), Some("1.00")),
        ];

        assert_eq!(selected(&rates), Some("Royal Mail Tracked 48"));
    }

    #[test]
    fn falls_back_to_slower_or_unknown_speed() {
        let rates = [
            rate("Economy", Some(5), Some("2.50")),
            rate("Mystery", None, Some("2.00")),
            rate("DPD Next Day", Some(1), Some("1.00")),
        ];

        assert_eq!(selected(&rates), Some("Mystery"));
    }

    #[test]
    fn falls_back_to_cheapest_overall() {
        let rates = [
            rate("DPD Next Day", Some(1), Some("6.00")),
            rate("Same Day Courier", Some(0), Some("15.00")),
        ];

        assert_eq!(selected(&rates), Some("DPD Next Day"));
    }

    #[test]
    fn no_rates_selects_nothing() {
        assert_eq!(selected(&[]), None);
    }
}
