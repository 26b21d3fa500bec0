//! Delivery options
//!
//! The three delivery tiers a customer chooses between at checkout and how each is priced.

use std::{fmt, str::FromStr};

use rusty_money::{Money, iso};
use thiserror::Error;

/// Label shown instead of a zero price.
pub const FREE_DISPLAY_PRICE: &str = "FREE";

/// The delivery tiers on offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryTier {
    /// Cheapest two-to-three day service.
    Standard,

    /// Allow-listed guaranteed next working day service.
    NextDay,

    /// Delivery inside a reserved date and time window.
    Timed,
}

impl DeliveryTier {
    /// Every tier, in display order.
    pub const ALL: [DeliveryTier; 3] = [Self::Standard, Self::NextDay, Self::Timed];

    /// The upper-case label used on orders and in responses.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::NextDay => "NEXT_DAY",
            Self::Timed => "TIMED",
        }
    }
}

impl fmt::Display for DeliveryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored tier label that is not one of [`DeliveryTier::ALL`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown delivery tier: {0}")]
pub struct UnknownDeliveryTier(pub String);

impl FromStr for DeliveryTier {
    type Err = UnknownDeliveryTier;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| UnknownDeliveryTier(value.to_string()))
    }
}

/// Flat customer-facing price of each tier, in pence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPricing {
    /// Standard delivery price.
    pub standard: u32,

    /// Next-day delivery price.
    pub next_day: u32,

    /// Timed delivery price.
    pub timed: u32,
}

impl TierPricing {
    /// Price of `tier` for a customer; members get standard delivery free.
    pub fn price_for(&self, tier: DeliveryTier, member: bool) -> u32 {
        match tier {
            DeliveryTier::Standard if member => 0,
            DeliveryTier::Standard => self.standard,
            DeliveryTier::NextDay => self.next_day,
            DeliveryTier::Timed => self.timed,
        }
    }
}

/// Format a price in pence for display, e.g. `£4.99`.
pub fn display_price(pence: u32) -> String {
    if pence == 0 {
        return FREE_DISPLAY_PRICE.to_string();
    }

    Money::from_minor(i64::from(pence), iso::GBP).to_string()
}

/// Availability and price of one tier for the current customer and address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOption {
    /// Which tier this describes.
    pub tier: DeliveryTier,

    /// Whether the tier can be chosen right now.
    pub available: bool,

    /// Price in pence.
    pub price: u32,

    /// Formatted price.
    pub display_price: String,

    /// Human-readable explanation when unavailable.
    pub unavailable_reason: Option<String>,

    /// Carrier service that would fulfil the tier, when one has been quoted.
    pub service_name: Option<String>,
}

impl DeliveryOption {
    /// An available tier, optionally naming the carrier service behind it.
    pub fn available(tier: DeliveryTier, price: u32, service_name: Option<String>) -> Self {
        Self {
            tier,
            available: true,
            price,
            display_price: display_price(price),
            unavailable_reason: None,
            service_name,
        }
    }

    /// An unavailable tier with the reason shown to the customer.
    pub fn unavailable(tier: DeliveryTier, price: u32, reason: impl Into<String>) -> Self {
        Self {
            tier,
            available: false,
            price,
            display_price: display_price(price),
            unavailable_reason: Some(reason.into()),
            service_name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRICING: TierPricing = TierPricing {
        standard: 399,
        next_day: 799,
        timed: 1_299,
    };

    #[test]
    fn members_get_free_standard_delivery() {
        assert_eq!(PRICING.price_for(DeliveryTier::Standard, true), 0);
        assert_eq!(PRICING.price_for(DeliveryTier::Standard, false), 399);
        assert_eq!(PRICING.price_for(DeliveryTier::NextDay, true), 799);
        assert_eq!(PRICING.price_for(DeliveryTier::Timed, true), 1_299);
    }

    #[test]
    fn prices_display_in_pounds() {
        assert_eq!(display_price(399), "£3.99");
        assert_eq!(display_price(1_299), "£12.99");
        assert_eq!(display_price(0), FREE_DISPLAY_PRICE);
    }

    #[test]
    fn unavailable_option_carries_reason() {
        let option = DeliveryOption::unavailable(DeliveryTier::Timed, 1_299, "Enter your address");

        assert!(!option.available);
        assert_eq!(option.unavailable_reason.as_deref(), Some("Enter your address"));
        assert_eq!(option.service_name, None);
        assert_eq!(option.display_price, "£12.99");
    }

    #[test]
    fn tier_labels() {
        let labels: Vec<&str> = DeliveryTier::ALL.iter().map(|tier| tier.as_str()).collect();

        assert_eq!(labels, ["STANDARD", "NEXT_DAY", "TIMED"]);
    }

    #[test]
    fn tiers_parse_from_their_labels() {
        assert_eq!("NEXT_DAY".parse(), Ok(DeliveryTier::NextDay));
        assert_eq!("timed".parse(), Ok(DeliveryTier::Timed));
        assert_eq!(
            "EXPRESS".parse::<DeliveryTier>(),
            Err(UnknownDeliveryTier("EXPRESS".to_string()))
        );
    }
}
