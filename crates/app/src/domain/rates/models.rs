//! Rate Models

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// A postal address; every field is optional because the storefront sends what the customer
/// has typed so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub name: Option<String>,
    pub street1: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
}

impl Address {
    /// The trimmed postcode, when one has been entered.
    pub fn postcode(&self) -> Option<&str> {
        self.postcode
            .as_deref()
            .map(str::trim)
            .filter(|postcode| !postcode.is_empty())
    }

    /// Whether enough of the address is known to quote carriers.
    pub fn is_quotable(&self) -> bool {
        self.postcode().is_some()
    }
}

/// Parcel dimensions in centimetres and weight in grams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Parcel {
    pub length_cm: u32,
    pub width_cm: u32,
    pub height_cm: u32,
    pub weight_grams: u32,
}

impl Default for Parcel {
    fn default() -> Self {
        Self {
            length_cm: 30,
            width_cm: 20,
            height_cm: 10,
            weight_grams: 1_000,
        }
    }
}

/// Everything needed to ask the provider for quotes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateRequest {
    pub from: Address,
    pub to: Address,
    pub parcel: Parcel,

    /// Day the parcel will be handed over, when already committed.
    pub ship_date: Option<Date>,
}

/// A purchased shipping label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchasedLabel {
    pub label_url: String,
    pub tracking_number: String,
}
