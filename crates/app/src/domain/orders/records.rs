//! Order Records

use despatch::options::DeliveryTier;
use jiff::{Timestamp, civil::Date};

use crate::{
    domain::{rates::models::Address, slots::records::SlotUuid},
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// The delivery-related fields of a placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub delivery_tier: DeliveryTier,
    pub shipping_address: Address,
    pub delivery_slot: Option<SlotUuid>,
    pub shipping_rate: Option<String>,
    pub shipping_service: Option<String>,
    pub selected_delivery_date: Option<Date>,
    pub calculated_ship_date: Option<Date>,
    pub label_url: Option<String>,
    pub tracking_number: Option<String>,
    pub created_at: Timestamp,
}

impl OrderRecord {
    pub fn has_label(&self) -> bool {
        self.label_url.is_some()
    }
}
