//! Reservations Data

use jiff::{Timestamp, civil::Date};

use crate::domain::{
    orders::records::OrderUuid, rates::models::Address, slots::records::SlotUuid,
};

/// A request to hold a slot for a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveRequest {
    pub slot: SlotUuid,

    /// Delivery address used to find a carrier that can meet the slot's date.
    pub address: Address,
}

/// Finalises a held reservation, optionally against an order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Confirmation {
    pub order: Option<OrderUuid>,

    /// Overrides the quote chosen at reservation time.
    pub shipping_rate: Option<String>,
}

/// Reservation Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewReservation {
    pub(crate) slot: SlotUuid,
    pub(crate) expires_at: Timestamp,
    pub(crate) selected_delivery_date: Date,
    pub(crate) calculated_ship_date: Date,
    pub(crate) shipping_service: String,
    pub(crate) shipping_rate_id: String,
}
