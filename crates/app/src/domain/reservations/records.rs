//! Reservation Records

use despatch::reservations::ReservationStatus;
use jiff::{Timestamp, civil::Date};

use crate::{
    domain::{orders::records::OrderUuid, slots::records::SlotUuid},
    uuids::TypedUuid,
};

/// Reservation UUID
pub type ReservationUuid = TypedUuid<ReservationRecord>;

/// A customer's claim on one unit of a slot's capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRecord {
    pub uuid: ReservationUuid,
    pub slot: SlotUuid,
    pub status: ReservationStatus,
    pub expires_at: Timestamp,
    pub selected_delivery_date: Date,
    pub calculated_ship_date: Date,
    pub shipping_service: String,
    pub shipping_rate_id: String,
    pub order: Option<OrderUuid>,
    pub created_at: Timestamp,
    pub confirmed_at: Option<Timestamp>,
    pub expired_at: Option<Timestamp>,
}
