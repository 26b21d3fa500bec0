//! Reserve Slot Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use despatch_app::domain::{
    rates::models::Address,
    reservations::{data::ReserveRequest, records::ReservationRecord},
};

use crate::{
    delivery::errors::{record_outcome, reservation_status_error},
    extensions::*,
    state::State,
};

/// Reserve Slot Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ReserveSlotRequest {
    /// Slot to hold
    pub slot_id: Uuid,

    pub name: Option<String>,

    pub street1: Option<String>,

    pub city: Option<String>,

    /// Required: carriers are quoted to this postcode
    pub postcode: Option<String>,

    pub country: Option<String>,
}

impl From<ReserveSlotRequest> for ReserveRequest {
    fn from(request: ReserveSlotRequest) -> Self {
        ReserveRequest {
            slot: request.slot_id.into(),
            address: Address {
                name: request.name,
                street1: request.street1,
                city: request.city,
                postcode: request.postcode,
                country: request.country,
            },
        }
    }
}

/// Reservation Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ReservationResponse {
    pub reservation_id: Uuid,

    pub slot_id: Uuid,

    /// When the hold lapses unless confirmed
    pub expires_at: String,

    pub status: String,

    pub selected_delivery_date: String,

    /// Date the parcel must leave the warehouse
    pub calculated_ship_date: String,

    /// Carrier service chosen to meet the delivery date
    pub shipping_service: String,
}

impl From<ReservationRecord> for ReservationResponse {
    fn from(reservation: ReservationRecord) -> Self {
        Self {
            reservation_id: reservation.uuid.into_uuid(),
            slot_id: reservation.slot.into_uuid(),
            expires_at: reservation.expires_at.to_string(),
            status: reservation.status.to_string(),
            selected_delivery_date: reservation.selected_delivery_date.to_string(),
            calculated_ship_date: reservation.calculated_ship_date.to_string(),
            shipping_service: reservation.shipping_service,
        }
    }
}

/// Reserve Slot Handler
///
/// Holds one unit of the slot's capacity for the configured hold period.
#[endpoint(
    tags("delivery"),
    summary = "Reserve Slot",
    responses(
        (status_code = StatusCode::CREATED, description = "Slot reserved"),
        (status_code = StatusCode::BAD_REQUEST, description = "Delivery postcode missing"),
        (status_code = StatusCode::NOT_FOUND, description = "Slot not found"),
        (status_code = StatusCode::CONFLICT, description = "Slot fully booked or date unavailable"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Carrier API failure"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Slot busy"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<ReserveSlotRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ReservationResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let result = state
        .app
        .reservations
        .reserve(json.into_inner().into(), state.now())
        .await;

    record_outcome("reserve", &result);

    let reservation = result.map_err(reservation_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(reservation.into()))
}
