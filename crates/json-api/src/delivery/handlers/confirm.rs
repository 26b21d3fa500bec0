//! Confirm Reservation Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use despatch_app::domain::reservations::data::Confirmation;

use crate::{
    delivery::errors::{record_outcome, reservation_status_error},
    extensions::*,
    state::State,
};

/// Confirm Reservation Request
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct ConfirmReservationRequest {
    /// Order to attach the reservation to
    pub order_id: Option<Uuid>,

    /// Carrier rate to use instead of the one quoted at reservation time
    pub shipping_rate: Option<String>,
}

impl From<ConfirmReservationRequest> for Confirmation {
    fn from(request: ConfirmReservationRequest) -> Self {
        Confirmation {
            order: request.order_id.map(Into::into),
            shipping_rate: request.shipping_rate,
        }
    }
}

/// Reservation Status Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ReservationStatusResponse {
    pub reservation_id: Uuid,

    pub status: String,

    pub slot_id: Uuid,
}

/// Confirm Reservation Handler
#[endpoint(
    tags("delivery"),
    summary = "Confirm Reservation",
    responses(
        (status_code = StatusCode::OK, description = "Reservation confirmed"),
        (status_code = StatusCode::NOT_FOUND, description = "Reservation or order not found"),
        (status_code = StatusCode::CONFLICT, description = "Reservation expired or cancelled"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "reservations.confirm",
    skip(reservation, json, depot),
    fields(reservation_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    reservation: PathParam<Uuid>,
    json: JsonBody<ConfirmReservationRequest>,
    depot: &mut Depot,
) -> Result<Json<ReservationStatusResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let reservation = reservation.into_inner();

    tracing::Span::current().record("reservation_uuid", tracing::field::display(reservation));

    let result = state
        .app
        .reservations
        .confirm(reservation.into(), json.into_inner().into(), state.now())
        .await;

    record_outcome("confirm", &result);

    let confirmed = result.map_err(reservation_status_error)?;

    Ok(Json(ReservationStatusResponse {
        reservation_id: confirmed.uuid.into_uuid(),
        status: confirmed.status.to_string(),
        slot_id: confirmed.slot.into_uuid(),
    }))
}
