//! Cancel Reservation Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    delivery::errors::{record_outcome, reservation_status_error},
    extensions::*,
    state::State,
};

/// Cancel Reservation Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CancelReservationResponse {
    pub reservation_id: Uuid,

    /// Always `cancelled`
    pub status: String,
}

/// Cancel Reservation Handler
///
/// Releases a live hold. Cancelling a reservation that is no longer held succeeds without
/// changing it.
#[endpoint(
    tags("delivery"),
    summary = "Cancel Reservation",
    responses(
        (status_code = StatusCode::OK, description = "Reservation cancelled"),
        (status_code = StatusCode::NOT_FOUND, description = "Reservation not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "reservations.cancel",
    skip(reservation, depot),
    fields(reservation_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    reservation: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CancelReservationResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let reservation = reservation.into_inner();

    tracing::Span::current().record("reservation_uuid", tracing::field::display(reservation));

    let result = state
        .app
        .reservations
        .cancel(reservation.into(), state.now())
        .await;

    record_outcome("cancel", &result);

    let cancelled = result.map_err(reservation_status_error)?;

    Ok(Json(CancelReservationResponse {
        reservation_id: cancelled.uuid.into_uuid(),
        status: "cancelled".to_string(),
    }))
}
