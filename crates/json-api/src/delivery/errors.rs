//! Delivery Errors

use salvo::http::StatusError;
use tracing::{error, warn};

use despatch_app::domain::{
    options::DeliveryOptionsError, reservations::ReservationsServiceError,
    slots::SlotsServiceError,
};

use crate::observability::record_reservation_outcome;

pub(crate) fn reservation_status_error(error: ReservationsServiceError) -> StatusError {
    if error.is_booking_failure() {
        warn!(%error, "booking failed");
    }

    match error {
        ReservationsServiceError::SlotFullyBooked => {
            StatusError::conflict().brief("That delivery slot has just been taken")
        }
        ReservationsServiceError::DateUnavailable => {
            StatusError::conflict().brief("That delivery date can no longer be met")
        }
        ReservationsServiceError::ReservationExpired => {
            StatusError::conflict().brief("The reservation has expired")
        }
        ReservationsServiceError::ReservationInvalidState(status) => {
            StatusError::conflict().brief(format!("The reservation is already {status}"))
        }
        ReservationsServiceError::AddressRequired => {
            StatusError::bad_request().brief("A delivery postcode is required")
        }
        ReservationsServiceError::NotFound => {
            StatusError::not_found().brief("Reservation not found")
        }
        ReservationsServiceError::SlotNotFound => StatusError::not_found().brief("Slot not found"),
        ReservationsServiceError::OrderNotFound => {
            StatusError::not_found().brief("Order not found")
        }
        ReservationsServiceError::CarrierApi(source) => {
            error!("carrier API failed during booking: {source}");

            StatusError::bad_gateway().brief("Delivery prices are temporarily unavailable")
        }
        ReservationsServiceError::LockTimeout(source) => {
            warn!("{source}");

            StatusError::service_unavailable().brief("That delivery slot is busy, please retry")
        }
        ReservationsServiceError::Calendar(source) => {
            error!("delivery date arithmetic failed: {source}");

            StatusError::internal_server_error()
        }
        ReservationsServiceError::Sql(source) => {
            error!("failed to update reservation: {source}");

            StatusError::internal_server_error()
        }
    }
}

fn outcome(error: &ReservationsServiceError) -> &'static str {
    match error {
        ReservationsServiceError::SlotFullyBooked => "slot_fully_booked",
        ReservationsServiceError::DateUnavailable => "date_unavailable",
        ReservationsServiceError::ReservationExpired => "reservation_expired",
        ReservationsServiceError::ReservationInvalidState(_) => "invalid_state",
        ReservationsServiceError::AddressRequired => "address_required",
        ReservationsServiceError::NotFound
        | ReservationsServiceError::SlotNotFound
        | ReservationsServiceError::OrderNotFound => "not_found",
        ReservationsServiceError::CarrierApi(_) => "carrier_api_failure",
        ReservationsServiceError::LockTimeout(_) => "lock_timeout",
        ReservationsServiceError::Calendar(_) | ReservationsServiceError::Sql(_) => "error",
    }
}

/// Count a reserve, confirm or cancel result.
pub(crate) fn record_outcome<T>(operation: &str, result: &Result<T, ReservationsServiceError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(error) => outcome(error),
    };

    record_reservation_outcome(operation, outcome);
}

pub(crate) fn slots_status_error(error: SlotsServiceError) -> StatusError {
    match error {
        SlotsServiceError::NotFound => StatusError::not_found().brief("Slot not found"),
        SlotsServiceError::InvalidData => {
            error!("stored slot data is invalid");

            StatusError::internal_server_error()
        }
        SlotsServiceError::Calendar(source) => {
            error!("delivery date arithmetic failed: {source}");

            StatusError::internal_server_error()
        }
        SlotsServiceError::Sql(source) => {
            error!("failed to list delivery slots: {source}");

            StatusError::internal_server_error()
        }
    }
}

pub(crate) fn options_status_error(error: DeliveryOptionsError) -> StatusError {
    match error {
        DeliveryOptionsError::Calendar(source) => {
            error!("delivery date arithmetic failed: {source}");

            StatusError::internal_server_error()
        }
    }
}
