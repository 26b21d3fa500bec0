//! Reservations service errors.

use despatch::{calendar::CalendarError, reservations::ReservationStatus};
use sqlx::{Error, error::ErrorKind};
use thiserror::Error;

use crate::{domain::rates::RatesGatewayError, locks::LockTimeout};

/// Row check keeping `reserved_count` within `0..=capacity`.
const CAPACITY_CONSTRAINT: &str = "delivery_slots_reserved_within_capacity";

#[derive(Debug, Error)]
pub enum ReservationsServiceError {
    #[error("that delivery slot has just been taken, please choose another")]
    SlotFullyBooked,

    #[error("that delivery date is no longer available, please choose another")]
    DateUnavailable,

    #[error("the reservation has expired, please choose a slot again")]
    ReservationExpired,

    #[error("the reservation is {0} and cannot be confirmed")]
    ReservationInvalidState(ReservationStatus),

    #[error("a delivery postcode is required to reserve a slot")]
    AddressRequired,

    #[error("reservation not found")]
    NotFound,

    #[error("slot not found")]
    SlotNotFound,

    #[error("order not found")]
    OrderNotFound,

    #[error("carrier API failure")]
    CarrierApi(#[from] RatesGatewayError),

    #[error("slot is busy")]
    LockTimeout(#[from] LockTimeout),

    #[error("date arithmetic out of range")]
    Calendar(#[from] CalendarError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl ReservationsServiceError {
    /// Expected booking outcomes the customer can act on, as opposed to system faults.
    pub fn is_booking_failure(&self) -> bool {
        matches!(
            self,
            Self::SlotFullyBooked
                | Self::DateUnavailable
                | Self::ReservationExpired
                | Self::ReservationInvalidState(_)
        )
    }
}

impl From<Error> for ReservationsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        let Some(db_error) = error.as_database_error() else {
            return Self::Sql(error);
        };

        match db_error.kind() {
            ErrorKind::CheckViolation if db_error.constraint() == Some(CAPACITY_CONSTRAINT) => {
                Self::SlotFullyBooked
            }
            ErrorKind::ForeignKeyViolation => Self::OrderNotFound,
            _ => Self::Sql(error),
        }
    }
}

impl From<jiff::Error> for ReservationsServiceError {
    fn from(error: jiff::Error) -> Self {
        Self::Calendar(CalendarError::from(error))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::db::TestDb;

    use super::*;

    async fn insert_slot(db: &TestDb, capacity: i32) -> Result<uuid::Uuid, Error> {
        let slot = uuid::Uuid::now_v7();

        sqlx::query(
            "INSERT INTO delivery_slots (uuid, delivery_date, time_window, capacity)
            VALUES ($1, '2026-10-21', '08:00-12:00', $2)",
        )
        .bind(slot)
        .bind(capacity)
        .execute(db.pool())
        .await?;

        Ok(slot)
    }

    #[test]
    fn booking_failures_are_distinguished_from_faults() {
        assert!(ReservationsServiceError::SlotFullyBooked.is_booking_failure());
        assert!(
            ReservationsServiceError::ReservationInvalidState(ReservationStatus::Expired)
                .is_booking_failure()
        );
        assert!(!ReservationsServiceError::NotFound.is_booking_failure());
        assert!(!ReservationsServiceError::Sql(Error::PoolTimedOut).is_booking_failure());
    }

    #[test]
    fn missing_rows_map_to_not_found() {
        let error = ReservationsServiceError::from(Error::RowNotFound);

        assert!(
            matches!(error, ReservationsServiceError::NotFound),
            "expected NotFound, got {error:?}"
        );
    }

    #[test]
    fn messages_tell_the_customer_what_to_do() {
        assert_eq!(
            ReservationsServiceError::ReservationInvalidState(ReservationStatus::Expired)
                .to_string(),
            "the reservation is expired and cannot be confirmed"
        );
    }

    #[tokio::test]
    async fn only_the_capacity_check_means_fully_booked() -> TestResult {
        let db = TestDb::new().await;
        let slot = insert_slot(&db, 1).await?;

        let overbooked = sqlx::query(
            "UPDATE delivery_slots SET reserved_count = reserved_count + 2 WHERE uuid = $1",
        )
        .bind(slot)
        .execute(db.pool())
        .await
        .err()
        .ok_or("overbooking should violate the capacity check")?;

        let error = ReservationsServiceError::from(overbooked);

        assert!(
            matches!(error, ReservationsServiceError::SlotFullyBooked),
            "expected SlotFullyBooked, got {error:?}"
        );

        let unconfirmed_order = sqlx::query(
            "INSERT INTO slot_reservations (
                uuid,
                slot_uuid,
                status,
                expires_at,
                selected_delivery_date,
                calculated_ship_date,
                shipping_service,
                shipping_rate_id,
                order_uuid,
                created_at
            )
            VALUES ($1, $2, 'reserved', now(), '2026-10-21', '2026-10-20', 'Tracked 24',
                'rate_rm_tracked_24', $3, now())",
        )
        .bind(uuid::Uuid::now_v7())
        .bind(slot)
        .bind(uuid::Uuid::now_v7())
        .execute(db.pool())
        .await
        .err()
        .ok_or("an order on an unconfirmed hold should violate its check")?;

        let error = ReservationsServiceError::from(unconfirmed_order);

        assert!(
            matches!(error, ReservationsServiceError::Sql(_)),
            "expected Sql, got {error:?}"
        );

        Ok(())
    }
}
