//! Reservations service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use despatch::{
    calendar::WorkingCalendar,
    rates::cheapest_qualifying,
    reservations::{ConfirmAction, ReleaseAction, cancel_action, confirm_action, hold_expiry},
};
use jiff::Timestamp;
use mockall::automock;
use tracing::info;

use crate::{
    config::DeliveryConfig,
    database::Db,
    domain::{
        orders::repository::PgOrdersRepository,
        rates::RatesGateway,
        reservations::{
            data::{Confirmation, NewReservation, ReserveRequest},
            errors::ReservationsServiceError,
            records::{ReservationRecord, ReservationUuid},
            repository::PgReservationsRepository,
            sweeper::PgReservationSweeper,
        },
        slots::repository::PgSlotsRepository,
    },
    locks::SlotLocks,
};

#[derive(Clone)]
pub struct PgReservationsService {
    db: Db,
    config: Arc<DeliveryConfig>,
    calendar: WorkingCalendar,
    locks: SlotLocks,
    rates: Arc<dyn RatesGateway>,
    reservations: PgReservationsRepository,
    slots: PgSlotsRepository,
    orders: PgOrdersRepository,
    sweeper: PgReservationSweeper,
}

impl PgReservationsService {
    #[must_use]
    pub fn new(db: Db, config: Arc<DeliveryConfig>, rates: Arc<dyn RatesGateway>) -> Self {
        Self {
            calendar: config.calendar(),
            locks: SlotLocks::new(config.lock_wait),
            sweeper: PgReservationSweeper::new(db.clone()),
            reservations: PgReservationsRepository::new(),
            slots: PgSlotsRepository::new(),
            orders: PgOrdersRepository::new(),
            db,
            config,
            rates,
        }
    }
}

impl fmt::Debug for PgReservationsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgReservationsService")
            .field("calendar", &self.calendar)
            .field("locks", &self.locks)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ReservationsService for PgReservationsService {
    #[tracing::instrument(
        name = "reservations.service.reserve",
        skip(self, request),
        fields(slot_uuid = %request.slot),
        err
    )]
    async fn reserve(
        &self,
        request: ReserveRequest,
        now: Timestamp,
    ) -> Result<ReservationRecord, ReservationsServiceError> {
        if !request.address.is_quotable() {
            return Err(ReservationsServiceError::AddressRequired);
        }

        self.sweeper.release_expired(now).await?;

        let _guard = self.locks.acquire(request.slot).await?;
        let mut tx = self.db.begin().await?;

        let slot = self
            .slots
            .lock_slot(&mut tx, request.slot)
            .await?
            .ok_or(ReservationsServiceError::SlotNotFound)?;

        if slot.availability().is_full() {
            return Err(ReservationsServiceError::SlotFullyBooked);
        }

        if !self
            .calendar
            .is_selectable_delivery_date(slot.delivery_date, now)?
        {
            return Err(ReservationsServiceError::DateUnavailable);
        }

        let rates = self
            .rates
            .fetch_rates(&self.config.rate_request(&request.address, None))
            .await?;

        let Some(chosen) = cheapest_qualifying(&rates, slot.delivery_date, &self.calendar, now)?
        else {
            return Err(ReservationsServiceError::DateUnavailable);
        };

        if !self.slots.increment_reserved(&mut tx, slot.uuid).await? {
            return Err(ReservationsServiceError::SlotFullyBooked);
        }

        let record = self
            .reservations
            .create_reservation(
                &mut tx,
                NewReservation {
                    slot: slot.uuid,
                    expires_at: hold_expiry(now, self.config.hold)?,
                    selected_delivery_date: slot.delivery_date,
                    calculated_ship_date: chosen.ship_date,
                    shipping_service: chosen.rate.service_name,
                    shipping_rate_id: chosen.rate.object_id,
                },
                now,
            )
            .await?;

        tx.commit().await?;

        info!(
            reservation_uuid = %record.uuid,
            delivery_date = %record.selected_delivery_date,
            time_window = %slot.time_window,
            "reserved delivery slot"
        );

        Ok(record)
    }

    #[tracing::instrument(
        name = "reservations.service.confirm",
        skip(self, confirmation),
        fields(order_uuid = ?confirmation.order),
        err
    )]
    async fn confirm(
        &self,
        reservation: ReservationUuid,
        confirmation: Confirmation,
        now: Timestamp,
    ) -> Result<ReservationRecord, ReservationsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self
            .reservations
            .lock_reservation(&mut tx, reservation)
            .await?
            .ok_or(ReservationsServiceError::NotFound)?;

        match confirm_action(record.status, record.expires_at, now) {
            ConfirmAction::AlreadyConfirmed => Ok(record),
            ConfirmAction::Reject => Err(ReservationsServiceError::ReservationInvalidState(
                record.status,
            )),
            ConfirmAction::Expire => {
                self.slots.release_reserved(&mut tx, record.slot).await?;
                self.reservations
                    .expire_reservation(&mut tx, reservation, now)
                    .await?;

                tx.commit().await?;

                info!(reservation_uuid = %reservation, "expired lapsed reservation on confirm");

                Err(ReservationsServiceError::ReservationExpired)
            }
            ConfirmAction::Confirm => {
                let shipping_rate = confirmation
                    .shipping_rate
                    .unwrap_or_else(|| record.shipping_rate_id.clone());

                let confirmed = self
                    .reservations
                    .confirm_reservation(&mut tx, reservation, confirmation.order, &shipping_rate, now)
                    .await?;

                if let Some(order) = confirmation.order
                    && !self
                        .orders
                        .attach_reservation(&mut tx, order, &confirmed)
                        .await?
                {
                    return Err(ReservationsServiceError::OrderNotFound);
                }

                tx.commit().await?;

                info!(reservation_uuid = %reservation, "confirmed reservation");

                Ok(confirmed)
            }
        }
    }

    #[tracing::instrument(name = "reservations.service.cancel", skip(self), err)]
    async fn cancel(
        &self,
        reservation: ReservationUuid,
        now: Timestamp,
    ) -> Result<ReservationRecord, ReservationsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self
            .reservations
            .lock_reservation(&mut tx, reservation)
            .await?
            .ok_or(ReservationsServiceError::NotFound)?;

        if cancel_action(record.status) == ReleaseAction::Skip {
            return Ok(record);
        }

        self.slots.release_reserved(&mut tx, record.slot).await?;

        let cancelled = self
            .reservations
            .expire_reservation(&mut tx, reservation, now)
            .await?;

        tx.commit().await?;

        info!(reservation_uuid = %reservation, "cancelled reservation");

        Ok(cancelled)
    }

    async fn release_expired_reservations(
        &self,
        now: Timestamp,
    ) -> Result<u64, ReservationsServiceError> {
        Ok(self.sweeper.release_expired(now).await?)
    }
}

#[automock]
#[async_trait]
pub trait ReservationsService: Send + Sync {
    /// Hold one unit of a slot for the customer, choosing the carrier service that will meet
    /// the slot's date.
    async fn reserve(
        &self,
        request: ReserveRequest,
        now: Timestamp,
    ) -> Result<ReservationRecord, ReservationsServiceError>;

    /// Finalise a held reservation. Confirming twice returns the confirmed reservation
    /// unchanged.
    async fn confirm(
        &self,
        reservation: ReservationUuid,
        confirmation: Confirmation,
        now: Timestamp,
    ) -> Result<ReservationRecord, ReservationsServiceError>;

    /// Release a held reservation. Anything other than a live hold is returned untouched.
    async fn cancel(
        &self,
        reservation: ReservationUuid,
        now: Timestamp,
    ) -> Result<ReservationRecord, ReservationsServiceError>;

    /// Expire every lapsed hold. Returns how many were released.
    async fn release_expired_reservations(
        &self,
        now: Timestamp,
    ) -> Result<u64, ReservationsServiceError>;
}

#[cfg(test)]
mod tests {
    use despatch::reservations::ReservationStatus;
    use jiff::SignedDuration;
    use testresult::TestResult;
    use tokio::task::JoinSet;

    use crate::{
        config::DeliveryConfig,
        domain::slots::{SlotsService, records::SlotUuid},
        test::{
            TestContext,
            helpers::{
                address, create_order, first_slot, london_time, next_day_rates, slot_counts,
            },
        },
    };

    use super::*;

    async fn context(capacity: u32) -> TestContext {
        TestContext::new(
            DeliveryConfig {
                slot_capacity: capacity,
                ..DeliveryConfig::default()
            },
            next_day_rates(),
        )
        .await
    }

    #[tokio::test]
    async fn reserve_takes_one_unit_and_records_ship_date() -> TestResult {
        let ctx = context(2).await;
        let now = london_time("2026-10-20T10:00")?;
        let slot = first_slot(&ctx, now).await?;

        let reservation = ctx
            .reservations
            .reserve(
                ReserveRequest {
                    slot,
                    address: address(),
                },
                now,
            )
            .await?;

        assert_eq!(reservation.status, ReservationStatus::Reserved);
        assert_eq!(reservation.selected_delivery_date.to_string(), "2026-10-21");
        assert_eq!(reservation.calculated_ship_date.to_string(), "2026-10-20");
        assert_eq!(reservation.shipping_service, "Royal Mail Tracked 24");
        assert_eq!(reservation.expires_at, now.checked_add(SignedDuration::from_mins(15))?);
        assert_eq!(slot_counts(&ctx, slot).await?, (2, 1));

        Ok(())
    }

    #[tokio::test]
    async fn reserve_without_postcode_is_rejected() -> TestResult {
        let ctx = context(1).await;
        let now = london_time("2026-10-20T10:00")?;
        let slot = first_slot(&ctx, now).await?;

        let result = ctx
            .reservations
            .reserve(
                ReserveRequest {
                    slot,
                    address: Default::default(),
                },
                now,
            )
            .await;

        assert!(
            matches!(result, Err(ReservationsServiceError::AddressRequired)),
            "expected AddressRequired, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn unknown_slot_is_reported() -> TestResult {
        let ctx = context(1).await;
        let now = london_time("2026-10-20T10:00")?;

        let result = ctx
            .reservations
            .reserve(
                ReserveRequest {
                    slot: SlotUuid::now_v7(),
                    address: address(),
                },
                now,
            )
            .await;

        assert!(
            matches!(result, Err(ReservationsServiceError::SlotNotFound)),
            "expected SlotNotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn date_without_a_qualifying_rate_is_unavailable() -> TestResult {
        let ctx = context(1).await;
        let now = london_time("2026-10-20T10:00")?;

        // Materialise slots, then ask again after the cutoff so tomorrow cannot be met.
        let slot = first_slot(&ctx, now).await?;
        let late = london_time("2026-10-20T16:30")?;

        let result = ctx
            .reservations
            .reserve(
                ReserveRequest {
                    slot,
                    address: address(),
                },
                late,
            )
            .await;

        assert!(
            matches!(result, Err(ReservationsServiceError::DateUnavailable)),
            "expected DateUnavailable, got {result:?}"
        );
        assert_eq!(slot_counts(&ctx, slot).await?, (1, 0));

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reservations_never_exceed_capacity() -> TestResult {
        const CAPACITY: u32 = 3;
        const ATTEMPTS: u32 = 8;

        let ctx = context(CAPACITY).await;
        let now = london_time("2026-10-20T10:00")?;
        let slot = first_slot(&ctx, now).await?;
        let mut tasks = JoinSet::new();

        for _ in 0..ATTEMPTS {
            let service = ctx.reservations.clone();

            tasks.spawn(async move {
                service
                    .reserve(
                        ReserveRequest {
                            slot,
                            address: address(),
                        },
                        now,
                    )
                    .await
            });
        }

        let mut reserved = 0;
        let mut fully_booked = 0;

        while let Some(outcome) = tasks.join_next().await {
            match outcome? {
                Ok(_) => reserved += 1,
                Err(ReservationsServiceError::SlotFullyBooked) => fully_booked += 1,
                Err(other) => return Err(other.into()),
            }
        }

        assert_eq!(reserved, CAPACITY);
        assert_eq!(fully_booked, ATTEMPTS - CAPACITY);
        assert_eq!(slot_counts(&ctx, slot).await?, (CAPACITY, CAPACITY));

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn last_slot_race_then_sweep_frees_it() -> TestResult {
        let ctx = context(1).await;
        let now = london_time("2026-10-20T10:00")?;
        let slot = first_slot(&ctx, now).await?;
        let request = ReserveRequest {
            slot,
            address: address(),
        };

        let first = ctx.reservations.clone();
        let second = ctx.reservations.clone();
        let (a, b) = tokio::join!(
            first.reserve(request.clone(), now),
            second.reserve(request.clone(), now)
        );

        let (winner, loser) = if a.is_ok() { (a, b) } else { (b, a) };

        assert_eq!(winner?.status, ReservationStatus::Reserved);
        assert!(
            matches!(loser, Err(ReservationsServiceError::SlotFullyBooked)),
            "expected SlotFullyBooked, got {loser:?}"
        );

        let later = london_time("2026-10-20T10:16")?;

        assert_eq!(ctx.reservations.release_expired_reservations(later).await?, 1);

        let third = ctx.reservations.reserve(request, later).await?;

        assert_eq!(third.status, ReservationStatus::Reserved);
        assert_eq!(slot_counts(&ctx, slot).await?, (1, 1));

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_sweeps_release_once() -> TestResult {
        let ctx = context(2).await;
        let now = london_time("2026-10-20T10:00")?;
        let slot = first_slot(&ctx, now).await?;

        ctx.reservations
            .reserve(
                ReserveRequest {
                    slot,
                    address: address(),
                },
                now,
            )
            .await?;

        let later = london_time("2026-10-20T10:30")?;
        let first = ctx.reservations.clone();
        let second = ctx.reservations.clone();

        let (a, b) = tokio::join!(
            first.release_expired_reservations(later),
            second.release_expired_reservations(later)
        );

        assert_eq!(a? + b?, 1);
        assert_eq!(slot_counts(&ctx, slot).await?, (2, 0));

        Ok(())
    }

    #[tokio::test]
    async fn confirm_is_idempotent_and_updates_the_order() -> TestResult {
        let ctx = context(1).await;
        let now = london_time("2026-10-20T10:00")?;
        let slot = first_slot(&ctx, now).await?;
        let order = create_order(&ctx, "TIMED").await?;

        let reservation = ctx
            .reservations
            .reserve(
                ReserveRequest {
                    slot,
                    address: address(),
                },
                now,
            )
            .await?;

        let confirmation = Confirmation {
            order: Some(order),
            shipping_rate: None,
        };

        let first = ctx
            .reservations
            .confirm(reservation.uuid, confirmation.clone(), now)
            .await?;
        let second = ctx
            .reservations
            .confirm(reservation.uuid, confirmation, now)
            .await?;

        assert_eq!(first, second);
        assert_eq!(first.status, ReservationStatus::Confirmed);
        assert_eq!(first.order, Some(order));
        assert_eq!(slot_counts(&ctx, slot).await?, (1, 1));

        let stored: (Option<uuid::Uuid>, Option<String>) = sqlx::query_as(
            "SELECT delivery_slot_uuid, shipping_service FROM orders WHERE uuid = $1",
        )
        .bind(order.into_uuid())
        .fetch_one(ctx.db.pool())
        .await?;

        assert_eq!(stored.0, Some(slot.into_uuid()));
        assert_eq!(stored.1.as_deref(), Some("Royal Mail Tracked 24"));

        Ok(())
    }

    #[tokio::test]
    async fn confirming_a_lapsed_hold_expires_it() -> TestResult {
        let ctx = context(1).await;
        let now = london_time("2026-10-20T10:00")?;
        let slot = first_slot(&ctx, now).await?;

        let reservation = ctx
            .reservations
            .reserve(
                ReserveRequest {
                    slot,
                    address: address(),
                },
                now,
            )
            .await?;

        let later = london_time("2026-10-20T10:15")?;

        let result = ctx
            .reservations
            .confirm(reservation.uuid, Confirmation::default(), later)
            .await;

        assert!(
            matches!(result, Err(ReservationsServiceError::ReservationExpired)),
            "expected ReservationExpired, got {result:?}"
        );
        assert_eq!(slot_counts(&ctx, slot).await?, (1, 0));

        let again = ctx
            .reservations
            .confirm(reservation.uuid, Confirmation::default(), later)
            .await;

        assert!(
            matches!(
                again,
                Err(ReservationsServiceError::ReservationInvalidState(
                    ReservationStatus::Expired
                ))
            ),
            "expected ReservationInvalidState, got {again:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn cancel_releases_only_live_holds() -> TestResult {
        let ctx = context(1).await;
        let now = london_time("2026-10-20T10:00")?;
        let slot = first_slot(&ctx, now).await?;

        let reservation = ctx
            .reservations
            .reserve(
                ReserveRequest {
                    slot,
                    address: address(),
                },
                now,
            )
            .await?;

        let cancelled = ctx.reservations.cancel(reservation.uuid, now).await?;
        let repeated = ctx.reservations.cancel(reservation.uuid, now).await?;

        assert_eq!(cancelled.status, ReservationStatus::Expired);
        assert_eq!(repeated, cancelled);
        assert_eq!(slot_counts(&ctx, slot).await?, (1, 0));

        let days = ctx.slots.list_availability(1, now).await?;

        assert!(days.iter().all(|day| day.has_room()));

        Ok(())
    }

    #[tokio::test]
    async fn unknown_reservation_is_not_found() -> TestResult {
        let ctx = context(1).await;
        let now = london_time("2026-10-20T10:00")?;

        let result = ctx.reservations.cancel(ReservationUuid::now_v7(), now).await;

        assert!(
            matches!(result, Err(ReservationsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }
}
