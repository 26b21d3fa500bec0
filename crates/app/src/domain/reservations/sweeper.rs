//! Expiry sweep
//!
//! Releases lapsed holds lazily: every path that reads or writes reservations runs the sweep
//! first rather than relying on a timer.

use despatch::reservations::{ReleaseAction, sweep_action};
use jiff::Timestamp;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        reservations::{records::ReservationUuid, repository::PgReservationsRepository},
        slots::repository::PgSlotsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgReservationSweeper {
    db: Db,
    reservations: PgReservationsRepository,
    slots: PgSlotsRepository,
}

impl PgReservationSweeper {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            reservations: PgReservationsRepository::new(),
            slots: PgSlotsRepository::new(),
        }
    }

    /// Expire every lapsed hold and give its unit back. Returns how many were released.
    ///
    /// Safe to run concurrently: each reservation is re-checked under its row lock, so a
    /// hold is released at most once and never after it has been confirmed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or updated.
    #[tracing::instrument(name = "reservations.sweeper.release_expired", skip(self), err)]
    pub async fn release_expired(&self, now: Timestamp) -> Result<u64, sqlx::Error> {
        let mut tx = self.db.begin().await?;
        let lapsed = self.reservations.list_lapsed_reservations(&mut tx, now).await?;
        tx.commit().await?;

        let mut released = 0;

        for reservation in lapsed {
            if self.release_one(reservation, now).await? {
                released += 1;
            }
        }

        if released > 0 {
            info!(released, "released lapsed reservations");
        }

        Ok(released)
    }

    async fn release_one(
        &self,
        reservation: ReservationUuid,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let Some(record) = self.reservations.lock_reservation(&mut tx, reservation).await? else {
            return Ok(false);
        };

        if sweep_action(record.status, record.expires_at, now) == ReleaseAction::Skip {
            return Ok(false);
        }

        self.slots.release_reserved(&mut tx, record.slot).await?;
        self.reservations
            .expire_reservation(&mut tx, reservation, now)
            .await?;

        tx.commit().await?;

        Ok(true)
    }
}
