//! Slots service.

use std::sync::Arc;

use async_trait::async_trait;
use despatch::calendar::WorkingCalendar;
use jiff::Timestamp;
use mockall::automock;
use tracing::debug;

use crate::{
    config::DeliveryConfig,
    database::Db,
    domain::{
        reservations::PgReservationSweeper,
        slots::{
            errors::SlotsServiceError,
            records::{DayAvailability, WindowAvailability},
            repository::PgSlotsRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgSlotsService {
    db: Db,
    config: Arc<DeliveryConfig>,
    calendar: WorkingCalendar,
    repository: PgSlotsRepository,
    sweeper: PgReservationSweeper,
}

impl PgSlotsService {
    #[must_use]
    pub fn new(db: Db, config: Arc<DeliveryConfig>) -> Self {
        Self {
            calendar: config.calendar(),
            sweeper: PgReservationSweeper::new(db.clone()),
            repository: PgSlotsRepository::new(),
            db,
            config,
        }
    }
}

#[async_trait]
impl SlotsService for PgSlotsService {
    #[tracing::instrument(name = "slots.service.ensure_slots_for_window", skip(self), err)]
    async fn ensure_slots_for_window(
        &self,
        days: usize,
        now: Timestamp,
    ) -> Result<u64, SlotsServiceError> {
        let dates = self.calendar.upcoming_working_days(now, days)?;
        let mut tx = self.db.begin().await?;
        let mut created = 0;

        for date in dates {
            for window in &self.config.time_windows {
                created += self
                    .repository
                    .insert_slot_if_missing(&mut tx, date, *window, self.config.slot_capacity)
                    .await?;
            }
        }

        tx.commit().await?;

        debug!(created, "materialised delivery slots");

        Ok(created)
    }

    #[tracing::instrument(name = "slots.service.list_availability", skip(self), err)]
    async fn list_availability(
        &self,
        days: usize,
        now: Timestamp,
    ) -> Result<Vec<DayAvailability>, SlotsServiceError> {
        self.sweeper.release_expired(now).await?;
        self.ensure_slots_for_window(days, now).await?;

        let dates = self.calendar.upcoming_working_days(now, days)?;

        let (Some(first), Some(last)) = (dates.first().copied(), dates.last().copied()) else {
            return Ok(Vec::new());
        };

        let mut tx = self.db.begin().await?;
        let slots = self.repository.list_slots(&mut tx, first, last).await?;
        tx.commit().await?;

        let mut listed = Vec::with_capacity(dates.len());

        for date in dates {
            let windows = slots
                .iter()
                .filter(|slot| slot.delivery_date == date)
                .filter(|slot| self.config.time_windows.contains(&slot.time_window))
                .map(|slot| WindowAvailability {
                    slot: slot.uuid,
                    time_window: slot.time_window,
                    availability: slot.availability(),
                })
                .collect();

            listed.push(DayAvailability {
                date,
                selectable: self.calendar.is_selectable_delivery_date(date, now)?,
                windows,
            });
        }

        Ok(listed)
    }
}

#[automock]
#[async_trait]
pub trait SlotsService: Send + Sync {
    /// Materialise slots for the next `days` working days. Existing slots keep their counts.
    /// Returns how many slots were created.
    async fn ensure_slots_for_window(
        &self,
        days: usize,
        now: Timestamp,
    ) -> Result<u64, SlotsServiceError>;

    /// Capacity of every window over the next `days` working days, after releasing lapsed
    /// holds.
    async fn list_availability(
        &self,
        days: usize,
        now: Timestamp,
    ) -> Result<Vec<DayAvailability>, SlotsServiceError>;
}
