//! Labels service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use despatch::{
    calendar::WorkingCalendar,
    options::DeliveryTier,
    rates::{prefer_service, qualifying_rates},
};
use jiff::Timestamp;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    config::DeliveryConfig,
    database::Db,
    domain::{
        labels::errors::LabelsServiceError,
        orders::{
            records::{OrderRecord, OrderUuid},
            repository::PgOrdersRepository,
        },
        rates::RatesGateway,
    },
};

#[derive(Clone)]
pub struct PgLabelsService {
    db: Db,
    config: Arc<DeliveryConfig>,
    calendar: WorkingCalendar,
    rates: Arc<dyn RatesGateway>,
    orders: PgOrdersRepository,
}

impl PgLabelsService {
    #[must_use]
    pub fn new(db: Db, config: Arc<DeliveryConfig>, rates: Arc<dyn RatesGateway>) -> Self {
        Self {
            calendar: config.calendar(),
            orders: PgOrdersRepository::new(),
            db,
            config,
            rates,
        }
    }
}

impl fmt::Debug for PgLabelsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgLabelsService")
            .field("calendar", &self.calendar)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LabelsService for PgLabelsService {
    #[tracing::instrument(
        name = "labels.service.purchase_label",
        skip(self),
        fields(order_uuid = %order),
        err
    )]
    async fn purchase_label(
        &self,
        order: OrderUuid,
        now: Timestamp,
    ) -> Result<OrderRecord, LabelsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self
            .orders
            .lock_order(&mut tx, order)
            .await?
            .ok_or(LabelsServiceError::OrderNotFound)?;

        if record.delivery_tier != DeliveryTier::Timed {
            return Err(LabelsServiceError::NotTimedDelivery(record.delivery_tier));
        }

        if record.has_label() {
            return Ok(record);
        }

        let (Some(delivery_date), Some(ship_date)) =
            (record.selected_delivery_date, record.calculated_ship_date)
        else {
            return Err(LabelsServiceError::MissingSchedule);
        };

        let rates = self
            .rates
            .fetch_rates(
                &self
                    .config
                    .rate_request(&record.shipping_address, Some(ship_date)),
            )
            .await?;

        let qualifying = qualifying_rates(&rates, delivery_date, &self.calendar, now)?;

        let Some(winner) = prefer_service(qualifying, record.shipping_service.as_deref()) else {
            warn!(%delivery_date, "no carrier service qualifies for committed delivery date");

            return Err(LabelsServiceError::NoQualifyingRate);
        };

        let label = self.rates.purchase_label(&winner.rate.object_id).await?;

        let updated = self
            .orders
            .record_label(
                &mut tx,
                order,
                &winner.rate.object_id,
                &winner.rate.service_name,
                &label,
            )
            .await?;

        tx.commit().await?;

        info!(
            service = %winner.rate.service_name,
            tracking_number = %label.tracking_number,
            "purchased shipping label"
        );

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait LabelsService: Send + Sync {
    /// Buy the shipping label for a confirmed timed order. An order that already has a label
    /// is returned unchanged.
    async fn purchase_label(
        &self,
        order: OrderUuid,
        now: Timestamp,
    ) -> Result<OrderRecord, LabelsServiceError>;
}
