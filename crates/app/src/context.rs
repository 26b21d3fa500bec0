//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    config::DeliveryConfig,
    database::{self, Db, PoolSettings},
    domain::{
        labels::{LabelsService, PgLabelsService},
        options::{DeliveryOptionsFacade, DeliveryOptionsService},
        rates::{CarrierApiConfig, RatesGateway, RatesGatewayError, ShippoGateway},
        reservations::{PgReservationsService, ReservationsService},
        slots::{PgSlotsService, SlotsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrate(#[source] sqlx::migrate::MigrateError),

    #[error("failed to build carrier API client")]
    Gateway(#[source] RatesGatewayError),
}

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<DeliveryConfig>,
    pub slots: Arc<dyn SlotsService>,
    pub reservations: Arc<dyn ReservationsService>,
    pub labels: Arc<dyn LabelsService>,
    pub options: Arc<dyn DeliveryOptionsService>,
}

impl AppContext {
    /// Wire every service over one database and one carrier client.
    #[must_use]
    pub fn new(db: Db, config: DeliveryConfig, rates: Arc<dyn RatesGateway>) -> Self {
        let config = Arc::new(config);
        let slots: Arc<dyn SlotsService> =
            Arc::new(PgSlotsService::new(db.clone(), Arc::clone(&config)));

        Self {
            reservations: Arc::new(PgReservationsService::new(
                db.clone(),
                Arc::clone(&config),
                Arc::clone(&rates),
            )),
            labels: Arc::new(PgLabelsService::new(
                db,
                Arc::clone(&config),
                Arc::clone(&rates),
            )),
            options: Arc::new(DeliveryOptionsFacade::new(
                Arc::clone(&config),
                Arc::clone(&slots),
                rates,
            )),
            slots,
            config,
        }
    }

    /// Build application context from a database URL, applying pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error when connecting, migrating or building the carrier client fails.
    pub async fn from_database_url(
        url: &str,
        pool: PoolSettings,
        config: DeliveryConfig,
        carrier: CarrierApiConfig,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect_with(url, pool)
            .await
            .map_err(AppInitError::Database)?;

        database::migrate(&pool)
            .await
            .map_err(AppInitError::Migrate)?;

        let rates: Arc<dyn RatesGateway> =
            Arc::new(ShippoGateway::new(carrier).map_err(AppInitError::Gateway)?);

        Ok(Self::new(Db::new(pool), config, rates))
    }
}
