//! Test context for service-level integration tests.

use std::sync::Arc;

use crate::{
    config::DeliveryConfig,
    database::Db,
    domain::{
        labels::PgLabelsService,
        rates::{MockRatesGateway, RatesGateway},
        reservations::PgReservationsService,
        slots::PgSlotsService,
    },
};

use super::db::TestDb;

pub struct TestContext {
    pub db: TestDb,
    pub config: Arc<DeliveryConfig>,
    pub slots: PgSlotsService,
    pub reservations: PgReservationsService,
    pub labels: PgLabelsService,
}

impl TestContext {
    /// Services over a fresh database, quoting through `rates`.
    pub async fn new(config: DeliveryConfig, rates: MockRatesGateway) -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());
        let config = Arc::new(config);
        let rates: Arc<dyn RatesGateway> = Arc::new(rates);

        Self {
            slots: PgSlotsService::new(db.clone(), Arc::clone(&config)),
            reservations: PgReservationsService::new(
                db.clone(),
                Arc::clone(&config),
                Arc::clone(&rates),
            ),
            labels: PgLabelsService::new(db, Arc::clone(&config), rates),
            config,
            db: test_db,
        }
    }

    /// Services for tests that never reach the carrier.
    pub async fn with_config(config: DeliveryConfig) -> Self {
        Self::new(config, MockRatesGateway::new()).await
    }
}
