//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};

use despatch_app::{
    config::DeliveryConfig,
    context::AppContext,
    domain::{
        labels::MockLabelsService, options::MockDeliveryOptionsService,
        reservations::MockReservationsService, slots::MockSlotsService,
    },
};

use crate::state::State;

/// 2026-10-20 10:00 in London.
pub(crate) fn test_now() -> Timestamp {
    Timestamp::constant(1_792_486_800, 0)
}

/// One mock per service. Start from [`Mocks::strict`] and replace the ones under test.
pub(crate) struct Mocks {
    pub(crate) slots: MockSlotsService,
    pub(crate) reservations: MockReservationsService,
    pub(crate) labels: MockLabelsService,
    pub(crate) options: MockDeliveryOptionsService,
}

impl Mocks {
    pub(crate) fn strict() -> Self {
        let mut slots = MockSlotsService::new();

        slots.expect_ensure_slots_for_window().never();
        slots.expect_list_availability().never();

        let mut reservations = MockReservationsService::new();

        reservations.expect_reserve().never();
        reservations.expect_confirm().never();
        reservations.expect_cancel().never();
        reservations.expect_release_expired_reservations().never();

        let mut labels = MockLabelsService::new();

        labels.expect_purchase_label().never();

        let mut options = MockDeliveryOptionsService::new();

        options.expect_delivery_options().never();

        Self {
            slots,
            reservations,
            labels,
            options,
        }
    }
}

fn app_context(mocks: Mocks) -> AppContext {
    AppContext {
        config: Arc::new(DeliveryConfig::default()),
        slots: Arc::new(mocks.slots),
        reservations: Arc::new(mocks.reservations),
        labels: Arc::new(mocks.labels),
        options: Arc::new(mocks.options),
    }
}

pub(crate) fn delivery_service(mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(Arc::new(State::with_clock(
                app_context(mocks),
                test_now,
            ))))
            .push(route),
    )
}
