//! Test Helpers

use despatch::rates::CarrierRate;
use jiff::{Timestamp, Zoned};
use rust_decimal::Decimal;

use crate::{
    domain::{
        orders::records::OrderUuid,
        rates::{MockRatesGateway, models::Address},
        slots::{SlotsService, SlotsServiceError, records::SlotUuid},
    },
    test::TestContext,
};

/// Parse `YYYY-MM-DDTHH:MM` as a London wall-clock time.
pub(crate) fn london_time(datetime: &str) -> Result<Timestamp, jiff::Error> {
    Ok(format!("{datetime}[Europe/London]")
        .parse::<Zoned>()?
        .timestamp())
}

pub(crate) fn address() -> Address {
    Address {
        name: Some("Ada Lovelace".to_string()),
        street1: Some("10 Downing Street".to_string()),
        city: Some("London".to_string()),
        postcode: Some("SW1A 1AA".to_string()),
        country: Some("GB".to_string()),
    }
}

/// A carrier quoting a single one-day service.
pub(crate) fn next_day_rates() -> MockRatesGateway {
    let mut rates = MockRatesGateway::new();

    rates.expect_fetch_rates().returning(|_| {
        Ok(vec![CarrierRate::from_parts(
            Some("Royal Mail"),
            Some("Tracked 24"),
            Some(1),
            Some(Decimal::new(450, 2)),
            "rate_rm_tracked_24",
        )])
    });

    rates
}

/// The earliest window of the first listed delivery day.
pub(crate) async fn first_slot(
    ctx: &TestContext,
    now: Timestamp,
) -> Result<SlotUuid, SlotsServiceError> {
    ctx.slots
        .list_availability(1, now)
        .await?
        .into_iter()
        .flat_map(|day| day.windows)
        .map(|window| window.slot)
        .next()
        .ok_or(SlotsServiceError::NotFound)
}

/// `(capacity, reserved_count)` as stored.
pub(crate) async fn slot_counts(
    ctx: &TestContext,
    slot: SlotUuid,
) -> Result<(u32, u32), sqlx::Error> {
    let (capacity, reserved): (i32, i32) =
        sqlx::query_as("SELECT capacity, reserved_count FROM delivery_slots WHERE uuid = $1")
            .bind(slot.into_uuid())
            .fetch_one(ctx.db.pool())
            .await?;

    let decode = |value: i32| {
        u32::try_from(value).map_err(|error| sqlx::Error::Decode(Box::new(error)))
    };

    Ok((decode(capacity)?, decode(reserved)?))
}

pub(crate) async fn create_order(ctx: &TestContext, tier: &str) -> Result<OrderUuid, sqlx::Error> {
    let order = OrderUuid::now_v7();
    let address = address();

    sqlx::query(
        "INSERT INTO orders (
            uuid,
            delivery_tier,
            shipping_name,
            shipping_street1,
            shipping_city,
            shipping_postcode,
            shipping_country
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(order.into_uuid())
    .bind(tier)
    .bind(address.name)
    .bind(address.street1)
    .bind(address.city)
    .bind(address.postcode)
    .bind(address.country)
    .execute(ctx.db.pool())
    .await?;

    Ok(order)
}
