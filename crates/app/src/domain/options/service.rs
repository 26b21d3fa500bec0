//! Delivery options service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use despatch::{
    calendar::{CalendarError, WorkingCalendar},
    options::{DeliveryOption, DeliveryTier},
    rates::{CarrierRate, cheapest_qualifying, select_standard},
};
use jiff::Timestamp;
use mockall::automock;
use thiserror::Error;
use tracing::warn;

use crate::{
    config::DeliveryConfig,
    domain::{
        rates::{RatesGateway, models::Address},
        slots::SlotsService,
    },
};

const ADDRESS_REQUIRED: &str = "Enter your delivery address to see timed delivery";
const PRICES_UNAVAILABLE: &str = "Delivery prices are temporarily unavailable";
const NO_STANDARD_SERVICE: &str = "Standard delivery is not available for this address";
const NO_NEXT_DAY_SERVICE: &str = "Next day delivery is not available for this address";
const NO_TIMED_SLOTS: &str = "No delivery slots are currently available";
const SLOTS_UNAVAILABLE: &str = "Delivery slots are temporarily unavailable";

#[derive(Debug, Error)]
pub enum DeliveryOptionsError {
    #[error("date arithmetic out of range")]
    Calendar(#[from] CalendarError),
}

/// What the customer has told us so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionsQuery {
    pub address: Address,
    pub member: bool,
}

/// Prices every tier for the checkout page. Carrier or slot store outages mark the affected
/// tiers unavailable instead of failing.
#[derive(Clone)]
pub struct DeliveryOptionsFacade {
    config: Arc<DeliveryConfig>,
    calendar: WorkingCalendar,
    slots: Arc<dyn SlotsService>,
    rates: Arc<dyn RatesGateway>,
}

impl DeliveryOptionsFacade {
    #[must_use]
    pub fn new(
        config: Arc<DeliveryConfig>,
        slots: Arc<dyn SlotsService>,
        rates: Arc<dyn RatesGateway>,
    ) -> Self {
        Self {
            calendar: config.calendar(),
            config,
            slots,
            rates,
        }
    }

    fn price(&self, tier: DeliveryTier, member: bool) -> u32 {
        self.config.pricing.price_for(tier, member)
    }

    fn standard(&self, rates: Option<&Quotes>, member: bool) -> DeliveryOption {
        let price = self.price(DeliveryTier::Standard, member);

        match rates {
            None => DeliveryOption::available(DeliveryTier::Standard, price, None),
            Some(Quotes::Failed) => {
                DeliveryOption::unavailable(DeliveryTier::Standard, price, PRICES_UNAVAILABLE)
            }
            Some(Quotes::Fetched(rates)) => match select_standard(rates) {
                Some(rate) => DeliveryOption::available(
                    DeliveryTier::Standard,
                    price,
                    Some(rate.service_name.clone()),
                ),
                None => {
                    DeliveryOption::unavailable(DeliveryTier::Standard, price, NO_STANDARD_SERVICE)
                }
            },
        }
    }

    fn next_day(
        &self,
        rates: Option<&Quotes>,
        member: bool,
        now: Timestamp,
    ) -> Result<DeliveryOption, DeliveryOptionsError> {
        let price = self.price(DeliveryTier::NextDay, member);

        if self.calendar.next_day_delivery_date(now)?.is_none() {
            let reason = format!(
                "Order before {}:00 on a working day for next day delivery",
                self.calendar.cutoff_hour()
            );

            return Ok(DeliveryOption::unavailable(
                DeliveryTier::NextDay,
                price,
                reason,
            ));
        }

        Ok(match rates {
            None => DeliveryOption::available(DeliveryTier::NextDay, price, None),
            Some(Quotes::Failed) => {
                DeliveryOption::unavailable(DeliveryTier::NextDay, price, PRICES_UNAVAILABLE)
            }
            Some(Quotes::Fetched(rates)) => match self.config.next_day.select(rates) {
                Some(rate) => DeliveryOption::available(
                    DeliveryTier::NextDay,
                    price,
                    Some(rate.service_name.clone()),
                ),
                None => {
                    DeliveryOption::unavailable(DeliveryTier::NextDay, price, NO_NEXT_DAY_SERVICE)
                }
            },
        })
    }

    async fn timed(
        &self,
        rates: Option<&Quotes>,
        member: bool,
        now: Timestamp,
    ) -> Result<DeliveryOption, DeliveryOptionsError> {
        let price = self.price(DeliveryTier::Timed, member);

        let rates = match rates {
            None => {
                return Ok(DeliveryOption::unavailable(
                    DeliveryTier::Timed,
                    price,
                    ADDRESS_REQUIRED,
                ));
            }
            Some(Quotes::Failed) => {
                return Ok(DeliveryOption::unavailable(
                    DeliveryTier::Timed,
                    price,
                    PRICES_UNAVAILABLE,
                ));
            }
            Some(Quotes::Fetched(rates)) => rates,
        };

        let days = match self
            .slots
            .list_availability(self.config.window_days, now)
            .await
        {
            Ok(days) => days,
            Err(error) => {
                warn!(%error, "slot availability unavailable, timed delivery degraded");

                return Ok(DeliveryOption::unavailable(
                    DeliveryTier::Timed,
                    price,
                    SLOTS_UNAVAILABLE,
                ));
            }
        };

        for day in days.iter().filter(|day| day.selectable && day.has_room()) {
            if let Some(qualifying) = cheapest_qualifying(rates, day.date, &self.calendar, now)? {
                return Ok(DeliveryOption::available(
                    DeliveryTier::Timed,
                    price,
                    Some(qualifying.rate.service_name),
                ));
            }
        }

        Ok(DeliveryOption::unavailable(
            DeliveryTier::Timed,
            price,
            NO_TIMED_SLOTS,
        ))
    }
}

/// Outcome of quoting an address, kept so every tier degrades the same way.
enum Quotes {
    Fetched(Vec<CarrierRate>),
    Failed,
}

impl fmt::Debug for DeliveryOptionsFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryOptionsFacade")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DeliveryOptionsService for DeliveryOptionsFacade {
    #[tracing::instrument(
        name = "options.service.delivery_options",
        skip(self, query),
        fields(member = query.member, has_postcode = query.address.is_quotable()),
        err
    )]
    async fn delivery_options(
        &self,
        query: OptionsQuery,
        now: Timestamp,
    ) -> Result<Vec<DeliveryOption>, DeliveryOptionsError> {
        let quotes = if query.address.is_quotable() {
            let request = self.config.rate_request(&query.address, None);

            Some(match self.rates.fetch_rates(&request).await {
                Ok(rates) => Quotes::Fetched(rates),
                Err(error) => {
                    warn!(%error, "carrier quotes unavailable, delivery tiers degraded");

                    Quotes::Failed
                }
            })
        } else {
            None
        };

        Ok(vec![
            self.standard(quotes.as_ref(), query.member),
            self.next_day(quotes.as_ref(), query.member, now)?,
            self.timed(quotes.as_ref(), query.member, now).await?,
        ])
    }
}

#[automock]
#[async_trait]
pub trait DeliveryOptionsService: Send + Sync {
    /// Availability and price of every tier, in display order.
    async fn delivery_options(
        &self,
        query: OptionsQuery,
        now: Timestamp,
    ) -> Result<Vec<DeliveryOption>, DeliveryOptionsError>;
}

#[cfg(test)]
mod tests {
    use despatch::slots::{SlotAvailability, TimeWindow};
    use jiff::{Zoned, civil::Date};
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::domain::{
        rates::{MockRatesGateway, RatesGatewayError},
        slots::{
            MockSlotsService, SlotsServiceError,
            records::{DayAvailability, SlotUuid, WindowAvailability},
        },
    };

    use super::*;

    fn london(datetime: &str) -> Result<Timestamp, jiff::Error> {
        Ok(format!("{datetime}[Europe/London]").parse::<Zoned>()?.timestamp())
    }

    fn rate(name: &str, days: Option<i64>, amount: i64) -> CarrierRate {
        CarrierRate::from_parts(
            Some(name),
            None,
            days,
            Some(Decimal::new(amount, 2)),
            format!("rate_{amount}"),
        )
    }

    fn quotes() -> Vec<CarrierRate> {
        vec![
            rate("DPD Next Day", Some(1), 600),
            rate("Royal Mail Special Delivery Guaranteed", Some(1), 800),
            rate("Evri Standard", Some(3), 299),
        ]
    }

    fn day(date: Date, selectable: bool, remaining: u32) -> DayAvailability {
        DayAvailability {
            date,
            selectable,
            windows: vec![WindowAvailability {
                slot: SlotUuid::now_v7(),
                time_window: TimeWindow::Morning,
                availability: SlotAvailability::from_counts(2, 2 - remaining),
            }],
        }
    }

    fn facade(slots: MockSlotsService, rates: MockRatesGateway) -> DeliveryOptionsFacade {
        DeliveryOptionsFacade::new(
            Arc::new(DeliveryConfig::default()),
            Arc::new(slots),
            Arc::new(rates),
        )
    }

    fn query(member: bool) -> OptionsQuery {
        OptionsQuery {
            address: Address {
                postcode: Some("SW1A 1AA".to_string()),
                ..Address::default()
            },
            member,
        }
    }

    fn option(options: &[DeliveryOption], tier: DeliveryTier) -> TestResult<DeliveryOption> {
        Ok(options
            .iter()
            .find(|option| option.tier == tier)
            .cloned()
            .ok_or("tier missing")?)
    }

    #[tokio::test]
    async fn quoted_address_prices_every_tier() -> TestResult {
        let mut rates = MockRatesGateway::new();
        rates
            .expect_fetch_rates()
            .times(1)
            .returning(|_| Ok(quotes()));

        let mut slots = MockSlotsService::new();
        slots.expect_list_availability().times(1).returning(|_, _| {
            Ok(vec![
                day(Date::constant(2026, 10, 21), true, 0),
                day(Date::constant(2026, 10, 22), true, 1),
            ])
        });

        let now = london("2026-10-20T10:00")?;
        let options = facade(slots, rates)
            .delivery_options(query(false), now)
            .await?;

        let tiers: Vec<DeliveryTier> = options.iter().map(|option| option.tier).collect();

        assert_eq!(tiers, DeliveryTier::ALL);

        let standard = option(&options, DeliveryTier::Standard)?;
        assert!(standard.available);
        assert_eq!(standard.service_name.as_deref(), Some("Evri Standard"));
        assert_eq!(standard.display_price, "£3.99");

        let next_day = option(&options, DeliveryTier::NextDay)?;
        assert!(next_day.available);
        assert_eq!(
            next_day.service_name.as_deref(),
            Some("Royal Mail Special Delivery Guaranteed")
        );

        let timed = option(&options, DeliveryTier::Timed)?;
        assert!(timed.available);
        assert_eq!(timed.service_name.as_deref(), Some("DPD Next Day"));

        Ok(())
    }

    #[tokio::test]
    async fn members_get_free_standard_delivery() -> TestResult {
        let mut rates = MockRatesGateway::new();
        rates.expect_fetch_rates().returning(|_| Ok(quotes()));

        let mut slots = MockSlotsService::new();
        slots
            .expect_list_availability()
            .returning(|_, _| Ok(Vec::new()));

        let now = london("2026-10-20T10:00")?;
        let options = facade(slots, rates)
            .delivery_options(query(true), now)
            .await?;

        let standard = option(&options, DeliveryTier::Standard)?;
        assert_eq!(standard.price, 0);
        assert_eq!(standard.display_price, "FREE");

        let next_day = option(&options, DeliveryTier::NextDay)?;
        assert_eq!(next_day.price, 799);

        Ok(())
    }

    #[tokio::test]
    async fn without_postcode_timed_needs_an_address() -> TestResult {
        let mut rates = MockRatesGateway::new();
        rates.expect_fetch_rates().never();

        let mut slots = MockSlotsService::new();
        slots.expect_list_availability().never();

        let now = london("2026-10-20T10:00")?;
        let options = facade(slots, rates)
            .delivery_options(OptionsQuery::default(), now)
            .await?;

        assert!(option(&options, DeliveryTier::Standard)?.available);
        assert!(option(&options, DeliveryTier::NextDay)?.available);

        let timed = option(&options, DeliveryTier::Timed)?;
        assert!(!timed.available);
        assert_eq!(timed.unavailable_reason.as_deref(), Some(ADDRESS_REQUIRED));

        Ok(())
    }

    #[tokio::test]
    async fn carrier_outage_degrades_tiers_instead_of_failing() -> TestResult {
        let mut rates = MockRatesGateway::new();
        rates.expect_fetch_rates().returning(|_| {
            Err(RatesGatewayError::UnexpectedStatus {
                status: 502,
                body: String::new(),
            })
        });

        let mut slots = MockSlotsService::new();
        slots.expect_list_availability().never();

        let now = london("2026-10-20T10:00")?;
        let options = facade(slots, rates)
            .delivery_options(query(false), now)
            .await?;

        assert!(options.iter().all(|option| !option.available));
        assert!(options.iter().all(|option| {
            option.unavailable_reason.as_deref() == Some(PRICES_UNAVAILABLE)
        }));

        Ok(())
    }

    #[tokio::test]
    async fn next_day_closes_at_cutoff() -> TestResult {
        let mut rates = MockRatesGateway::new();
        rates.expect_fetch_rates().returning(|_| Ok(quotes()));

        let mut slots = MockSlotsService::new();
        slots
            .expect_list_availability()
            .returning(|_, _| Ok(Vec::new()));

        let now = london("2026-10-20T16:01")?;
        let options = facade(slots, rates)
            .delivery_options(query(false), now)
            .await?;

        let next_day = option(&options, DeliveryTier::NextDay)?;
        assert!(!next_day.available);
        assert_eq!(
            next_day.unavailable_reason.as_deref(),
            Some("Order before 16:00 on a working day for next day delivery")
        );

        Ok(())
    }

    #[tokio::test]
    async fn next_day_requires_an_allow_listed_service() -> TestResult {
        let mut rates = MockRatesGateway::new();
        rates
            .expect_fetch_rates()
            .returning(|_| Ok(vec![rate("Evri Next Day", Some(1), 350)]));

        let mut slots = MockSlotsService::new();
        slots
            .expect_list_availability()
            .returning(|_, _| Ok(Vec::new()));

        let now = london("2026-10-20T10:00")?;
        let options = facade(slots, rates)
            .delivery_options(query(false), now)
            .await?;

        let next_day = option(&options, DeliveryTier::NextDay)?;
        assert!(!next_day.available);
        assert_eq!(
            next_day.unavailable_reason.as_deref(),
            Some(NO_NEXT_DAY_SERVICE)
        );

        Ok(())
    }

    #[tokio::test]
    async fn timed_needs_a_selectable_day_with_room_and_a_carrier() -> TestResult {
        let mut rates = MockRatesGateway::new();
        rates
            .expect_fetch_rates()
            .returning(|_| Ok(vec![rate("Mystery Courier", None, 100)]));

        let mut slots = MockSlotsService::new();
        slots
            .expect_list_availability()
            .returning(|_, _| Ok(vec![day(Date::constant(2026, 10, 22), true, 2)]));

        let now = london("2026-10-20T10:00")?;
        let options = facade(slots, rates)
            .delivery_options(query(false), now)
            .await?;

        let timed = option(&options, DeliveryTier::Timed)?;
        assert!(!timed.available);
        assert_eq!(timed.unavailable_reason.as_deref(), Some(NO_TIMED_SLOTS));

        Ok(())
    }

    #[tokio::test]
    async fn slot_store_outage_degrades_timed_only() -> TestResult {
        let mut rates = MockRatesGateway::new();
        rates.expect_fetch_rates().returning(|_| Ok(quotes()));

        let mut slots = MockSlotsService::new();
        slots
            .expect_list_availability()
            .returning(|_, _| Err(SlotsServiceError::Sql(sqlx::Error::PoolTimedOut)));

        let now = london("2026-10-20T10:00")?;
        let options = facade(slots, rates)
            .delivery_options(query(false), now)
            .await?;

        assert!(option(&options, DeliveryTier::Standard)?.available);

        let timed = option(&options, DeliveryTier::Timed)?;
        assert!(!timed.available);
        assert_eq!(timed.unavailable_reason.as_deref(), Some(SLOTS_UNAVAILABLE));

        Ok(())
    }
}
