//! Orders Repository

use despatch::options::DeliveryTier;
use jiff_sqlx::{Date as SqlxDate, Timestamp as SqlxTimestamp};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::domain::{
    orders::records::{OrderRecord, OrderUuid},
    rates::models::{Address, PurchasedLabel},
    reservations::records::ReservationRecord,
    slots::records::SlotUuid,
};

const LOCK_ORDER_SQL: &str = include_str!("sql/lock_order.sql");
const ATTACH_RESERVATION_SQL: &str = include_str!("sql/attach_reservation.sql");
const RECORD_LABEL_SQL: &str = include_str!("sql/record_label.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Read an order and hold its row lock until the transaction ends.
    pub(crate) async fn lock_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LOCK_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Copy a confirmed reservation's slot, service and dates onto the order. Returns
    /// `false` when the order does not exist.
    pub(crate) async fn attach_reservation(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        reservation: &ReservationRecord,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(ATTACH_RESERVATION_SQL)
            .bind(order.into_uuid())
            .bind(reservation.slot.into_uuid())
            .bind(&reservation.shipping_rate_id)
            .bind(&reservation.shipping_service)
            .bind(SqlxDate::from(reservation.selected_delivery_date))
            .bind(SqlxDate::from(reservation.calculated_ship_date))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }

    pub(crate) async fn record_label(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        rate_object_id: &str,
        service_name: &str,
        label: &PurchasedLabel,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(RECORD_LABEL_SQL)
            .bind(order.into_uuid())
            .bind(rate_object_id)
            .bind(service_name)
            .bind(&label.label_url)
            .bind(&label.tracking_number)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let delivery_tier: String = row.try_get("delivery_tier")?;

        let delivery_tier =
            delivery_tier
                .parse::<DeliveryTier>()
                .map_err(|e| sqlx::Error::ColumnDecode {
                    index: "delivery_tier".to_string(),
                    source: Box::new(e),
                })?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            delivery_tier,
            shipping_address: Address {
                name: row.try_get("shipping_name")?,
                street1: row.try_get("shipping_street1")?,
                city: row.try_get("shipping_city")?,
                postcode: row.try_get("shipping_postcode")?,
                country: row.try_get("shipping_country")?,
            },
            delivery_slot: row
                .try_get::<Option<Uuid>, _>("delivery_slot_uuid")?
                .map(SlotUuid::from_uuid),
            shipping_rate: row.try_get("shipping_rate")?,
            shipping_service: row.try_get("shipping_service")?,
            selected_delivery_date: row
                .try_get::<Option<SqlxDate>, _>("selected_delivery_date")?
                .map(SqlxDate::to_jiff),
            calculated_ship_date: row
                .try_get::<Option<SqlxDate>, _>("calculated_ship_date")?
                .map(SqlxDate::to_jiff),
            label_url: row.try_get("label_url")?,
            tracking_number: row.try_get("tracking_number")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
