//! Reservations Repository

use despatch::reservations::ReservationStatus;
use jiff::Timestamp;
use jiff_sqlx::{Date as SqlxDate, Timestamp as SqlxTimestamp};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};
use uuid::Uuid;

use crate::domain::{
    orders::records::OrderUuid,
    reservations::{
        data::NewReservation,
        records::{ReservationRecord, ReservationUuid},
    },
    slots::records::SlotUuid,
};

const CREATE_RESERVATION_SQL: &str = include_str!("sql/create_reservation.sql");
const LOCK_RESERVATION_SQL: &str = include_str!("sql/lock_reservation.sql");
const CONFIRM_RESERVATION_SQL: &str = include_str!("sql/confirm_reservation.sql");
const EXPIRE_RESERVATION_SQL: &str = include_str!("sql/expire_reservation.sql");
const LIST_LAPSED_RESERVATIONS_SQL: &str = include_str!("sql/list_lapsed_reservations.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgReservationsRepository;

impl PgReservationsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_reservation(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reservation: NewReservation,
        now: Timestamp,
    ) -> Result<ReservationRecord, sqlx::Error> {
        query_as::<Postgres, ReservationRecord>(CREATE_RESERVATION_SQL)
            .bind(ReservationUuid::now_v7().into_uuid())
            .bind(reservation.slot.into_uuid())
            .bind(SqlxTimestamp::from(reservation.expires_at))
            .bind(SqlxDate::from(reservation.selected_delivery_date))
            .bind(SqlxDate::from(reservation.calculated_ship_date))
            .bind(reservation.shipping_service)
            .bind(reservation.shipping_rate_id)
            .bind(SqlxTimestamp::from(now))
            .fetch_one(&mut **tx)
            .await
    }

    /// Read a reservation and hold its row lock until the transaction ends.
    pub(crate) async fn lock_reservation(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reservation: ReservationUuid,
    ) -> Result<Option<ReservationRecord>, sqlx::Error> {
        query_as::<Postgres, ReservationRecord>(LOCK_RESERVATION_SQL)
            .bind(reservation.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn confirm_reservation(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reservation: ReservationUuid,
        order: Option<OrderUuid>,
        shipping_rate_id: &str,
        now: Timestamp,
    ) -> Result<ReservationRecord, sqlx::Error> {
        query_as::<Postgres, ReservationRecord>(CONFIRM_RESERVATION_SQL)
            .bind(reservation.into_uuid())
            .bind(SqlxTimestamp::from(now))
            .bind(order.map(OrderUuid::into_uuid))
            .bind(shipping_rate_id)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn expire_reservation(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reservation: ReservationUuid,
        now: Timestamp,
    ) -> Result<ReservationRecord, sqlx::Error> {
        query_as::<Postgres, ReservationRecord>(EXPIRE_RESERVATION_SQL)
            .bind(reservation.into_uuid())
            .bind(SqlxTimestamp::from(now))
            .fetch_one(&mut **tx)
            .await
    }

    /// Reservations still `reserved` whose hold had lapsed by `now`, oldest first.
    pub(crate) async fn list_lapsed_reservations(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        now: Timestamp,
    ) -> Result<Vec<ReservationUuid>, sqlx::Error> {
        let uuids: Vec<Uuid> = query_scalar(LIST_LAPSED_RESERVATIONS_SQL)
            .bind(SqlxTimestamp::from(now))
            .fetch_all(&mut **tx)
            .await?;

        Ok(uuids.into_iter().map(ReservationUuid::from_uuid).collect())
    }
}

impl<'r> FromRow<'r, PgRow> for ReservationRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        let status = status
            .parse::<ReservationStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: ReservationUuid::from_uuid(row.try_get("uuid")?),
            slot: SlotUuid::from_uuid(row.try_get("slot_uuid")?),
            status,
            expires_at: row.try_get::<SqlxTimestamp, _>("expires_at")?.to_jiff(),
            selected_delivery_date: row
                .try_get::<SqlxDate, _>("selected_delivery_date")?
                .to_jiff(),
            calculated_ship_date: row
                .try_get::<SqlxDate, _>("calculated_ship_date")?
                .to_jiff(),
            shipping_service: row.try_get("shipping_service")?,
            shipping_rate_id: row.try_get("shipping_rate_id")?,
            order: row
                .try_get::<Option<Uuid>, _>("order_uuid")?
                .map(OrderUuid::from_uuid),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            confirmed_at: row
                .try_get::<Option<SqlxTimestamp>, _>("confirmed_at")?
                .map(SqlxTimestamp::to_jiff),
            expired_at: row
                .try_get::<Option<SqlxTimestamp>, _>("expired_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
