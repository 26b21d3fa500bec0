//! Slots Repository

use despatch::slots::TimeWindow;
use jiff::civil::Date;
use jiff_sqlx::Date as SqlxDate;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::slots::records::{SlotRecord, SlotUuid};

const INSERT_SLOT_SQL: &str = include_str!("sql/insert_slot.sql");
const LIST_SLOTS_SQL: &str = include_str!("sql/list_slots.sql");
const LOCK_SLOT_SQL: &str = include_str!("sql/lock_slot.sql");
const INCREMENT_RESERVED_SQL: &str = include_str!("sql/increment_reserved.sql");
const RELEASE_RESERVED_SQL: &str = include_str!("sql/release_reserved.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgSlotsRepository;

impl PgSlotsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert a slot unless one already exists for the date and window. Returns rows inserted.
    pub(crate) async fn insert_slot_if_missing(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        delivery_date: Date,
        time_window: TimeWindow,
        capacity: u32,
    ) -> Result<u64, sqlx::Error> {
        let capacity = i32::try_from(capacity).map_err(|e| sqlx::Error::ColumnDecode {
            index: "capacity".to_string(),
            source: Box::new(e),
        })?;

        let rows_affected = query(INSERT_SLOT_SQL)
            .bind(SlotUuid::now_v7().into_uuid())
            .bind(SqlxDate::from(delivery_date))
            .bind(time_window.as_str())
            .bind(capacity)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn list_slots(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        first: Date,
        last: Date,
    ) -> Result<Vec<SlotRecord>, sqlx::Error> {
        query_as::<Postgres, SlotRecord>(LIST_SLOTS_SQL)
            .bind(SqlxDate::from(first))
            .bind(SqlxDate::from(last))
            .fetch_all(&mut **tx)
            .await
    }

    /// Read a slot and hold its row lock until the transaction ends.
    pub(crate) async fn lock_slot(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        slot: SlotUuid,
    ) -> Result<Option<SlotRecord>, sqlx::Error> {
        query_as::<Postgres, SlotRecord>(LOCK_SLOT_SQL)
            .bind(slot.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Take one unit of capacity. Returns `false` when the slot is already full.
    pub(crate) async fn increment_reserved(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        slot: SlotUuid,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(INCREMENT_RESERVED_SQL)
            .bind(slot.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }

    /// Give one unit of capacity back, never going below zero.
    pub(crate) async fn release_reserved(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        slot: SlotUuid,
    ) -> Result<(), sqlx::Error> {
        query(RELEASE_RESERVED_SQL)
            .bind(slot.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

fn count_column(row: &PgRow, column: &str) -> sqlx::Result<u32> {
    let value: i32 = row.try_get(column)?;

    u32::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for SlotRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let time_window: String = row.try_get("time_window")?;

        let time_window =
            time_window
                .parse::<TimeWindow>()
                .map_err(|e| sqlx::Error::ColumnDecode {
                    index: "time_window".to_string(),
                    source: Box::new(e),
                })?;

        Ok(Self {
            uuid: SlotUuid::from_uuid(row.try_get("uuid")?),
            delivery_date: row.try_get::<SqlxDate, _>("delivery_date")?.to_jiff(),
            time_window,
            capacity: count_column(row, "capacity")?,
            reserved_count: count_column(row, "reserved_count")?,
        })
    }
}
