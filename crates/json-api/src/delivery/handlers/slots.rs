//! Delivery Slots Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use despatch_app::domain::slots::records::{DayAvailability, WindowAvailability};

use crate::{delivery::errors::slots_status_error, extensions::*, state::State};

/// Delivery Slots Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DeliverySlotsResponse {
    /// Upcoming working days, earliest first
    pub days: Vec<DeliveryDayResponse>,
}

/// Delivery Day Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DeliveryDayResponse {
    /// Delivery date (`YYYY-MM-DD`)
    pub date: String,

    /// Whether the date can still be chosen
    pub selectable: bool,

    /// Time windows on this date
    pub windows: Vec<DeliveryWindowResponse>,
}

impl From<DayAvailability> for DeliveryDayResponse {
    fn from(day: DayAvailability) -> Self {
        Self {
            date: day.date.to_string(),
            selectable: day.selectable,
            windows: day.windows.into_iter().map(Into::into).collect(),
        }
    }
}

/// Delivery Window Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DeliveryWindowResponse {
    /// Slot to reserve for this window
    pub slot_id: Uuid,

    /// Window label, e.g. `08:00-12:00`
    pub time_window: String,

    pub capacity: u32,

    pub reserved_count: u32,

    pub remaining: u32,

    /// Whether the window has room
    pub available: bool,
}

impl From<WindowAvailability> for DeliveryWindowResponse {
    fn from(window: WindowAvailability) -> Self {
        Self {
            slot_id: window.slot.into_uuid(),
            time_window: window.time_window.to_string(),
            capacity: window.availability.capacity,
            reserved_count: window.availability.reserved_count,
            remaining: window.availability.remaining,
            available: window.availability.available,
        }
    }
}

/// Delivery Slots Handler
///
/// Lists capacity for every window over the configured number of working days.
#[endpoint(
    tags("delivery"),
    summary = "List Delivery Slots",
    responses(
        (status_code = StatusCode::OK, description = "Delivery days and windows"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    postcode: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<DeliverySlotsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    // Slots are not routed by area yet; the postcode is only logged.
    debug!(postcode = ?postcode.into_inner(), "listing delivery slots");

    let days = state
        .app
        .slots
        .list_availability(state.app.config.window_days, state.now())
        .await
        .map_err(slots_status_error)?;

    Ok(Json(DeliverySlotsResponse {
        days: days.into_iter().map(Into::into).collect(),
    }))
}
