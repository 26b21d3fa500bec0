//! Purchase Label Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{extensions::*, orders::errors::labels_status_error, state::State};

/// Shipping Label Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ShippingLabelResponse {
    pub order_id: Uuid,

    /// Printable label document
    pub label_url: String,

    pub tracking_number: String,

    /// Carrier service the label was bought for
    pub shipping_service: Option<String>,
}

/// Purchase Label Handler
///
/// Buys the label for a timed order from a carrier service that still meets its delivery date.
/// Orders that already have a label return it unchanged.
#[endpoint(
    tags("orders"),
    summary = "Purchase Shipping Label",
    responses(
        (status_code = StatusCode::OK, description = "Label purchased"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Order cannot be labelled"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Carrier failure"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.label",
    skip(order, depot),
    fields(order_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ShippingLabelResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let order = order.into_inner();

    tracing::Span::current().record("order_uuid", tracing::field::display(order));

    let labelled = state
        .app
        .labels
        .purchase_label(order.into(), state.now())
        .await
        .map_err(labels_status_error)?;

    let label_url = labelled
        .label_url
        .ok_or("label URL missing")
        .or_500("purchased label was not recorded")?;

    let tracking_number = labelled
        .tracking_number
        .ok_or("tracking number missing")
        .or_500("purchased label was not recorded")?;

    tracing::info!(order_uuid = %order, %tracking_number, "label purchased");

    Ok(Json(ShippingLabelResponse {
        order_id: labelled.uuid.into_uuid(),
        label_url,
        tracking_number,
        shipping_service: labelled.shipping_service,
    }))
}
