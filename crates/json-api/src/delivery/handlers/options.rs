//! Delivery Options Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use despatch::options::DeliveryOption;
use despatch_app::domain::{options::OptionsQuery, rates::models::Address};

use crate::{delivery::errors::options_status_error, extensions::*, state::State};

/// Delivery Options Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DeliveryOptionsResponse {
    /// Every delivery tier, in display order
    pub options: Vec<DeliveryOptionResponse>,
}

/// Delivery Option Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DeliveryOptionResponse {
    /// `STANDARD`, `NEXT_DAY` or `TIMED`
    pub tier: String,

    /// Whether the tier can be chosen
    pub available: bool,

    /// Price in pence
    pub price: u32,

    /// Price as shown to the customer
    pub display_price: String,

    /// Why the tier cannot be chosen
    pub unavailable_reason: Option<String>,

    /// Carrier service expected to deliver this tier
    pub service_name: Option<String>,
}

impl From<DeliveryOption> for DeliveryOptionResponse {
    fn from(option: DeliveryOption) -> Self {
        Self {
            tier: option.tier.to_string(),
            available: option.available,
            price: option.price,
            display_price: option.display_price,
            unavailable_reason: option.unavailable_reason,
            service_name: option.service_name,
        }
    }
}

/// Delivery Options Handler
///
/// Prices every delivery tier. Carrier outages mark tiers unavailable rather than failing.
#[endpoint(
    tags("delivery"),
    summary = "Get Delivery Options",
    responses(
        (status_code = StatusCode::OK, description = "Delivery options"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    postcode: QueryParam<String, false>,
    country: QueryParam<String, false>,
    city: QueryParam<String, false>,
    street1: QueryParam<String, false>,
    member: QueryParam<bool, false>,
    depot: &mut Depot,
) -> Result<Json<DeliveryOptionsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let query = OptionsQuery {
        address: Address {
            name: None,
            street1: street1.into_inner(),
            city: city.into_inner(),
            postcode: postcode.into_inner(),
            country: country.into_inner(),
        },
        member: member.into_inner().unwrap_or(false),
    };

    let options = state
        .app
        .options
        .delivery_options(query, state.now())
        .await
        .map_err(options_status_error)?;

    Ok(Json(DeliveryOptionsResponse {
        options: options.into_iter().map(Into::into).collect(),
    }))
}
