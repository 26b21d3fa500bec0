//! Rates gateway.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use despatch::rates::CarrierRate;
use mockall::automock;
use moka::future::Cache;
use reqwest::{Client, Response, header::AUTHORIZATION};
use tracing::debug;

use crate::domain::rates::{
    errors::RatesGatewayError,
    models::{PurchasedLabel, RateRequest},
    wire::{
        LABEL_FILE_TYPE, SUCCESS_STATUS, ShipmentPayload, ShipmentResponse, TransactionPayload,
        TransactionResponse,
    },
};

const MAX_CACHED_RESPONSES: u64 = 1_000;

/// Connection settings for the rate-shopping provider.
#[derive(Debug, Clone)]
pub struct CarrierApiConfig {
    pub base_url: String,
    pub token: String,
    pub cache_ttl: Duration,
    pub timeout: Duration,
}

/// Rate-shopping provider client that caches raw quote responses by request body.
#[derive(Debug, Clone)]
pub struct ShippoGateway {
    client: Client,
    config: CarrierApiConfig,
    cache: Cache<String, Arc<ShipmentResponse>>,
}

impl ShippoGateway {
    /// Build a gateway with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn new(config: CarrierApiConfig) -> Result<Self, RatesGatewayError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            cache: Cache::builder()
                .max_capacity(MAX_CACHED_RESPONSES)
                .time_to_live(config.cache_ttl)
                .build(),
            config,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn authorization(&self) -> String {
        format!("ShippoToken {}", self.config.token)
    }

    async fn ensure_success(response: Response) -> Result<Response, RatesGatewayError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();

        Err(RatesGatewayError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl RatesGateway for ShippoGateway {
    #[tracing::instrument(
        name = "rates.gateway.fetch_rates",
        skip(self, request),
        fields(ship_date = ?request.ship_date),
        err
    )]
    async fn fetch_rates(&self, request: &RateRequest) -> Result<Vec<CarrierRate>, RatesGatewayError> {
        let payload = ShipmentPayload::from(request);
        let key = serde_json::to_string(&payload)?;

        if let Some(cached) = self.cache.get(&key).await {
            debug!("carrier rate cache hit");

            return Ok(cached.carrier_rates());
        }

        debug!("carrier rate cache miss");

        let response = self
            .client
            .post(self.endpoint("shipments"))
            .header(AUTHORIZATION, self.authorization())
            .json(&payload)
            .send()
            .await?;

        let shipment: ShipmentResponse = Self::ensure_success(response).await?.json().await?;
        let rates = shipment.carrier_rates();

        self.cache.insert(key, Arc::new(shipment)).await;

        Ok(rates)
    }

    #[tracing::instrument(name = "rates.gateway.purchase_label", skip(self), err)]
    async fn purchase_label(&self, rate_object_id: &str) -> Result<PurchasedLabel, RatesGatewayError> {
        let payload = TransactionPayload {
            rate: rate_object_id,
            label_file_type: LABEL_FILE_TYPE,
            asynchronous: false,
        };

        let response = self
            .client
            .post(self.endpoint("transactions"))
            .header(AUTHORIZATION, self.authorization())
            .json(&payload)
            .send()
            .await?;

        let transaction: TransactionResponse = Self::ensure_success(response).await?.json().await?;

        match transaction {
            TransactionResponse {
                ref status,
                label_url: Some(label_url),
                tracking_number: Some(tracking_number),
                ..
            } if status.eq_ignore_ascii_case(SUCCESS_STATUS) => Ok(PurchasedLabel {
                label_url,
                tracking_number,
            }),
            failed => Err(RatesGatewayError::LabelPurchase {
                messages: failed.messages(),
                status: failed.status,
            }),
        }
    }
}

#[automock]
#[async_trait]
pub trait RatesGateway: Send + Sync {
    /// Quotes for shipping a parcel between two addresses, normalised.
    async fn fetch_rates(&self, request: &RateRequest) -> Result<Vec<CarrierRate>, RatesGatewayError>;

    /// Buy a label against a quote's object id.
    async fn purchase_label(&self, rate_object_id: &str) -> Result<PurchasedLabel, RatesGatewayError>;
}
