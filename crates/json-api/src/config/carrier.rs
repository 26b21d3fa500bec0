//! Carrier Config

use std::time::Duration;

use clap::Args;
use despatch_app::domain::rates::CarrierApiConfig;

/// Rate-shopping provider settings.
#[derive(Debug, Args)]
pub struct CarrierConfig {
    /// Base URL of the rate-shopping API
    #[arg(long, env = "CARRIER_API_URL", default_value = "https://api.goshippo.com")]
    pub carrier_api_url: String,

    /// Rate-shopping API token
    #[arg(long, env = "CARRIER_API_TOKEN", hide_env_values = true)]
    pub carrier_api_token: String,

    /// Request timeout in seconds
    #[arg(long, env = "CARRIER_API_TIMEOUT_SECONDS", default_value_t = 10)]
    pub carrier_api_timeout_seconds: u64,

    /// How long quotes are reused for an identical request, in seconds
    #[arg(long, env = "RATE_CACHE_TTL_SECONDS", default_value_t = 300)]
    pub rate_cache_ttl_seconds: u64,
}

impl CarrierConfig {
    /// Client settings for the rate gateway.
    #[must_use]
    pub fn to_carrier_api_config(&self) -> CarrierApiConfig {
        CarrierApiConfig {
            base_url: self.carrier_api_url.clone(),
            token: self.carrier_api_token.clone(),
            cache_ttl: Duration::from_secs(self.rate_cache_ttl_seconds),
            timeout: Duration::from_secs(self.carrier_api_timeout_seconds),
        }
    }
}
