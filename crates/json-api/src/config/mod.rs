//! Server configuration module

use clap::Parser;
use despatch_app::config::args::DeliveryArgs;

use crate::config::{
    carrier::CarrierConfig,
    db::DatabaseConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    server::ServerRuntimeConfig,
};

pub(crate) mod carrier;
pub(crate) mod db;
pub(crate) mod observability;
pub(crate) mod server;

/// Despatch JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "despatch-json", about = "Despatch JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Observability (traces/metrics) settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Delivery scheduling settings.
    #[command(flatten)]
    pub delivery: DeliveryArgs,

    /// Rate-shopping provider settings.
    #[command(flatten)]
    pub carrier: CarrierConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn minimal_arguments_use_documented_defaults() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "despatch-json",
            "--database-url",
            "postgres://localhost/despatch",
            "--carrier-api-token",
            "shippo_test_token",
        ])?;

        assert_eq!(config.socket_addr(), "0.0.0.0:8080");
        assert_eq!(
            config.database.pool_settings(),
            despatch_app::database::PoolSettings::default()
        );
        assert_eq!(config.delivery.slot_capacity, 10);
        assert_eq!(config.delivery.cutoff_hour, 16);
        assert_eq!(config.carrier.rate_cache_ttl_seconds, 300);

        Ok(())
    }

    #[test]
    fn cutoff_hour_must_be_a_clock_hour() {
        let result = ServerConfig::try_parse_from([
            "despatch-json",
            "--database-url",
            "postgres://localhost/despatch",
            "--carrier-api-token",
            "shippo_test_token",
            "--cutoff-hour",
            "24",
        ]);

        assert!(result.is_err(), "expected cutoff hour 24 to be rejected");
    }

    #[test]
    fn telemetry_is_local_unless_enabled() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "despatch-json",
            "--database-url",
            "postgres://localhost/despatch",
            "--carrier-api-token",
            "shippo_test_token",
            "--log-format",
            "json",
        ])?;

        assert!(
            matches!(config.logging.log_format, observability::LogFormat::Json),
            "expected json log format"
        );
        assert!(!config.observability.otel_enabled, "otel should be off by default");
        assert_eq!(config.observability.otel_service_name, "despatch-json");

        Ok(())
    }
}
