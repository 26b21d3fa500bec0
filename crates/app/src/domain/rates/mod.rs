//! Carrier Rates

pub mod errors;
pub mod gateway;
pub mod models;
mod wire;

pub use errors::RatesGatewayError;
pub use gateway::*;
