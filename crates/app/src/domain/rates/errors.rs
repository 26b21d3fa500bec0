//! Rate gateway errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RatesGatewayError {
    #[error("carrier API unreachable")]
    Transport(#[from] reqwest::Error),

    #[error("carrier API responded with status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("failed to encode carrier request")]
    Encode(#[from] serde_json::Error),

    #[error("label purchase failed with status {status}: {messages}")]
    LabelPurchase { status: String, messages: String },
}

impl RatesGatewayError {
    /// Whether this error came from a refused label purchase rather than an unreachable or
    /// misbehaving provider.
    pub fn is_label_purchase(&self) -> bool {
        matches!(self, Self::LabelPurchase { .. })
    }
}
