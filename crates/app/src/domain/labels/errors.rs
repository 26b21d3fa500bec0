//! Labels service errors.

use despatch::{calendar::CalendarError, options::DeliveryTier};
use sqlx::Error;
use thiserror::Error;

use crate::domain::rates::RatesGatewayError;

#[derive(Debug, Error)]
pub enum LabelsServiceError {
    #[error("order not found")]
    OrderNotFound,

    #[error("labels are only bought here for timed orders, not {0}")]
    NotTimedDelivery(DeliveryTier),

    #[error("order has no committed delivery and ship dates")]
    MissingSchedule,

    #[error("no carrier service can still meet the committed delivery date")]
    NoQualifyingRate,

    #[error("carrier API failure")]
    CarrierApi(#[source] RatesGatewayError),

    #[error("label purchase failed")]
    LabelPurchase(#[source] RatesGatewayError),

    #[error("date arithmetic out of range")]
    Calendar(#[from] CalendarError),

    #[error("storage error")]
    Sql(#[from] Error),
}

impl From<RatesGatewayError> for LabelsServiceError {
    fn from(error: RatesGatewayError) -> Self {
        if error.is_label_purchase() {
            Self::LabelPurchase(error)
        } else {
            Self::CarrierApi(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refused_purchases_are_told_apart_from_outages() {
        let refused = LabelsServiceError::from(RatesGatewayError::LabelPurchase {
            status: "ERROR".to_string(),
            messages: "Rate expired".to_string(),
        });

        let outage = LabelsServiceError::from(RatesGatewayError::UnexpectedStatus {
            status: 503,
            body: String::new(),
        });

        assert!(
            matches!(refused, LabelsServiceError::LabelPurchase(_)),
            "expected LabelPurchase, got {refused:?}"
        );
        assert!(
            matches!(outage, LabelsServiceError::CarrierApi(_)),
            "expected CarrierApi, got {outage:?}"
        );
    }
}
