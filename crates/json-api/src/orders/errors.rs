//! Errors

use salvo::http::StatusError;
use tracing::{error, warn};

use despatch_app::domain::labels::LabelsServiceError;

pub(crate) fn labels_status_error(error: LabelsServiceError) -> StatusError {
    match error {
        LabelsServiceError::OrderNotFound => StatusError::not_found().brief("Order not found"),
        LabelsServiceError::NotTimedDelivery(tier) => {
            StatusError::conflict().brief(format!("Labels are not bought here for {tier} orders"))
        }
        LabelsServiceError::MissingSchedule => {
            StatusError::conflict().brief("The order has no confirmed delivery slot")
        }
        LabelsServiceError::NoQualifyingRate => {
            warn!("label purchase blocked: no carrier service meets the committed date");

            StatusError::conflict().brief("No carrier can still meet the delivery date")
        }
        LabelsServiceError::CarrierApi(source) => {
            error!("carrier API failed while buying label: {source}");

            StatusError::bad_gateway().brief("The carrier is temporarily unavailable")
        }
        LabelsServiceError::LabelPurchase(source) => {
            error!("carrier refused label purchase: {source}");

            StatusError::bad_gateway().brief("The carrier refused the label purchase")
        }
        LabelsServiceError::Calendar(source) => {
            error!("ship date arithmetic failed: {source}");

            StatusError::internal_server_error()
        }
        LabelsServiceError::Sql(source) => {
            error!("failed to update order: {source}");

            StatusError::internal_server_error()
        }
    }
}
