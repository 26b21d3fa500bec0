//! Provider wire format
//!
//! Request and response bodies for the rate-shopping provider's `shipments` and
//! `transactions` endpoints.

use std::str::FromStr;

use despatch::rates::CarrierRate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::rates::models::{Address, Parcel, RateRequest};

pub(crate) const LABEL_FILE_TYPE: &str = "PDF";
pub(crate) const SUCCESS_STATUS: &str = "SUCCESS";

#[derive(Debug, Serialize)]
pub(crate) struct ShipmentPayload<'a> {
    address_from: WireAddress<'a>,
    address_to: WireAddress<'a>,
    parcels: [WireParcel; 1],

    #[serde(skip_serializing_if = "Option::is_none")]
    shipment_date: Option<String>,

    #[serde(rename = "async")]
    asynchronous: bool,
}

impl<'a> From<&'a RateRequest> for ShipmentPayload<'a> {
    fn from(request: &'a RateRequest) -> Self {
        Self {
            address_from: WireAddress::from(&request.from),
            address_to: WireAddress::from(&request.to),
            parcels: [WireParcel::from(request.parcel)],
            shipment_date: request.ship_date.map(|date| format!("{date}T00:00:00Z")),
            asynchronous: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct WireAddress<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    street1: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    city: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    zip: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    country: Option<&'a str>,
}

impl<'a> From<&'a Address> for WireAddress<'a> {
    fn from(address: &'a Address) -> Self {
        Self {
            name: address.name.as_deref(),
            street1: address.street1.as_deref(),
            city: address.city.as_deref(),
            zip: address.postcode(),
            country: address.country.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
struct WireParcel {
    length: String,
    width: String,
    height: String,
    distance_unit: &'static str,
    weight: String,
    mass_unit: &'static str,
}

impl From<Parcel> for WireParcel {
    fn from(parcel: Parcel) -> Self {
        Self {
            length: parcel.length_cm.to_string(),
            width: parcel.width_cm.to_string(),
            height: parcel.height_cm.to_string(),
            distance_unit: "cm",
            weight: parcel.weight_grams.to_string(),
            mass_unit: "g",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ShipmentResponse {
    #[serde(default)]
    pub(crate) rates: Vec<WireRate>,
}

impl ShipmentResponse {
    pub(crate) fn carrier_rates(&self) -> Vec<CarrierRate> {
        self.rates.iter().map(WireRate::to_carrier_rate).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireRate {
    object_id: String,
    provider: Option<String>,
    servicelevel: Option<WireServiceLevel>,
    amount: Option<String>,
    estimated_days: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct WireServiceLevel {
    name: Option<String>,
}

impl WireRate {
    fn to_carrier_rate(&self) -> CarrierRate {
        let amount = self
            .amount
            .as_deref()
            .and_then(|amount| Decimal::from_str(amount.trim()).ok());

        CarrierRate::from_parts(
            self.provider.as_deref(),
            self.servicelevel
                .as_ref()
                .and_then(|level| level.name.as_deref()),
            self.estimated_days,
            amount,
            self.object_id.clone(),
        )
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TransactionPayload<'a> {
    pub(crate) rate: &'a str,
    pub(crate) label_file_type: &'static str,

    #[serde(rename = "async")]
    pub(crate) asynchronous: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransactionResponse {
    pub(crate) status: String,
    pub(crate) label_url: Option<String>,
    pub(crate) tracking_number: Option<String>,

    #[serde(default)]
    pub(crate) messages: Vec<serde_json::Value>,
}

impl TransactionResponse {
    pub(crate) fn messages(&self) -> String {
        self.messages
            .iter()
            .map(|message| {
                message
                    .get("text")
                    .and_then(serde_json::Value::as_str)
                    .map_or_else(|| message.to_string(), str::to_string)
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn shipment_payload_uses_provider_field_names() -> TestResult {
        let request = RateRequest {
            from: Address {
                postcode: Some("E16 1AA".to_string()),
                country: Some("GB".to_string()),
                ..Address::default()
            },
            to: Address {
                postcode: Some(" SW1A 1AA ".to_string()),
                ..Address::default()
            },
            parcel: Parcel::default(),
            ship_date: Some(date(2026, 10, 20)),
        };

        let payload = serde_json::to_value(ShipmentPayload::from(&request))?;

        assert_eq!(payload["address_to"]["zip"], "SW1A 1AA");
        assert_eq!(payload["address_from"]["country"], "GB");
        assert_eq!(payload["parcels"][0]["mass_unit"], "g");
        assert_eq!(payload["shipment_date"], "2026-10-20T00:00:00Z");
        assert_eq!(payload["async"], false);

        Ok(())
    }

    #[test]
    fn rates_normalise_missing_fields() -> TestResult {
        let response: ShipmentResponse = serde_json::from_value(json!({
            "rates": [
                {
                    "object_id": "rate_1",
                    "provider": "DPD",
                    "servicelevel": { "name": "Next Day" },
                    "amount": "6.50",
                    "estimated_days": 1
                },
                { "object_id": "rate_2", "amount": "not a number" }
            ]
        }))?;

        let [next_day, unknown]: [CarrierRate; 2] = response
            .carrier_rates()
            .try_into()
            .map_err(|rates: Vec<CarrierRate>| format!("expected two rates, got {}", rates.len()))?;

        assert_eq!(next_day.service_name, "DPD Next Day");
        assert_eq!(next_day.amount, Some(Decimal::new(650, 2)));
        assert_eq!(next_day.estimated_days, Some(1));
        assert_eq!(unknown.service_name, "Unknown Service");
        assert_eq!(unknown.amount, None);
        assert_eq!(unknown.estimated_days, None);

        Ok(())
    }

    #[test]
    fn transaction_messages_prefer_text() -> TestResult {
        let response: TransactionResponse = serde_json::from_value(json!({
            "status": "ERROR",
            "messages": [{ "text": "Address invalid" }, { "code": "x" }]
        }))?;

        assert_eq!(response.messages(), r#"Address invalid; {"code":"x"}"#);

        Ok(())
    }
}
