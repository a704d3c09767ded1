//! One quote per input line: parse, price on the worker, tax.

use serde::Deserialize;
use serde_json::Value;

use crate::config::Config;
use crate::dispatch::FareDispatcher;
use crate::error::Result;
use crate::pricing::{FareRequest, ServiceType};
use crate::tax::{quote, ExternalCharges};

/// A parsed input line.
#[derive(Debug, Clone)]
pub struct QuoteInput {
    pub trip: FareRequest,
    pub customer_gstin: Option<String>,
    pub external: ExternalCharges,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuoteInput {
    trip: Value,
    #[serde(default)]
    customer_gstin: Option<String>,
    #[serde(flatten)]
    external: ExternalCharges,
}

/// Parse one line of input.
///
/// The trip's service type is checked on its own first so an unknown one
/// reports as [`PricingError::InvalidServiceType`](crate::pricing::PricingError)
/// rather than as a generic JSON error.
pub fn parse_quote_input(line: &str) -> Result<QuoteInput> {
    let raw: RawQuoteInput = serde_json::from_str(line)?;

    if let Some(service_type) = raw.trip.get("serviceType").and_then(Value::as_str) {
        service_type.parse::<ServiceType>()?;
    }
    let trip = FareRequest::deserialize(raw.trip)?;

    Ok(QuoteInput {
        trip,
        customer_gstin: raw.customer_gstin,
        external: raw.external,
    })
}

/// Price one line and render the quote as JSON.
pub async fn price_line(
    dispatcher: &FareDispatcher,
    config: &Config,
    line: &str,
) -> Result<Value> {
    let input = parse_quote_input(line)?;
    let fare = dispatcher.compute(&input.trip).await?;

    let quote = quote(
        fare,
        config.gst_rate,
        config.supplier_gstin.as_deref(),
        input.customer_gstin.as_deref(),
        input.external,
    )?;

    Ok(serde_json::to_value(&quote)?)
}
