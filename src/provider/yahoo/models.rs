//! Serde models for the Yahoo Finance quoteSummary endpoint.
//!
//! Numeric fields arrive as raw/formatted pairs; either half may be absent,
//! so normalization prefers `raw` and falls back to parsing `fmt`.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    pub quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
pub(super) struct QuoteSummaryBody {
    #[serde(default)]
    pub result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QuoteSummaryResult {
    pub price: PriceModule,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PriceModule {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub regular_market_price: Option<ValueNode>,
    #[serde(default)]
    pub regular_market_change_percent: Option<ValueNode>,
    #[serde(default)]
    pub regular_market_volume: Option<ValueNode>,
    #[serde(default)]
    pub market_cap: Option<ValueNode>,
    #[serde(default)]
    pub regular_market_time: Option<i64>,
}

/// A Yahoo numeric field: machine value plus display string.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ValueNode {
    #[serde(default)]
    pub raw: Option<f64>,
    #[serde(default)]
    pub fmt: Option<String>,
}
