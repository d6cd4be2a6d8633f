#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vietfin/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! VNDIRECT top stocks provider.
//!
//! Implements [`EquityDiscoveryProvider`] over the `finfo-api` top stocks
//! query. Only HOSE (`VNIndex`) and HNX are served.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use vietfin_core::{
    DataError, EquityDiscoveryProvider, Exchange, FieldAlias, HttpTransport, MarketMover,
    Provider, ProviderId, RecordVariant, Response, Result, Transport,
};

/// Top stocks query endpoint.
const BASE_URL: &str = "https://finfo-api.vndirect.com.vn/v4/top_stocks";

const HEADERS: &[(&str, &str)] = &[
    ("accept", "*/*"),
    ("accept-language", "en-US,en;q=0.9"),
    ("content-type", "application/json"),
    ("dnt", "1"),
    ("origin", "https://dstock.vndirect.com.vn"),
    ("referer", "https://dstock.vndirect.com.vn/"),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "same-site"),
];

/// Rows of `top_stocks`. `volume` is the 20-day average.
#[derive(Debug)]
pub struct VndirectMarketMover;

impl RecordVariant for VndirectMarketMover {
    type Record = MarketMover;
    const NAME: &'static str = "VndirectMarketMover";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("symbol", "code"),
        FieldAlias::new("price", "lastPrice"),
        FieldAlias::new("change", "priceChgCr1D"),
        FieldAlias::new("percent_change", "priceChgPctCr1D"),
        FieldAlias::new("volume", "totalVolumeAvgCr20D"),
        FieldAlias::new("trading_value", "accumulatedVal"),
        FieldAlias::new("updated_at", "lastUpdated"),
    ];
}

#[derive(Clone, Copy, Debug)]
enum Report {
    Value,
    Gainers,
    Losers,
}

impl Report {
    const fn name(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Gainers => "gainers",
            Self::Losers => "losers",
        }
    }

    fn query(self, index: &str) -> String {
        match self {
            Self::Gainers => format!(
                "q=index:{index}~nmVolumeAvgCr20D:gte:10000~priceChgPctCr1D:gt:0&size=10&sort=priceChgPctCr1D"
            ),
            Self::Losers => format!(
                "q=index:{index}~nmVolumeAvgCr20D:gte:10000~priceChgPctCr1D:lt:0&size=10&sort=priceChgPctCr1D:asc"
            ),
            Self::Value => format!("q=index:{index}~accumulatedVal:gt:0&size=10&sort=accumulatedVal"),
        }
    }
}

fn index_code(exchange: Exchange) -> Result<&'static str> {
    match exchange {
        Exchange::Hose => Ok("VNIndex"),
        Exchange::Hnx => Ok("HNX"),
        other => Err(DataError::InvalidParameter(format!(
            "Exchange {other} is not supported by this provider VNDIRECT."
        ))),
    }
}

/// VNDIRECT data provider.
#[derive(Debug, Clone)]
pub struct VndirectProvider {
    transport: Arc<dyn Transport>,
}

impl VndirectProvider {
    /// Create a new VNDIRECT provider with the default HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::with_transport(Arc::new(HttpTransport::new("vndirect", HEADERS)))
    }

    /// Create a new VNDIRECT provider with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self::with_transport(Arc::new(HttpTransport::with_client("vndirect", client)))
    }

    /// Create a new VNDIRECT provider over any transport.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn top_stocks(
        &self,
        report: Report,
        exchange: Exchange,
    ) -> Result<Response<MarketMover>> {
        let url = format!("{BASE_URL}?{}", report.query(index_code(exchange)?));
        let body = self.transport.get_json(&url).await?;
        let rows = body
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        if rows.is_empty() {
            return Err(DataError::EmptyData(format!(
                "No data found for the list of top {}, at exchange {exchange}",
                report.name()
            )));
        }

        debug!(report = report.name(), %exchange, rows = rows.len(), "Fetched top stocks");
        let movers = VndirectMarketMover::parse_all(rows)?;
        Ok(Response::from_records(ProviderId::Vndirect, movers, body)?.with_api_url(url))
    }
}

impl Default for VndirectProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for VndirectProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Vndirect
    }

    fn description(&self) -> &str {
        "VNDIRECT provider for top movers on HOSE and HNX"
    }
}

#[async_trait]
impl EquityDiscoveryProvider for VndirectProvider {
    async fn active(&self, exchange: Exchange) -> Result<Response<MarketMover>> {
        self.top_stocks(Report::Value, exchange).await
    }

    async fn gainers(&self, exchange: Exchange) -> Result<Response<MarketMover>> {
        self.top_stocks(Report::Gainers, exchange).await
    }

    async fn losers(&self, exchange: Exchange) -> Result<Response<MarketMover>> {
        self.top_stocks(Report::Losers, exchange).await
    }
}
