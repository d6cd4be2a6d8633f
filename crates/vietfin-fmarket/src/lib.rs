#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vietfin/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Fmarket mutual fund data provider.
//!
//! Fmarket distributes open-ended funds in Vietnam. This crate implements
//! [`FundsProvider`] against its public product API: fund search, daily NAV
//! history and the top equity and bond holdings of a fund.
//!
//! Funds are addressed by short name (e.g. `DCDS`); NAV and holdings requests
//! first resolve the short name to Fmarket's numeric product id.

/// Alias tables for Fmarket payloads.
pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use tracing::debug;
use vietfin_core::{
    DataError, DateRange, FundHolding, FundInfo, FundNav, FundType, FundsProvider, HttpTransport,
    Provider, ProviderId, RecordVariant, Response, Result, Results, Series, Symbol, Transport,
};

use crate::models::{FmarketFundHolding, FmarketFundInfo, FmarketFundNav};

/// Product API base URL.
const API_URL: &str = "https://api.fmarket.vn/res";

/// Rows requested from the product filter.
const FILTER_PAGE_SIZE: usize = 100;

const HEADERS: &[(&str, &str)] = &[
    ("accept", "application/json, text/plain, */*"),
    ("accept-language", "vi"),
    ("content-type", "application/json"),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "same-site"),
    ("referer", "https://fmarket.vn/"),
];

/// Fmarket data provider.
#[derive(Debug, Clone)]
pub struct FmarketProvider {
    transport: Arc<dyn Transport>,
}

impl FmarketProvider {
    /// Create a new Fmarket provider with the default HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::with_transport(Arc::new(HttpTransport::new("fmarket", HEADERS)))
    }

    /// Create a new Fmarket provider with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self::with_transport(Arc::new(HttpTransport::with_client("fmarket", client)))
    }

    /// Create a new Fmarket provider over any transport.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn filter(&self, search: &str, fund_type: Option<FundType>) -> Result<Value> {
        let asset_types: Vec<&str> = fund_type.map(|t| t.as_str()).into_iter().collect();
        let payload = json!({
            "types": ["NEW_FUND", "TRADING_FUND"],
            "issuerIds": [],
            "sortOrder": "DESC",
            "sortField": "navTo6Months",
            "page": 1,
            "pageSize": FILTER_PAGE_SIZE,
            "isIpo": false,
            "fundAssetTypes": asset_types,
            "bondRemainPeriods": [],
            "searchField": search,
            "isBuyByReward": false,
            "thirdAppIds": [],
        });
        self.transport
            .post_json(&format!("{API_URL}/products/filter"), &payload)
            .await
    }

    /// Resolves a fund short name to its product id.
    pub async fn fund_id(&self, symbol: &Symbol) -> Result<i64> {
        let body = self.filter(symbol.as_str(), None).await?;
        let total = body.pointer("/data/total").and_then(Value::as_u64).unwrap_or(0);
        match total {
            0 => Err(DataError::NotFound(format!(
                "No fund found for symbol {symbol}. Please check the symbol."
            ))),
            1 => body
                .pointer("/data/rows/0/id")
                .and_then(Value::as_i64)
                .ok_or_else(|| DataError::Parse(format!("fund {symbol} has no product id"))),
            _ => Err(DataError::Ambiguous(format!(
                "Multiple funds found for the given symbol {symbol}. Please check the symbol."
            ))),
        }
    }
}

impl Default for FmarketProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for FmarketProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Fmarket
    }

    fn description(&self) -> &str {
        "Fmarket provider for open-ended mutual funds"
    }
}

fn rows_at(body: &Value, pointer: &str) -> Vec<Value> {
    body.pointer(pointer)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

#[async_trait]
impl FundsProvider for FmarketProvider {
    async fn search(
        &self,
        symbol: &Symbol,
        fund_type: Option<FundType>,
    ) -> Result<Response<FundInfo>> {
        let body = self.filter(symbol.as_str(), fund_type).await?;
        let rows = rows_at(&body, "/data/rows");
        if rows.is_empty() {
            return Err(DataError::EmptyData(format!(
                "No data found for fund symbol: {symbol}"
            )));
        }

        debug!(%symbol, ?fund_type, rows = rows.len(), "Fetched fund list");
        let funds = FmarketFundInfo::parse_all(rows)?;
        Ok(Response::from_records(ProviderId::Fmarket, funds, body)?
            .with_symbol(symbol)
            .with_api_url(format!("{API_URL}/products/filter")))
    }

    async fn historical(&self, symbol: &Symbol, range: DateRange) -> Result<Response<FundNav>> {
        let today = Utc::now().date_naive();
        let range = DateRange::new(range.start, range.end.min(today));
        let fund_id = self.fund_id(symbol).await?;

        let url = format!("{API_URL}/product/get-nav-history");
        let payload = json!({
            "isAllData": 1,
            "productId": fund_id,
            "fromDate": range.start.format("%Y%m%d").to_string(),
            "toDate": range.end.format("%Y%m%d").to_string(),
        });
        let body = self.transport.post_json(&url, &payload).await?;
        let rows = rows_at(&body, "/data");
        if rows.is_empty() {
            return Err(DataError::empty());
        }

        // The endpoint only honours a few preset look-back windows.
        let navs: Vec<FundNav> = FmarketFundNav::parse_all(rows)?
            .into_iter()
            .filter(|nav| range.contains(nav.date_nav))
            .collect();
        debug!(%symbol, fund_id, navs = navs.len(), "Fetched NAV history");

        Ok(Response::from_records(ProviderId::Fmarket, navs, body)?
            .with_symbol(symbol)
            .with_api_url(url))
    }

    async fn holdings(&self, symbol: &Symbol) -> Result<Response<FundHolding>> {
        let fund_id = self.fund_id(symbol).await?;
        let url = format!("{API_URL}/products/{fund_id}");
        let body = self.transport.get_json(&url).await?;

        let equity = FmarketFundHolding::parse_all(rows_at(&body, "/data/productTopHoldingList"))?;
        let bond = FmarketFundHolding::parse_all(rows_at(&body, "/data/productTopHoldingBondList"))?;
        let results = Results::MultiSeries(vec![
            ("equity".to_string(), Series::Records(equity)),
            ("bond".to_string(), Series::Records(bond)),
        ]);

        Ok(Response::new(ProviderId::Fmarket, results, body)?
            .with_symbol(symbol)
            .with_api_url(url))
    }
}
