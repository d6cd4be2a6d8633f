#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vietfin/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SSI (SSI Securities) data provider.
//!
//! This crate provides an SSI data provider backed by the public `iboard`,
//! `fiin-core`, `fiin-market` and `fiin-fundamental` endpoints.
//!
//! # Features
//!
//! - Equity, index, ETF, futures and covered warrant search
//! - Index constituents
//! - Top movers by value, gainers and losers
//! - Daily and hourly bars for stocks and ETFs
//! - Intraday matched trades of a futures contract
//! - Income, balance sheet and cash flow statements, read from the
//!   spreadsheet downloads
//!
//! # Example
//!
//! ```no_run
//! use vietfin_ssi::SsiProvider;
//! use vietfin_core::{Exchange, EquityDiscoveryProvider};
//!
//! # async fn example() -> vietfin_core::Result<()> {
//! let provider = SsiProvider::new();
//! let gainers = provider.gainers(Exchange::Hose).await?;
//! println!("{gainers}");
//! # Ok(())
//! # }
//! ```

/// Alias tables for SSI payloads.
pub mod models;

pub mod sheet;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use serde_json::Value;
use tracing::debug;
use vietfin_core::{
    CoveredWarrant, CoveredWarrantProvider, DataError, DateRange, EquityDiscoveryProvider,
    EquityFundamentalProvider, EquityInfo, EquityPriceProvider, EquityProvider, EtfInfo,
    EtfProvider, Exchange, FuturesContract, FuturesProvider, FuturesTrade, HttpTransport,
    IndexConstituent, IndexInfo, IndexProvider, Interval, MarketMover, Period, PriceBar, Provider,
    ProviderId, RecordVariant, Response, Result, StatementItem, Symbol, Transport,
    alias::columns_to_rows,
};

use crate::models::{
    SsiCoveredWarrant, SsiEquityInfo, SsiEtfInfo, SsiFuturesContract, SsiFuturesTrade,
    SsiIndexConstituent, SsiIndexInfo, SsiMarketMover, SsiPriceBar, SsiStatementItem,
};

/// iboard board query host.
const BOARD_URL: &str = "https://iboard-query.ssi.com.vn";

/// Master data host.
const CORE_URL: &str = "https://fiin-core.ssi.com.vn/Master";

/// Market reports host.
const MARKET_URL: &str = "https://fiin-market.ssi.com.vn/TopMover";

/// Statement downloads.
const FUNDAMENTAL_URL: &str = "https://fiin-fundamental.ssi.com.vn/FinancialStatement";

/// Periods requested per statement download.
const STATEMENT_PERIODS: u32 = 100;

/// Chart history endpoint.
const CHART_URL: &str = "https://iboard.ssi.com.vn/dchart/api/history";

/// Page size of the `le-table` endpoint.
const TRADE_PAGE_SIZE: usize = 50;

/// Days of hourly history served by the chart endpoint.
const HOURLY_WINDOW_DAYS: i64 = 30;

const HEADERS: &[(&str, &str)] = &[
    ("accept", "application/json"),
    ("accept-language", "en-US,en;q=0.9,vi-VN;q=0.8,vi;q=0.7"),
    ("content-type", "application/json"),
    ("dnt", "1"),
    ("origin", "https://iboard.ssi.com.vn"),
    ("referer", "https://iboard.ssi.com.vn/"),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "same-site"),
    ("x-fiin-key", "KEY"),
    ("x-fiin-seed", "SEED"),
    ("x-fiin-user-id", "ID"),
];

/// Top mover reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TopMover {
    Value,
    Gainers,
    Losers,
}

impl TopMover {
    const fn endpoint(self) -> &'static str {
        match self {
            Self::Value => "GetTopValue",
            Self::Gainers => "GetTopGainers",
            Self::Losers => "GetTopLosers",
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Gainers => "gainers",
            Self::Losers => "losers",
        }
    }
}

/// Financial statement workbooks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Statement {
    Income,
    Balance,
    Cash,
}

impl Statement {
    const fn download(self) -> &'static str {
        match self {
            Self::Income => "DownloadIncomeStatement",
            Self::Balance => "DownloadBalanceSheet",
            Self::Cash => "DownloadCashFlow",
        }
    }
}

fn organizations_url() -> String {
    format!("{CORE_URL}/GetListOrganization?language=vi")
}

const fn frequency(period: Period) -> &'static str {
    match period {
        Period::Annual => "Yearly",
        Period::Quarter => "Quarterly",
    }
}

/// SSI data provider.
#[derive(Debug, Clone)]
pub struct SsiProvider {
    transport: Arc<dyn Transport>,
}

impl SsiProvider {
    /// Create a new SSI provider with the default HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::with_transport(Arc::new(HttpTransport::new("ssi", HEADERS)))
    }

    /// Create a new SSI provider with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self::with_transport(Arc::new(HttpTransport::with_client("ssi", client)))
    }

    /// Create a new SSI provider over any transport.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetches a whole listing under `key` and keeps the rows whose `field`
    /// equals `symbol`. An empty symbol keeps every row.
    async fn listing<V: RecordVariant>(
        &self,
        url: &str,
        key: &str,
        field: &str,
        symbol: &Symbol,
        what: &str,
    ) -> Result<Response<V::Record>> {
        let body = self.transport.get_json(url).await?;
        let mut rows = body
            .get(key)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        if rows.is_empty() {
            return Err(DataError::empty());
        }

        if !symbol.is_empty() {
            rows.retain(|row| {
                row.get(field)
                    .and_then(Value::as_str)
                    .is_some_and(|v| v.eq_ignore_ascii_case(symbol.as_str()))
            });
            if rows.is_empty() {
                return Err(DataError::EmptyData(format!(
                    "No data found for {what}: {symbol}"
                )));
            }
        }

        debug!(%symbol, url, rows = rows.len(), "Fetched listing");
        let records = V::parse_all(rows)?;
        Ok(Response::from_records(ProviderId::Ssi, records, body)?
            .with_symbol(symbol)
            .with_api_url(url))
    }

    async fn top_movers(
        &self,
        report: TopMover,
        exchange: Exchange,
    ) -> Result<Response<MarketMover>> {
        let url = format!(
            "{MARKET_URL}/{}?language=vi&ComGroupCode={}",
            report.endpoint(),
            exchange.as_str().to_uppercase()
        );
        let body = self.transport.get_json(&url).await?;
        let rows = body
            .get("items")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        if rows.is_empty() {
            return Err(DataError::EmptyData(format!(
                "No data found for the list of top {}, at exchange {exchange}",
                report.name()
            )));
        }
        let movers = SsiMarketMover::parse_all(rows)?;
        Ok(Response::from_records(ProviderId::Ssi, movers, body)?.with_api_url(url))
    }

    /// Statement downloads are keyed by the issuer's organization code,
    /// looked up in the listed-company catalog.
    async fn organ_code(&self, symbol: &Symbol) -> Result<(String, String)> {
        if symbol.is_empty() {
            return Err(DataError::InvalidParameter(
                "a stock symbol is required for financial statements".to_string(),
            ));
        }
        let companies = EquityProvider::search(self, symbol).await?;
        companies
            .records()
            .find_map(|info| info.organ_code.clone())
            .map(|code| (code, organizations_url()))
            .ok_or_else(|| {
                DataError::NotFound(format!("No organization code for stock symbol: {symbol}"))
            })
    }

    async fn statement(
        &self,
        symbol: &Symbol,
        period: Period,
        statement: Statement,
    ) -> Result<Response<StatementItem>> {
        let (organ_code, search_url) = self.organ_code(symbol).await?;
        let url = format!(
            "{FUNDAMENTAL_URL}/{}?language=en&OrganCode={organ_code}&Skip=0&Frequency={}&numberOfPeriod={STATEMENT_PERIODS}&latestYear={}",
            statement.download(),
            frequency(period),
            Utc::now().year()
        );

        let bytes = self.transport.get_bytes(&url).await?;
        let workbook = sheet::first_sheet(bytes)?;
        let rows: Vec<Value> = sheet::melt_sheet(&workbook, period)
            .into_iter()
            .map(|mut row| {
                if let Some(object) = row.as_object_mut() {
                    object.insert("symbol".to_string(), Value::from(symbol.as_str()));
                }
                row
            })
            .collect();
        if rows.is_empty() {
            return Err(DataError::EmptyData(format!(
                "No data found for the symbol {symbol}."
            )));
        }

        debug!(%symbol, url, rows = rows.len(), "Melted statement workbook");
        let items = SsiStatementItem::parse_all(rows)?;
        Ok(
            Response::from_records(ProviderId::Ssi, items, sheet::sheet_json(&workbook))?
                .with_symbol(symbol)
                .with_api_url(vec![search_url, url]),
        )
    }

    async fn chart(
        &self,
        symbol: &Symbol,
        range: DateRange,
        interval: Interval,
    ) -> Result<Response<PriceBar>> {
        let (resolution, range) = match interval {
            Interval::OneDay => ("1D", range),
            Interval::OneHour => (
                "1",
                range.clamp_to_recent(HOURLY_WINDOW_DAYS, Utc::now().date_naive()),
            ),
            other => {
                return Err(DataError::InvalidParameter(format!(
                    "Invalid interval: {other}. Allowed intervals for provider SSI are [1d, 1h]."
                )));
            }
        };

        let url = format!(
            "{CHART_URL}?resolution={resolution}&symbol={symbol}&from={}&to={}",
            range.start_timestamp(),
            range.end_timestamp()
        );
        let body = self.transport.get_json(&url).await?;
        let rows = columns_to_rows(&body);
        debug!(%symbol, url, rows = rows.len(), "Fetched chart history");
        let bars = SsiPriceBar::parse_all(rows)?;
        Ok(Response::from_records(ProviderId::Ssi, bars, body)?
            .with_symbol(symbol)
            .with_api_url(url))
    }
}

impl Default for SsiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for SsiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Ssi
    }

    fn description(&self) -> &str {
        "SSI provider for listings, board snapshots, top movers, chart history and statements"
    }
}

#[async_trait]
impl EquityProvider for SsiProvider {
    async fn search(&self, symbol: &Symbol) -> Result<Response<EquityInfo>> {
        let url = organizations_url();
        self.listing::<SsiEquityInfo>(&url, "items", "ticker", symbol, "stock symbol")
            .await
    }
}

#[async_trait]
impl EquityPriceProvider for SsiProvider {
    async fn historical(
        &self,
        symbol: &Symbol,
        range: DateRange,
        interval: Interval,
    ) -> Result<Response<PriceBar>> {
        self.chart(symbol, range, interval).await
    }
}

#[async_trait]
impl EquityDiscoveryProvider for SsiProvider {
    async fn active(&self, exchange: Exchange) -> Result<Response<MarketMover>> {
        self.top_movers(TopMover::Value, exchange).await
    }

    async fn gainers(&self, exchange: Exchange) -> Result<Response<MarketMover>> {
        self.top_movers(TopMover::Gainers, exchange).await
    }

    async fn losers(&self, exchange: Exchange) -> Result<Response<MarketMover>> {
        self.top_movers(TopMover::Losers, exchange).await
    }
}

#[async_trait]
impl EquityFundamentalProvider for SsiProvider {
    async fn income(&self, symbol: &Symbol, period: Period) -> Result<Response<StatementItem>> {
        self.statement(symbol, period, Statement::Income).await
    }

    async fn balance(&self, symbol: &Symbol, period: Period) -> Result<Response<StatementItem>> {
        self.statement(symbol, period, Statement::Balance).await
    }

    async fn cash(&self, symbol: &Symbol, period: Period) -> Result<Response<StatementItem>> {
        self.statement(symbol, period, Statement::Cash).await
    }
}

#[async_trait]
impl FuturesProvider for SsiProvider {
    async fn quote(
        &self,
        symbol: &Symbol,
        limit: usize,
        _cookie: Option<&str>,
    ) -> Result<Response<FuturesTrade>> {
        let base =
            format!("{BOARD_URL}/le-table?stockSymbol={symbol}&pageSize={TRADE_PAGE_SIZE}");
        let mut url = base.clone();
        let mut urls = Vec::new();
        let mut rows: Vec<Value> = Vec::new();
        let mut raw = Vec::new();

        loop {
            let body = self.transport.get_json(&url).await?;
            urls.push(url.clone());
            let chunk = body
                .pointer("/data/items")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let last_id = chunk
                .last()
                .and_then(|row| row.get("_id"))
                .and_then(Value::as_str)
                .map(str::to_string);
            let chunk_len = chunk.len();
            rows.extend(chunk);
            raw.push(body);

            if (limit > 0 && rows.len() >= limit) || chunk_len < TRADE_PAGE_SIZE {
                break;
            }
            let Some(last_id) = last_id else {
                break;
            };
            url = format!("{base}&lastId={last_id}");
        }

        if rows.is_empty() {
            return Err(DataError::EmptyData(format!(
                "No data found for the given futures contract {symbol} on {}.",
                Utc::now().date_naive()
            )));
        }
        if limit > 0 {
            rows.truncate(limit);
        }

        let trades = SsiFuturesTrade::parse_all(rows)?;
        Ok(Response::from_records(ProviderId::Ssi, trades, Value::Array(raw))?
            .with_symbol(symbol)
            .with_api_url(urls))
    }

    async fn search(&self, symbol: &Symbol) -> Result<Response<FuturesContract>> {
        let url = format!("{BOARD_URL}/v2/stock/exchange/fu?hasVN30=true&hasVN100=true");
        self.listing::<SsiFuturesContract>(&url, "data", "ss", symbol, "futures contract")
            .await
    }
}

#[async_trait]
impl CoveredWarrantProvider for SsiProvider {
    async fn search(&self, symbol: &Symbol) -> Result<Response<CoveredWarrant>> {
        let url = format!("{BOARD_URL}/v2/stock/type/w/hose");
        self.listing::<SsiCoveredWarrant>(&url, "data", "ss", symbol, "covered warrant")
            .await
    }
}

#[async_trait]
impl IndexProvider for SsiProvider {
    async fn search(&self, symbol: &Symbol) -> Result<Response<IndexInfo>> {
        let url = format!("{CORE_URL}/GetAllCompanyGroup?language=vi");
        self.listing::<SsiIndexInfo>(&url, "items", "comGroupCode", symbol, "index symbol")
            .await
    }

    async fn constituents(&self, symbol: &Symbol) -> Result<Response<IndexConstituent>> {
        let url = format!("{BOARD_URL}/v2/stock/group/{symbol}");
        let every = Symbol::default();
        self.listing::<SsiIndexConstituent>(&url, "data", "ss", &every, "index symbol")
            .await
            .map(|response| response.with_symbol(symbol))
    }
}

#[async_trait]
impl EtfProvider for SsiProvider {
    async fn historical(
        &self,
        symbol: &Symbol,
        range: DateRange,
        interval: Interval,
    ) -> Result<Response<PriceBar>> {
        self.chart(symbol, range, interval).await
    }

    async fn search(&self, symbol: &Symbol) -> Result<Response<EtfInfo>> {
        let url = format!("{BOARD_URL}/v2/stock/type/e/hose");
        self.listing::<SsiEtfInfo>(&url, "data", "ss", symbol, "Etf symbol")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vietfin_core::{ApiUrl, StaticTransport};

    fn trade_page(items: Vec<Value>) -> Value {
        json!({"data": {"items": items}})
    }

    fn provider(transport: StaticTransport) -> (SsiProvider, Arc<StaticTransport>) {
        let transport = Arc::new(transport);
        (SsiProvider::with_transport(transport.clone()), transport)
    }

    fn organizations(count: usize) -> Value {
        let items: Vec<Value> = (0..count)
            .map(|i| {
                json!({
                    "ticker": format!("T{i:04}"),
                    "organName": format!("Company {i}"),
                    "organShortName": format!("Co {i}"),
                    "organCode": format!("ORG{i}")
                })
            })
            .chain(std::iter::once(json!({
                "ticker": "VNM",
                "organName": "Công ty Cổ phần Sữa Việt Nam",
                "organShortName": "Vinamilk",
                "organCode": "VINAMILK"
            })))
            .collect();
        json!({"items": items})
    }

    fn trade(id: u64) -> Value {
        json!({
            "_id": format!("143001{}", 1_709_879_401_000_u64 + id),
            "time": "14:30:01",
            "stockSymbol": "VN30F2403",
            "vol": 1,
            "price": 1250.0,
            "side": "sd"
        })
    }

    #[test]
    fn test_provider_info() {
        let provider = SsiProvider::default();
        assert_eq!(provider.name(), "ssi");
    }

    #[tokio::test]
    async fn test_empty_search_returns_catalog() {
        let (provider, _) =
            provider(StaticTransport::new().route("GetListOrganization", organizations(1799)));
        let response = EquityProvider::search(&provider, &Symbol::default())
            .await
            .unwrap();
        assert_eq!(response.extra.records_count, 1800);
    }

    #[tokio::test]
    async fn test_search_filters_symbol() {
        let (provider, _) =
            provider(StaticTransport::new().route("GetListOrganization", organizations(10)));
        let response = EquityProvider::search(&provider, &Symbol::new("vnm"))
            .await
            .unwrap();
        assert_eq!(response.len(), 1);
        let info = response.records().next().unwrap();
        assert_eq!(info.short_name.as_deref(), Some("Vinamilk"));
        assert_eq!(info.organ_code.as_deref(), Some("VINAMILK"));
    }

    #[tokio::test]
    async fn test_search_unknown_symbol_is_empty() {
        let (provider, _) =
            provider(StaticTransport::new().route("GetListOrganization", organizations(3)));
        let err = EquityProvider::search(&provider, &Symbol::new("ZZZ"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No data found for stock symbol: ZZZ");
    }

    #[tokio::test]
    async fn test_profile_is_unsupported() {
        let (provider, _) = provider(StaticTransport::new());
        let err = provider.profile(&Symbol::new("VNM")).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "equity.profile() command is not implemented for ssi provider."
        );
    }

    #[tokio::test]
    async fn test_ratios_are_unsupported() {
        let (provider, transport) = provider(StaticTransport::new());
        let err = provider
            .ratios(&Symbol::new("VNM"), Period::Annual)
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::UnsupportedOperation { .. }));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_statement_download_keyed_by_organ_code() {
        let (provider, transport) = provider(
            StaticTransport::new()
                .route("GetListOrganization", organizations(3))
                .route_bytes("DownloadBalanceSheet", b"not a workbook".to_vec()),
        );
        let err = provider
            .balance(&Symbol::new("vnm"), Period::Quarter)
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Parse(_)));

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].starts_with(
            "https://fiin-fundamental.ssi.com.vn/FinancialStatement/DownloadBalanceSheet?language=en&OrganCode=VINAMILK&Skip=0&Frequency=Quarterly&numberOfPeriod=100&latestYear="
        ));
    }

    #[tokio::test]
    async fn test_statement_requires_symbol() {
        let (provider, transport) = provider(StaticTransport::new());
        let err = provider
            .income(&Symbol::default(), Period::Annual)
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidParameter(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_statement_for_unlisted_symbol_is_empty() {
        let (provider, transport) =
            provider(StaticTransport::new().route("GetListOrganization", organizations(3)));
        let err = provider
            .cash(&Symbol::new("ZZZ"), Period::Annual)
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::EmptyData(_)));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_top_movers_use_exchange_code() {
        let (provider, transport) = provider(StaticTransport::new().route(
            "GetTopLosers",
            json!({"items": [{
                "ticker": "HPG", "price": 27000, "priceChange": -500,
                "percentPriceChange": -1.8, "volume": 100000, "value": 2.7e9, "sectorName": "Steel"
            }]}),
        ));
        let response = provider.losers(Exchange::Upcom).await.unwrap();
        assert_eq!(response.len(), 1);
        assert!(transport.requests()[0].ends_with("ComGroupCode=UPCOM"));
        assert_eq!(
            response.records().next().unwrap().industry.as_deref(),
            Some("Steel")
        );
    }

    #[tokio::test]
    async fn test_chart_rejects_unsupported_interval() {
        let (provider, _) = provider(StaticTransport::new());
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        let symbol = Symbol::new("E1VFVN30");
        let err = EtfProvider::historical(&provider, &symbol, range, Interval::FifteenMinutes)
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn test_chart_rows_from_columns() {
        let (provider, transport) = provider(StaticTransport::new().route(
            "dchart",
            json!({
                "s": "ok",
                "t": [1704153600, 1704240000],
                "o": [20.1, 20.3], "h": [20.5, 20.6], "l": [20.0, 20.1],
                "c": [20.3, 20.4], "v": [1000, 1200]
            }),
        ));
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        let symbol = Symbol::new("FPT");
        let response = EquityPriceProvider::historical(&provider, &symbol, range, Interval::OneDay)
            .await
            .unwrap();
        assert_eq!(response.len(), 2);
        assert!(transport.requests()[0].contains("resolution=1D&symbol=FPT&from=1704067200&to=1706659200"));
    }

    #[tokio::test]
    async fn test_hourly_chart_clamped_to_recent_window() {
        let (provider, transport) = provider(StaticTransport::new().route(
            "dchart",
            json!({
                "s": "ok",
                "t": [1704153600], "o": [20.1], "h": [20.5], "l": [20.0], "c": [20.3], "v": [1000]
            }),
        ));
        let range = DateRange::parse("2020-01-01", "2020-06-30").unwrap();
        let symbol = Symbol::new("E1VFVN30");
        EtfProvider::historical(&provider, &symbol, range, Interval::OneHour)
            .await
            .unwrap();

        let today = Utc::now().date_naive();
        let midnight = |date: chrono::NaiveDate| {
            date.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp()
        };
        let expected = format!(
            "resolution=1&symbol=E1VFVN30&from={}&to={}",
            midnight(today - chrono::Duration::days(30)),
            midnight(today)
        );
        assert!(transport.requests()[0].ends_with(&expected));
    }

    #[tokio::test]
    async fn test_futures_quote_follows_last_id() {
        let first: Vec<Value> = (0..50).map(trade).collect();
        let second: Vec<Value> = (50..60).map(trade).collect();
        let last_id = first[49]["_id"].as_str().unwrap().to_string();
        let (provider, transport) = provider(
            StaticTransport::new()
                .route("pageSize=50", trade_page(first))
                .route(format!("lastId={last_id}"), trade_page(second)),
        );

        let response = FuturesProvider::quote(&provider, &Symbol::new("VN30F2403"), 0, None)
            .await
            .unwrap();
        assert_eq!(response.len(), 60);
        assert_eq!(transport.requests().len(), 2);
        assert!(response.records().all(|t| t.status.as_deref() == Some("Sell")));

        let base = "https://iboard-query.ssi.com.vn/le-table?stockSymbol=VN30F2403&pageSize=50";
        assert_eq!(
            response.extra.api_url,
            Some(ApiUrl::Many(vec![
                base.to_string(),
                format!("{base}&lastId={last_id}"),
            ]))
        );
    }

    #[tokio::test]
    async fn test_futures_quote_stops_on_short_page() {
        let pages: Vec<Vec<Value>> = vec![
            (0..50).map(trade).collect(),
            (50..100).map(trade).collect(),
            (100..107).map(trade).collect(),
        ];
        let cursor = |page: &[Value]| format!("lastId={}", page[49]["_id"].as_str().unwrap());
        let (provider, transport) = provider(
            StaticTransport::new()
                .route("pageSize=50", trade_page(pages[0].clone()))
                .route(cursor(pages[0].as_slice()), trade_page(pages[1].clone()))
                .route(cursor(pages[1].as_slice()), trade_page(pages[2].clone())),
        );

        let response = FuturesProvider::quote(&provider, &Symbol::new("VN30F2403"), 0, None)
            .await
            .unwrap();
        assert_eq!(response.len(), 107);
        assert_eq!(transport.requests().len(), 3);
        assert!(matches!(response.extra.api_url, Some(ApiUrl::Many(ref urls)) if urls.len() == 3));
    }

    #[tokio::test]
    async fn test_futures_quote_limit_spans_pages() {
        let first: Vec<Value> = (0..50).map(trade).collect();
        let second: Vec<Value> = (50..100).map(trade).collect();
        let last_id = first[49]["_id"].as_str().unwrap().to_string();
        let (provider, transport) = provider(
            StaticTransport::new()
                .route("pageSize=50", trade_page(first))
                .route(format!("lastId={last_id}"), trade_page(second)),
        );

        let response = FuturesProvider::quote(&provider, &Symbol::new("VN30F2403"), 70, None)
            .await
            .unwrap();
        assert_eq!(response.len(), 70);
        assert_eq!(transport.requests().len(), 2);
        let last = response.records().last().unwrap();
        assert_eq!(last.id, trade(69)["_id"].as_str().map(str::to_string));
    }

    #[tokio::test]
    async fn test_futures_quote_truncates_to_limit() {
        let (provider, transport) = provider(
            StaticTransport::new().route("pageSize=50", trade_page((0..50).map(trade).collect())),
        );
        let response = FuturesProvider::quote(&provider, &Symbol::new("VN30F2403"), 20, None)
            .await
            .unwrap();
        assert_eq!(response.len(), 20);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_constituents_keep_every_row() {
        let (provider, _) = provider(StaticTransport::new().route(
            "group/VN30",
            json!({"data": [
                {"ss": "ACB", "cv": "Ngân hàng ACB", "e": "hose"},
                {"ss": "VNM", "cv": "Vinamilk", "e": "hose"}
            ]}),
        ));
        let response = provider.constituents(&Symbol::new("vn30")).await.unwrap();
        assert_eq!(response.len(), 2);
        assert_eq!(response.extra.symbol.as_deref(), Some("VN30"));
    }
}
