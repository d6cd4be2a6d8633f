#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vietfin/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! TCBS (Techcom Securities) data provider.
//!
//! This crate provides a TCBS data provider that implements the equity,
//! equity price, ownership, calendar, fundamental, futures, index price,
//! ETF and news capability traits from `vietfin-core`.
//!
//! # Features
//!
//! - Daily bars for stocks, indices, ETFs and futures, fetched in yearly chunks
//! - Paged intraday quotes, events, insider deals, dividends and news
//! - Company overview, key officers and large shareholders
//! - Financial ratios and melted income, balance and cash flow statements
//!
//! # Example
//!
//! ```no_run
//! use vietfin_tcbs::TcbsProvider;
//! use vietfin_core::{DateRange, EquityPriceProvider, Interval, Symbol};
//!
//! # async fn example() -> vietfin_core::Result<()> {
//! let provider = TcbsProvider::new();
//! let range = DateRange::parse("2024-01-01", "2024-06-30")?;
//!
//! let bars = provider
//!     .historical(&Symbol::new("VNM"), range, Interval::OneDay)
//!     .await?;
//! println!("Fetched {} bars", bars.len());
//! # Ok(())
//! # }
//! ```

/// Alias tables for TCBS payloads.
pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use serde_json::{Map, Value, json};
use tracing::debug;
use vietfin_core::{
    CalendarEvent, CompanyProfile, DataError, DateRange, Dividend, EquityCalendarProvider,
    EquityFundamentalProvider, EquityOwnershipProvider, EquityPriceProvider, EquityProvider,
    EtfProvider, Executive, FinancialRatio, FuturesProvider, HttpTransport, IndexPriceProvider,
    InsiderTrade, Interval, MajorHolder, NewsItem, NewsProvider, Period, PriceBar, Provider,
    ProviderId, QuoteTick, RecordVariant, Response, Result, StatementItem, Symbol, Transport,
    types::page_size,
};

use crate::models::{
    TcbsDividend, TcbsEvent, TcbsExecutive, TcbsInsiderTrade, TcbsMajorHolder, TcbsMultiples,
    TcbsNews, TcbsPriceBar, TcbsProfile, TcbsQuote, TcbsRatio, TcbsStatementItem,
};

/// Public API host.
const API_URL: &str = "https://apipubaws.tcbs.com.vn";

/// Company analysis API prefix.
const ANALYSIS_URL: &str = "https://apipubaws.tcbs.com.vn/tcanalysis/v1";

/// Largest page the paged endpoints serve.
const MAX_PAGE_SIZE: usize = 100;

/// Days of history requested per `bars-long-term` call.
const CHUNK_DAYS: i64 = 365;

/// Headers sent with every request.
const HEADERS: &[(&str, &str)] = &[
    ("accept", "application/json"),
    ("accept-language", "vi"),
    ("origin", "https://tcinvest.tcbs.com.vn"),
    ("referer", "https://tcinvest.tcbs.com.vn/"),
];

/// Instrument families served by the daily bars endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BarSource {
    Stock,
    Index,
    Futures,
}

impl BarSource {
    const fn endpoint(self) -> &'static str {
        match self {
            Self::Stock | Self::Index => "stock",
            Self::Futures => "futures",
        }
    }

    const fn kind(self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Index => "index",
            Self::Futures => "derivative",
        }
    }
}

/// Financial statements served by the finance endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Statement {
    Income,
    Balance,
    Cash,
}

impl Statement {
    const fn path(self) -> &'static str {
        match self {
            Self::Income => "incomestatement",
            Self::Balance => "balancesheet",
            Self::Cash => "cashflow",
        }
    }
}

/// Columns kept on every melted statement row.
const STATEMENT_ID_COLUMNS: [&str; 4] = ["ticker", "period", "year", "quarter"];

/// TCBS data provider.
#[derive(Debug, Clone)]
pub struct TcbsProvider {
    transport: Arc<dyn Transport>,
}

impl TcbsProvider {
    /// Create a new TCBS provider with the default HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::with_transport(Arc::new(HttpTransport::new("tcbs", HEADERS)))
    }

    /// Create a new TCBS provider with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self::with_transport(Arc::new(HttpTransport::with_client("tcbs", client)))
    }

    /// Create a new TCBS provider over any transport.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    fn bars_url(symbol: &Symbol, source: BarSource, to: i64, count_back: i64) -> String {
        format!(
            "{API_URL}/{}-insight/v2/stock/bars-long-term?ticker={symbol}&type={}&resolution=D&to={to}&countBack={count_back}",
            source.endpoint(),
            source.kind(),
        )
    }

    /// Walks the range forward in yearly chunks, then keeps bars inside it.
    async fn bars(
        &self,
        symbol: &Symbol,
        range: DateRange,
        interval: Interval,
        source: BarSource,
    ) -> Result<Response<PriceBar>> {
        if interval != Interval::OneDay {
            return Err(DataError::InvalidParameter(format!(
                "Invalid interval: {interval}. TCBS only supports interval: 1d."
            )));
        }

        let mut bars = Vec::new();
        let mut urls = Vec::new();
        let mut raw = Vec::new();
        let mut chunk_start = range.start;

        loop {
            let days = (range.end - chunk_start).num_days().clamp(1, CHUNK_DAYS);
            let chunk_end = chunk_start + Duration::days(days);
            let to = DateRange::new(chunk_start, chunk_end).end_timestamp();
            let url = Self::bars_url(symbol, source, to, days);
            let body = self.transport.get_json(&url).await?;
            let rows = rows_at(&body, "data");
            if rows.is_empty() {
                break;
            }
            debug!(%symbol, url, rows = rows.len(), "Fetched bars chunk");
            bars.extend(TcbsPriceBar::parse_all(rows)?);
            urls.push(url);
            raw.push(body);
            chunk_start = chunk_end;
            if chunk_start >= range.end {
                break;
            }
        }

        bars.retain(|bar| range.contains(bar.date.date_naive()));
        Ok(Response::from_records(ProviderId::Tcbs, bars, Value::Array(raw))?
            .with_symbol(symbol)
            .with_api_url(urls))
    }

    /// Reads `page`/`size` paged rows under `key` until a page comes back
    /// empty or `limit` rows are collected. A `limit` of zero reads every page.
    async fn paged<V: RecordVariant>(
        &self,
        symbol: &Symbol,
        url: &str,
        key: &str,
        limit: usize,
    ) -> Result<Response<V::Record>> {
        let size = page_size(limit, MAX_PAGE_SIZE);
        let separator = if url.contains('?') { '&' } else { '?' };
        let mut records = Vec::new();
        let mut urls = Vec::new();
        let mut raw = Vec::new();

        for page in 0.. {
            let page_url = format!("{url}{separator}page={page}&size={size}");
            let body = self.transport.get_json(&page_url).await?;
            let rows = rows_at(&body, key);
            if rows.is_empty() {
                break;
            }
            let short_page = rows.len() < size;
            debug!(%symbol, url = page_url, page, rows = rows.len(), "Fetched page");
            records.extend(V::parse_all(rows)?);
            urls.push(page_url);
            raw.push(body);

            if limit > 0 && records.len() >= limit {
                records.truncate(limit);
                break;
            }
            if short_page {
                break;
            }
        }

        Ok(
            Response::from_records(ProviderId::Tcbs, records, Value::Array(raw))?
                .with_symbol(symbol)
                .with_api_url(urls),
        )
    }

    /// Fetches the ratio payload with `period` injected in every row.
    async fn ratio_rows(
        &self,
        symbol: &Symbol,
        period: Period,
    ) -> Result<(String, Value, Vec<Value>)> {
        let url = format!(
            "{ANALYSIS_URL}/finance/{symbol}/financialratio?yearly={}&isAll=true",
            yearly(period)
        );
        let body = self.transport.get_json(&url).await?;
        let rows = with_period(&body, period);
        Ok((url, body, rows))
    }

    async fn statement(
        &self,
        symbol: &Symbol,
        period: Period,
        statement: Statement,
    ) -> Result<Response<StatementItem>> {
        let url = format!(
            "{ANALYSIS_URL}/finance/{symbol}/{}?yearly={}&isAll=true",
            statement.path(),
            yearly(period)
        );
        let body = self.transport.get_json(&url).await?;
        let rows = melt_statement(&with_period(&body, period));
        let items = TcbsStatementItem::parse_all(rows)?;
        Ok(Response::from_records(ProviderId::Tcbs, items, body)?
            .with_symbol(symbol)
            .with_api_url(url))
    }
}

impl Default for TcbsProvider {
    fn default() -> Self {
        Self::new()
    }
}

const fn yearly(period: Period) -> u8 {
    match period {
        Period::Annual => 1,
        Period::Quarter => 0,
    }
}

/// Rows of the array under `key`, or of the body itself when `key` is empty.
fn rows_at(body: &Value, key: &str) -> Vec<Value> {
    let node = if key.is_empty() { Some(body) } else { body.get(key) };
    node.and_then(Value::as_array).cloned().unwrap_or_default()
}

fn with_period(body: &Value, period: Period) -> Vec<Value> {
    rows_at(body, "")
        .into_iter()
        .map(|mut row| {
            if let Some(object) = row.as_object_mut() {
                object.insert("period".to_string(), json!(period.as_str()));
            }
            row
        })
        .collect()
}

/// Unpivots statement rows: one output row per (input row, line item), grouped
/// by line item. Every output row carries the id columns plus `ITEMS` and `values`.
pub fn melt_statement(rows: &[Value]) -> Vec<Value> {
    let objects: Vec<&Map<String, Value>> = rows.iter().filter_map(Value::as_object).collect();
    let mut items: Vec<&String> = Vec::new();
    for row in &objects {
        for key in row.keys() {
            if !STATEMENT_ID_COLUMNS.contains(&key.as_str()) && !items.contains(&key) {
                items.push(key);
            }
        }
    }

    items
        .into_iter()
        .flat_map(|item| {
            objects.iter().map(move |row| {
                let mut melted: Map<String, Value> = STATEMENT_ID_COLUMNS
                    .iter()
                    .map(|id| ((*id).to_string(), row.get(*id).cloned().unwrap_or(Value::Null)))
                    .collect();
                melted.insert("ITEMS".to_string(), json!(item));
                melted.insert(
                    "values".to_string(),
                    row.get(item).cloned().unwrap_or(Value::Null),
                );
                Value::Object(melted)
            })
        })
        .collect()
}

impl Provider for TcbsProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Tcbs
    }

    fn description(&self) -> &str {
        "TCBS provider for prices, ownership, events, fundamentals and news"
    }
}

#[async_trait]
impl EquityProvider for TcbsProvider {
    async fn profile(&self, symbol: &Symbol) -> Result<Response<CompanyProfile>> {
        let company_url = format!("{ANALYSIS_URL}/company/{symbol}/overview");
        let ticker_url = format!("{ANALYSIS_URL}/ticker/{symbol}/overview");
        let company = self.transport.get_json(&company_url).await?;
        let ticker = self.transport.get_json(&ticker_url).await?;

        let mut merged = Map::new();
        for body in [company, ticker] {
            if let Value::Object(object) = body {
                merged.extend(object);
            }
        }
        if merged.is_empty() {
            return Err(DataError::empty());
        }

        let profile = TcbsProfile::parse(merged.clone())?;
        Ok(
            Response::from_records(ProviderId::Tcbs, vec![profile], Value::Object(merged))?
                .with_symbol(symbol)
                .with_api_url(vec![company_url, ticker_url]),
        )
    }
}

#[async_trait]
impl EquityPriceProvider for TcbsProvider {
    async fn historical(
        &self,
        symbol: &Symbol,
        range: DateRange,
        interval: Interval,
    ) -> Result<Response<PriceBar>> {
        self.bars(symbol, range, interval, BarSource::Stock).await
    }

    async fn quote(&self, symbol: &Symbol, limit: usize) -> Result<Response<QuoteTick>> {
        let url = format!("{API_URL}/stock-insight/v1/intraday/{symbol}/investor/his/paging");
        self.paged::<TcbsQuote>(symbol, &format!("{url}?headIndex=-1"), "data", limit)
            .await
    }
}

#[async_trait]
impl EquityOwnershipProvider for TcbsProvider {
    async fn insider_trading(
        &self,
        symbol: &Symbol,
        limit: usize,
    ) -> Result<Response<InsiderTrade>> {
        let url = format!("{ANALYSIS_URL}/company/{symbol}/insider-dealing");
        self.paged::<TcbsInsiderTrade>(symbol, &url, "listInsiderDealing", limit)
            .await
    }

    async fn major_holders(&self, symbol: &Symbol) -> Result<Response<MajorHolder>> {
        let url = format!("{ANALYSIS_URL}/company/{symbol}/large-share-holders");
        let body = self.transport.get_json(&url).await?;
        let holders = TcbsMajorHolder::parse_all(rows_at(&body, "listShareHolder"))?;
        Ok(Response::from_records(ProviderId::Tcbs, holders, body)?
            .with_symbol(symbol)
            .with_api_url(url))
    }
}

#[async_trait]
impl EquityCalendarProvider for TcbsProvider {
    async fn events(&self, symbol: &Symbol, limit: usize) -> Result<Response<CalendarEvent>> {
        let url = format!("{ANALYSIS_URL}/ticker/{symbol}/events-news");
        self.paged::<TcbsEvent>(symbol, &url, "listEventNews", limit)
            .await
    }
}

#[async_trait]
impl EquityFundamentalProvider for TcbsProvider {
    async fn management(&self, symbol: &Symbol) -> Result<Response<Executive>> {
        let url = format!("{ANALYSIS_URL}/company/{symbol}/key-officers");
        self.paged::<TcbsExecutive>(symbol, &url, "listKeyOfficer", 0)
            .await
    }

    async fn ratios(&self, symbol: &Symbol, period: Period) -> Result<Response<FinancialRatio>> {
        let (url, body, rows) = self.ratio_rows(symbol, period).await?;
        let ratios = TcbsRatio::parse_all(rows)?;
        Ok(Response::from_records(ProviderId::Tcbs, ratios, body)?
            .with_symbol(symbol)
            .with_api_url(url))
    }

    async fn dividends(&self, symbol: &Symbol, limit: usize) -> Result<Response<Dividend>> {
        let url = format!("{ANALYSIS_URL}/company/{symbol}/dividend-payment-histories");
        self.paged::<TcbsDividend>(symbol, &url, "listDividendPaymentHis", limit)
            .await
    }

    async fn income(&self, symbol: &Symbol, period: Period) -> Result<Response<StatementItem>> {
        self.statement(symbol, period, Statement::Income).await
    }

    async fn balance(&self, symbol: &Symbol, period: Period) -> Result<Response<StatementItem>> {
        self.statement(symbol, period, Statement::Balance).await
    }

    async fn cash(&self, symbol: &Symbol, period: Period) -> Result<Response<StatementItem>> {
        self.statement(symbol, period, Statement::Cash).await
    }

    async fn multiples(
        &self,
        symbol: &Symbol,
        period: Period,
    ) -> Result<Response<FinancialRatio>> {
        let (url, body, rows) = self.ratio_rows(symbol, period).await?;
        let multiples = TcbsMultiples::parse_all(rows)?;
        Ok(Response::from_records(ProviderId::Tcbs, multiples, body)?
            .with_symbol(symbol)
            .with_api_url(url))
    }
}

#[async_trait]
impl FuturesProvider for TcbsProvider {
    async fn historical(&self, symbol: &Symbol, range: DateRange) -> Result<Response<PriceBar>> {
        self.bars(symbol, range, Interval::OneDay, BarSource::Futures)
            .await
    }
}

#[async_trait]
impl IndexPriceProvider for TcbsProvider {
    async fn historical(
        &self,
        symbol: &Symbol,
        range: DateRange,
        interval: Interval,
    ) -> Result<Response<PriceBar>> {
        self.bars(symbol, range, interval, BarSource::Index).await
    }
}

#[async_trait]
impl EtfProvider for TcbsProvider {
    async fn historical(
        &self,
        symbol: &Symbol,
        range: DateRange,
        interval: Interval,
    ) -> Result<Response<PriceBar>> {
        self.bars(symbol, range, interval, BarSource::Stock).await
    }
}

#[async_trait]
impl NewsProvider for TcbsProvider {
    async fn company(&self, symbol: &Symbol, limit: usize) -> Result<Response<NewsItem>> {
        let url = format!("{ANALYSIS_URL}/ticker/{symbol}/activity-news");
        self.paged::<TcbsNews>(symbol, &url, "listActivityNews", limit)
            .await
    }
}
