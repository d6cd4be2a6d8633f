#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vietfin/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! DNSE (Entrade) chart data provider.
//!
//! Serves OHLCV bars for stocks, indices and ETFs at every supported interval.
//! Intraday requests are clamped to the 90 most recent days.
//!
//! # Example
//!
//! ```no_run
//! use vietfin_dnse::DnseProvider;
//! use vietfin_core::{DateRange, IndexPriceProvider, Interval, Symbol};
//!
//! # async fn example() -> vietfin_core::Result<()> {
//! let provider = DnseProvider::new();
//! let range = DateRange::parse("2024-01-01", "2024-03-31")?;
//! let bars = provider
//!     .historical(&Symbol::new("VNINDEX"), range, Interval::OneDay)
//!     .await?;
//! println!("{bars}");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use vietfin_core::{
    DateRange, EquityPriceProvider, EtfProvider, FieldAlias, HttpTransport, IndexPriceProvider,
    Interval, PriceBar, Provider, ProviderId, RecordVariant, Response, Result, Symbol, Transport,
    alias::columns_to_rows, parse::epoch_seconds,
};

/// Chart API base URL.
const BASE_URL: &str = "https://services.entrade.com.vn/chart-api/v2/ohlcs";

/// Days of intraday history served by the chart API.
const INTRADAY_WINDOW_DAYS: i64 = 90;

const HEADERS: &[(&str, &str)] = &[
    ("accept", "application/json, text/plain, */*"),
    ("accept-language", "en-US,en;q=0.9,vi;q=0.8"),
    ("origin", "https://banggia.dnse.com.vn"),
    ("referer", "https://banggia.dnse.com.vn/"),
];

/// Column-oriented OHLCV payload rows.
#[derive(Debug)]
pub struct DnsePriceBar;

impl RecordVariant for DnsePriceBar {
    type Record = PriceBar;
    const NAME: &'static str = "DnsePriceBar";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::parsed("date", "t", epoch_seconds),
        FieldAlias::new("open", "o"),
        FieldAlias::new("high", "h"),
        FieldAlias::new("low", "l"),
        FieldAlias::new("close", "c"),
        FieldAlias::new("volume", "v"),
    ];
}

const fn resolution(interval: Interval) -> &'static str {
    match interval {
        Interval::OneMinute => "1",
        Interval::FifteenMinutes => "15",
        Interval::ThirtyMinutes => "30",
        Interval::OneHour => "1H",
        Interval::OneDay => "1D",
    }
}

/// DNSE data provider.
#[derive(Debug, Clone)]
pub struct DnseProvider {
    transport: Arc<dyn Transport>,
}

impl DnseProvider {
    /// Create a new DNSE provider with the default HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::with_transport(Arc::new(HttpTransport::new("dnse", HEADERS)))
    }

    /// Create a new DNSE provider with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self::with_transport(Arc::new(HttpTransport::with_client("dnse", client)))
    }

    /// Create a new DNSE provider over any transport.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn ohlcs(
        &self,
        kind: &str,
        symbol: &Symbol,
        range: DateRange,
        interval: Interval,
    ) -> Result<Response<PriceBar>> {
        let range = if interval.is_intraday() {
            range.clamp_to_recent(INTRADAY_WINDOW_DAYS, Utc::now().date_naive())
        } else {
            range
        };

        let url = format!(
            "{BASE_URL}/{kind}?from={}&to={}&symbol={symbol}&resolution={}",
            range.start_timestamp(),
            range.end_timestamp(),
            resolution(interval)
        );
        let body = self.transport.get_json(&url).await?;
        let rows = columns_to_rows(&body);
        debug!(%symbol, url, rows = rows.len(), "Fetched ohlcs");

        let bars = DnsePriceBar::parse_all(rows)?;
        Ok(Response::from_records(ProviderId::Dnse, bars, body)?
            .with_symbol(symbol)
            .with_api_url(url))
    }
}

impl Default for DnseProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for DnseProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Dnse
    }

    fn description(&self) -> &str {
        "DNSE provider for stock, index and ETF bars"
    }
}

#[async_trait]
impl EquityPriceProvider for DnseProvider {
    async fn historical(
        &self,
        symbol: &Symbol,
        range: DateRange,
        interval: Interval,
    ) -> Result<Response<PriceBar>> {
        self.ohlcs("stock", symbol, range, interval).await
    }
}

#[async_trait]
impl IndexPriceProvider for DnseProvider {
    async fn historical(
        &self,
        symbol: &Symbol,
        range: DateRange,
        interval: Interval,
    ) -> Result<Response<PriceBar>> {
        self.ohlcs("index", symbol, range, interval).await
    }
}

#[async_trait]
impl EtfProvider for DnseProvider {
    async fn historical(
        &self,
        symbol: &Symbol,
        range: DateRange,
        interval: Interval,
    ) -> Result<Response<PriceBar>> {
        self.ohlcs("stock", symbol, range, interval).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use serde_json::json;
    use vietfin_core::{DataError, StaticTransport};

    fn ohlcs() -> serde_json::Value {
        json!({
            "t": [1704153600, 1704240000, 1704326400],
            "o": [1130.1, 1132.0, 1128.5],
            "h": [1135.0, 1136.2, 1131.0],
            "l": [1128.0, 1127.4, 1120.9],
            "c": [1132.5, 1129.9, 1122.3],
            "v": [500000, 620000, 580000],
            "nextTime": 0
        })
    }

    #[test]
    fn test_resolution_codes() {
        let codes: Vec<&str> = Interval::ALL.iter().map(|i| resolution(*i)).collect();
        assert_eq!(codes, vec!["1", "15", "30", "1H", "1D"]);
    }

    #[tokio::test]
    async fn test_index_bars() {
        let transport = Arc::new(StaticTransport::new().route("ohlcs/index", ohlcs()));
        let provider = DnseProvider::with_transport(transport.clone());
        let range = DateRange::parse("2024-01-01", "2024-01-05").unwrap();

        let response = IndexPriceProvider::historical(
            &provider,
            &Symbol::new("vnindex"),
            range,
            Interval::OneDay,
        )
        .await
        .unwrap();

        assert_eq!(response.provider, "dnse");
        assert_eq!(response.len(), 3);
        let first = response.records().next().unwrap();
        assert_eq!(first.close, 1132.5);
        assert_eq!(first.volume, 500_000);
        assert_eq!(
            transport.requests()[0],
            "https://services.entrade.com.vn/chart-api/v2/ohlcs/index?from=1704067200&to=1704412800&symbol=VNINDEX&resolution=1D"
        );
    }

    #[tokio::test]
    async fn test_intraday_range_is_clamped() {
        let transport = Arc::new(StaticTransport::new().fallback(ohlcs()));
        let provider = DnseProvider::with_transport(transport.clone());
        let today = Utc::now().date_naive();
        let range = DateRange::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), today);

        EquityPriceProvider::historical(&provider, &Symbol::new("FPT"), range, Interval::OneHour)
            .await
            .unwrap();

        let expected = DateRange::new(today - Duration::days(INTRADAY_WINDOW_DAYS), today);
        let url = &transport.requests()[0];
        assert!(url.contains(&format!("from={}", expected.start_timestamp())));
        assert!(url.ends_with("resolution=1H"));
    }

    #[tokio::test]
    async fn test_empty_columns_are_empty_data() {
        let transport = Arc::new(StaticTransport::new().fallback(json!({"t": [], "nextTime": 0})));
        let provider = DnseProvider::with_transport(transport);
        let range = DateRange::parse("2024-01-01", "2024-01-05").unwrap();
        let err = EtfProvider::historical(&provider, &Symbol::new("E1VFVN30"), range, Interval::OneDay)
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::EmptyData(_)));
    }
}
