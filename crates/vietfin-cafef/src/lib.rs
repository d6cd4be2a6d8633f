#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vietfin/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! CafeF trading history provider.
//!
//! Implements the foreign and proprietary trading halves of
//! [`EquityOwnershipProvider`] from the CafeF `DataHistory` handlers. Both
//! handlers are paged from `PageIndex=1` until a page comes back empty.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde_json::{Value, json};
use tracing::debug;
use vietfin_core::{
    DateRange, EquityOwnershipProvider, FieldAlias, ForeignTrade, HttpTransport, PropTrade,
    Provider, ProviderId, RawRecord, RecordVariant, Response, Result, Symbol, Transport,
    parse::date_dmy,
};

/// Trading history handlers.
const BASE_URL: &str = "https://s.cafef.vn/Ajax/PageNew/DataHistory";

/// Rows per page.
const PAGE_SIZE: usize = 20;

const HEADERS: &[(&str, &str)] = &[
    ("accept", "application/json, text/plain, */*"),
    ("accept-language", "vi-VN,vi;q=0.9,en;q=0.8"),
    ("referer", "https://s.cafef.vn/"),
];

/// `"76.1(-2.65 %)"`: close price and percent change.
static PRICE_CHANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([\d.]+)\(([-\d.]+) %\)").expect("Invalid regex pattern")
});

/// Rows of `GDKhoiNgoai.ashx`.
#[derive(Debug)]
pub struct CafefForeignTrade;

impl RecordVariant for CafefForeignTrade {
    type Record = ForeignTrade;
    const NAME: &'static str = "CafefForeignTrade";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::parsed("date", "Ngay", date_dmy),
        FieldAlias::new("net_trading_volume", "KLGDRong"),
        FieldAlias::new("net_trading_value", "GTDGRong"),
        FieldAlias::new("bid_volume", "KLMua"),
        FieldAlias::new("bid_value", "GtMua"),
        FieldAlias::new("ask_volume", "KLBan"),
        FieldAlias::new("ask_value", "GtBan"),
        FieldAlias::new("remaining_room", "RoomConLai"),
        FieldAlias::new("weight", "DangSoHuu"),
    ];

    fn pre_parse(row: &mut RawRecord) -> std::result::Result<(), String> {
        let captures = row
            .get("ThayDoi")
            .and_then(Value::as_str)
            .and_then(|s| PRICE_CHANGE.captures(s))
            .map(|c| (c[1].parse::<f64>().ok(), c[2].parse::<f64>().ok()));
        let (close, change) = captures.unwrap_or((None, None));
        row.insert("close_price".to_string(), json!(close));
        row.insert("percent_change".to_string(), json!(change));
        Ok(())
    }
}

/// Rows of `GDTuDoanh.ashx`.
#[derive(Debug)]
pub struct CafefPropTrade;

impl RecordVariant for CafefPropTrade {
    type Record = PropTrade;
    const NAME: &'static str = "CafefPropTrade";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::parsed("date", "Date", date_dmy),
        FieldAlias::new("bid_volume", "KLcpMua"),
        FieldAlias::new("bid_value", "GtMua"),
        FieldAlias::new("ask_volume", "KlcpBan"),
        FieldAlias::new("ask_value", "GtBan"),
        FieldAlias::new("symbol", "Symbol"),
    ];
}

/// CafeF data provider.
#[derive(Debug, Clone)]
pub struct CafefProvider {
    transport: Arc<dyn Transport>,
}

impl CafefProvider {
    /// Create a new CafeF provider with the default HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::with_transport(Arc::new(HttpTransport::new("cafef", HEADERS)))
    }

    /// Create a new CafeF provider with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self::with_transport(Arc::new(HttpTransport::with_client("cafef", client)))
    }

    /// Create a new CafeF provider over any transport.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Reads every page of `handler`, taking rows at `pointer`.
    async fn history<V: RecordVariant>(
        &self,
        handler: &str,
        pointer: &str,
        symbol: &Symbol,
        range: DateRange,
    ) -> Result<Response<V::Record>> {
        let mut records = Vec::new();
        let mut urls = Vec::new();
        let mut raw = Vec::new();

        for page in 1.. {
            let url = format!(
                "{BASE_URL}/{handler}?Symbol={symbol}&StartDate={}&EndDate={}&PageIndex={page}&PageSize={PAGE_SIZE}",
                range.start, range.end
            );
            let body = self.transport.get_json(&url).await?;
            let rows = body
                .pointer(pointer)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            if rows.is_empty() {
                break;
            }
            debug!(%symbol, url, page, rows = rows.len(), "Fetched page");
            records.extend(V::parse_all(rows)?);
            urls.push(url);
            raw.push(body);
        }

        Ok(
            Response::from_records(ProviderId::Cafef, records, Value::Array(raw))?
                .with_symbol(symbol)
                .with_api_url(urls),
        )
    }
}

impl Default for CafefProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for CafefProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Cafef
    }

    fn description(&self) -> &str {
        "CafeF provider for foreign and proprietary trading history"
    }
}

#[async_trait]
impl EquityOwnershipProvider for CafefProvider {
    async fn foreign_trading(
        &self,
        symbol: &Symbol,
        range: DateRange,
    ) -> Result<Response<ForeignTrade>> {
        self.history::<CafefForeignTrade>("GDKhoiNgoai.ashx", "/Data/Data", symbol, range)
            .await
    }

    async fn prop_trading(&self, symbol: &Symbol, range: DateRange) -> Result<Response<PropTrade>> {
        self.history::<CafefPropTrade>(
            "GDTuDoanh.ashx",
            "/Data/Data/ListDataTudoanh",
            symbol,
            range,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use vietfin_core::{DataError, StaticTransport};

    fn foreign_row(day: u32) -> Value {
        json!({
            "Ngay": format!("{day:02}/01/2024"),
            "KLGDRong": -12000,
            "GTDGRong": -850_000_000,
            "KLMua": 30000,
            "GtMua": 2_100_000_000,
            "KLBan": 42000,
            "GtBan": 2_950_000_000_i64,
            "ThayDoi": "70.5(-1.26 %)",
            "RoomConLai": 1_000_000,
            "DangSoHuu": 52.3
        })
    }

    #[test]
    fn test_price_change_split() {
        let trade = CafefForeignTrade::parse_value(foreign_row(2)).unwrap();
        assert_eq!(trade.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(trade.close_price, Some(70.5));
        assert_eq!(trade.percent_change, Some(-1.26));
        assert_eq!(trade.net_trading_volume, Some(-12000));
    }

    #[test]
    fn test_unparseable_price_change_is_none() {
        let mut row = foreign_row(2);
        row["ThayDoi"] = json!("n/a");
        let trade = CafefForeignTrade::parse_value(row).unwrap();
        assert_eq!(trade.close_price, None);
        assert_eq!(trade.percent_change, None);
    }

    #[tokio::test]
    async fn test_foreign_pages_until_empty() {
        let transport = Arc::new(
            StaticTransport::new()
                .route("PageIndex=1&", json!({"Data": {"Data": [foreign_row(2), foreign_row(3)]}}))
                .route("PageIndex=2&", json!({"Data": {"Data": [foreign_row(4)]}}))
                .route("PageIndex=3&", json!({"Data": {"Data": []}})),
        );
        let provider = CafefProvider::with_transport(transport.clone());
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();

        let response = provider
            .foreign_trading(&Symbol::new("VNM"), range)
            .await
            .unwrap();
        assert_eq!(response.len(), 3);
        assert_eq!(transport.requests().len(), 3);
        assert!(transport.requests()[0].contains(
            "GDKhoiNgoai.ashx?Symbol=VNM&StartDate=2024-01-01&EndDate=2024-01-31&PageIndex=1&PageSize=20"
        ));
    }

    #[tokio::test]
    async fn test_prop_without_rows_is_empty() {
        let transport = Arc::new(
            StaticTransport::new().fallback(json!({"Data": {"Data": {"ListDataTudoanh": []}}})),
        );
        let provider = CafefProvider::with_transport(transport);
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        let err = provider
            .prop_trading(&Symbol::new("VNM"), range)
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::EmptyData(_)));
    }

    #[tokio::test]
    async fn test_prop_rows() {
        let transport = Arc::new(
            StaticTransport::new()
                .route(
                    "PageIndex=1&",
                    json!({"Data": {"Data": {"ListDataTudoanh": [
                        {"Date": "05/01/2024", "Symbol": "VNM", "KLcpMua": 1000, "GtMua": 70_000_000, "KlcpBan": 0, "GtBan": 0}
                    ]}}}),
                )
                .fallback(json!({"Data": {"Data": {"ListDataTudoanh": []}}})),
        );
        let provider = CafefProvider::with_transport(transport);
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        let response = provider
            .prop_trading(&Symbol::new("VNM"), range)
            .await
            .unwrap();
        let trade = response.records().next().unwrap();
        assert_eq!(trade.symbol, "VNM");
        assert_eq!(trade.bid_volume, Some(1000));
    }
}
