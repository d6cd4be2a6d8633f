#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vietfin/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! VDSC (Rong Viet Securities) futures board provider.
//!
//! # Example
//!
//! ```no_run
//! use vietfin_vdsc::VdscProvider;
//! use vietfin_core::{FuturesProvider, Symbol};
//!
//! # async fn example() -> vietfin_core::Result<()> {
//! let provider = VdscProvider::new();
//! let cookie = "JSESSIONID=...";
//! let trades = provider.quote(&Symbol::new("VN30F2403"), 100, Some(cookie)).await?;
//! println!("{trades}");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde_json::{Value, json};
use tracing::debug;
use vietfin_core::{
    DataError, FieldAlias, FuturesProvider, FuturesTrade, HttpTransport, Provider, ProviderId,
    RecordVariant, Response, Result, Symbol, Transport,
};

/// Intraday board search.
const BOARD_URL: &str = "https://livedragon.vdsc.com.vn/general/intradaySearch.rv";

const HEADERS: &[(&str, &str)] = &[
    ("Accept", "application/json, text/javascript, */*; q=0.01"),
    ("Accept-Language", "en-US,en;q=0.9"),
    ("DNT", "1"),
    ("Origin", "https://livedragon.vdsc.com.vn"),
    ("Sec-Fetch-Dest", "empty"),
    ("Sec-Fetch-Mode", "cors"),
    ("Sec-Fetch-Site", "same-origin"),
    ("X-Requested-With", "XMLHttpRequest"),
];

/// Rows of the intraday board.
///
/// The board has no trade side or trade id; the session date is the board
/// date of the request and is added by the provider.
#[derive(Debug)]
pub struct VdscFuturesTrade;

impl RecordVariant for VdscFuturesTrade {
    type Record = FuturesTrade;
    const NAME: &'static str = "VdscFuturesTrade";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("time", "TradeTime"),
        FieldAlias::new("symbol", "Code"),
        FieldAlias::new("exchange", "FloorCode"),
        FieldAlias::new("ref_price", "RefPrice"),
        FieldAlias::new("high_price", "HigPrice"),
        FieldAlias::new("low_price", "LowPrice"),
        FieldAlias::new("volume", "MatchedVol"),
        FieldAlias::new("price", "MatchedPrice"),
        FieldAlias::new("price_change", "MatchedChange"),
        FieldAlias::new("avg_price", "AvgPrice"),
        FieldAlias::new("total_volume", "MatchedTotalVol"),
        FieldAlias::new("bid_price_1", "BidPrice1"),
        FieldAlias::new("bid_volume_1", "BidVol1"),
        FieldAlias::new("bid_price_2", "BidPrice2"),
        FieldAlias::new("bid_volume_2", "BidVol2"),
        FieldAlias::new("bid_price_3", "BidPrice3"),
        FieldAlias::new("bid_volume_3", "BidVol3"),
        FieldAlias::new("offer_price_1", "OfferPrice1"),
        FieldAlias::new("offer_volume_1", "OfferVol1"),
        FieldAlias::new("offer_price_2", "OfferPrice2"),
        FieldAlias::new("offer_volume_2", "OfferVol2"),
        FieldAlias::new("offer_price_3", "OfferPrice3"),
        FieldAlias::new("offer_volume_3", "OfferVol3"),
        FieldAlias::new("ceiling_price", "CeiPrice"),
        FieldAlias::new("floor_price", "FlrPrice"),
        FieldAlias::new("session", "AmPm"),
    ];
}

/// VDSC data provider.
#[derive(Debug, Clone)]
pub struct VdscProvider {
    transport: Arc<dyn Transport>,
}

impl VdscProvider {
    /// Create a new VDSC provider with the default HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::with_transport(Arc::new(HttpTransport::new("vdsc", HEADERS)))
    }

    /// Create a new VDSC provider with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self::with_transport(Arc::new(HttpTransport::with_client("vdsc", client)))
    }

    /// Create a new VDSC provider over any transport.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn board(
        &self,
        symbol: &Symbol,
        date: NaiveDate,
        limit: usize,
        cookie: Option<&str>,
    ) -> Result<Response<FuturesTrade>> {
        let form = [
            ("stockCode", symbol.to_string()),
            ("boardDate", date.format("%d/%m/%Y").to_string()),
        ];
        let headers: Vec<(&str, String)> = cookie
            .filter(|c| !c.is_empty())
            .map(|c| ("Cookie", c.to_string()))
            .into_iter()
            .collect();

        let body = self.transport.post_form(BOARD_URL, &form, &headers).await?;
        let mut rows = body
            .get("list")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        if rows.is_empty() {
            return Err(DataError::EmptyData(format!(
                "No data found for the given symbol {symbol} on {date}"
            )));
        }
        if limit > 0 {
            rows.truncate(limit);
        }
        for row in &mut rows {
            if let Some(object) = row.as_object_mut() {
                object.insert("date_session".to_string(), json!(date));
            }
        }

        debug!(%symbol, %date, rows = rows.len(), "Fetched intraday board");
        let trades = VdscFuturesTrade::parse_all(rows)?;
        Ok(Response::from_records(ProviderId::Vdsc, trades, body)?
            .with_symbol(symbol)
            .with_api_url(BOARD_URL))
    }
}

impl Default for VdscProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for VdscProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Vdsc
    }

    fn description(&self) -> &str {
        "VDSC LiveDragon provider for the intraday futures board"
    }
}

#[async_trait]
impl FuturesProvider for VdscProvider {
    async fn quote(
        &self,
        symbol: &Symbol,
        limit: usize,
        cookie: Option<&str>,
    ) -> Result<Response<FuturesTrade>> {
        self.board(symbol, Utc::now().date_naive(), limit, cookie)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use vietfin_core::StaticTransport;

    fn board_row(minute: u32) -> Value {
        json!({
            "TradeTime": format!("14:{minute:02}:05"),
            "Code": "VN30F2403",
            "FloorCode": "DER",
            "RefPrice": 1245.0,
            "HigPrice": 1260.0,
            "LowPrice": 1240.2,
            "MatchedVol": 12,
            "MatchedPrice": 1250.5,
            "MatchedChange": 5.5,
            "AvgPrice": 1251.3,
            "MatchedTotalVol": 180_000,
            "BidPrice1": 1250.4, "BidVol1": 30,
            "BidPrice2": 1250.3, "BidVol2": 45,
            "BidPrice3": 1250.2, "BidVol3": 60,
            "OfferPrice1": 1250.6, "OfferVol1": 25,
            "OfferPrice2": 1250.7, "OfferVol2": 40,
            "OfferPrice3": 1250.8, "OfferVol3": 55,
            "CeiPrice": 1332.1,
            "FlrPrice": 1157.9,
            "AmPm": "PM"
        })
    }

    fn provider(transport: StaticTransport) -> (VdscProvider, Arc<StaticTransport>) {
        let transport = Arc::new(transport);
        (VdscProvider::with_transport(transport.clone()), transport)
    }

    fn session() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 8).unwrap()
    }

    #[test]
    fn test_provider_info() {
        let provider = VdscProvider::default();
        assert_eq!(provider.name(), "vdsc");
    }

    #[tokio::test]
    async fn test_board_rows_parsed() {
        let (provider, _) = provider(
            StaticTransport::new().route("intradaySearch.rv", json!({"list": [board_row(29)]})),
        );
        let response = provider
            .board(&Symbol::new("VN30F2403"), session(), 0, Some("JSESSIONID=abc"))
            .await
            .unwrap();

        assert_eq!(response.provider, "vdsc");
        let trade = response.records().next().unwrap();
        assert_eq!(trade.date_session, session());
        assert_eq!(trade.time, NaiveTime::from_hms_opt(14, 29, 5).unwrap());
        assert_eq!(trade.volume, 12);
        assert!((trade.price - 1250.5).abs() < f64::EPSILON);
        assert_eq!(trade.total_volume, Some(180_000));
        assert_eq!(trade.offer_volume_3, Some(55));
        assert_eq!(trade.session.as_deref(), Some("PM"));
        assert_eq!(trade.status, None);
        assert_eq!(trade.id, None);
    }

    #[tokio::test]
    async fn test_form_carries_board_date_and_cookie() {
        let (provider, transport) =
            provider(StaticTransport::new().route("intradaySearch.rv", json!({"list": [board_row(1)]})));
        provider
            .board(&Symbol::new("vn30f2403"), session(), 0, Some("JSESSIONID=abc"))
            .await
            .unwrap();

        assert_eq!(
            transport.sent_forms(),
            vec![
                ("stockCode".to_string(), "VN30F2403".to_string()),
                ("boardDate".to_string(), "08/03/2024".to_string()),
            ]
        );
        assert_eq!(
            transport.sent_headers(),
            vec![("Cookie".to_string(), "JSESSIONID=abc".to_string())]
        );
    }

    #[tokio::test]
    async fn test_missing_cookie_sends_no_header() {
        let (provider, transport) =
            provider(StaticTransport::new().route("intradaySearch.rv", json!({"list": [board_row(1)]})));
        FuturesProvider::quote(&provider, &Symbol::new("VN30F2403"), 0, None)
            .await
            .unwrap();
        assert!(transport.sent_headers().is_empty());
    }

    #[tokio::test]
    async fn test_limit_truncates_board() {
        let rows: Vec<Value> = (0..30).map(board_row).collect();
        let (provider, _) =
            provider(StaticTransport::new().route("intradaySearch.rv", json!({"list": rows})));
        let response = provider
            .board(&Symbol::new("VN30F2403"), session(), 10, None)
            .await
            .unwrap();
        assert_eq!(response.len(), 10);
        assert_eq!(
            response.records().last().unwrap().time,
            NaiveTime::from_hms_opt(14, 9, 5).unwrap()
        );
    }

    #[tokio::test]
    async fn test_empty_board_names_symbol_and_date() {
        let (provider, _) =
            provider(StaticTransport::new().route("intradaySearch.rv", json!({"list": []})));
        let err = provider
            .board(&Symbol::new("VN30F2403"), session(), 0, None)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No data found for the given symbol VN30F2403 on 2024-03-08"
        );
    }
}
