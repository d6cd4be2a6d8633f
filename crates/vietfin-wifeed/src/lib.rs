#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vietfin/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! WiFeed listed company provider.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use vietfin_core::{
    DataError, EquityInfo, EquityProvider, FieldAlias, HttpTransport, Provider, ProviderId,
    RecordVariant, Response, Result, Symbol, Transport,
};

/// Listed ticker catalog.
const LIST_URL: &str = "https://wifeed.vn/api/thong-tin-co-phieu/danh-sach-ma-chung-khoan";

/// Rows of the ticker catalog.
#[derive(Debug)]
pub struct WifeedEquityInfo;

impl RecordVariant for WifeedEquityInfo {
    type Record = EquityInfo;
    const NAME: &'static str = "WifeedEquityInfo";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("symbol", "code"),
        FieldAlias::new("name", "fullname_vi"),
        FieldAlias::new("exchange", "san"),
    ];
}

/// WiFeed data provider.
#[derive(Debug, Clone)]
pub struct WifeedProvider {
    transport: Arc<dyn Transport>,
}

impl WifeedProvider {
    /// Create a new WiFeed provider with the default HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::with_transport(Arc::new(HttpTransport::new("wifeed", &[])))
    }

    /// Create a new WiFeed provider with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self::with_transport(Arc::new(HttpTransport::with_client("wifeed", client)))
    }

    /// Create a new WiFeed provider over any transport.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

impl Default for WifeedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for WifeedProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Wifeed
    }

    fn description(&self) -> &str {
        "WiFeed provider for the listed company catalog"
    }
}

#[async_trait]
impl EquityProvider for WifeedProvider {
    async fn search(&self, symbol: &Symbol) -> Result<Response<EquityInfo>> {
        let body = self.transport.get_json(LIST_URL).await?;
        let mut rows = body
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        if rows.is_empty() {
            return Err(DataError::empty());
        }

        if !symbol.is_empty() {
            rows.retain(|row| {
                row.get("code")
                    .and_then(Value::as_str)
                    .is_some_and(|code| code.eq_ignore_ascii_case(symbol.as_str()))
            });
            if rows.is_empty() {
                return Err(DataError::EmptyData(format!(
                    "No data found for stock symbol: {symbol}"
                )));
            }
        }

        debug!(%symbol, rows = rows.len(), "Fetched ticker catalog");
        let tickers = WifeedEquityInfo::parse_all(rows)?;
        Ok(Response::from_records(ProviderId::Wifeed, tickers, body)?
            .with_symbol(symbol)
            .with_api_url(LIST_URL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vietfin_core::StaticTransport;

    fn catalog() -> Value {
        json!({"data": [
            {"code": "VNM", "fullname_vi": "Công ty Cổ phần Sữa Việt Nam", "san": "HOSE", "loaidn": 1},
            {"code": "SHS", "fullname_vi": "Công ty Cổ phần Chứng khoán Sài Gòn Hà Nội", "san": "HNX", "loaidn": 2},
            {"code": "BSR", "fullname_vi": "Công ty Cổ phần Lọc hóa dầu Bình Sơn", "san": "UPCOM", "loaidn": 1}
        ]})
    }

    #[tokio::test]
    async fn test_catalog_and_single_symbol() {
        let provider = WifeedProvider::with_transport(Arc::new(
            StaticTransport::new().route("danh-sach-ma-chung-khoan", catalog()),
        ));

        let all = provider.search(&Symbol::default()).await.unwrap();
        assert_eq!(all.extra.records_count, 3);
        assert_eq!(all.extra.symbol, None);

        let one = provider.search(&Symbol::new("shs")).await.unwrap();
        let info = one.records().next().unwrap();
        assert_eq!(info.exchange.as_deref(), Some("HNX"));
        assert_eq!(one.provider, "wifeed");
    }

    #[tokio::test]
    async fn test_unknown_symbol() {
        let provider = WifeedProvider::with_transport(Arc::new(
            StaticTransport::new().route("danh-sach-ma-chung-khoan", catalog()),
        ));
        let err = provider.search(&Symbol::new("XYZ")).await.unwrap_err();
        assert!(matches!(err, DataError::EmptyData(_)));
    }
}
