//! End-to-end scenarios through the facades, served by canned payloads.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Value, json};
use vietfin::{
    Capability, DataError, Exchange, Interval, Period, ProviderId, Shape, StaticTransport, VietFin,
};

const BARS: &str = "bars-long-term";
const CATALOG: &str = "GetListOrganization";

fn client(transport: StaticTransport) -> (VietFin, Arc<StaticTransport>) {
    let transport = Arc::new(transport);
    (VietFin::with_transport(transport.clone()), transport)
}

fn catalog(size: usize) -> Value {
    let items: Vec<Value> = (0..size)
        .map(|i| {
            let ticker = if i == 42 {
                "VNM".to_string()
            } else {
                format!("T{i:04}")
            };
            json!({
                "ticker": ticker,
                "organName": format!("Company {i}"),
                "organShortName": format!("Co {i}"),
                "organCode": format!("ORG{i}")
            })
        })
        .collect();
    json!({"items": items, "status": "Success"})
}

fn daily_bars() -> Value {
    json!({"ticker": "VNM", "data": [
        {"open": 70.0, "high": 71.0, "low": 69.0, "close": 70.5, "volume": 1000, "tradingDate": "2024-01-04T00:00:00.000Z"},
        {"open": 70.5, "high": 72.0, "low": 70.0, "close": 71.5, "volume": 2000, "tradingDate": "2024-01-02T00:00:00.000Z"},
        {"open": 71.5, "high": 73.0, "low": 69.5, "close": 69.8, "volume": 3000, "tradingDate": "2024-01-03T00:00:00.000Z"}
    ]})
}

#[tokio::test]
async fn empty_query_returns_full_catalog() {
    let (vf, transport) = client(StaticTransport::new().route(CATALOG, catalog(1800)));

    let response = vf.equity().search("").await.unwrap();

    assert_eq!(response.extra.records_count, 1800);
    assert_eq!(response.provider, "ssi");
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn single_symbol_search_is_case_normalized() {
    let (vf, _) = client(StaticTransport::new().route(CATALOG, catalog(1800)));

    let response = vf.equity().search("vnm").await.unwrap();

    assert_eq!(response.len(), 1);
    let record = response.records().next().unwrap();
    assert_eq!(record.symbol, "VNM");
    assert_eq!(response.extra.symbol.as_deref(), Some("VNM"));
}

#[tokio::test]
async fn provider_override_is_case_insensitive() {
    let (vf, transport) = client(StaticTransport::new().route(
        "wifeed",
        json!({"data": [
            {"code": "VNM", "fullname_vi": "Công ty Cổ phần Sữa Việt Nam", "san": "HOSE"},
            {"code": "FPT", "fullname_vi": "Công ty Cổ phần FPT", "san": "HOSE"}
        ]}),
    ));

    let response = vf.equity().using("WiFeed").search("").await.unwrap();

    assert_eq!(response.provider, "wifeed");
    assert_eq!(response.len(), 2);
    assert!(transport.requests()[0].contains("wifeed"));
}

#[tokio::test]
async fn unsupported_operation_names_operation_and_provider() {
    let (vf, transport) = client(StaticTransport::new());

    let err = vf
        .equity()
        .price()
        .using("dnse")
        .quote("VNM", 10)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "equity.price.quote() command is not implemented for dnse provider."
    );
    assert!(transport.requests().is_empty());

    let err = vf
        .equity()
        .fundamental()
        .using("ssi")
        .ratios("VNM", Period::Annual)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DataError::UnsupportedOperation {
            capability: Capability::EquityFundamental,
            operation: "ratios",
            ..
        }
    ));
}

#[tokio::test]
async fn parent_override_reaches_sub_facades() {
    let (vf, transport) = client(StaticTransport::new().route(
        "dchart",
        json!({"s": "ok", "t": [1704153600], "o": [20.1], "h": [20.5], "l": [20.0], "c": [20.3], "v": [1000]}),
    ));

    let response = vf
        .equity()
        .using("SSI")
        .price()
        .historical("FPT", Some("2024-01-01"), Some("2024-01-31"), Interval::OneDay)
        .await
        .unwrap();
    assert_eq!(response.provider, "ssi");
    assert!(transport.requests()[0].contains("dchart"));

    let err = vf
        .equity()
        .using("dnse")
        .fundamental()
        .ratios("FPT", Period::Annual)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DataError::UnknownProvider {
            capability: Capability::EquityFundamental,
            ..
        }
    ));

    let response = vf
        .index()
        .using("ssi")
        .price()
        .historical("VNINDEX", Some("2024-01-01"), Some("2024-01-31"), Interval::OneDay)
        .await;
    assert!(matches!(
        response,
        Err(DataError::UnknownProvider {
            capability: Capability::IndexPrice,
            ..
        })
    ));
}

#[tokio::test]
async fn futures_quote_forwards_cookie_to_vdsc() {
    let (vf, transport) = client(StaticTransport::new().route(
        "intradaySearch.rv",
        json!({"list": [
            {"TradeTime": "14:29:05", "Code": "VN30F2403", "MatchedVol": 12, "MatchedPrice": 1250.5},
            {"TradeTime": "14:29:01", "Code": "VN30F2403", "MatchedVol": 3, "MatchedPrice": 1250.4}
        ]}),
    ));

    let response = vf
        .derivatives()
        .futures()
        .using("vdsc")
        .quote("vn30f2403", 1, Some("JSESSIONID=abc"))
        .await
        .unwrap();

    assert_eq!(response.provider, "vdsc");
    assert_eq!(response.len(), 1);
    assert_eq!(
        transport.sent_headers(),
        vec![("Cookie".to_string(), "JSESSIONID=abc".to_string())]
    );
}

#[tokio::test]
async fn holdings_keep_series_order() {
    let (vf, _) = client(
        StaticTransport::new()
            .route(
                "products/filter",
                json!({"data": {"total": 1, "rows": [{"id": 28, "shortName": "DCDS"}]}}),
            )
            .route(
                "products/28",
                json!({"data": {
                    "productTopHoldingList": [
                        {"stockCode": "FPT", "industry": "Công nghệ", "netAssetPercent": 8.6, "type": "STOCK"},
                        {"stockCode": "MWG", "industry": "Bán lẻ", "netAssetPercent": 6.1, "type": "STOCK"}
                    ],
                    "productTopHoldingBondList": [
                        {"stockCode": "BVB12301", "industry": "Ngân hàng", "netAssetPercent": 2.0, "type": "BOND"}
                    ]
                }}),
            ),
    );

    let response = vf.funds().holdings("dcds").await.unwrap();
    assert_eq!(response.results.shape(), Shape::MultiSeries);

    let table = response.to_table(None, None).unwrap();
    let columns: Vec<&str> = table.column_names().collect();
    let last_equity = columns.iter().rposition(|c| c.starts_with("equity.")).unwrap();
    let first_bond = columns.iter().position(|c| c.starts_with("bond.")).unwrap();
    assert_eq!(columns[0], "equity.stock_code");
    assert!(last_equity < first_bond);
    assert_eq!(table.height(), 2);
    assert_eq!(table.column("bond.stock_code").unwrap()[1], Value::Null);
}

#[tokio::test]
async fn lookups_are_deterministic() {
    let (vf, _) = client(StaticTransport::new());
    let registry = vf.registry();

    let first = registry.equity_price("tcbs").unwrap();
    let second = registry.equity_price("TCBS").unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    for _ in 0..2 {
        let err = registry.equity_price("vndirect").unwrap_err();
        assert!(matches!(
            err,
            DataError::UnknownProvider {
                capability: Capability::EquityPrice,
                ..
            }
        ));
    }
    assert_eq!(
        registry.providers(Capability::IndexPrice),
        vec![ProviderId::Tcbs, ProviderId::Dnse]
    );
}

#[tokio::test]
async fn unknown_provider_fails_before_any_request() {
    let (vf, transport) = client(StaticTransport::new());

    let err = vf.funds().using("tcbs").search("", None).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Provider tcbs is not implemented yet for funds."
    );

    let err = vf.news().using("yahoo").company("VNM", 10).await.unwrap_err();
    assert!(matches!(err, DataError::UnknownProvider { .. }));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn zero_rows_is_empty_data() {
    let (vf, _) = client(
        StaticTransport::new()
            .route(CATALOG, json!({"items": []}))
            .route("top_stocks", json!({"data": []}))
            .route(BARS, json!({"ticker": "VNM", "data": []})),
    );

    let err = vf.equity().search("").await.unwrap_err();
    assert!(matches!(err, DataError::EmptyData(_)));

    let err = vf
        .equity()
        .discovery()
        .gainers(Exchange::Hose)
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::EmptyData(_)));

    let err = vf
        .equity()
        .price()
        .historical("VNM", Some("2024-01-01"), Some("2024-01-05"), Interval::OneDay)
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::EmptyData(_)));
}

#[tokio::test]
async fn price_history_defaults_to_tcbs() {
    let (vf, transport) = client(StaticTransport::new().route(BARS, daily_bars()));

    let response = vf
        .equity()
        .price()
        .historical("vnm", Some("2024-01-01"), Some("2024-01-05"), Interval::OneDay)
        .await
        .unwrap();

    assert_eq!(response.provider, "tcbs");
    assert_eq!(response.len(), 3);
    assert!(transport.requests()[0].contains("ticker=VNM"));
}

#[tokio::test]
async fn malformed_date_is_rejected() {
    let (vf, transport) = client(StaticTransport::new().route(BARS, daily_bars()));

    let err = vf
        .index()
        .price()
        .historical("VNINDEX", Some("01/02/2024"), None, Interval::OneDay)
        .await
        .unwrap_err();

    assert!(matches!(err, DataError::InvalidParameter(_)));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn table_conversion_is_idempotent() {
    let (vf, _) = client(StaticTransport::new().route(BARS, daily_bars()));
    let response = vf
        .equity()
        .price()
        .historical("VNM", Some("2024-01-01"), Some("2024-01-05"), Interval::OneDay)
        .await
        .unwrap();

    let first = response.to_table(None, None).unwrap();
    let second = response.to_table(None, None).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.height(), response.len());

    let fields: HashSet<&str> = ["date", "open", "high", "low", "close", "volume"].into();
    assert!(first.column_names().all(|c| fields.contains(c)));
    assert_eq!(first.index(), Some("date"));
}

#[tokio::test]
async fn sorting_permutes_rows() {
    let (vf, _) = client(StaticTransport::new().route(BARS, daily_bars()));
    let response = vf
        .equity()
        .price()
        .historical("VNM", Some("2024-01-01"), Some("2024-01-05"), Interval::OneDay)
        .await
        .unwrap();

    let unsorted = response.to_table(None, None).unwrap();
    let sorted = response.to_table(None, Some("close")).unwrap();

    let closes: Vec<f64> = sorted
        .column("close")
        .unwrap()
        .iter()
        .filter_map(Value::as_f64)
        .collect();
    assert_eq!(closes, vec![69.8, 70.5, 71.5]);

    let rows = |table: &vietfin::Table| {
        let mut rows: Vec<String> = (0..table.height())
            .filter_map(|i| table.row(i))
            .map(|row| Value::Object(row).to_string())
            .collect();
        rows.sort();
        rows
    };
    assert_eq!(rows(&unsorted), rows(&sorted));
}

#[tokio::test]
async fn csv_export_includes_header() {
    let (vf, _) = client(StaticTransport::new().route(BARS, daily_bars()));
    let response = vf
        .equity()
        .price()
        .historical("VNM", Some("2024-01-01"), Some("2024-01-05"), Interval::OneDay)
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vnm.csv");
    response.to_csv(&path, None, None).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 4);
    assert!(text.lines().next().unwrap().contains("close"));
}
