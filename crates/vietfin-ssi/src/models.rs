//! Alias tables mapping SSI payloads onto canonical records.

use serde_json::{Value, json};
use vietfin_core::alias::{FieldAlias, RawRecord, RecordVariant};
use vietfin_core::parse::{date_compact, date_dmy, epoch_millis_date, epoch_seconds, times_thousand};
use vietfin_core::records::{
    CoveredWarrant, EquityInfo, EtfInfo, FuturesContract, FuturesTrade, IndexConstituent,
    IndexInfo, MarketMover, PriceBar, StatementItem,
};

/// `fiin-core` organization list.
#[derive(Debug)]
pub struct SsiEquityInfo;

impl RecordVariant for SsiEquityInfo {
    type Record = EquityInfo;
    const NAME: &'static str = "SsiEquityInfo";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("symbol", "ticker"),
        FieldAlias::new("name", "organName"),
        FieldAlias::new("short_name", "organShortName"),
        FieldAlias::new("organ_code", "organCode"),
    ];
}

/// `fiin-core` company groups.
#[derive(Debug)]
pub struct SsiIndexInfo;

impl RecordVariant for SsiIndexInfo {
    type Record = IndexInfo;
    const NAME: &'static str = "SsiIndexInfo";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("index_symbol", "comGroupCode"),
        FieldAlias::new("group_by_index", "parentComGroupCode"),
    ];
}

/// iboard board rows of an index group.
#[derive(Debug)]
pub struct SsiIndexConstituent;

impl RecordVariant for SsiIndexConstituent {
    type Record = IndexConstituent;
    const NAME: &'static str = "SsiIndexConstituent";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("symbol", "ss"),
        FieldAlias::new("name", "cv"),
        FieldAlias::new("open", "o"),
        FieldAlias::new("high", "h"),
        FieldAlias::new("low", "l"),
        FieldAlias::new("volume", "mtq"),
        FieldAlias::new("prev_close", "pcp"),
        FieldAlias::new("exchange", "e"),
    ];
}

/// iboard board rows of listed ETFs.
#[derive(Debug)]
pub struct SsiEtfInfo;

impl RecordVariant for SsiEtfInfo {
    type Record = EtfInfo;
    const NAME: &'static str = "SsiEtfInfo";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("symbol", "ss"),
        FieldAlias::new("short_name", "cv"),
        FieldAlias::new("inav", "ina"),
        FieldAlias::new("open", "o"),
        FieldAlias::new("high", "h"),
        FieldAlias::new("low", "l"),
        FieldAlias::new("volume", "mtq"),
        FieldAlias::new("exchange", "e"),
    ];
}

/// iboard board rows of covered warrants. Dates come as `YYYYmmdd`.
#[derive(Debug)]
pub struct SsiCoveredWarrant;

impl RecordVariant for SsiCoveredWarrant {
    type Record = CoveredWarrant;
    const NAME: &'static str = "SsiCoveredWarrant";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("symbol", "ss"),
        FieldAlias::parsed("expiration_date", "md", date_compact),
        FieldAlias::parsed("last_trading_date", "ltd", date_compact),
        FieldAlias::new("issuer", "isn"),
        FieldAlias::new("underlying_asset", "us"),
        FieldAlias::new("strike_price", "ep"),
        FieldAlias::new("close_price", "mp"),
        FieldAlias::new("price_change", "pc"),
        FieldAlias::new("price_change_pct", "cp"),
        FieldAlias::new("volume", "mtq"),
        FieldAlias::new("conversion_ratio", "er"),
    ];
}

/// iboard board rows of futures contracts. Dates come as `dd/mm/YYYY`.
#[derive(Debug)]
pub struct SsiFuturesContract;

impl RecordVariant for SsiFuturesContract {
    type Record = FuturesContract;
    const NAME: &'static str = "SsiFuturesContract";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("symbol", "ss"),
        FieldAlias::parsed("expiration_date", "md", date_dmy),
        FieldAlias::parsed("initial_date", "ltd", date_dmy),
        FieldAlias::new("price", "mp"),
        FieldAlias::new("volume", "mv"),
        FieldAlias::new("asset", "us"),
    ];
}

fn trade_side(value: Value) -> std::result::Result<Value, String> {
    let side = value.as_str().map(str::to_lowercase).unwrap_or_default();
    match side.as_str() {
        "bu" => Ok(json!("Buy")),
        "sd" => Ok(json!("Sell")),
        "unknown" => Ok(json!("Unfilled")),
        _ => Err(format!(
            "Unknown status: {side}. Predefined values are [bu, sd, unknown]."
        )),
    }
}

/// `le-table` matched trades of a futures contract.
///
/// The `_id` is `HHmmss` followed by the execution time in unix
/// milliseconds; the session date is read from that suffix.
#[derive(Debug)]
pub struct SsiFuturesTrade;

impl RecordVariant for SsiFuturesTrade {
    type Record = FuturesTrade;
    const NAME: &'static str = "SsiFuturesTrade";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("volume", "vol"),
        FieldAlias::new("price_change", "priceChange"),
        FieldAlias::new("price_change_percent", "priceChangePercent"),
        FieldAlias::new("ref_price", "ref"),
        FieldAlias::parsed("status", "side", trade_side),
        FieldAlias::new("symbol", "stockSymbol"),
        FieldAlias::new("id", "_id"),
    ];

    fn pre_parse(row: &mut RawRecord) -> std::result::Result<(), String> {
        let Some(millis) = row
            .get("id")
            .and_then(Value::as_str)
            .and_then(|id| id.get(6..))
            .and_then(|suffix| suffix.parse::<i64>().ok())
        else {
            return Err("id does not carry an execution timestamp".to_string());
        };
        row.insert("date_session".to_string(), epoch_millis_date(json!(millis))?);
        Ok(())
    }
}

/// `fiin-market` top movers.
#[derive(Debug)]
pub struct SsiMarketMover;

impl RecordVariant for SsiMarketMover {
    type Record = MarketMover;
    const NAME: &'static str = "SsiMarketMover";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("symbol", "ticker"),
        FieldAlias::new("change", "priceChange"),
        FieldAlias::new("percent_change", "percentPriceChange"),
        FieldAlias::new("trading_value", "value"),
        FieldAlias::new("industry", "sectorName"),
    ];
}

/// `dchart` bars. Prices are quoted in thousands of dong.
#[derive(Debug)]
pub struct SsiPriceBar;

impl RecordVariant for SsiPriceBar {
    type Record = PriceBar;
    const NAME: &'static str = "SsiPriceBar";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::parsed("date", "t", epoch_seconds),
        FieldAlias::parsed("open", "o", times_thousand),
        FieldAlias::parsed("high", "h", times_thousand),
        FieldAlias::parsed("low", "l", times_thousand),
        FieldAlias::parsed("close", "c", times_thousand),
        FieldAlias::new("volume", "v"),
    ];
}

/// One melted statement line. Rows come from [`melt_sheet`](crate::sheet::melt_sheet)
/// with the ticker added under `symbol`.
#[derive(Debug)]
pub struct SsiStatementItem;

impl RecordVariant for SsiStatementItem {
    type Record = StatementItem;
    const NAME: &'static str = "SsiStatementItem";
    const ALIASES: &'static [FieldAlias] = &[FieldAlias::new("items", "ITEMS")];

    /// Splits `Q4 2023` into a fiscal quarter and year.
    fn pre_parse(row: &mut RawRecord) -> std::result::Result<(), String> {
        let label = row
            .get("fiscal_period")
            .and_then(Value::as_str)
            .ok_or("fiscal_period is missing")?
            .to_string();
        let (quarter, year) = match label.split_once(' ') {
            Some((quarter, year)) => (Some(quarter), year),
            None => (None, label.as_str()),
        };
        let invalid = || format!("Invalid fiscal period: {label}");

        let year: i64 = year.parse().map_err(|_| invalid())?;
        row.insert("fiscal_year".to_string(), json!(year));
        if let Some(quarter) = quarter {
            let quarter: i64 = quarter
                .strip_prefix('Q')
                .and_then(|q| q.parse().ok())
                .ok_or_else(invalid)?;
            row.insert("fiscal_quarter".to_string(), json!(quarter));
        }
        Ok(())
    }
}
