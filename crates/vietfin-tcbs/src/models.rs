//! Alias tables mapping TCBS payloads onto canonical records.

use serde_json::{Value, json};
use vietfin_core::alias::{FieldAlias, RawRecord, RecordVariant};
use vietfin_core::parse::{as_i64, date_dmy_short, html_text};
use vietfin_core::records::{
    CalendarEvent, CompanyProfile, Dividend, Executive, FinancialRatio, InsiderTrade,
    MajorHolder, NewsItem, PriceBar, QuoteTick, StatementItem,
};

type ParseResult = std::result::Result<Value, String>;

/// `tcanalysis/v1/company/{symbol}/overview` merged with `ticker/{symbol}/overview`.
#[derive(Debug)]
pub struct TcbsProfile;

impl RecordVariant for TcbsProfile {
    type Record = CompanyProfile;
    const NAME: &'static str = "TcbsProfile";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("symbol", "ticker"),
        FieldAlias::new("name", "shortName"),
        FieldAlias::new("legal_name", "companyName"),
        FieldAlias::new("exchange", "exchange"),
        FieldAlias::parsed("long_description", "companyProfile", html_text),
        FieldAlias::new("company_url", "website"),
        FieldAlias::new("employees", "noEmployees"),
        FieldAlias::new("industry_category", "industry"),
    ];
}

/// Daily bars from `bars-long-term`.
#[derive(Debug)]
pub struct TcbsPriceBar;

impl RecordVariant for TcbsPriceBar {
    type Record = PriceBar;
    const NAME: &'static str = "TcbsPriceBar";
    const ALIASES: &'static [FieldAlias] = &[FieldAlias::new("date", "tradingDate")];
}

/// Intraday matched orders.
#[derive(Debug)]
pub struct TcbsQuote;

impl RecordVariant for TcbsQuote {
    type Record = QuoteTick;
    const NAME: &'static str = "TcbsQuote";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("time", "t"),
        FieldAlias::new("price", "p"),
        FieldAlias::new("volume", "v"),
        FieldAlias::new("average_price", "ap"),
        FieldAlias::new("order_type", "a"),
        FieldAlias::new("order_count", "n"),
        FieldAlias::new("investor_type", "type"),
        FieldAlias::new("prev_price_change", "pcp"),
    ];
}

fn dealing_action(value: Value) -> ParseResult {
    let code = match &value {
        Value::String(s) => s.to_lowercase(),
        other => other.to_string(),
    };
    Ok(json!(match code.as_str() {
        "0" => "Mua".to_string(),
        "1" => "Bán".to_string(),
        _ => format!("Invalid value for acquisition_or_disposition: {code}"),
    }))
}

fn dealing_method(value: Value) -> ParseResult {
    Ok(json!(match as_i64(&value) {
        Some(0) => "Cổ đông nội bộ".to_string(),
        Some(1) => "Cổ đông lớn".to_string(),
        Some(2) => "Cổ đông sáng lập".to_string(),
        _ => format!("Invalid value for owner_type: {value}"),
    }))
}

/// Insider and major shareholder deals.
#[derive(Debug)]
pub struct TcbsInsiderTrade;

impl RecordVariant for TcbsInsiderTrade {
    type Record = InsiderTrade;
    const NAME: &'static str = "TcbsInsiderTrade";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("symbol", "ticker"),
        FieldAlias::new("transaction_price", "price"),
        FieldAlias::new("securities_transacted", "quantity"),
        FieldAlias::parsed("filing_date", "anDate", date_dmy_short),
        FieldAlias::parsed("acquisition_or_disposition", "dealingAction", dealing_action),
        FieldAlias::parsed("owner_type", "dealingMethod", dealing_method),
    ];
}

/// Large shareholders.
#[derive(Debug)]
pub struct TcbsMajorHolder;

impl RecordVariant for TcbsMajorHolder {
    type Record = MajorHolder;
    const NAME: &'static str = "TcbsMajorHolder";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("investor_name", "name"),
        FieldAlias::new("weight", "ownPercent"),
    ];
}

/// Corporate events.
#[derive(Debug)]
pub struct TcbsEvent;

impl RecordVariant for TcbsEvent {
    type Record = CalendarEvent;
    const NAME: &'static str = "TcbsEvent";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("symbol", "ticker"),
        FieldAlias::new("event_name", "eventName"),
        FieldAlias::new("event_code", "eventCode"),
        FieldAlias::new("price_change", "priceChange"),
        FieldAlias::new("price_change_ratio", "priceChangeRatio"),
        FieldAlias::parsed("event_desc", "eventDesc", html_text),
        FieldAlias::new("date_notify", "notifyDate"),
        FieldAlias::new("date_execute", "exerDate"),
        FieldAlias::new("date_register", "regFinalDate"),
        FieldAlias::new("date_ex_right", "exRigthDate"),
    ];
}

/// Key officers.
#[derive(Debug)]
pub struct TcbsExecutive;

impl RecordVariant for TcbsExecutive {
    type Record = Executive;
    const NAME: &'static str = "TcbsExecutive";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("title", "position"),
        FieldAlias::new("weight", "ownPercent"),
        FieldAlias::new("symbol", "ticker"),
    ];
}

/// Financial ratios. `period` is injected by the provider before parsing.
#[derive(Debug)]
pub struct TcbsRatio;

impl RecordVariant for TcbsRatio {
    type Record = FinancialRatio;
    const NAME: &'static str = "TcbsRatio";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("symbol", "ticker"),
        FieldAlias::new("fiscal_year", "year"),
        FieldAlias::new("fiscal_quarter", "quarter"),
    ];
}

/// Metrics kept by the valuation multiples view of the ratio payload.
pub(crate) const MULTIPLES: &[&str] = &[
    "priceToEarning",
    "priceToBook",
    "valueBeforeEbitda",
    "dividend",
    "earningPerShare",
    "bookValuePerShare",
];

/// Valuation multiples: the ratio payload restricted to [`MULTIPLES`].
#[derive(Debug)]
pub struct TcbsMultiples;

impl RecordVariant for TcbsMultiples {
    type Record = FinancialRatio;
    const NAME: &'static str = "TcbsMultiples";
    const ALIASES: &'static [FieldAlias] = TcbsRatio::ALIASES;

    fn pre_parse(row: &mut RawRecord) -> std::result::Result<(), String> {
        row.retain(|key, _| {
            matches!(key.as_str(), "symbol" | "period" | "fiscal_year" | "fiscal_quarter")
                || MULTIPLES.contains(&key.as_str())
        });
        Ok(())
    }
}

/// Dividend payments.
#[derive(Debug)]
pub struct TcbsDividend;

impl RecordVariant for TcbsDividend {
    type Record = Dividend;
    const NAME: &'static str = "TcbsDividend";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("symbol", "ticker"),
        FieldAlias::new("dividend_type", "issueMethod"),
        FieldAlias::parsed("payment_date", "exerciseDate", date_dmy_short),
        FieldAlias::new("cash_dividend_percentage", "cashDividendPercentage"),
    ];
}

fn statement_label(value: Value) -> ParseResult {
    let Value::String(item) = value else {
        return Ok(value);
    };
    let label = match item.as_str() {
        "grossProfit" => "gross profit",
        "operationIncome" => "total operating income",
        "operationExpense" => "total operating expenses",
        "interestExpense" => "total interest expense",
        "cash" => "cash and cash equivalents",
        "asset" => "total assets",
        "equity" => "total equity",
        "debt" => "total debt",
        "fromSale" => "net cash from operating activities",
        "fromInvest" => "net cash from investing activities",
        "fromFinancial" => "net cash from financing activities",
        "freeCashFlow" => "free cash flow",
        _ => return Ok(Value::String(item)),
    };
    Ok(json!(label))
}

/// One melted statement line. Rows come from [`melt_statement`](crate::melt_statement).
#[derive(Debug)]
pub struct TcbsStatementItem;

impl RecordVariant for TcbsStatementItem {
    type Record = StatementItem;
    const NAME: &'static str = "TcbsStatementItem";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("symbol", "ticker"),
        FieldAlias::new("fiscal_year", "year"),
        FieldAlias::new("fiscal_quarter", "quarter"),
        FieldAlias::parsed("items", "ITEMS", statement_label),
    ];
}

/// Company headlines.
#[derive(Debug)]
pub struct TcbsNews;

impl RecordVariant for TcbsNews {
    type Record = NewsItem;
    const NAME: &'static str = "TcbsNews";
    const ALIASES: &'static [FieldAlias] = &[
        FieldAlias::new("symbol", "ticker"),
        FieldAlias::new("date_published", "publishDate"),
        FieldAlias::new("price_change", "priceChange"),
        FieldAlias::new("price_change_ratio", "priceChangeRatio"),
    ];
}
