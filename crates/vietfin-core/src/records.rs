//! Canonical records.
//!
//! One struct per financial concept, shared by every provider that serves it.
//! Field names are provider-agnostic; each provider crate declares a
//! [`RecordVariant`](crate::alias::RecordVariant) mapping its raw keys onto them.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::alias::Record;
use crate::parse::{de, since_epoch};

/// A listed company in a search catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EquityInfo {
    /// Ticker.
    #[serde(deserialize_with = "de::text")]
    pub symbol: String,
    /// Legal or full name.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub name: Option<String>,
    /// Short trading name.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub short_name: Option<String>,
    /// Organization code in the provider's database.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub organ_code: Option<String>,
    /// Listing exchange.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub exchange: Option<String>,
}

impl Record for EquityInfo {}

/// Company overview.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Ticker.
    #[serde(deserialize_with = "de::text")]
    pub symbol: String,
    /// Common name.
    #[serde(deserialize_with = "de::text")]
    pub name: String,
    /// Official legal name.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub legal_name: Option<String>,
    /// Listing exchange.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub exchange: Option<String>,
    /// Plain-text company description.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub long_description: Option<String>,
    /// Company website.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub company_url: Option<String>,
    /// Headcount.
    #[serde(default, deserialize_with = "de::opt_integer")]
    pub employees: Option<i64>,
    /// Industry classification.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub industry_category: Option<String>,
}

impl Record for CompanyProfile {}

/// One OHLCV bar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Bar open time (UTC).
    #[serde(deserialize_with = "de::datetime")]
    pub date: DateTime<Utc>,
    /// Opening price.
    #[serde(deserialize_with = "de::number")]
    pub open: f64,
    /// Highest price.
    #[serde(deserialize_with = "de::number")]
    pub high: f64,
    /// Lowest price.
    #[serde(deserialize_with = "de::number")]
    pub low: f64,
    /// Closing price.
    #[serde(deserialize_with = "de::number")]
    pub close: f64,
    /// Traded volume.
    #[serde(deserialize_with = "de::integer")]
    pub volume: i64,
}

impl Record for PriceBar {}

/// One intraday matched order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteTick {
    /// Match time.
    #[serde(deserialize_with = "de::time")]
    pub time: NaiveTime,
    /// Matched price.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub price: Option<f64>,
    /// Matched volume.
    #[serde(default, deserialize_with = "de::opt_integer")]
    pub volume: Option<i64>,
    /// Running average price.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub average_price: Option<f64>,
    /// Buy-up or sell-down side.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub order_type: Option<String>,
    /// Number of orders in the match.
    #[serde(default, deserialize_with = "de::opt_integer")]
    pub order_count: Option<i64>,
    /// Investor classification.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub investor_type: Option<String>,
    /// Change against the previous match.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub prev_price_change: Option<f64>,
}

impl Record for QuoteTick {}

/// An insider or major shareholder deal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InsiderTrade {
    /// Ticker.
    #[serde(deserialize_with = "de::text")]
    pub symbol: String,
    /// Announcement date.
    #[serde(deserialize_with = "de::date")]
    pub filing_date: NaiveDate,
    /// `Mua` (buy) or `Bán` (sell).
    #[serde(deserialize_with = "de::text")]
    pub acquisition_or_disposition: String,
    /// Deal price.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub transaction_price: Option<f64>,
    /// Number of shares.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub securities_transacted: Option<f64>,
    /// Kind of shareholder.
    #[serde(deserialize_with = "de::text")]
    pub owner_type: String,
}

impl Record for InsiderTrade {}

/// A large shareholder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MajorHolder {
    /// Holder name.
    #[serde(deserialize_with = "de::text")]
    pub investor_name: String,
    /// Share of outstanding stock, as a fraction.
    #[serde(deserialize_with = "de::number")]
    pub weight: f64,
}

impl Record for MajorHolder {}

/// Daily foreign investor flow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForeignTrade {
    /// Session date.
    #[serde(deserialize_with = "de::date")]
    pub date: NaiveDate,
    /// Net volume.
    #[serde(default, deserialize_with = "de::opt_integer")]
    pub net_trading_volume: Option<i64>,
    /// Net value.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub net_trading_value: Option<f64>,
    /// Volume bought.
    #[serde(default, deserialize_with = "de::opt_integer")]
    pub bid_volume: Option<i64>,
    /// Value bought.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub bid_value: Option<f64>,
    /// Volume sold.
    #[serde(default, deserialize_with = "de::opt_integer")]
    pub ask_volume: Option<i64>,
    /// Value sold.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub ask_value: Option<f64>,
    /// Shares foreigners may still buy.
    #[serde(default, deserialize_with = "de::opt_integer")]
    pub remaining_room: Option<i64>,
    /// Current foreign ownership, in percent.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub weight: Option<f64>,
    /// Closing price of the session.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub close_price: Option<f64>,
    /// Change against the previous session, in percent.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub percent_change: Option<f64>,
}

impl Record for ForeignTrade {}

/// Daily proprietary (broker own-account) flow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropTrade {
    /// Session date.
    #[serde(deserialize_with = "de::date")]
    pub date: NaiveDate,
    /// Ticker.
    #[serde(deserialize_with = "de::text")]
    pub symbol: String,
    /// Volume bought.
    #[serde(default, deserialize_with = "de::opt_integer")]
    pub bid_volume: Option<i64>,
    /// Value bought.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub bid_value: Option<f64>,
    /// Volume sold.
    #[serde(default, deserialize_with = "de::opt_integer")]
    pub ask_volume: Option<i64>,
    /// Value sold.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub ask_value: Option<f64>,
}

impl Record for PropTrade {}

/// A corporate event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Ticker.
    #[serde(deserialize_with = "de::text")]
    pub symbol: String,
    /// Event code.
    #[serde(deserialize_with = "de::text")]
    pub event_code: String,
    /// Event name.
    #[serde(deserialize_with = "de::text")]
    pub event_name: String,
    /// Plain-text description.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub event_desc: Option<String>,
    /// Stock price at the time.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub price: Option<f64>,
    /// Price change.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub price_change: Option<f64>,
    /// Price change ratio.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub price_change_ratio: Option<f64>,
    /// Public notification date.
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub date_notify: Option<DateTime<Utc>>,
    /// Execution date.
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub date_execute: Option<DateTime<Utc>>,
    /// Registration date.
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub date_register: Option<DateTime<Utc>>,
    /// Ex-right date.
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub date_ex_right: Option<DateTime<Utc>>,
}

impl Record for CalendarEvent {
    fn post_parse(mut self) -> Self {
        self.date_notify = since_epoch(self.date_notify);
        self.date_execute = since_epoch(self.date_execute);
        self.date_register = since_epoch(self.date_register);
        self.date_ex_right = since_epoch(self.date_ex_right);
        self
    }
}

/// A key executive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Executive {
    /// Ticker.
    #[serde(deserialize_with = "de::text")]
    pub symbol: String,
    /// Person name.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub name: Option<String>,
    /// Position held.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub title: Option<String>,
    /// Share of outstanding stock owned.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub weight: Option<f64>,
}

impl Record for Executive {}

/// Financial ratios for one fiscal period.
///
/// The metric set varies by provider and over time, so every column beyond
/// the period identifiers is kept in [`metrics`](Self::metrics), in upstream order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinancialRatio {
    /// Ticker.
    #[serde(deserialize_with = "de::text")]
    pub symbol: String,
    /// `annual` or `quarter`.
    #[serde(deserialize_with = "de::text")]
    pub period: String,
    /// Fiscal year.
    #[serde(deserialize_with = "de::integer")]
    pub fiscal_year: i64,
    /// Fiscal quarter, absent for annual rows.
    #[serde(default, deserialize_with = "de::opt_integer")]
    pub fiscal_quarter: Option<i64>,
    /// Every other ratio column.
    #[serde(flatten)]
    pub metrics: Map<String, Value>,
}

impl Record for FinancialRatio {}

/// A dividend payment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dividend {
    /// Ticker.
    #[serde(deserialize_with = "de::text")]
    pub symbol: String,
    /// Cash or stock.
    #[serde(deserialize_with = "de::text")]
    pub dividend_type: String,
    /// Payment date.
    #[serde(deserialize_with = "de::date")]
    pub payment_date: NaiveDate,
    /// Cash dividend as a fraction of par value.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub cash_dividend_percentage: Option<f64>,
}

impl Record for Dividend {}

/// One line item of a financial statement for one fiscal period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatementItem {
    /// Ticker.
    #[serde(deserialize_with = "de::text")]
    pub symbol: String,
    /// `annual` or `quarter`.
    #[serde(deserialize_with = "de::text")]
    pub period: String,
    /// Fiscal year.
    #[serde(deserialize_with = "de::integer")]
    pub fiscal_year: i64,
    /// Fiscal quarter, absent for annual rows.
    #[serde(default, deserialize_with = "de::opt_integer")]
    pub fiscal_quarter: Option<i64>,
    /// Line item label.
    #[serde(deserialize_with = "de::text")]
    pub items: String,
    /// Line item value.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub values: Option<f64>,
}

impl Record for StatementItem {}

/// A stock in a top movers report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketMover {
    /// Ticker.
    #[serde(deserialize_with = "de::text")]
    pub symbol: String,
    /// Last price.
    #[serde(deserialize_with = "de::number")]
    pub price: f64,
    /// Absolute change.
    #[serde(deserialize_with = "de::number")]
    pub change: f64,
    /// Percent change.
    #[serde(deserialize_with = "de::number")]
    pub percent_change: f64,
    /// Traded volume (some providers report a 20-day average).
    #[serde(default, deserialize_with = "de::opt_number")]
    pub volume: Option<f64>,
    /// Traded value.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub trading_value: Option<f64>,
    /// Sector name.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub industry: Option<String>,
    /// Last refresh time.
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for MarketMover {}

/// A listed futures contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FuturesContract {
    /// Contract symbol.
    #[serde(deserialize_with = "de::text")]
    pub symbol: String,
    /// Last trading day.
    #[serde(deserialize_with = "de::date")]
    pub expiration_date: NaiveDate,
    /// First trading day.
    #[serde(deserialize_with = "de::date")]
    pub initial_date: NaiveDate,
    /// Matched price.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub price: Option<f64>,
    /// Matched volume.
    #[serde(default, deserialize_with = "de::opt_integer")]
    pub volume: Option<i64>,
    /// Underlying asset.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub asset: Option<String>,
}

impl Record for FuturesContract {}

/// One matched futures trade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FuturesTrade {
    /// Trading session date.
    #[serde(deserialize_with = "de::date")]
    pub date_session: NaiveDate,
    /// Match time.
    #[serde(deserialize_with = "de::time")]
    pub time: NaiveTime,
    /// Contract symbol.
    #[serde(deserialize_with = "de::text")]
    pub symbol: String,
    /// Contracts matched.
    #[serde(deserialize_with = "de::integer")]
    pub volume: i64,
    /// Matched price.
    #[serde(deserialize_with = "de::number")]
    pub price: f64,
    /// `Buy`, `Sell` or `Unfilled`, where the board reports the side.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub status: Option<String>,
    /// Change against the reference price.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub price_change: Option<f64>,
    /// Change against the reference price, in percent.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub price_change_percent: Option<f64>,
    /// Session reference price.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub ref_price: Option<f64>,
    /// Upstream trade id.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub id: Option<String>,
    /// Exchange floor code.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub exchange: Option<String>,
    /// Session high.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub high_price: Option<f64>,
    /// Session low.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub low_price: Option<f64>,
    /// Session average matched price.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub avg_price: Option<f64>,
    /// Contracts matched so far in the session.
    #[serde(default, deserialize_with = "de::opt_integer")]
    pub total_volume: Option<i64>,
    /// Ceiling price.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub ceiling_price: Option<f64>,
    /// Floor price.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub floor_price: Option<f64>,
    /// Morning or afternoon session marker.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub session: Option<String>,
    /// Bid price at depth 1.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub bid_price_1: Option<f64>,
    /// Bid volume at depth 1.
    #[serde(default, deserialize_with = "de::opt_integer")]
    pub bid_volume_1: Option<i64>,
    /// Bid price at depth 2.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub bid_price_2: Option<f64>,
    /// Bid volume at depth 2.
    #[serde(default, deserialize_with = "de::opt_integer")]
    pub bid_volume_2: Option<i64>,
    /// Bid price at depth 3.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub bid_price_3: Option<f64>,
    /// Bid volume at depth 3.
    #[serde(default, deserialize_with = "de::opt_integer")]
    pub bid_volume_3: Option<i64>,
    /// Offer price at depth 1.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub offer_price_1: Option<f64>,
    /// Offer volume at depth 1.
    #[serde(default, deserialize_with = "de::opt_integer")]
    pub offer_volume_1: Option<i64>,
    /// Offer price at depth 2.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub offer_price_2: Option<f64>,
    /// Offer volume at depth 2.
    #[serde(default, deserialize_with = "de::opt_integer")]
    pub offer_volume_2: Option<i64>,
    /// Offer price at depth 3.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub offer_price_3: Option<f64>,
    /// Offer volume at depth 3.
    #[serde(default, deserialize_with = "de::opt_integer")]
    pub offer_volume_3: Option<i64>,
}

impl Record for FuturesTrade {}

/// A listed covered warrant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoveredWarrant {
    /// Warrant symbol.
    #[serde(deserialize_with = "de::text")]
    pub symbol: String,
    /// Maturity date.
    #[serde(deserialize_with = "de::date")]
    pub expiration_date: NaiveDate,
    /// Last trading day.
    #[serde(deserialize_with = "de::date")]
    pub last_trading_date: NaiveDate,
    /// Issuing institution.
    #[serde(deserialize_with = "de::text")]
    pub issuer: String,
    /// Underlying stock.
    #[serde(deserialize_with = "de::text")]
    pub underlying_asset: String,
    /// Strike price.
    #[serde(deserialize_with = "de::number")]
    pub strike_price: f64,
    /// Warrant price.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub close_price: Option<f64>,
    /// Change against the previous session.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub price_change: Option<f64>,
    /// Change against the previous session, in percent.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub price_change_pct: Option<f64>,
    /// Matched volume.
    #[serde(default, deserialize_with = "de::opt_integer")]
    pub volume: Option<i64>,
    /// Conversion ratio, e.g. `5:1`.
    #[serde(deserialize_with = "de::text")]
    pub conversion_ratio: String,
}

impl Record for CoveredWarrant {}

/// A market index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexInfo {
    /// Index code.
    #[serde(deserialize_with = "de::text")]
    pub index_symbol: String,
    /// Parent index, if any.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub group_by_index: Option<String>,
}

impl Record for IndexInfo {}

/// A stock belonging to an index, with today's prices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexConstituent {
    /// Ticker.
    #[serde(deserialize_with = "de::text")]
    pub symbol: String,
    /// Company name.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub name: Option<String>,
    /// Opening price.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub open: Option<f64>,
    /// Highest price.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub high: Option<f64>,
    /// Lowest price.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub low: Option<f64>,
    /// Traded volume.
    #[serde(default, deserialize_with = "de::opt_integer")]
    pub volume: Option<i64>,
    /// Previous close.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub prev_close: Option<f64>,
    /// Listing exchange.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub exchange: Option<String>,
}

impl Record for IndexConstituent {}

/// A listed ETF with today's prices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EtfInfo {
    /// Ticker.
    #[serde(deserialize_with = "de::text")]
    pub symbol: String,
    /// Short name.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub short_name: Option<String>,
    /// Intraday indicative NAV.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub inav: Option<f64>,
    /// Opening price.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub open: Option<f64>,
    /// Highest price.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub high: Option<f64>,
    /// Lowest price.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub low: Option<f64>,
    /// Traded volume.
    #[serde(default, deserialize_with = "de::opt_integer")]
    pub volume: Option<i64>,
    /// Listing exchange.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub exchange: Option<String>,
}

impl Record for EtfInfo {}

/// An open-ended mutual fund.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FundInfo {
    /// Fund id in the distributor's database.
    #[serde(deserialize_with = "de::integer")]
    pub fund_id: i64,
    /// Trading code.
    #[serde(deserialize_with = "de::text")]
    pub short_name: String,
    /// Official name.
    #[serde(deserialize_with = "de::text")]
    pub name: String,
    /// Inception date.
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub inception_date: Option<DateTime<Utc>>,
    /// Annual management fee, in percent.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub management_fee: Option<f64>,
    /// Latest NAV per unit.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub nav: Option<f64>,
    /// Fund management company.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub fund_owner: Option<String>,
    /// Asset class.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub fund_type: Option<String>,
}

impl Record for FundInfo {
    fn post_parse(mut self) -> Self {
        self.inception_date = since_epoch(self.inception_date);
        self
    }
}

/// A fund's NAV on one day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FundNav {
    /// Valuation date.
    #[serde(deserialize_with = "de::date")]
    pub date_nav: NaiveDate,
    /// NAV per unit.
    #[serde(deserialize_with = "de::number")]
    pub nav_per_share: f64,
    /// Fund id.
    #[serde(deserialize_with = "de::integer")]
    pub fund_id: i64,
}

impl Record for FundNav {}

/// A top holding of a fund.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FundHolding {
    /// Security code.
    #[serde(deserialize_with = "de::text")]
    pub stock_code: String,
    /// Industry of the holding.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub industry: Option<String>,
    /// Share of net assets, in percent.
    #[serde(deserialize_with = "de::number")]
    pub weight: f64,
    /// Asset category.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub asset_category: Option<String>,
    /// Last update.
    #[serde(default, deserialize_with = "de::opt_datetime")]
    pub update_at: Option<DateTime<Utc>>,
}

impl Record for FundHolding {
    fn post_parse(mut self) -> Self {
        self.update_at = since_epoch(self.update_at);
        self
    }
}

/// A company news headline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Ticker.
    #[serde(deserialize_with = "de::text")]
    pub symbol: String,
    /// Publication time.
    #[serde(deserialize_with = "de::datetime")]
    pub date_published: DateTime<Utc>,
    /// Headline.
    #[serde(deserialize_with = "de::text")]
    pub title: String,
    /// Publisher.
    #[serde(default, deserialize_with = "de::opt_text")]
    pub source: Option<String>,
    /// Stock price at publication.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub price: Option<f64>,
    /// Price change.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub price_change: Option<f64>,
    /// Price change ratio.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub price_change_ratio: Option<f64>,
}

impl Record for NewsItem {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ratio_keeps_extra_metrics_in_order() {
        let ratio: FinancialRatio = serde_json::from_value(json!({
            "symbol": "VNM",
            "period": "annual",
            "fiscal_year": 2023,
            "fiscal_quarter": 5,
            "priceToEarning": 15.2,
            "roe": 0.27
        }))
        .unwrap();
        let keys: Vec<&str> = ratio.metrics.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["priceToEarning", "roe"]);

        let row = serde_json::to_value(&ratio).unwrap();
        let columns: Vec<&str> = row.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            columns,
            vec!["symbol", "period", "fiscal_year", "fiscal_quarter", "priceToEarning", "roe"]
        );
    }

    #[test]
    fn test_event_dates_before_epoch_dropped() {
        let event: CalendarEvent = serde_json::from_value(json!({
            "symbol": "VNM",
            "event_code": "DIV",
            "event_name": "Cash dividend",
            "date_notify": "1900-01-01T00:00:00",
            "date_execute": "2024-05-02T00:00:00"
        }))
        .unwrap();
        let event = event.post_parse();
        assert_eq!(event.date_notify, None);
        assert!(event.date_execute.is_some());
    }

    #[test]
    fn test_price_bar_serializes_in_field_order() {
        let bar: PriceBar = serde_json::from_value(json!({
            "volume": "1000", "close": 2, "low": 1, "high": 3, "open": 2,
            "date": "2024-01-02"
        }))
        .unwrap();
        let row = serde_json::to_value(&bar).unwrap();
        let columns: Vec<&str> = row.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(columns, vec!["date", "open", "high", "low", "close", "volume"]);
        assert_eq!(row["date"], json!("2024-01-02T00:00:00Z"));
    }
}
