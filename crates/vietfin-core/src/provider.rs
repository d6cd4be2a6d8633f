//! Provider traits for fetching Vietnamese market data.
//!
//! This module defines the core provider traits:
//!
//! - [`Provider`] - Base trait for all data providers
//! - one capability trait per financial concept, e.g. [`EquityPriceProvider`]
//!
//! Every capability method has a default body failing with
//! [`DataError::UnsupportedOperation`], so a provider only overrides what its
//! upstream actually serves.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

use crate::{
    error::{DataError, Result},
    frequency::{Interval, Period},
    records::{
        CalendarEvent, CompanyProfile, CoveredWarrant, Dividend, EquityInfo, EtfInfo, Executive,
        FinancialRatio, ForeignTrade, FundHolding, FundInfo, FundNav, FuturesContract,
        FuturesTrade, IndexConstituent, IndexInfo, InsiderTrade, MajorHolder, MarketMover,
        NewsItem, PriceBar, PropTrade, QuoteTick, StatementItem,
    },
    response::Response,
    types::{DateRange, Exchange, FundType, Symbol},
};

/// A named group of operations on one financial concept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Listed companies.
    Equity,
    /// Stock prices.
    EquityPrice,
    /// Shareholders and investor flows.
    EquityOwnership,
    /// Corporate events.
    EquityCalendar,
    /// Statements, ratios and executives.
    EquityFundamental,
    /// Top movers.
    EquityDiscovery,
    /// Futures contracts.
    DerivativesFutures,
    /// Covered warrants.
    DerivativesCoveredWarrant,
    /// Market indices.
    Index,
    /// Index prices.
    IndexPrice,
    /// Exchange-traded funds.
    Etf,
    /// Open-ended mutual funds.
    Funds,
    /// Company news.
    News,
}

impl Capability {
    /// All capabilities.
    pub const ALL: [Self; 13] = [
        Self::Equity,
        Self::EquityPrice,
        Self::EquityOwnership,
        Self::EquityCalendar,
        Self::EquityFundamental,
        Self::EquityDiscovery,
        Self::DerivativesFutures,
        Self::DerivativesCoveredWarrant,
        Self::Index,
        Self::IndexPrice,
        Self::Etf,
        Self::Funds,
        Self::News,
    ];

    /// Returns the dotted path, e.g. `"equity.price"`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Equity => "equity",
            Self::EquityPrice => "equity.price",
            Self::EquityOwnership => "equity.ownership",
            Self::EquityCalendar => "equity.calendar",
            Self::EquityFundamental => "equity.fundamental",
            Self::EquityDiscovery => "equity.discovery",
            Self::DerivativesFutures => "derivatives.futures",
            Self::DerivativesCoveredWarrant => "derivatives.covered_warrant",
            Self::Index => "index",
            Self::IndexPrice => "index.price",
            Self::Etf => "etf",
            Self::Funds => "funds",
            Self::News => "news",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identifier of an upstream source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Techcom Securities.
    Tcbs,
    /// SSI Securities.
    Ssi,
    /// DNSE Securities (Entrade).
    Dnse,
    /// Fmarket fund distribution platform.
    Fmarket,
    /// VNDIRECT Securities.
    Vndirect,
    /// CafeF financial news portal.
    Cafef,
    /// WiFeed data platform.
    Wifeed,
    /// Rong Viet Securities (LiveDragon board).
    Vdsc,
}

impl ProviderId {
    /// All known providers.
    pub const ALL: [Self; 8] = [
        Self::Tcbs,
        Self::Ssi,
        Self::Dnse,
        Self::Fmarket,
        Self::Vndirect,
        Self::Cafef,
        Self::Wifeed,
        Self::Vdsc,
    ];

    /// Returns the lowercase registry key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tcbs => "tcbs",
            Self::Ssi => "ssi",
            Self::Dnse => "dnse",
            Self::Fmarket => "fmarket",
            Self::Vndirect => "vndirect",
            Self::Cafef => "cafef",
            Self::Wifeed => "wifeed",
            Self::Vdsc => "vdsc",
        }
    }

    /// Looks up a provider by name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let needle = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|p| p.as_str() == needle)
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base trait for all data providers.
///
/// Implementations are stateless apart from their transport and are shared
/// behind `Arc` for the whole process.
pub trait Provider: Send + Sync + Debug {
    /// Returns the registry identifier.
    fn id(&self) -> ProviderId;

    /// Returns the lowercase registry key (e.g. `"tcbs"`).
    fn name(&self) -> &'static str {
        self.id().as_str()
    }

    /// Returns a description of this provider.
    fn description(&self) -> &str;
}

macro_rules! unsupported {
    ($self:ident, $capability:ident, $operation:literal) => {
        Err(DataError::unsupported(
            Capability::$capability,
            $operation,
            $self.name(),
        ))
    };
}

/// Listed company lookups.
#[async_trait]
pub trait EquityProvider: Provider {
    /// Searches the listed-company catalog. An empty symbol returns the whole catalog.
    async fn search(&self, symbol: &Symbol) -> Result<Response<EquityInfo>> {
        let _ = symbol;
        unsupported!(self, Equity, "search")
    }

    /// Fetches the company overview.
    async fn profile(&self, symbol: &Symbol) -> Result<Response<CompanyProfile>> {
        let _ = symbol;
        unsupported!(self, Equity, "profile")
    }
}

/// Stock price history and intraday trades.
#[async_trait]
pub trait EquityPriceProvider: Provider {
    /// Fetches OHLCV bars for `range` at `interval`.
    async fn historical(
        &self,
        symbol: &Symbol,
        range: DateRange,
        interval: Interval,
    ) -> Result<Response<PriceBar>> {
        let _ = (symbol, range, interval);
        unsupported!(self, EquityPrice, "historical")
    }

    /// Fetches the latest intraday matched orders, newest first.
    async fn quote(&self, symbol: &Symbol, limit: usize) -> Result<Response<QuoteTick>> {
        let _ = (symbol, limit);
        unsupported!(self, EquityPrice, "quote")
    }
}

/// Shareholders and investor flows.
#[async_trait]
pub trait EquityOwnershipProvider: Provider {
    /// Fetches insider and major shareholder deals.
    async fn insider_trading(
        &self,
        symbol: &Symbol,
        limit: usize,
    ) -> Result<Response<InsiderTrade>> {
        let _ = (symbol, limit);
        unsupported!(self, EquityOwnership, "insider_trading")
    }

    /// Fetches the large shareholders.
    async fn major_holders(&self, symbol: &Symbol) -> Result<Response<MajorHolder>> {
        let _ = symbol;
        unsupported!(self, EquityOwnership, "major_holders")
    }

    /// Fetches daily foreign investor flows.
    async fn foreign_trading(
        &self,
        symbol: &Symbol,
        range: DateRange,
    ) -> Result<Response<ForeignTrade>> {
        let _ = (symbol, range);
        unsupported!(self, EquityOwnership, "foreign_trading")
    }

    /// Fetches daily proprietary trading flows.
    async fn prop_trading(&self, symbol: &Symbol, range: DateRange) -> Result<Response<PropTrade>> {
        let _ = (symbol, range);
        unsupported!(self, EquityOwnership, "prop_trading")
    }
}

/// Corporate events.
#[async_trait]
pub trait EquityCalendarProvider: Provider {
    /// Fetches corporate events, newest first.
    async fn events(&self, symbol: &Symbol, limit: usize) -> Result<Response<CalendarEvent>> {
        let _ = (symbol, limit);
        unsupported!(self, EquityCalendar, "events")
    }
}

/// Statements, ratios, dividends and executives.
#[async_trait]
pub trait EquityFundamentalProvider: Provider {
    /// Fetches the key executives.
    async fn management(&self, symbol: &Symbol) -> Result<Response<Executive>> {
        let _ = symbol;
        unsupported!(self, EquityFundamental, "management")
    }

    /// Fetches financial ratios per fiscal period.
    async fn ratios(&self, symbol: &Symbol, period: Period) -> Result<Response<FinancialRatio>> {
        let _ = (symbol, period);
        unsupported!(self, EquityFundamental, "ratios")
    }

    /// Fetches historical dividend payments.
    async fn dividends(&self, symbol: &Symbol, limit: usize) -> Result<Response<Dividend>> {
        let _ = (symbol, limit);
        unsupported!(self, EquityFundamental, "dividends")
    }

    /// Fetches the income statement, one row per line item and period.
    async fn income(&self, symbol: &Symbol, period: Period) -> Result<Response<StatementItem>> {
        let _ = (symbol, period);
        unsupported!(self, EquityFundamental, "income")
    }

    /// Fetches the balance sheet, one row per line item and period.
    async fn balance(&self, symbol: &Symbol, period: Period) -> Result<Response<StatementItem>> {
        let _ = (symbol, period);
        unsupported!(self, EquityFundamental, "balance")
    }

    /// Fetches the cash flow statement, one row per line item and period.
    async fn cash(&self, symbol: &Symbol, period: Period) -> Result<Response<StatementItem>> {
        let _ = (symbol, period);
        unsupported!(self, EquityFundamental, "cash")
    }

    /// Fetches valuation multiples per fiscal period.
    async fn multiples(
        &self,
        symbol: &Symbol,
        period: Period,
    ) -> Result<Response<FinancialRatio>> {
        let _ = (symbol, period);
        unsupported!(self, EquityFundamental, "multiples")
    }
}

/// Top movers reports.
#[async_trait]
pub trait EquityDiscoveryProvider: Provider {
    /// Most actively traded stocks.
    async fn active(&self, exchange: Exchange) -> Result<Response<MarketMover>> {
        let _ = exchange;
        unsupported!(self, EquityDiscovery, "active")
    }

    /// Top gaining stocks.
    async fn gainers(&self, exchange: Exchange) -> Result<Response<MarketMover>> {
        let _ = exchange;
        unsupported!(self, EquityDiscovery, "gainers")
    }

    /// Top losing stocks.
    async fn losers(&self, exchange: Exchange) -> Result<Response<MarketMover>> {
        let _ = exchange;
        unsupported!(self, EquityDiscovery, "losers")
    }
}

/// Futures contracts.
#[async_trait]
pub trait FuturesProvider: Provider {
    /// Fetches daily bars for a futures contract.
    async fn historical(&self, symbol: &Symbol, range: DateRange) -> Result<Response<PriceBar>> {
        let _ = (symbol, range);
        unsupported!(self, DerivativesFutures, "historical")
    }

    /// Fetches the latest matched trades. A `limit` of zero fetches the whole session.
    ///
    /// `cookie` is a browser session cookie for boards that reject anonymous
    /// requests; providers that do not need one ignore it.
    async fn quote(
        &self,
        symbol: &Symbol,
        limit: usize,
        cookie: Option<&str>,
    ) -> Result<Response<FuturesTrade>> {
        let _ = (symbol, limit, cookie);
        unsupported!(self, DerivativesFutures, "quote")
    }

    /// Lists the contracts currently trading. An empty symbol lists all of them.
    async fn search(&self, symbol: &Symbol) -> Result<Response<FuturesContract>> {
        let _ = symbol;
        unsupported!(self, DerivativesFutures, "search")
    }
}

/// Covered warrants.
#[async_trait]
pub trait CoveredWarrantProvider: Provider {
    /// Lists the warrants currently trading. An empty symbol lists all of them.
    async fn search(&self, symbol: &Symbol) -> Result<Response<CoveredWarrant>> {
        let _ = symbol;
        unsupported!(self, DerivativesCoveredWarrant, "search")
    }
}

/// Market indices.
#[async_trait]
pub trait IndexProvider: Provider {
    /// Lists the indices. An empty symbol lists all of them.
    async fn search(&self, symbol: &Symbol) -> Result<Response<IndexInfo>> {
        let _ = symbol;
        unsupported!(self, Index, "search")
    }

    /// Lists the stocks of an index.
    async fn constituents(&self, symbol: &Symbol) -> Result<Response<IndexConstituent>> {
        let _ = symbol;
        unsupported!(self, Index, "constituents")
    }
}

/// Index prices.
#[async_trait]
pub trait IndexPriceProvider: Provider {
    /// Fetches OHLCV bars of an index.
    async fn historical(
        &self,
        symbol: &Symbol,
        range: DateRange,
        interval: Interval,
    ) -> Result<Response<PriceBar>> {
        let _ = (symbol, range, interval);
        unsupported!(self, IndexPrice, "historical")
    }
}

/// Exchange-traded funds.
#[async_trait]
pub trait EtfProvider: Provider {
    /// Fetches OHLCV bars of an ETF.
    async fn historical(
        &self,
        symbol: &Symbol,
        range: DateRange,
        interval: Interval,
    ) -> Result<Response<PriceBar>> {
        let _ = (symbol, range, interval);
        unsupported!(self, Etf, "historical")
    }

    /// Lists the ETFs currently trading. An empty symbol lists all of them.
    async fn search(&self, symbol: &Symbol) -> Result<Response<EtfInfo>> {
        let _ = symbol;
        unsupported!(self, Etf, "search")
    }
}

/// Open-ended mutual funds.
#[async_trait]
pub trait FundsProvider: Provider {
    /// Searches funds by short name, optionally restricted to an asset class.
    async fn search(
        &self,
        symbol: &Symbol,
        fund_type: Option<FundType>,
    ) -> Result<Response<FundInfo>> {
        let _ = (symbol, fund_type);
        unsupported!(self, Funds, "search")
    }

    /// Fetches daily NAV history.
    async fn historical(&self, symbol: &Symbol, range: DateRange) -> Result<Response<FundNav>> {
        let _ = (symbol, range);
        unsupported!(self, Funds, "historical")
    }

    /// Fetches the top equity and bond holdings as two series.
    async fn holdings(&self, symbol: &Symbol) -> Result<Response<FundHolding>> {
        let _ = symbol;
        unsupported!(self, Funds, "holdings")
    }
}

/// Company news.
#[async_trait]
pub trait NewsProvider: Provider {
    /// Fetches the latest headlines about a company.
    async fn company(&self, symbol: &Symbol, limit: usize) -> Result<Response<NewsItem>> {
        let _ = (symbol, limit);
        unsupported!(self, News, "company")
    }
}
