//! Per-concept entry points.
//!
//! Each facade resolves its provider through a [`ProviderRegistry`], using a
//! default per operation unless [`using`](Equity::using) names another one.
//! Sub-facades such as [`Equity::price`] inherit that choice. Facades
//! normalize the simple parameters and hands the provider's [`Response`]
//! back unchanged.

use chrono::Utc;
use tracing::info;

use vietfin_core::{
    CalendarEvent, CompanyProfile, CoveredWarrant, DateRange, Dividend, EquityInfo, EtfInfo,
    Exchange, Executive, FinancialRatio, ForeignTrade, FundHolding, FundInfo, FundNav, FundType,
    FuturesContract, FuturesTrade, IndexConstituent, IndexInfo, InsiderTrade, Interval,
    MajorHolder, MarketMover, NewsItem, Period, PriceBar, PropTrade, ProviderId, QuoteTick,
    Response, Result, StatementItem, Symbol,
};

use crate::registry::ProviderRegistry;

fn retrieved<T>(response: Response<T>) -> Response<T> {
    info!(
        provider = %response.provider,
        symbol = response.extra.symbol.as_deref().unwrap_or_default(),
        records = response.extra.records_count,
        "Retrieved records"
    );
    response
}

fn date_range(start: Option<&str>, end: Option<&str>) -> Result<DateRange> {
    DateRange::parse_or_default(start, end, Utc::now().date_naive())
}

macro_rules! facade {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name<'a> {
            registry: &'a ProviderRegistry,
            provider: Option<&'a str>,
        }

        impl<'a> $name<'a> {
            /// Creates the facade over `registry`.
            #[must_use]
            pub const fn new(registry: &'a ProviderRegistry) -> Self {
                Self {
                    registry,
                    provider: None,
                }
            }

            /// Routes every operation to `provider` instead of its default.
            /// The name is matched case-insensitively.
            #[must_use]
            pub const fn using(mut self, provider: &'a str) -> Self {
                self.provider = Some(provider);
                self
            }

            fn provider_or(&self, default: ProviderId) -> &'a str {
                self.provider.unwrap_or(default.as_str())
            }
        }
    };
}

facade! {
    /// Listed companies. `search` defaults to SSI, `profile` to TCBS.
    Equity
}

impl<'a> Equity<'a> {
    /// Searches the listed-company catalog. An empty symbol returns all of it.
    pub async fn search(&self, symbol: &str) -> Result<Response<EquityInfo>> {
        let provider = self.registry.equity(self.provider_or(ProviderId::Ssi))?;
        provider.search(&Symbol::new(symbol)).await.map(retrieved)
    }

    /// Fetches the company overview.
    pub async fn profile(&self, symbol: &str) -> Result<Response<CompanyProfile>> {
        let provider = self.registry.equity(self.provider_or(ProviderId::Tcbs))?;
        provider.profile(&Symbol::new(symbol)).await.map(retrieved)
    }

    /// Stock prices.
    #[must_use]
    pub const fn price(&self) -> EquityPrice<'a> {
        EquityPrice {
            registry: self.registry,
            provider: self.provider,
        }
    }

    /// Shareholders and investor flows.
    #[must_use]
    pub const fn ownership(&self) -> EquityOwnership<'a> {
        EquityOwnership {
            registry: self.registry,
            provider: self.provider,
        }
    }

    /// Corporate events.
    #[must_use]
    pub const fn calendar(&self) -> EquityCalendar<'a> {
        EquityCalendar {
            registry: self.registry,
            provider: self.provider,
        }
    }

    /// Statements, ratios and executives.
    #[must_use]
    pub const fn fundamental(&self) -> EquityFundamental<'a> {
        EquityFundamental {
            registry: self.registry,
            provider: self.provider,
        }
    }

    /// Top movers.
    #[must_use]
    pub const fn discovery(&self) -> EquityDiscovery<'a> {
        EquityDiscovery {
            registry: self.registry,
            provider: self.provider,
        }
    }
}

facade! {
    /// Stock prices, served by TCBS unless overridden.
    EquityPrice
}

impl EquityPrice<'_> {
    /// Fetches OHLCV bars. Missing bounds cover the last year up to today.
    pub async fn historical(
        &self,
        symbol: &str,
        start: Option<&str>,
        end: Option<&str>,
        interval: Interval,
    ) -> Result<Response<PriceBar>> {
        let range = date_range(start, end)?;
        let provider = self
            .registry
            .equity_price(self.provider_or(ProviderId::Tcbs))?;
        provider
            .historical(&Symbol::new(symbol), range, interval)
            .await
            .map(retrieved)
    }

    /// Fetches the latest intraday matched orders.
    pub async fn quote(&self, symbol: &str, limit: usize) -> Result<Response<QuoteTick>> {
        let provider = self
            .registry
            .equity_price(self.provider_or(ProviderId::Tcbs))?;
        provider
            .quote(&Symbol::new(symbol), limit)
            .await
            .map(retrieved)
    }
}

facade! {
    /// Shareholders and investor flows. Insider deals and major holders come
    /// from TCBS, foreign and proprietary flows from CafeF.
    EquityOwnership
}

impl EquityOwnership<'_> {
    /// Fetches insider and major shareholder deals.
    pub async fn insider_trading(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Response<InsiderTrade>> {
        let provider = self
            .registry
            .equity_ownership(self.provider_or(ProviderId::Tcbs))?;
        provider
            .insider_trading(&Symbol::new(symbol), limit)
            .await
            .map(retrieved)
    }

    /// Fetches the large shareholders.
    pub async fn major_holders(&self, symbol: &str) -> Result<Response<MajorHolder>> {
        let provider = self
            .registry
            .equity_ownership(self.provider_or(ProviderId::Tcbs))?;
        provider
            .major_holders(&Symbol::new(symbol))
            .await
            .map(retrieved)
    }

    /// Fetches daily foreign investor flows.
    pub async fn foreign_trading(
        &self,
        symbol: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Response<ForeignTrade>> {
        let range = date_range(start, end)?;
        let provider = self
            .registry
            .equity_ownership(self.provider_or(ProviderId::Cafef))?;
        provider
            .foreign_trading(&Symbol::new(symbol), range)
            .await
            .map(retrieved)
    }

    /// Fetches daily proprietary trading flows.
    pub async fn prop_trading(
        &self,
        symbol: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Response<PropTrade>> {
        let range = date_range(start, end)?;
        let provider = self
            .registry
            .equity_ownership(self.provider_or(ProviderId::Cafef))?;
        provider
            .prop_trading(&Symbol::new(symbol), range)
            .await
            .map(retrieved)
    }
}

facade! {
    /// Corporate events.
    EquityCalendar
}

impl EquityCalendar<'_> {
    /// Fetches corporate events, newest first.
    pub async fn events(&self, symbol: &str, limit: usize) -> Result<Response<CalendarEvent>> {
        let provider = self
            .registry
            .equity_calendar(self.provider_or(ProviderId::Tcbs))?;
        provider
            .events(&Symbol::new(symbol), limit)
            .await
            .map(retrieved)
    }
}

facade! {
    /// Statements, ratios, dividends and executives, served by TCBS unless
    /// overridden.
    EquityFundamental
}

impl EquityFundamental<'_> {
    /// Fetches the key executives.
    pub async fn management(&self, symbol: &str) -> Result<Response<Executive>> {
        let provider = self
            .registry
            .equity_fundamental(self.provider_or(ProviderId::Tcbs))?;
        provider
            .management(&Symbol::new(symbol))
            .await
            .map(retrieved)
    }

    /// Fetches financial ratios per fiscal period.
    pub async fn ratios(&self, symbol: &str, period: Period) -> Result<Response<FinancialRatio>> {
        let provider = self
            .registry
            .equity_fundamental(self.provider_or(ProviderId::Tcbs))?;
        provider
            .ratios(&Symbol::new(symbol), period)
            .await
            .map(retrieved)
    }

    /// Fetches historical dividend payments.
    pub async fn dividends(&self, symbol: &str, limit: usize) -> Result<Response<Dividend>> {
        let provider = self
            .registry
            .equity_fundamental(self.provider_or(ProviderId::Tcbs))?;
        provider
            .dividends(&Symbol::new(symbol), limit)
            .await
            .map(retrieved)
    }

    /// Fetches the income statement.
    pub async fn income(&self, symbol: &str, period: Period) -> Result<Response<StatementItem>> {
        let provider = self
            .registry
            .equity_fundamental(self.provider_or(ProviderId::Tcbs))?;
        provider
            .income(&Symbol::new(symbol), period)
            .await
            .map(retrieved)
    }

    /// Fetches the balance sheet.
    pub async fn balance(&self, symbol: &str, period: Period) -> Result<Response<StatementItem>> {
        let provider = self
            .registry
            .equity_fundamental(self.provider_or(ProviderId::Tcbs))?;
        provider
            .balance(&Symbol::new(symbol), period)
            .await
            .map(retrieved)
    }

    /// Fetches the cash flow statement.
    pub async fn cash(&self, symbol: &str, period: Period) -> Result<Response<StatementItem>> {
        let provider = self
            .registry
            .equity_fundamental(self.provider_or(ProviderId::Tcbs))?;
        provider
            .cash(&Symbol::new(symbol), period)
            .await
            .map(retrieved)
    }

    /// Fetches valuation multiples per fiscal period.
    pub async fn multiples(
        &self,
        symbol: &str,
        period: Period,
    ) -> Result<Response<FinancialRatio>> {
        let provider = self
            .registry
            .equity_fundamental(self.provider_or(ProviderId::Tcbs))?;
        provider
            .multiples(&Symbol::new(symbol), period)
            .await
            .map(retrieved)
    }
}

facade! {
    /// Top movers, served by VNDIRECT unless overridden.
    EquityDiscovery
}

impl EquityDiscovery<'_> {
    /// Most actively traded stocks.
    pub async fn active(&self, exchange: Exchange) -> Result<Response<MarketMover>> {
        let provider = self
            .registry
            .equity_discovery(self.provider_or(ProviderId::Vndirect))?;
        provider.active(exchange).await.map(retrieved)
    }

    /// Top gaining stocks.
    pub async fn gainers(&self, exchange: Exchange) -> Result<Response<MarketMover>> {
        let provider = self
            .registry
            .equity_discovery(self.provider_or(ProviderId::Vndirect))?;
        provider.gainers(exchange).await.map(retrieved)
    }

    /// Top losing stocks.
    pub async fn losers(&self, exchange: Exchange) -> Result<Response<MarketMover>> {
        let provider = self
            .registry
            .equity_discovery(self.provider_or(ProviderId::Vndirect))?;
        provider.losers(exchange).await.map(retrieved)
    }
}

/// Derivatives: futures and covered warrants.
#[derive(Debug, Clone, Copy)]
pub struct Derivatives<'a> {
    registry: &'a ProviderRegistry,
}

impl<'a> Derivatives<'a> {
    /// Creates the facade over `registry`.
    #[must_use]
    pub const fn new(registry: &'a ProviderRegistry) -> Self {
        Self { registry }
    }

    /// Futures contracts.
    #[must_use]
    pub const fn futures(&self) -> Futures<'a> {
        Futures::new(self.registry)
    }

    /// Covered warrants.
    #[must_use]
    pub const fn covered_warrant(&self) -> CoveredWarrants<'a> {
        CoveredWarrants::new(self.registry)
    }
}

facade! {
    /// Futures contracts. History defaults to TCBS, quotes and search to SSI.
    Futures
}

impl Futures<'_> {
    /// Fetches daily bars of a contract.
    pub async fn historical(
        &self,
        symbol: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Response<PriceBar>> {
        let range = date_range(start, end)?;
        let provider = self.registry.futures(self.provider_or(ProviderId::Tcbs))?;
        provider
            .historical(&Symbol::new(symbol), range)
            .await
            .map(retrieved)
    }

    /// Fetches the latest matched trades. A `limit` of zero fetches the session.
    ///
    /// `cookie` is the browser session cookie the VDSC board requires; SSI
    /// ignores it.
    pub async fn quote(
        &self,
        symbol: &str,
        limit: usize,
        cookie: Option<&str>,
    ) -> Result<Response<FuturesTrade>> {
        let provider = self.registry.futures(self.provider_or(ProviderId::Ssi))?;
        provider
            .quote(&Symbol::new(symbol), limit, cookie)
            .await
            .map(retrieved)
    }

    /// Lists the contracts currently trading.
    pub async fn search(&self, symbol: &str) -> Result<Response<FuturesContract>> {
        let provider = self.registry.futures(self.provider_or(ProviderId::Ssi))?;
        provider.search(&Symbol::new(symbol)).await.map(retrieved)
    }
}

facade! {
    /// Covered warrants.
    CoveredWarrants
}

impl CoveredWarrants<'_> {
    /// Lists the warrants currently trading.
    pub async fn search(&self, symbol: &str) -> Result<Response<CoveredWarrant>> {
        let provider = self
            .registry
            .covered_warrant(self.provider_or(ProviderId::Ssi))?;
        provider.search(&Symbol::new(symbol)).await.map(retrieved)
    }
}

facade! {
    /// Market indices.
    Index
}

impl<'a> Index<'a> {
    /// Lists the indices. An empty symbol lists all of them.
    pub async fn search(&self, symbol: &str) -> Result<Response<IndexInfo>> {
        let provider = self.registry.index(self.provider_or(ProviderId::Ssi))?;
        provider.search(&Symbol::new(symbol)).await.map(retrieved)
    }

    /// Lists the stocks of an index.
    pub async fn constituents(&self, symbol: &str) -> Result<Response<IndexConstituent>> {
        let provider = self.registry.index(self.provider_or(ProviderId::Ssi))?;
        provider
            .constituents(&Symbol::new(symbol))
            .await
            .map(retrieved)
    }

    /// Index prices.
    #[must_use]
    pub const fn price(&self) -> IndexPrice<'a> {
        IndexPrice {
            registry: self.registry,
            provider: self.provider,
        }
    }
}

facade! {
    /// Index prices, served by TCBS unless overridden.
    IndexPrice
}

impl IndexPrice<'_> {
    /// Fetches OHLCV bars of an index.
    pub async fn historical(
        &self,
        symbol: &str,
        start: Option<&str>,
        end: Option<&str>,
        interval: Interval,
    ) -> Result<Response<PriceBar>> {
        let range = date_range(start, end)?;
        let provider = self
            .registry
            .index_price(self.provider_or(ProviderId::Tcbs))?;
        provider
            .historical(&Symbol::new(symbol), range, interval)
            .await
            .map(retrieved)
    }
}

facade! {
    /// Exchange-traded funds, served by SSI unless overridden.
    Etf
}

impl Etf<'_> {
    /// Fetches OHLCV bars of an ETF.
    pub async fn historical(
        &self,
        symbol: &str,
        start: Option<&str>,
        end: Option<&str>,
        interval: Interval,
    ) -> Result<Response<PriceBar>> {
        let range = date_range(start, end)?;
        let provider = self.registry.etf(self.provider_or(ProviderId::Ssi))?;
        provider
            .historical(&Symbol::new(symbol), range, interval)
            .await
            .map(retrieved)
    }

    /// Lists the ETFs currently trading.
    pub async fn search(&self, symbol: &str) -> Result<Response<EtfInfo>> {
        let provider = self.registry.etf(self.provider_or(ProviderId::Ssi))?;
        provider.search(&Symbol::new(symbol)).await.map(retrieved)
    }
}

facade! {
    /// Open-ended mutual funds, served by Fmarket.
    Funds
}

impl Funds<'_> {
    /// Searches funds by short name, optionally restricted to an asset class.
    pub async fn search(
        &self,
        symbol: &str,
        fund_type: Option<FundType>,
    ) -> Result<Response<FundInfo>> {
        let provider = self.registry.funds(self.provider_or(ProviderId::Fmarket))?;
        provider
            .search(&Symbol::new(symbol), fund_type)
            .await
            .map(retrieved)
    }

    /// Fetches daily NAV history.
    pub async fn historical(
        &self,
        symbol: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Response<FundNav>> {
        let range = date_range(start, end)?;
        let provider = self.registry.funds(self.provider_or(ProviderId::Fmarket))?;
        provider
            .historical(&Symbol::new(symbol), range)
            .await
            .map(retrieved)
    }

    /// Fetches the top equity and bond holdings as two series.
    pub async fn holdings(&self, symbol: &str) -> Result<Response<FundHolding>> {
        let provider = self.registry.funds(self.provider_or(ProviderId::Fmarket))?;
        provider.holdings(&Symbol::new(symbol)).await.map(retrieved)
    }
}

facade! {
    /// Company news.
    News
}

impl News<'_> {
    /// Fetches the latest headlines about a company.
    pub async fn company(&self, symbol: &str, limit: usize) -> Result<Response<NewsItem>> {
        let provider = self.registry.news(self.provider_or(ProviderId::Tcbs))?;
        provider
            .company(&Symbol::new(symbol), limit)
            .await
            .map(retrieved)
    }
}
