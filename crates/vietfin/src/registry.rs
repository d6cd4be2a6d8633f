//! Provider registry: the capability to provider lookup table.

use std::sync::{Arc, LazyLock};

use tracing::{debug, warn};

use vietfin_core::{
    Capability, CoveredWarrantProvider, DataError, EquityCalendarProvider, EquityDiscoveryProvider,
    EquityFundamentalProvider, EquityOwnershipProvider, EquityPriceProvider, EquityProvider,
    EtfProvider, FundsProvider, FuturesProvider, IndexPriceProvider, IndexProvider, NewsProvider,
    Provider, ProviderId, Result, Transport,
};

static GLOBAL: LazyLock<Arc<ProviderRegistry>> =
    LazyLock::new(|| Arc::new(ProviderRegistry::new()));

/// Registry of provider implementations, one list per capability.
///
/// Every provider is instantiated once when the registry is built and shared
/// behind `Arc` afterwards; lookups never construct anything. Which providers
/// are present depends on the enabled cargo features.
///
/// # Example
///
/// ```rust,no_run
/// use vietfin::{ProviderRegistry, Symbol};
///
/// # async fn example() -> vietfin::Result<()> {
/// let registry = ProviderRegistry::global();
/// let ssi = registry.equity("SSI")?;
/// let catalog = ssi.search(&Symbol::default()).await?;
/// println!("{}", catalog.extra.records_count);
/// # Ok(())
/// # }
/// ```
pub struct ProviderRegistry {
    equity: Vec<Arc<dyn EquityProvider>>,
    equity_price: Vec<Arc<dyn EquityPriceProvider>>,
    equity_ownership: Vec<Arc<dyn EquityOwnershipProvider>>,
    equity_calendar: Vec<Arc<dyn EquityCalendarProvider>>,
    equity_fundamental: Vec<Arc<dyn EquityFundamentalProvider>>,
    equity_discovery: Vec<Arc<dyn EquityDiscoveryProvider>>,
    futures: Vec<Arc<dyn FuturesProvider>>,
    covered_warrant: Vec<Arc<dyn CoveredWarrantProvider>>,
    index: Vec<Arc<dyn IndexProvider>>,
    index_price: Vec<Arc<dyn IndexPriceProvider>>,
    etf: Vec<Arc<dyn EtfProvider>>,
    funds: Vec<Arc<dyn FundsProvider>>,
    news: Vec<Arc<dyn NewsProvider>>,
}

fn ids<P: Provider + ?Sized>(providers: &[Arc<P>]) -> Vec<ProviderId> {
    providers.iter().map(|p| p.id()).collect()
}

fn names<P: Provider + ?Sized>(providers: &[Arc<P>]) -> Vec<&'static str> {
    providers.iter().map(|p| p.name()).collect()
}

fn lookup<P: Provider + ?Sized>(
    providers: &[Arc<P>],
    capability: Capability,
    name: &str,
) -> Result<Arc<P>> {
    ProviderId::parse(name)
        .and_then(|id| providers.iter().find(|p| p.id() == id))
        .cloned()
        .ok_or_else(|| {
            warn!(%capability, provider = name, "Provider is not registered");
            DataError::UnknownProvider {
                capability,
                provider: name.to_string(),
            }
        })
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("equity", &names(&self.equity))
            .field("equity_price", &names(&self.equity_price))
            .field("equity_ownership", &names(&self.equity_ownership))
            .field("equity_calendar", &names(&self.equity_calendar))
            .field("equity_fundamental", &names(&self.equity_fundamental))
            .field("equity_discovery", &names(&self.equity_discovery))
            .field("futures", &names(&self.futures))
            .field("covered_warrant", &names(&self.covered_warrant))
            .field("index", &names(&self.index))
            .field("index_price", &names(&self.index_price))
            .field("etf", &names(&self.etf))
            .field("funds", &names(&self.funds))
            .field("news", &names(&self.news))
            .finish()
    }
}

/// Builds a provider over HTTP, or over the shared transport when one is given.
macro_rules! build {
    ($provider:ty, $transport:expr) => {
        Arc::new(match $transport {
            Some(transport) => <$provider>::with_transport(Arc::clone(transport)),
            None => <$provider>::new(),
        })
    };
}

impl ProviderRegistry {
    /// Create a registry holding every provider enabled by cargo features,
    /// each with its default HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a registry whose providers all share `transport`.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self::build(Some(&transport))
    }

    /// Create a registry with no providers.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            equity: Vec::new(),
            equity_price: Vec::new(),
            equity_ownership: Vec::new(),
            equity_calendar: Vec::new(),
            equity_fundamental: Vec::new(),
            equity_discovery: Vec::new(),
            futures: Vec::new(),
            covered_warrant: Vec::new(),
            index: Vec::new(),
            index_price: Vec::new(),
            etf: Vec::new(),
            funds: Vec::new(),
            news: Vec::new(),
        }
    }

    /// The process-wide registry, built over HTTP on first use.
    #[must_use]
    pub fn global() -> &'static Self {
        GLOBAL.as_ref()
    }

    pub(crate) fn shared() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    // Registration order fixes the order reported by `providers`.
    #[allow(unused_variables, unused_mut)]
    fn build(transport: Option<&Arc<dyn Transport>>) -> Self {
        let mut registry = Self::empty();

        #[cfg(feature = "ssi")]
        let ssi: Arc<vietfin_ssi::SsiProvider> = build!(vietfin_ssi::SsiProvider, transport);
        #[cfg(feature = "tcbs")]
        let tcbs: Arc<vietfin_tcbs::TcbsProvider> = build!(vietfin_tcbs::TcbsProvider, transport);
        #[cfg(feature = "dnse")]
        let dnse: Arc<vietfin_dnse::DnseProvider> = build!(vietfin_dnse::DnseProvider, transport);
        #[cfg(feature = "cafef")]
        let cafef: Arc<vietfin_cafef::CafefProvider> =
            build!(vietfin_cafef::CafefProvider, transport);
        #[cfg(feature = "vndirect")]
        let vndirect: Arc<vietfin_vndirect::VndirectProvider> =
            build!(vietfin_vndirect::VndirectProvider, transport);
        #[cfg(feature = "wifeed")]
        let wifeed: Arc<vietfin_wifeed::WifeedProvider> =
            build!(vietfin_wifeed::WifeedProvider, transport);
        #[cfg(feature = "fmarket")]
        let fmarket: Arc<vietfin_fmarket::FmarketProvider> =
            build!(vietfin_fmarket::FmarketProvider, transport);
        #[cfg(feature = "vdsc")]
        let vdsc: Arc<vietfin_vdsc::VdscProvider> = build!(vietfin_vdsc::VdscProvider, transport);

        #[cfg(feature = "ssi")]
        {
            registry.register_equity(ssi.clone());
            registry.register_equity_price(ssi.clone());
            registry.register_equity_fundamental(ssi.clone());
            registry.register_equity_discovery(ssi.clone());
            registry.register_futures(ssi.clone());
            registry.register_covered_warrant(ssi.clone());
            registry.register_index(ssi.clone());
            registry.register_etf(ssi);
        }
        #[cfg(feature = "wifeed")]
        registry.register_equity(wifeed);
        #[cfg(feature = "tcbs")]
        {
            registry.register_equity(tcbs.clone());
            registry.register_equity_price(tcbs.clone());
            registry.register_equity_ownership(tcbs.clone());
            registry.register_equity_calendar(tcbs.clone());
            registry.register_equity_fundamental(tcbs.clone());
            registry.register_futures(tcbs.clone());
            registry.register_index_price(tcbs.clone());
            registry.register_etf(tcbs.clone());
            registry.register_news(tcbs);
        }
        #[cfg(feature = "dnse")]
        {
            registry.register_equity_price(dnse.clone());
            registry.register_index_price(dnse.clone());
            registry.register_etf(dnse);
        }
        #[cfg(feature = "vdsc")]
        registry.register_futures(vdsc);
        #[cfg(feature = "cafef")]
        registry.register_equity_ownership(cafef);
        #[cfg(feature = "vndirect")]
        registry.register_equity_discovery(vndirect);
        #[cfg(feature = "fmarket")]
        registry.register_funds(fmarket);

        registry
    }

    /// Register an equity provider.
    pub fn register_equity(&mut self, provider: Arc<dyn EquityProvider>) {
        debug!(provider = provider.name(), "Registering equity provider");
        self.equity.push(provider);
    }

    /// Register an equity price provider.
    pub fn register_equity_price(&mut self, provider: Arc<dyn EquityPriceProvider>) {
        debug!(provider = provider.name(), "Registering equity price provider");
        self.equity_price.push(provider);
    }

    /// Register an equity ownership provider.
    pub fn register_equity_ownership(&mut self, provider: Arc<dyn EquityOwnershipProvider>) {
        debug!(
            provider = provider.name(),
            "Registering equity ownership provider"
        );
        self.equity_ownership.push(provider);
    }

    /// Register an equity calendar provider.
    pub fn register_equity_calendar(&mut self, provider: Arc<dyn EquityCalendarProvider>) {
        debug!(
            provider = provider.name(),
            "Registering equity calendar provider"
        );
        self.equity_calendar.push(provider);
    }

    /// Register an equity fundamental provider.
    pub fn register_equity_fundamental(&mut self, provider: Arc<dyn EquityFundamentalProvider>) {
        debug!(
            provider = provider.name(),
            "Registering equity fundamental provider"
        );
        self.equity_fundamental.push(provider);
    }

    /// Register an equity discovery provider.
    pub fn register_equity_discovery(&mut self, provider: Arc<dyn EquityDiscoveryProvider>) {
        debug!(
            provider = provider.name(),
            "Registering equity discovery provider"
        );
        self.equity_discovery.push(provider);
    }

    /// Register a futures provider.
    pub fn register_futures(&mut self, provider: Arc<dyn FuturesProvider>) {
        debug!(provider = provider.name(), "Registering futures provider");
        self.futures.push(provider);
    }

    /// Register a covered warrant provider.
    pub fn register_covered_warrant(&mut self, provider: Arc<dyn CoveredWarrantProvider>) {
        debug!(
            provider = provider.name(),
            "Registering covered warrant provider"
        );
        self.covered_warrant.push(provider);
    }

    /// Register an index provider.
    pub fn register_index(&mut self, provider: Arc<dyn IndexProvider>) {
        debug!(provider = provider.name(), "Registering index provider");
        self.index.push(provider);
    }

    /// Register an index price provider.
    pub fn register_index_price(&mut self, provider: Arc<dyn IndexPriceProvider>) {
        debug!(provider = provider.name(), "Registering index price provider");
        self.index_price.push(provider);
    }

    /// Register an ETF provider.
    pub fn register_etf(&mut self, provider: Arc<dyn EtfProvider>) {
        debug!(provider = provider.name(), "Registering ETF provider");
        self.etf.push(provider);
    }

    /// Register a mutual fund provider.
    pub fn register_funds(&mut self, provider: Arc<dyn FundsProvider>) {
        debug!(provider = provider.name(), "Registering funds provider");
        self.funds.push(provider);
    }

    /// Register a news provider.
    pub fn register_news(&mut self, provider: Arc<dyn NewsProvider>) {
        debug!(provider = provider.name(), "Registering news provider");
        self.news.push(provider);
    }

    /// Providers registered for `capability`, in registration order.
    #[must_use]
    pub fn providers(&self, capability: Capability) -> Vec<ProviderId> {
        match capability {
            Capability::Equity => ids(&self.equity),
            Capability::EquityPrice => ids(&self.equity_price),
            Capability::EquityOwnership => ids(&self.equity_ownership),
            Capability::EquityCalendar => ids(&self.equity_calendar),
            Capability::EquityFundamental => ids(&self.equity_fundamental),
            Capability::EquityDiscovery => ids(&self.equity_discovery),
            Capability::DerivativesFutures => ids(&self.futures),
            Capability::DerivativesCoveredWarrant => ids(&self.covered_warrant),
            Capability::Index => ids(&self.index),
            Capability::IndexPrice => ids(&self.index_price),
            Capability::Etf => ids(&self.etf),
            Capability::Funds => ids(&self.funds),
            Capability::News => ids(&self.news),
        }
    }

    /// Looks up an equity provider by case-insensitive name.
    pub fn equity(&self, name: &str) -> Result<Arc<dyn EquityProvider>> {
        lookup(&self.equity, Capability::Equity, name)
    }

    /// Looks up an equity price provider by case-insensitive name.
    pub fn equity_price(&self, name: &str) -> Result<Arc<dyn EquityPriceProvider>> {
        lookup(&self.equity_price, Capability::EquityPrice, name)
    }

    /// Looks up an equity ownership provider by case-insensitive name.
    pub fn equity_ownership(&self, name: &str) -> Result<Arc<dyn EquityOwnershipProvider>> {
        lookup(&self.equity_ownership, Capability::EquityOwnership, name)
    }

    /// Looks up an equity calendar provider by case-insensitive name.
    pub fn equity_calendar(&self, name: &str) -> Result<Arc<dyn EquityCalendarProvider>> {
        lookup(&self.equity_calendar, Capability::EquityCalendar, name)
    }

    /// Looks up an equity fundamental provider by case-insensitive name.
    pub fn equity_fundamental(&self, name: &str) -> Result<Arc<dyn EquityFundamentalProvider>> {
        lookup(&self.equity_fundamental, Capability::EquityFundamental, name)
    }

    /// Looks up an equity discovery provider by case-insensitive name.
    pub fn equity_discovery(&self, name: &str) -> Result<Arc<dyn EquityDiscoveryProvider>> {
        lookup(&self.equity_discovery, Capability::EquityDiscovery, name)
    }

    /// Looks up a futures provider by case-insensitive name.
    pub fn futures(&self, name: &str) -> Result<Arc<dyn FuturesProvider>> {
        lookup(&self.futures, Capability::DerivativesFutures, name)
    }

    /// Looks up a covered warrant provider by case-insensitive name.
    pub fn covered_warrant(&self, name: &str) -> Result<Arc<dyn CoveredWarrantProvider>> {
        lookup(
            &self.covered_warrant,
            Capability::DerivativesCoveredWarrant,
            name,
        )
    }

    /// Looks up an index provider by case-insensitive name.
    pub fn index(&self, name: &str) -> Result<Arc<dyn IndexProvider>> {
        lookup(&self.index, Capability::Index, name)
    }

    /// Looks up an index price provider by case-insensitive name.
    pub fn index_price(&self, name: &str) -> Result<Arc<dyn IndexPriceProvider>> {
        lookup(&self.index_price, Capability::IndexPrice, name)
    }

    /// Looks up an ETF provider by case-insensitive name.
    pub fn etf(&self, name: &str) -> Result<Arc<dyn EtfProvider>> {
        lookup(&self.etf, Capability::Etf, name)
    }

    /// Looks up a mutual fund provider by case-insensitive name.
    pub fn funds(&self, name: &str) -> Result<Arc<dyn FundsProvider>> {
        lookup(&self.funds, Capability::Funds, name)
    }

    /// Looks up a news provider by case-insensitive name.
    pub fn news(&self, name: &str) -> Result<Arc<dyn NewsProvider>> {
        lookup(&self.news, Capability::News, name)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
