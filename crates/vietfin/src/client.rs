//! The [`VietFin`] entry point.

use std::sync::Arc;

use vietfin_core::Transport;

use crate::facade::{Derivatives, Equity, Etf, Funds, Index, News};
use crate::registry::ProviderRegistry;

/// Entry point grouping the facades of every financial concept.
///
/// Cloning is cheap: clones share one registry.
///
/// # Example
///
/// ```rust,no_run
/// use vietfin::{Interval, VietFin};
///
/// # async fn example() -> vietfin::Result<()> {
/// let vf = VietFin::new();
/// let bars = vf
///     .equity()
///     .price()
///     .historical("VNM", Some("2024-01-01"), Some("2024-03-31"), Interval::OneDay)
///     .await?;
/// let table = bars.to_table(None, None)?;
/// println!("{} rows", table.height());
///
/// let catalog = vf.equity().using("wifeed").search("").await?;
/// println!("{}", catalog.extra.records_count);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct VietFin {
    registry: Arc<ProviderRegistry>,
}

impl VietFin {
    /// Uses the process-wide registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: ProviderRegistry::shared(),
        }
    }

    /// Uses a registry whose providers all share `transport`.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self::with_registry(ProviderRegistry::with_transport(transport))
    }

    /// Uses a custom registry.
    #[must_use]
    pub fn with_registry(registry: ProviderRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// The registry backing every facade.
    #[must_use]
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Listed companies, prices, ownership, calendar, fundamentals and movers.
    #[must_use]
    pub fn equity(&self) -> Equity<'_> {
        Equity::new(&self.registry)
    }

    /// Futures and covered warrants.
    #[must_use]
    pub fn derivatives(&self) -> Derivatives<'_> {
        Derivatives::new(&self.registry)
    }

    /// Market indices.
    #[must_use]
    pub fn index(&self) -> Index<'_> {
        Index::new(&self.registry)
    }

    /// Exchange-traded funds.
    #[must_use]
    pub fn etf(&self) -> Etf<'_> {
        Etf::new(&self.registry)
    }

    /// Open-ended mutual funds.
    #[must_use]
    pub fn funds(&self) -> Funds<'_> {
        Funds::new(&self.registry)
    }

    /// Company news.
    #[must_use]
    pub fn news(&self) -> News<'_> {
        News::new(&self.registry)
    }
}

impl Default for VietFin {
    fn default() -> Self {
        Self::new()
    }
}
