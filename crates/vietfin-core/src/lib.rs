#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vietfin/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for Vietnamese market data providers.
//!
//! This crate provides the foundational abstractions shared by every provider:
//!
//! - [`Provider`](provider::Provider) - Base trait for all providers
//! - capability traits, one per financial concept, e.g.
//!   [`EquityPriceProvider`](provider::EquityPriceProvider)
//! - [`RecordVariant`](alias::RecordVariant) - Alias tables mapping raw rows to canonical records
//! - [`Response`](response::Response) - The normalized response envelope
//! - [`Table`](table::Table) - Tabular view of a response
//! - [`Transport`](transport::Transport) - HTTP seam

/// Alias tables and the record building pipeline.
pub mod alias;
/// Error types for data operations.
pub mod error;
/// Bar interval and reporting period definitions.
pub mod frequency;
/// Field parsers and lenient serde helpers.
pub mod parse;
/// Provider traits for fetching market data.
pub mod provider;
/// Canonical, provider-agnostic records.
pub mod records;
/// The response envelope.
pub mod response;
/// Tabular conversion of responses.
pub mod table;
/// HTTP transport seam.
pub mod transport;
/// Request parameter types (Symbol, DateRange, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use alias::{FieldAlias, RawRecord, Record, RecordVariant};
pub use error::{DataError, NormalizationError, Result};
pub use frequency::{Interval, Period};
pub use provider::{
    Capability, CoveredWarrantProvider, EquityCalendarProvider, EquityDiscoveryProvider,
    EquityFundamentalProvider, EquityOwnershipProvider, EquityPriceProvider, EquityProvider,
    EtfProvider, FundsProvider, FuturesProvider, IndexPriceProvider, IndexProvider, NewsProvider,
    Provider, ProviderId,
};
pub use records::*;
pub use response::{ApiUrl, Extra, Response, Results, Series, Shape};
pub use table::Table;
pub use transport::{HttpTransport, StaticTransport, Transport};
pub use types::{DateRange, Exchange, FundType, Symbol, DEFAULT_LIMIT, DEFAULT_LOOKBACK_DAYS};
