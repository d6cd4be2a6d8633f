#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/vietfin/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Unified access to Vietnamese financial market data.
//!
//! This crate re-exports the core types and the provider implementations,
//! and adds a [`ProviderRegistry`] mapping each capability to its providers
//! plus one facade per financial concept behind the [`VietFin`] entry point.
//!
//! # Features
//!
//! - `tcbs` - Techcom Securities: prices, ownership, fundamentals, news
//! - `ssi` - SSI Securities: catalogs, movers, derivatives, ETF bars, statements
//! - `dnse` - DNSE: intraday and daily bars
//! - `fmarket` - Fmarket: mutual funds
//! - `vndirect` - VNDIRECT: top movers
//! - `cafef` - CafeF: foreign and proprietary trading
//! - `wifeed` - WiFeed: listed company search
//! - `vdsc` - Rong Viet Securities: intraday futures board
//!
//! `default` and `full` enable all of them.
//!
//! # Example
//!
//! ```rust,no_run
//! use vietfin::{Period, VietFin};
//!
//! #[tokio::main]
//! async fn main() -> vietfin::Result<()> {
//!     let vf = VietFin::new();
//!
//!     let income = vf.equity().fundamental().income("FPT", Period::Quarter).await?;
//!     println!("{income}");
//!
//!     let holdings = vf.funds().holdings("DCDS").await?;
//!     let table = holdings.to_table(None, None)?;
//!     println!("{:?}", table.column_names().collect::<Vec<_>>());
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use vietfin_core::*;

// Providers
#[cfg(feature = "cafef")]
pub use vietfin_cafef::CafefProvider;
#[cfg(feature = "dnse")]
pub use vietfin_dnse::DnseProvider;
#[cfg(feature = "fmarket")]
pub use vietfin_fmarket::FmarketProvider;
#[cfg(feature = "ssi")]
pub use vietfin_ssi::SsiProvider;
#[cfg(feature = "tcbs")]
pub use vietfin_tcbs::TcbsProvider;
#[cfg(feature = "vdsc")]
pub use vietfin_vdsc::VdscProvider;
#[cfg(feature = "vndirect")]
pub use vietfin_vndirect::VndirectProvider;
#[cfg(feature = "wifeed")]
pub use vietfin_wifeed::WifeedProvider;

mod client;
pub mod facade;
mod registry;

pub use client::VietFin;
pub use registry::ProviderRegistry;
