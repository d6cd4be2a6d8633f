//! The response envelope returned by every provider operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{DataError, Result};
use crate::provider::ProviderId;
use crate::table::Table;
use crate::types::Symbol;

/// One named series of a multi-series result.
#[derive(Clone, Debug, PartialEq)]
pub enum Series<T> {
    /// Canonical records.
    Records(Vec<T>),
    /// Any other nested structure.
    Other(Value),
}

impl<T> Series<T> {
    fn len(&self) -> usize {
        match self {
            Self::Records(records) => records.len(),
            Self::Other(Value::Array(values)) => values.len(),
            Self::Other(Value::Object(map)) => map.len(),
            Self::Other(Value::Null) => 0,
            Self::Other(_) => 1,
        }
    }
}

/// Shape of a result payload, deciding how it becomes a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Several named series returned together.
    MultiSeries,
    /// A flat sequence of records.
    Records,
    /// A sequence of primitives or of sequences.
    Values,
    /// A single mapping.
    Mapping,
    /// Already tabular.
    Table,
}

/// The payload of a [`Response`].
#[derive(Clone, Debug, PartialEq)]
pub enum Results<T> {
    /// A flat sequence of records.
    Records(Vec<T>),
    /// Named series in insertion order, e.g. a fund's equity and bond holdings.
    MultiSeries(Vec<(String, Series<T>)>),
    /// A sequence of untyped values.
    Values(Vec<Value>),
    /// A single untyped mapping.
    Mapping(Map<String, Value>),
    /// An already tabular result.
    Table(Table),
}

impl<T> Results<T> {
    /// Classifies the payload.
    #[must_use]
    pub const fn shape(&self) -> Shape {
        match self {
            Self::Records(_) => Shape::Records,
            Self::MultiSeries(_) => Shape::MultiSeries,
            Self::Values(_) => Shape::Values,
            Self::Mapping(_) => Shape::Mapping,
            Self::Table(_) => Shape::Table,
        }
    }

    /// Number of records. Multi-series results count the records of every series.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Records(records) => records.len(),
            Self::MultiSeries(series) => series.iter().map(|(_, s)| s.len()).sum(),
            Self::Values(values) => values.len(),
            Self::Mapping(map) => map.len(),
            Self::Table(table) => table.height(),
        }
    }

    /// Returns true when there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Results<Value> {
    /// Builds an untyped result from arbitrary JSON.
    ///
    /// A one-element array holding a mapping of nested structures is read as
    /// multi-series; arrays of objects are records; other arrays are values;
    /// objects are mappings. A lone scalar becomes a one-element value list.
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match (classify(&value), value) {
            (Shape::MultiSeries, Value::Array(mut items)) => match items.pop() {
                Some(Value::Object(map)) => Self::MultiSeries(
                    map.into_iter()
                        .map(|(name, value)| (name, series_of(value)))
                        .collect(),
                ),
                _ => Self::Values(Vec::new()),
            },
            (Shape::Records, Value::Array(items)) => Self::Records(items),
            (Shape::Mapping, Value::Object(map)) => Self::Mapping(map),
            (_, Value::Array(items)) => Self::Values(items),
            (_, Value::Null) => Self::Values(Vec::new()),
            (_, other) => Self::Values(vec![other]),
        }
    }
}

fn series_of(value: Value) -> Series<Value> {
    match value {
        Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
            Series::Records(items)
        }
        other => Series::Other(other),
    }
}

/// Classifies raw JSON the way [`Results::from_json`] does.
#[must_use]
pub fn classify(value: &Value) -> Shape {
    match value {
        Value::Array(items) => match items.as_slice() {
            [Value::Object(map)]
                if !map.is_empty()
                    && map.values().all(|v| v.is_array() || v.is_object()) =>
            {
                Shape::MultiSeries
            }
            [] => Shape::Values,
            _ if items.iter().all(Value::is_object) => Shape::Records,
            _ => Shape::Values,
        },
        Value::Object(_) => Shape::Mapping,
        _ => Shape::Values,
    }
}

/// One or several upstream URLs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiUrl {
    /// A single request.
    One(String),
    /// Several requests, e.g. one per page.
    Many(Vec<String>),
}

impl From<String> for ApiUrl {
    fn from(url: String) -> Self {
        Self::One(url)
    }
}

impl From<&str> for ApiUrl {
    fn from(url: &str) -> Self {
        Self::One(url.to_string())
    }
}

impl From<Vec<String>> for ApiUrl {
    fn from(mut urls: Vec<String>) -> Self {
        if urls.len() == 1 {
            Self::One(urls.remove(0))
        } else {
            Self::Many(urls)
        }
    }
}

/// Run metadata attached to a [`Response`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extra {
    /// Number of records returned.
    pub records_count: usize,
    /// When the response was built.
    pub command_run_at: DateTime<Utc>,
    /// Requested symbol, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Upstream URL(s) consulted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<ApiUrl>,
}

/// Normalized response of a provider operation.
///
/// A response always holds at least one record: constructing an empty one
/// fails with [`DataError::EmptyData`].
#[derive(Clone, Debug, PartialEq)]
pub struct Response<T> {
    /// Normalized payload.
    pub results: Results<T>,
    /// Registry key of the provider that produced it.
    pub provider: String,
    /// Run metadata.
    pub extra: Extra,
    /// Untransformed upstream payload(s).
    pub raw_data: Value,
}

impl<T> Response<T> {
    /// Wraps `results`, failing when they are empty.
    pub fn new(provider: ProviderId, results: Results<T>, raw_data: Value) -> Result<Self> {
        if results.is_empty() {
            return Err(DataError::empty());
        }
        Ok(Self {
            extra: Extra {
                records_count: results.len(),
                command_run_at: Utc::now(),
                symbol: None,
                api_url: None,
            },
            results,
            provider: provider.as_str().to_string(),
            raw_data,
        })
    }

    /// Wraps a flat list of records, failing when it is empty.
    pub fn from_records(provider: ProviderId, records: Vec<T>, raw_data: Value) -> Result<Self> {
        Self::new(provider, Results::Records(records), raw_data)
    }

    /// Records the requested symbol. An empty symbol records nothing.
    #[must_use]
    pub fn with_symbol(mut self, symbol: &Symbol) -> Self {
        if !symbol.is_empty() {
            self.extra.symbol = Some(symbol.to_string());
        }
        self
    }

    /// Records the upstream URL(s).
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<ApiUrl>) -> Self {
        self.extra.api_url = Some(url.into());
        self
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Always false for a constructed response.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Iterates over the records of every series.
    pub fn records(&self) -> impl Iterator<Item = &T> {
        let (flat, series): (&[T], &[(String, Series<T>)]) = match &self.results {
            Results::Records(records) => (records.as_slice(), &[]),
            Results::MultiSeries(series) => (&[], series.as_slice()),
            _ => (&[], &[]),
        };
        flat.iter().chain(series.iter().flat_map(|(_, s)| match s {
            Series::Records(records) => records.iter(),
            Series::Other(_) => <&[T]>::default().iter(),
        }))
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let head: String = text.chars().take(width).collect();
        format!("{head}...")
    }
}

impl<T> fmt::Display for Response<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let extra = serde_json::to_string(&self.extra).unwrap_or_default();
        let raw = self.raw_data.to_string();
        writeln!(f, "Response")?;
        writeln!(f, "provider: {}", self.provider)?;
        writeln!(
            f,
            "results: {:?} with {} records",
            self.results.shape(),
            self.results.len()
        )?;
        writeln!(f, "extra: {}", truncate(&extra, 100))?;
        write!(f, "raw_data: {}", truncate(&raw, 100))
    }
}
