//! Alias mapping engine.
//!
//! Every canonical record has one variant type per upstream source. A variant
//! carries an alias table of `(canonical, raw, parser)` entries. Building a
//! record runs a fixed pipeline:
//!
//! 1. [`apply_aliases`] renames raw keys to canonical names;
//! 2. per-field parsers from the table run on the renamed values;
//! 3. the variant's [`RecordVariant::pre_parse`] hook rewrites the row;
//! 4. serde coerces the row into the canonical struct, ignoring unknown keys;
//! 5. [`Record::post_parse`] applies field-level business rules.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt::Debug;

use crate::error::{DataError, Result};

/// A decoded upstream row.
pub type RawRecord = Map<String, Value>;

/// Rewrites one field value after aliasing. Errors become a schema error.
pub type FieldParser = fn(Value) -> std::result::Result<Value, String>;

/// One entry of an alias table.
#[derive(Clone, Copy)]
pub struct FieldAlias {
    /// Provider-agnostic field name.
    pub canonical: &'static str,
    /// Key used by the upstream payload.
    pub raw: &'static str,
    /// Optional value rewrite, run after renaming.
    pub parser: Option<FieldParser>,
}

impl FieldAlias {
    /// Maps `raw` to `canonical` without touching the value.
    #[must_use]
    pub const fn new(canonical: &'static str, raw: &'static str) -> Self {
        Self {
            canonical,
            raw,
            parser: None,
        }
    }

    /// Maps `raw` to `canonical` and rewrites the value with `parser`.
    #[must_use]
    pub const fn parsed(canonical: &'static str, raw: &'static str, parser: FieldParser) -> Self {
        Self {
            canonical,
            raw,
            parser: Some(parser),
        }
    }
}

impl Debug for FieldAlias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldAlias")
            .field("canonical", &self.canonical)
            .field("raw", &self.raw)
            .field("parser", &self.parser.map(|_| "fn"))
            .finish()
    }
}

/// Renames every raw key listed in `table` to its canonical name.
///
/// Keys absent from the table pass through untouched and keep their position.
/// Running it again on its own output changes nothing.
#[must_use]
pub fn apply_aliases(raw: RawRecord, table: &[FieldAlias]) -> RawRecord {
    raw.into_iter()
        .map(|(key, value)| {
            let key = table
                .iter()
                .find(|alias| alias.raw == key)
                .map_or(key, |alias| alias.canonical.to_string());
            (key, value)
        })
        .collect()
}

/// A canonical, provider-agnostic row.
pub trait Record: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// Applies field-level rules after type coercion.
    #[must_use]
    fn post_parse(self) -> Self {
        self
    }
}

/// A provider-specific way of producing a canonical [`Record`].
pub trait RecordVariant {
    /// Canonical record produced by this variant.
    type Record: Record;

    /// Variant name used in schema errors.
    const NAME: &'static str;

    /// Alias table from canonical names to raw keys.
    const ALIASES: &'static [FieldAlias];

    /// Record-level rewrite run after aliasing and field parsers.
    fn pre_parse(_row: &mut RawRecord) -> std::result::Result<(), String> {
        Ok(())
    }

    /// Runs the full pipeline on one raw row.
    fn parse(raw: RawRecord) -> Result<Self::Record> {
        let mut row = apply_aliases(raw, Self::ALIASES);
        for alias in Self::ALIASES {
            let Some(parser) = alias.parser else {
                continue;
            };
            if let Some(value) = row.get_mut(alias.canonical) {
                let parsed = parser(value.take())
                    .map_err(|e| DataError::schema(Self::NAME, format!("{}: {e}", alias.canonical)))?;
                *value = parsed;
            }
        }
        Self::pre_parse(&mut row).map_err(|e| DataError::schema(Self::NAME, e))?;
        let record: Self::Record = serde_json::from_value(Value::Object(row))
            .map_err(|e| DataError::schema(Self::NAME, e.to_string()))?;
        Ok(record.post_parse())
    }

    /// Parses a decoded JSON value that must be an object.
    fn parse_value(value: Value) -> Result<Self::Record> {
        match value {
            Value::Object(row) => Self::parse(row),
            other => Err(DataError::schema(
                Self::NAME,
                format!("expected an object, got {other}"),
            )),
        }
    }

    /// Parses every row, failing on the first bad one.
    fn parse_all<I>(rows: I) -> Result<Vec<Self::Record>>
    where
        I: IntoIterator<Item = Value>,
    {
        rows.into_iter().map(Self::parse_value).collect()
    }
}

/// Turns a column-oriented payload (`{"t": [..], "o": [..]}`) into rows.
///
/// Keys whose value is not an array are ignored. Rows stop at the shortest
/// column.
#[must_use]
pub fn columns_to_rows(payload: &Value) -> Vec<Value> {
    let Some(object) = payload.as_object() else {
        return Vec::new();
    };
    let columns: Vec<(&String, &Vec<Value>)> = object
        .iter()
        .filter_map(|(k, v)| v.as_array().map(|a| (k, a)))
        .collect();
    let height = columns.iter().map(|(_, c)| c.len()).min().unwrap_or(0);

    (0..height)
        .map(|i| {
            let row: RawRecord = columns
                .iter()
                .map(|(k, c)| ((*k).clone(), c[i].clone()))
                .collect();
            Value::Object(row)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    struct Bar {
        date: String,
        close: f64,
        volume: Option<i64>,
    }

    impl Record for Bar {}

    struct RawBar;

    fn double(v: Value) -> std::result::Result<Value, String> {
        v.as_f64()
            .map(|f| json!(f * 2.0))
            .ok_or_else(|| "not a number".to_string())
    }

    impl RecordVariant for RawBar {
        type Record = Bar;
        const NAME: &'static str = "RawBar";
        const ALIASES: &'static [FieldAlias] = &[
            FieldAlias::new("date", "t"),
            FieldAlias::parsed("close", "c", double),
            FieldAlias::new("volume", "v"),
        ];
    }

    fn raw(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_aliases_rename_and_keep_unknown_keys() {
        let out = apply_aliases(raw(json!({"t": "2024-01-02", "x": 1, "c": 5})), RawBar::ALIASES);
        let keys: Vec<&str> = out.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["date", "x", "close"]);
        assert_eq!(out["x"], json!(1));
    }

    #[test]
    fn test_aliases_are_idempotent_on_canonical_rows() {
        let canonical = raw(json!({"date": "2024-01-02", "close": 5.0, "volume": 10}));
        let once = apply_aliases(canonical.clone(), RawBar::ALIASES);
        let twice = apply_aliases(once.clone(), RawBar::ALIASES);
        assert_eq!(once, canonical);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_parse_runs_field_parser() {
        let bar = RawBar::parse(raw(json!({"t": "2024-01-02", "c": 5.5, "v": 100}))).unwrap();
        assert_eq!(bar.date, "2024-01-02");
        assert_eq!(bar.close, 11.0);
        assert_eq!(bar.volume, Some(100));
    }

    #[test]
    fn test_missing_required_field_is_schema_error() {
        let err = RawBar::parse(raw(json!({"c": 5.5}))).unwrap_err();
        match err {
            DataError::Schema { record, message } => {
                assert_eq!(record, "RawBar");
                assert!(message.contains("date"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_failing_parser_is_schema_error() {
        let err = RawBar::parse(raw(json!({"t": "2024-01-02", "c": "abc"}))).unwrap_err();
        assert!(matches!(err, DataError::Schema { .. }));
    }

    #[test]
    fn test_non_object_row_rejected() {
        assert!(RawBar::parse_value(json!([1, 2])).is_err());
    }

    #[test]
    fn test_columns_to_rows() {
        let rows = columns_to_rows(&json!({"t": [1, 2], "c": [3.0, 4.0], "s": "ok"}));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], json!({"t": 2, "c": 4.0}));
    }
}
