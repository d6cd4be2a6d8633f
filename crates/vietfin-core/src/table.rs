//! Tabular conversion of responses.
//!
//! [`Results::to_table`] turns any result shape into a [`Table`], a grid of
//! JSON cells with ordered, named columns. Polars frames, `ndarray` arrays,
//! column mappings and CSV files are all derived from that table.
//!
//! The conversion is a strict pipeline:
//!
//! 1. empty results fail with [`DataError::EmptyData`];
//! 2. an already tabular result is returned as is;
//! 3. multi-series results become one sub-table per series, merged side by
//!    side with `series.field` column names in insertion order;
//! 4. record sequences become one row per record in field order, with the
//!    index hint moved to the front;
//! 5. untyped values and mappings go through a generic conversion, falling
//!    back to a one-row table for a mapping of mismatched shapes, take the
//!    index hint when they have that column, and have their other columns
//!    sorted alphabetically;
//! 6. columns that are null in every row are dropped;
//! 7. rows are sorted by `sort_by` when that column exists.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use ndarray::Array2;
use polars::prelude::*;
use serde::Serialize;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use crate::error::{DataError, NormalizationError, Result};
use crate::response::{Response, Results, Series};

/// Index column used by record sequences unless told otherwise.
pub const DEFAULT_INDEX: &str = "date";

/// Name of the positional or inner-key index column.
pub const INDEX_COLUMN: &str = "index";

type Conversion<T> = std::result::Result<T, NormalizationError>;

/// A grid of JSON cells with ordered, named columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<(String, Vec<Value>)>,
    index: Option<String>,
}

impl Table {
    /// Builds a table from columns of equal length.
    pub fn new(columns: Vec<(String, Vec<Value>)>, index: Option<String>) -> Result<Self> {
        Ok(Self::checked(columns, index)?)
    }

    fn checked(columns: Vec<(String, Vec<Value>)>, index: Option<String>) -> Conversion<Self> {
        if let Some((first, rest)) = columns.split_first() {
            let height = first.1.len();
            if let Some((name, _)) = rest.iter().find(|(_, c)| c.len() != height) {
                return Err(NormalizationError::Value(format!(
                    "column {name} does not have {height} rows"
                )));
            }
        }
        if let Some(index) = &index {
            if !columns.iter().any(|(name, _)| name == index) {
                return Err(NormalizationError::Value(format!(
                    "index column {index} is missing"
                )));
            }
        }
        Ok(Self { columns, index })
    }

    /// Builds a table from object rows; columns appear in first-seen order.
    fn from_rows(rows: &[Map<String, Value>]) -> Self {
        let mut names: Vec<&String> = Vec::new();
        for row in rows {
            for key in row.keys() {
                if !names.contains(&key) {
                    names.push(key);
                }
            }
        }
        let columns = names
            .into_iter()
            .map(|name| {
                let cells = rows
                    .iter()
                    .map(|row| row.get(name).cloned().unwrap_or(Value::Null))
                    .collect();
                (name.clone(), cells)
            })
            .collect();
        Self {
            columns,
            index: None,
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.columns.first().map_or(0, |(_, c)| c.len())
    }

    /// Number of columns, index included.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Cells of one column.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.as_slice())
    }

    /// Name of the index column, if any.
    #[must_use]
    pub fn index(&self) -> Option<&str> {
        self.index.as_deref()
    }

    /// Row `i` as a mapping.
    #[must_use]
    pub fn row(&self, i: usize) -> Option<Map<String, Value>> {
        (i < self.height()).then(|| {
            self.columns
                .iter()
                .map(|(name, cells)| (name.clone(), cells[i].clone()))
                .collect()
        })
    }

    fn set_index(&mut self, name: &str) {
        if let Some(pos) = self.columns.iter().position(|(n, _)| n == name) {
            let column = self.columns.remove(pos);
            self.columns.insert(0, column);
            self.index = Some(name.to_string());
        }
    }

    fn sort_columns(&mut self) {
        let index = self.index.clone();
        self.columns.sort_by(|(a, _), (b, _)| {
            let a_index = index.as_deref() == Some(a.as_str());
            let b_index = index.as_deref() == Some(b.as_str());
            b_index.cmp(&a_index).then_with(|| a.cmp(b))
        });
    }

    fn drop_null_columns(&mut self) {
        let index = self.index.clone();
        self.columns.retain(|(name, cells)| {
            index.as_deref() == Some(name.as_str()) || cells.iter().any(|v| !v.is_null())
        });
    }

    fn sort_rows_by(&mut self, name: &str) {
        let Some(keys) = self.column(name) else {
            return;
        };
        let mut order: Vec<usize> = (0..keys.len()).collect();
        order.sort_by(|&a, &b| compare_cells(&keys[a], &keys[b]));
        for (_, cells) in &mut self.columns {
            let sorted: Vec<Value> = order.iter().map(|&i| cells[i].clone()).collect();
            *cells = sorted;
        }
    }

    fn with_positional_index(&self) -> Self {
        if self.index.is_some() {
            return self.clone();
        }
        let positions = (0..self.height()).map(Value::from).collect();
        let mut columns = Vec::with_capacity(self.width() + 1);
        columns.push((INDEX_COLUMN.to_string(), positions));
        columns.extend(self.columns.iter().cloned());
        Self {
            columns,
            index: Some(INDEX_COLUMN.to_string()),
        }
    }

    /// Swaps rows and columns: index values become column names and the old
    /// column names land in an `index` column.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let (labels, data): (Vec<String>, Vec<&(String, Vec<Value>)>) = match &self.index {
            Some(index) => (
                self.column(index)
                    .unwrap_or_default()
                    .iter()
                    .map(cell_label)
                    .collect(),
                self.columns.iter().filter(|(n, _)| n != index).collect(),
            ),
            None => (
                (0..self.height()).map(|i| i.to_string()).collect(),
                self.columns.iter().collect(),
            ),
        };
        let mut columns = vec![(
            INDEX_COLUMN.to_string(),
            data.iter().map(|(name, _)| Value::from(name.as_str())).collect(),
        )];
        for (i, label) in labels.into_iter().enumerate() {
            columns.push((label, data.iter().map(|(_, c)| c[i].clone()).collect()));
        }
        Self {
            columns,
            index: Some(INDEX_COLUMN.to_string()),
        }
    }

    /// Converts to a polars frame, inferring one dtype per column.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let columns = self
            .columns
            .iter()
            .map(|(name, cells)| infer_column(name, cells))
            .collect::<Conversion<Vec<Column>>>()?;
        Ok(DataFrame::new(columns).map_err(NormalizationError::from)?)
    }

    /// Converts to a 2-D array, index column first. Tables without an index
    /// get a positional one.
    pub fn to_array(&self) -> Result<Array2<Value>> {
        let table = self.with_positional_index();
        let (height, width) = (table.height(), table.width());
        let cells = (0..height)
            .flat_map(|i| table.columns.iter().map(move |(_, c)| c[i].clone()))
            .collect();
        Ok(Array2::from_shape_vec((height, width), cells)
            .map_err(|e| NormalizationError::Value(e.to_string()))?)
    }

    /// Converts to a column name to cell list mapping, without the `index` column.
    #[must_use]
    pub fn to_mapping(&self) -> Map<String, Value> {
        self.columns
            .iter()
            .filter(|(name, _)| name != INDEX_COLUMN)
            .map(|(name, cells)| (name.clone(), Value::Array(cells.clone())))
            .collect()
    }

    /// Writes the table, index included, as CSV. A positional index is
    /// written under an empty header.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut table = self.with_positional_index();
        if self.index.is_none() {
            if let Some((name, _)) = table.columns.first_mut() {
                name.clear();
            }
        }
        let mut frame = table.to_frame()?;
        let mut file = File::create(path).map_err(NormalizationError::from)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut frame)
            .map_err(NormalizationError::from)?;
        Ok(())
    }
}

impl<T: Serialize> Results<T> {
    /// Converts the results to a table.
    ///
    /// `index` names the index field of record sequences (default `date`);
    /// `sort_by` sorts rows ascending when that column exists, nulls last.
    pub fn to_table(&self, index: Option<&str>, sort_by: Option<&str>) -> Result<Table> {
        if self.is_empty() {
            return Err(DataError::empty());
        }
        let index = index.unwrap_or(DEFAULT_INDEX);
        let mut table = match self {
            Self::Table(table) => return Ok(table.clone()),
            Self::MultiSeries(series) => multi_series_table(series, index)?,
            Self::Records(records) => records_table(records, index)?,
            Self::Values(values) => {
                let mut table = values_table(values)?;
                apply_index(&mut table, index);
                table.sort_columns();
                table
            }
            Self::Mapping(map) => {
                let mut table = mapping_table(map);
                apply_index(&mut table, index);
                table.sort_columns();
                table
            }
        };
        table.drop_null_columns();
        if let Some(column) = sort_by {
            table.sort_rows_by(column);
        }
        Ok(table)
    }

    fn is_mapping_of_mappings(&self) -> bool {
        matches!(self, Self::Mapping(map) if !map.is_empty() && map.values().all(Value::is_object))
    }
}

impl<T: Serialize> Response<T> {
    /// See [`Results::to_table`].
    pub fn to_table(&self, index: Option<&str>, sort_by: Option<&str>) -> Result<Table> {
        self.results.to_table(index, sort_by)
    }

    /// The table as a polars frame.
    pub fn to_frame(&self, index: Option<&str>, sort_by: Option<&str>) -> Result<DataFrame> {
        self.to_table(index, sort_by)?.to_frame()
    }

    /// The table as a 2-D array, index column first.
    pub fn to_array(&self, index: Option<&str>, sort_by: Option<&str>) -> Result<Array2<Value>> {
        self.to_table(index, sort_by)?.to_array()
    }

    /// The table as column name to cell list. A mapping of mappings is
    /// transposed first, so its inner keys become the columns.
    pub fn to_mapping(&self, index: Option<&str>, sort_by: Option<&str>) -> Result<Map<String, Value>> {
        let table = self.to_table(index, sort_by)?;
        if self.results.is_mapping_of_mappings() {
            Ok(table.transpose().to_mapping())
        } else {
            Ok(table.to_mapping())
        }
    }

    /// Writes the table as CSV.
    pub fn to_csv(
        &self,
        path: impl AsRef<Path>,
        index: Option<&str>,
        sort_by: Option<&str>,
    ) -> Result<()> {
        self.to_table(index, sort_by)?.write_csv(path)
    }
}

fn records_table<T: Serialize>(records: &[T], index: &str) -> Conversion<Table> {
    let rows = records
        .iter()
        .map(|record| match serde_json::to_value(record) {
            Ok(Value::Object(row)) => Ok(row),
            Ok(other) => Err(NormalizationError::Type(format!(
                "record serialized to {other} instead of an object"
            ))),
            Err(e) => Err(NormalizationError::Type(e.to_string())),
        })
        .collect::<Conversion<Vec<_>>>()?;
    let mut table = Table::from_rows(&rows);
    apply_index(&mut table, index);
    Ok(table)
}

/// Moves `index` to the front when the table has it. A date index also
/// orders the rows.
fn apply_index(table: &mut Table, index: &str) {
    table.set_index(index);
    if table.index() == Some(DEFAULT_INDEX) {
        table.sort_rows_by(DEFAULT_INDEX);
    }
}

fn values_table(values: &[Value]) -> Conversion<Table> {
    if values.iter().all(Value::is_object) {
        let rows: Vec<Map<String, Value>> =
            values.iter().filter_map(|v| v.as_object().cloned()).collect();
        return Ok(Table::from_rows(&rows));
    }
    if values.iter().all(Value::is_array) {
        let width = values
            .iter()
            .filter_map(Value::as_array)
            .map(Vec::len)
            .max()
            .unwrap_or(0);
        let columns = (0..width)
            .map(|j| {
                let cells = values
                    .iter()
                    .map(|row| row.get(j).cloned().unwrap_or(Value::Null))
                    .collect();
                (j.to_string(), cells)
            })
            .collect();
        return Table::checked(columns, None);
    }
    if values.iter().all(|v| !v.is_object() && !v.is_array()) {
        return Table::checked(vec![("0".to_string(), values.to_vec())], None);
    }
    Err(NormalizationError::Value(
        "rows mix objects, sequences and primitives".to_string(),
    ))
}

fn mapping_table(map: &Map<String, Value>) -> Table {
    let arrays: Option<Vec<(&String, &Vec<Value>)>> = map
        .iter()
        .map(|(k, v)| v.as_array().map(|a| (k, a)))
        .collect();
    if let Some(arrays) = arrays {
        let columns = arrays
            .into_iter()
            .map(|(k, a)| (k.clone(), a.clone()))
            .collect();
        if let Ok(table) = Table::checked(columns, None) {
            return table;
        }
        return one_row(map);
    }

    let objects: Option<Vec<(&String, &Map<String, Value>)>> = map
        .iter()
        .map(|(k, v)| v.as_object().map(|o| (k, o)))
        .collect();
    if let Some(objects) = objects {
        let mut keys: Vec<&String> = Vec::new();
        for (_, inner) in &objects {
            for key in inner.keys() {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        let mut columns = vec![(
            INDEX_COLUMN.to_string(),
            keys.iter().map(|k| Value::from(k.as_str())).collect(),
        )];
        for (name, inner) in objects {
            let cells = keys
                .iter()
                .map(|k| inner.get(*k).cloned().unwrap_or(Value::Null))
                .collect();
            columns.push((name.clone(), cells));
        }
        return Table {
            columns,
            index: Some(INDEX_COLUMN.to_string()),
        };
    }

    one_row(map)
}

fn one_row(map: &Map<String, Value>) -> Table {
    Table {
        columns: map.iter().map(|(k, v)| (k.clone(), vec![v.clone()])).collect(),
        index: None,
    }
}

fn multi_series_table<T: Serialize>(
    series: &[(String, Series<T>)],
    index: &str,
) -> Conversion<Table> {
    let parts = series
        .iter()
        .map(|(name, s)| {
            let table = match s {
                Series::Records(records) if records.is_empty() => Table::default(),
                Series::Records(records) => records_table(records, index)?,
                Series::Other(value) => other_table(value)?,
            };
            Ok((name.as_str(), table))
        })
        .collect::<Conversion<Vec<_>>>()?;

    let shared_index = !parts.is_empty()
        && parts
            .iter()
            .all(|(_, t)| t.width() == 0 || t.index() == Some(index));
    let any_indexed = parts.iter().any(|(_, t)| t.index() == Some(index));

    if shared_index && any_indexed {
        Ok(join_on_index(&parts, index))
    } else {
        Ok(side_by_side(&parts))
    }
}

fn other_table(value: &Value) -> Conversion<Table> {
    match value {
        Value::Array(values) if values.is_empty() => Ok(Table::default()),
        Value::Array(values) => values_table(values),
        Value::Object(map) => Ok(mapping_table(map)),
        scalar => Table::checked(vec![("0".to_string(), vec![scalar.clone()])], None),
    }
}

fn join_on_index(parts: &[(&str, Table)], index: &str) -> Table {
    let mut keys: Vec<Value> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for (_, table) in parts {
        for key in table.column(index).unwrap_or_default() {
            let label = cell_label(key);
            if !positions.contains_key(&label) {
                positions.insert(label, keys.len());
                keys.push(key.clone());
            }
        }
    }

    let mut columns = vec![(index.to_string(), keys.clone())];
    for (name, table) in parts {
        let table_keys = table.column(index).unwrap_or_default();
        for (field, cells) in table.columns.iter().filter(|(n, _)| n != index) {
            let mut merged = vec![Value::Null; keys.len()];
            for (key, cell) in table_keys.iter().zip(cells) {
                if let Some(&row) = positions.get(&cell_label(key)) {
                    merged[row] = cell.clone();
                }
            }
            columns.push((format!("{name}.{field}"), merged));
        }
    }

    let mut table = Table {
        columns,
        index: Some(index.to_string()),
    };
    table.sort_rows_by(index);
    table
}

fn side_by_side(parts: &[(&str, Table)]) -> Table {
    let height = parts.iter().map(|(_, t)| t.height()).max().unwrap_or(0);
    let columns = parts
        .iter()
        .flat_map(|(name, table)| {
            table.columns.iter().map(move |(field, cells)| {
                let mut padded = cells.clone();
                padded.resize(height, Value::Null);
                (format!("{name}.{field}"), padded)
            })
        })
        .collect();
    Table {
        columns,
        index: None,
    }
}

fn cell_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Number(_) => 0,
        Value::String(_) => 1,
        Value::Bool(_) => 2,
        Value::Array(_) | Value::Object(_) => 3,
        Value::Null => 4,
    }
}

fn compare_cells(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .unwrap_or(f64::NAN)
            .total_cmp(&y.as_f64().unwrap_or(f64::NAN)),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => rank(a)
            .cmp(&rank(b))
            .then_with(|| a.to_string().cmp(&b.to_string())),
    }
}

fn epoch_days(date: NaiveDate) -> Option<i32> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    i32::try_from((date - epoch).num_days()).ok()
}

fn parse_cell_datetime(s: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.timestamp_millis())
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.and_utc().timestamp_millis())
        })
}

fn infer_column(name: &str, cells: &[Value]) -> Conversion<Column> {
    let present: Vec<&Value> = cells.iter().filter(|v| !v.is_null()).collect();
    let name = PlSmallStr::from(name);

    if !present.is_empty() && present.iter().all(|v| v.is_boolean()) {
        let data: Vec<Option<bool>> = cells.iter().map(Value::as_bool).collect();
        return Ok(Column::new(name, data));
    }
    if !present.is_empty() && present.iter().all(|v| v.is_i64()) {
        let data: Vec<Option<i64>> = cells.iter().map(Value::as_i64).collect();
        return Ok(Column::new(name, data));
    }
    if !present.is_empty() && present.iter().all(|v| v.is_number()) {
        let data: Vec<Option<f64>> = cells.iter().map(Value::as_f64).collect();
        return Ok(Column::new(name, data));
    }

    let strings: Option<Vec<&str>> = present.iter().map(|v| v.as_str()).collect();
    if let Some(strings) = strings.filter(|s| !s.is_empty()) {
        let is_date = |s: &str| s.len() == 10 && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok();
        if strings.iter().all(|s| is_date(s)) {
            let days: Vec<Option<i32>> = cells
                .iter()
                .map(|v| {
                    v.as_str()
                        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
                        .and_then(epoch_days)
                })
                .collect();
            return Ok(Column::new(name, days).cast(&DataType::Date)?);
        }
        if strings.iter().all(|s| parse_cell_datetime(s).is_some()) {
            let millis: Vec<Option<i64>> = cells
                .iter()
                .map(|v| v.as_str().and_then(parse_cell_datetime))
                .collect();
            return Ok(Column::new(name, millis)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?);
        }
    }

    let text: Vec<Option<String>> = cells
        .iter()
        .map(|v| match v {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
        .collect();
    Ok(Column::new(name, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderId;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Clone, Debug, Serialize)]
    struct Bar {
        date: String,
        close: f64,
        note: Option<String>,
    }

    fn bar(date: &str, close: f64) -> Bar {
        Bar {
            date: date.to_string(),
            close,
            note: None,
        }
    }

    fn names(table: &Table) -> Vec<&str> {
        table.column_names().collect()
    }

    #[test]
    fn test_records_keep_field_order_and_drop_null_columns() {
        let results = Results::Records(vec![bar("2024-01-03", 2.0), bar("2024-01-02", 1.0)]);
        let table = results.to_table(None, None).unwrap();
        assert_eq!(names(&table), vec!["date", "close"]);
        assert_eq!(table.index(), Some("date"));
        assert_eq!(table.height(), 2);
        assert_eq!(table.column("close").unwrap(), &[json!(1.0), json!(2.0)]);
    }

    #[test]
    fn test_records_conversion_is_idempotent() {
        let results = Results::Records(vec![bar("2024-01-02", 1.0), bar("2024-01-03", 2.0)]);
        let first = results.to_table(None, Some("close")).unwrap();
        let second = results.to_table(None, Some("close")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sort_by_is_a_permutation() {
        let rows = vec![
            json!({"symbol": "VNM", "price": 70.5}),
            json!({"symbol": "FPT", "price": null}),
            json!({"symbol": "HPG", "price": 25.1}),
        ];
        let results = Results::Records(rows);
        let table = results.to_table(Some("symbol"), Some("price")).unwrap();
        assert_eq!(
            table.column("symbol").unwrap(),
            &[json!("HPG"), json!("VNM"), json!("FPT")]
        );
        assert_eq!(table.height(), 3);
    }

    #[test]
    fn test_missing_sort_column_is_ignored() {
        let results = Results::Records(vec![bar("2024-01-02", 1.0)]);
        let table = results.to_table(None, Some("volume")).unwrap();
        assert_eq!(table.height(), 1);
    }

    #[test]
    fn test_empty_results_fail() {
        let results = Results::<Bar>::Records(vec![]);
        assert!(matches!(
            results.to_table(None, None),
            Err(DataError::EmptyData(_))
        ));
    }

    #[test]
    fn test_multi_series_columns_follow_insertion_order() {
        let results = Results::MultiSeries(vec![
            (
                "equity".to_string(),
                Series::Records(vec![
                    json!({"stock_code": "FPT", "weight": 8.1}),
                    json!({"stock_code": "MWG", "weight": 6.0}),
                ]),
            ),
            (
                "bond".to_string(),
                Series::Records(vec![json!({"stock_code": "VIC12301", "weight": 3.2})]),
            ),
        ]);
        let table = results.to_table(None, None).unwrap();
        assert_eq!(
            names(&table),
            vec!["equity.stock_code", "equity.weight", "bond.stock_code", "bond.weight"]
        );
        assert_eq!(table.height(), 2);
        assert_eq!(table.column("bond.weight").unwrap()[1], Value::Null);
    }

    #[test]
    fn test_multi_series_joins_on_shared_index() {
        let results = Results::MultiSeries(vec![
            (
                "vnm".to_string(),
                Series::Records(vec![
                    json!({"date": "2024-01-02", "close": 70.0}),
                    json!({"date": "2024-01-03", "close": 71.0}),
                ]),
            ),
            (
                "fpt".to_string(),
                Series::Records(vec![json!({"date": "2024-01-03", "close": 95.0})]),
            ),
        ]);
        let table = results.to_table(None, None).unwrap();
        assert_eq!(names(&table), vec!["date", "vnm.close", "fpt.close"]);
        assert_eq!(table.column("fpt.close").unwrap(), &[Value::Null, json!(95.0)]);
    }

    #[test]
    fn test_mapping_of_scalars_is_one_row_sorted() {
        let results = Results::<Value>::Mapping(
            json!({"b": 2, "a": 1, "c": null}).as_object().cloned().unwrap(),
        );
        let table = results.to_table(None, None).unwrap();
        assert_eq!(names(&table), vec!["a", "b"]);
        assert_eq!(table.height(), 1);
    }

    #[test]
    fn test_mapping_of_uneven_arrays_falls_back_to_one_row() {
        let results = Results::<Value>::Mapping(
            json!({"a": [1, 2], "b": [3]}).as_object().cloned().unwrap(),
        );
        let table = results.to_table(None, None).unwrap();
        assert_eq!(table.height(), 1);
        assert_eq!(table.column("a").unwrap(), &[json!([1, 2])]);
    }

    #[test]
    fn test_values_of_arrays_use_positional_columns() {
        let results = Results::<Value>::Values(vec![json!([1, "x"]), json!([2, "y"])]);
        let table = results.to_table(None, None).unwrap();
        assert_eq!(names(&table), vec!["0", "1"]);
        assert_eq!(table.height(), 2);
    }

    #[test]
    fn test_mixed_values_are_a_value_error() {
        let results = Results::<Value>::Values(vec![json!({"a": 1}), json!(3)]);
        let err = results.to_table(None, None).unwrap_err();
        assert!(err.to_string().starts_with("ValueError:"));
    }

    #[test]
    fn test_mapping_of_mappings_is_transposed() {
        let results = Results::<Value>::Mapping(
            json!({"VNM": {"pe": 15.0, "pb": 4.1}, "FPT": {"pe": 20.0, "pb": 5.0}})
                .as_object()
                .cloned()
                .unwrap(),
        );
        let response = Response::new(ProviderId::Tcbs, results, Value::Null).unwrap();
        let mapping = response.to_mapping(None, None).unwrap();
        assert_eq!(mapping["pe"], json!([20.0, 15.0]));
        assert!(mapping.get("index").is_none());
    }

    #[test]
    fn test_array_has_positional_index() {
        let results = Results::<Value>::Values(vec![json!({"a": 1}), json!({"a": 2})]);
        let table = results.to_table(None, None).unwrap();
        let array = table.to_array().unwrap();
        assert_eq!(array.dim(), (2, 2));
        assert_eq!(array[[1, 0]], json!(1));
        assert_eq!(array[[1, 1]], json!(2));
    }

    #[test]
    fn test_frame_dtypes() {
        let results = Results::Records(vec![
            json!({"date": "2024-01-02", "volume": 10, "close": 1.5, "at": "2024-01-02T09:15:00Z", "code": "A"}),
            json!({"date": "2024-01-03", "volume": null, "close": 2, "at": "2024-01-03T09:15:00Z", "code": "B"}),
        ]);
        let frame = results.to_table(None, None).unwrap().to_frame().unwrap();
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.column("date").unwrap().dtype(), &DataType::Date);
        assert_eq!(frame.column("volume").unwrap().dtype(), &DataType::Int64);
        assert_eq!(frame.column("close").unwrap().dtype(), &DataType::Float64);
        assert_eq!(
            frame.column("at").unwrap().dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
        assert_eq!(frame.column("code").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_csv_written_with_header() {
        let results = Results::Records(vec![json!({"date": "2024-01-02", "close": 1.5})]);
        let response = Response::new(ProviderId::Dnse, results, Value::Null).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        response.to_csv(&path, None, None).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("date,close"));
    }

    #[test]
    fn test_csv_positional_index_has_empty_header() {
        let results = Results::<Value>::Values(vec![json!({"b": 1, "a": "x"}), json!({"b": 2, "a": "y"})]);
        let response = Response::new(ProviderId::Fmarket, results, Value::Null).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.csv");
        response.to_csv(&path, None, None).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![",a,b", "0,x,1", "1,y,2"]);
    }

    #[test]
    fn test_values_take_index_hint() {
        let results = Results::<Value>::Values(vec![
            json!({"name": "B", "code": "SSISCA"}),
            json!({"name": "A", "code": "DCDS"}),
        ]);
        let table = results.to_table(Some("code"), None).unwrap();
        assert_eq!(table.index(), Some("code"));
        assert_eq!(names(&table), vec!["code", "name"]);

        let unhinted = results.to_table(Some("missing"), None).unwrap();
        assert_eq!(unhinted.index(), None);
        assert_eq!(names(&unhinted), vec!["code", "name"]);
    }

    #[test]
    fn test_mapping_takes_date_index_and_orders_rows() {
        let results = Results::<Value>::Mapping(
            json!({"close": [2.0, 1.0], "date": ["2024-01-03", "2024-01-02"]})
                .as_object()
                .cloned()
                .unwrap(),
        );
        let table = results.to_table(None, None).unwrap();
        assert_eq!(table.index(), Some("date"));
        assert_eq!(names(&table), vec!["date", "close"]);
        assert_eq!(table.column("close").unwrap(), &[json!(1.0), json!(2.0)]);
    }

    #[test]
    fn test_table_new_rejects_ragged_columns() {
        let err = Table::new(
            vec![("a".into(), vec![json!(1)]), ("b".into(), vec![])],
            None,
        )
        .unwrap_err();
        assert!(matches!(err, DataError::Normalization(NormalizationError::Value(_))));
    }
}
