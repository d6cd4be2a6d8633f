//! Financial statement workbooks served by `fiin-fundamental`.
//!
//! The first worksheet holds a title block, then a header row of fiscal
//! periods with the line item labels in the first column, then the line items
//! and a short footer.

use std::io::Cursor;
use std::sync::LazyLock;

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use regex::Regex;
use serde_json::{Map, Value, json};
use vietfin_core::{DataError, Period, Result};

/// Rows above the header row.
const TITLE_ROWS: u32 = 7;

/// Rows below the last line item.
const FOOTER_ROWS: u32 = 3;

/// Header labels of period columns: `2023` or `Q4 2023`.
static FISCAL_PERIOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(Q\d{1,2}\s)?\d{4}$").expect("Invalid regex pattern"));

/// Opens the first worksheet of a downloaded workbook.
pub fn first_sheet(bytes: Vec<u8>) -> Result<Range<Data>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| DataError::Parse(format!("statement workbook: {e}")))?;
    workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DataError::Parse("statement workbook has no worksheet".to_string()))?
        .map_err(|e| DataError::Parse(format!("statement workbook: {e}")))
}

/// Unpivots a statement sheet into one row per (period column, line item),
/// grouped by period column.
///
/// Every output row carries `ITEMS`, `period`, `fiscal_period` and `values`.
/// Columns whose header is not a fiscal period and rows without a label are
/// skipped.
#[must_use]
pub fn melt_sheet(sheet: &Range<Data>, period: Period) -> Vec<Value> {
    let (Some((_, label_col)), Some((last_row, last_col))) = (sheet.start(), sheet.end()) else {
        return Vec::new();
    };
    let first_item = TITLE_ROWS + 1;
    if last_row < first_item + FOOTER_ROWS {
        return Vec::new();
    }
    let last_item = last_row - FOOTER_ROWS;

    let periods: Vec<(u32, String)> = (label_col + 1..=last_col)
        .filter_map(|col| {
            let label = cell_text(sheet.get_value((TITLE_ROWS, col)))?;
            FISCAL_PERIOD.is_match(&label).then_some((col, label))
        })
        .collect();
    let items: Vec<(u32, String)> = (first_item..=last_item)
        .filter_map(|row| cell_text(sheet.get_value((row, label_col))).map(|label| (row, label)))
        .collect();

    periods
        .iter()
        .flat_map(|(col, fiscal_period)| {
            items.iter().map(move |(row, item)| {
                let mut melted = Map::new();
                melted.insert("ITEMS".to_string(), json!(item));
                melted.insert("period".to_string(), json!(period.as_str()));
                melted.insert("fiscal_period".to_string(), json!(fiscal_period));
                melted.insert(
                    "values".to_string(),
                    cell_number(sheet.get_value((*row, *col))),
                );
                Value::Object(melted)
            })
        })
        .collect()
}

/// The whole sheet as an array of rows, kept as the raw payload.
#[must_use]
pub fn sheet_json(sheet: &Range<Data>) -> Value {
    sheet
        .rows()
        .map(|row| Value::Array(row.iter().map(cell_value).collect()))
        .collect()
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::Int(i) => json!(i),
        Data::Float(f) => json!(f),
        Data::Bool(b) => json!(b),
        Data::String(s) => json!(s),
        other => json!(other.to_string()),
    }
}

fn cell_text(cell: Option<&Data>) -> Option<String> {
    let text = match cell? {
        Data::String(s) | Data::DateTimeIso(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{f:.0}"),
        Data::Float(f) => f.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn cell_number(cell: Option<&Data>) -> Value {
    match cell {
        Some(Data::Int(i)) => json!(i),
        Some(Data::Float(f)) => json!(f),
        Some(Data::String(s)) => s
            .trim()
            .replace(',', "")
            .parse::<f64>()
            .map_or(Value::Null, |v| json!(v)),
        _ => Value::Null,
    }
}
