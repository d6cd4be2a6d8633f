//! Field parsers and lenient serde helpers used by record variants.
//!
//! Field parsers have the [`FieldParser`](crate::alias::FieldParser) shape and
//! run on canonical values right after aliasing. Null values pass through every
//! parser untouched so optional fields stay optional.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use scraper::Html;
use serde_json::{Value, json};

type ParseResult = std::result::Result<Value, String>;

fn reformat_date(value: Value, format: &str) -> ParseResult {
    match value {
        Value::Null => Ok(Value::Null),
        Value::String(s) if s.trim().is_empty() => Ok(Value::Null),
        Value::String(s) => NaiveDate::parse_from_str(s.trim(), format)
            .map(|d| json!(d.format("%Y-%m-%d").to_string()))
            .map_err(|e| format!("{s:?} does not match {format}: {e}")),
        Value::Number(n) => reformat_date(Value::String(n.to_string()), format),
        other => Err(format!("expected a date string, got {other}")),
    }
}

/// `dd/mm/YYYY` to ISO date.
pub fn date_dmy(value: Value) -> ParseResult {
    reformat_date(value, "%d/%m/%Y")
}

/// `dd/mm/yy` to ISO date.
pub fn date_dmy_short(value: Value) -> ParseResult {
    reformat_date(value, "%d/%m/%y")
}

/// `YYYYmmdd` (string or number) to ISO date.
pub fn date_compact(value: Value) -> ParseResult {
    reformat_date(value, "%Y%m%d")
}

/// Unix seconds to an RFC 3339 UTC timestamp.
pub fn epoch_seconds(value: Value) -> ParseResult {
    match value {
        Value::Null => Ok(Value::Null),
        other => {
            let secs = as_i64(&other).ok_or_else(|| format!("expected unix seconds, got {other}"))?;
            Utc.timestamp_opt(secs, 0)
                .single()
                .map(|dt| json!(dt.to_rfc3339_opts(SecondsFormat::Secs, true)))
                .ok_or_else(|| format!("timestamp {secs} is out of range"))
        }
    }
}

/// Unix milliseconds to an ISO date (UTC).
pub fn epoch_millis_date(value: Value) -> ParseResult {
    match value {
        Value::Null => Ok(Value::Null),
        other => {
            let millis =
                as_i64(&other).ok_or_else(|| format!("expected unix milliseconds, got {other}"))?;
            Utc.timestamp_millis_opt(millis)
                .single()
                .map(|dt| json!(dt.date_naive().format("%Y-%m-%d").to_string()))
                .ok_or_else(|| format!("timestamp {millis} is out of range"))
        }
    }
}

/// Multiplies a price quoted in thousands of dong back to dong.
pub fn times_thousand(value: Value) -> ParseResult {
    match value {
        Value::Null => Ok(Value::Null),
        other => as_f64(&other)
            .map(|f| json!(f * 1000.0))
            .ok_or_else(|| format!("expected a number, got {other}")),
    }
}

/// Strips HTML markup, keeping one line per text node.
pub fn html_text(value: Value) -> ParseResult {
    match value {
        Value::String(s) => Ok(json!(strip_html(&s))),
        other => Ok(other),
    }
}

/// Extracts visible text from an HTML fragment, one trimmed line per text node.
#[must_use]
pub fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drops datetimes that fall before the Unix epoch, which upstreams use as a
/// placeholder for "unknown".
#[must_use]
pub fn since_epoch(value: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    value.filter(|dt| dt.timestamp() >= 0)
}

/// Reads a JSON number or numeric string as `f64`.
#[must_use]
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

/// Reads a JSON number or numeric string as `i64`, accepting integral floats.
#[must_use]
pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => {
            let s = s.trim().replace(',', "");
            s.parse::<i64>()
                .ok()
                .or_else(|| as_i64(&json!(s.parse::<f64>().ok()?)))
        }
        _ => None,
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)).map(|n| n.and_utc())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| s.get(..10).and_then(|p| NaiveDate::parse_from_str(p, "%Y-%m-%d").ok()))
}

/// Lenient `deserialize_with` helpers.
///
/// Upstreams mix numbers and numeric strings, send `""` for missing values
/// and encode timestamps several ways. Optional helpers map null, missing
/// (with `#[serde(default)]`) and empty strings to `None`.
pub mod de {
    use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn blank(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    fn optional<'de, D, T>(
        d: D,
        read: impl FnOnce(&Value) -> Option<T>,
        what: &str,
    ) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(d)?;
        if blank(&value) {
            return Ok(None);
        }
        read(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected {what}, got {value}")))
    }

    fn required<'de, D, T>(
        d: D,
        read: impl FnOnce(&Value) -> Option<T>,
        what: &str,
    ) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
    {
        optional(d, read, what)?.ok_or_else(|| D::Error::custom(format!("missing {what}")))
    }

    fn text_of(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn datetime_of(value: &Value) -> Option<DateTime<Utc>> {
        match value {
            Value::String(s) => super::parse_datetime(s),
            Value::Number(_) => {
                let n = super::as_i64(value)?;
                if n.abs() >= 100_000_000_000 {
                    Utc.timestamp_millis_opt(n).single()
                } else {
                    Utc.timestamp_opt(n, 0).single()
                }
            }
            _ => None,
        }
    }

    fn date_of(value: &Value) -> Option<NaiveDate> {
        match value {
            Value::String(s) => super::parse_date(s),
            Value::Number(_) => datetime_of(value).map(|dt| dt.date_naive()),
            _ => None,
        }
    }

    fn time_of(value: &Value) -> Option<NaiveTime> {
        let s = value.as_str()?.trim();
        NaiveTime::parse_from_str(s, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S%.f"))
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
            .ok()
    }

    /// Required number.
    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        required(d, super::as_f64, "a number")
    }

    /// Optional number.
    pub fn opt_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        optional(d, super::as_f64, "a number")
    }

    /// Required integer.
    pub fn integer<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        required(d, super::as_i64, "an integer")
    }

    /// Optional integer.
    pub fn opt_integer<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        optional(d, super::as_i64, "an integer")
    }

    /// Required string; numbers and booleans are rendered as text.
    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        let value = Value::deserialize(d)?;
        text_of(&value).ok_or_else(|| D::Error::custom(format!("expected a string, got {value}")))
    }

    /// Optional string.
    pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        optional(d, text_of, "a string")
    }

    /// Required calendar date.
    pub fn date<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        required(d, date_of, "a date")
    }

    /// Optional calendar date.
    pub fn opt_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        optional(d, date_of, "a date")
    }

    /// Required UTC timestamp.
    pub fn datetime<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        required(d, datetime_of, "a timestamp")
    }

    /// Optional UTC timestamp.
    pub fn opt_datetime<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        optional(d, datetime_of, "a timestamp")
    }

    /// Required time of day.
    pub fn time<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        required(d, time_of, "a time of day")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_date_formats() {
        assert_eq!(date_dmy(json!("05/03/2024")).unwrap(), json!("2024-03-05"));
        assert_eq!(date_dmy_short(json!("05/03/24")).unwrap(), json!("2024-03-05"));
        assert_eq!(date_compact(json!(20241231)).unwrap(), json!("2024-12-31"));
        assert_eq!(date_dmy(Value::Null).unwrap(), Value::Null);
        assert!(date_dmy(json!("2024-03-05")).is_err());
    }

    #[test]
    fn test_epoch_conversions() {
        assert_eq!(epoch_seconds(json!(1_704_153_600)).unwrap(), json!("2024-01-02T00:00:00Z"));
        assert_eq!(
            epoch_millis_date(json!("1704153600000")).unwrap(),
            json!("2024-01-02")
        );
    }

    #[test]
    fn test_times_thousand() {
        assert_eq!(times_thousand(json!(25.5)).unwrap(), json!(25500.0));
        assert!(times_thousand(json!("n/a")).is_err());
    }

    #[test]
    fn test_strip_html() {
        let text = strip_html("<p>Vinamilk</p><p> <b>Dairy</b> products </p>");
        assert_eq!(text, "Vinamilk\nDairy\nproducts");
    }

    #[test]
    fn test_since_epoch() {
        let before = Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0).single();
        let after = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single();
        assert_eq!(since_epoch(before), None);
        assert_eq!(since_epoch(after), after);
    }

    #[derive(Debug, Deserialize)]
    struct Lenient {
        #[serde(deserialize_with = "de::number")]
        price: f64,
        #[serde(default, deserialize_with = "de::opt_integer")]
        volume: Option<i64>,
        #[serde(default, deserialize_with = "de::opt_text")]
        code: Option<String>,
        #[serde(default, deserialize_with = "de::opt_datetime")]
        at: Option<DateTime<Utc>>,
    }

    #[test]
    fn test_lenient_coercion() {
        let row: Lenient = serde_json::from_value(json!({
            "price": "1,250.5",
            "volume": 300.0,
            "code": 42,
            "at": "2024-01-02T00:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(row.price, 1250.5);
        assert_eq!(row.volume, Some(300));
        assert_eq!(row.code.as_deref(), Some("42"));
        assert_eq!(row.at.map(|d| d.timestamp()), Some(1_704_153_600));

        let sparse: Lenient = serde_json::from_value(json!({"price": 1, "volume": ""})).unwrap();
        assert_eq!(sparse.volume, None);
        assert_eq!(sparse.at, None);
    }

    #[test]
    fn test_lenient_rejects_garbage() {
        assert!(serde_json::from_value::<Lenient>(json!({"price": "abc"})).is_err());
        assert!(serde_json::from_value::<Lenient>(json!({})).is_err());
    }
}
