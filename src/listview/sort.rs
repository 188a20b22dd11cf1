//! Sort keys and the value parsers they rely on.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use super::Record;

/// How a listing orders its records.
///
/// Every comparator is applied with a stable sort, so records with equal
/// keys keep their filtered order. Records whose key is missing or cannot be
/// parsed go after the ones that can.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "field", rename_all = "camelCase")]
pub enum SortKey {
    /// Keep the collection order.
    #[default]
    Unsorted,
    /// Date descending.
    Newest(String),
    /// Date ascending.
    Oldest(String),
    /// Text ascending, ignoring case and accents.
    Alphabetical(String),
    NumberAsc(String),
    NumberDesc(String),
}

impl SortKey {
    /// Compare two records under this key.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        match self {
            SortKey::Unsorted => Ordering::Equal,
            SortKey::Newest(field) => present_first(
                parse_date(a.get(field)),
                parse_date(b.get(field)),
                |x, y| y.cmp(&x),
            ),
            SortKey::Oldest(field) => present_first(
                parse_date(a.get(field)),
                parse_date(b.get(field)),
                |x, y| x.cmp(&y),
            ),
            SortKey::Alphabetical(field) => present_first(
                sort_text(a.get(field)),
                sort_text(b.get(field)),
                |x, y| x.cmp(&y),
            ),
            SortKey::NumberAsc(field) => present_first(
                parse_number(a.get(field)),
                parse_number(b.get(field)),
                |x, y| x.total_cmp(&y),
            ),
            SortKey::NumberDesc(field) => present_first(
                parse_number(a.get(field)),
                parse_number(b.get(field)),
                |x, y| y.total_cmp(&x),
            ),
        }
    }

    /// Stable in-place sort of a filtered selection.
    pub fn sort(&self, records: &mut [&Record]) {
        if *self == SortKey::Unsorted {
            return;
        }
        records.sort_by(|a, b| self.compare(a, b));
    }

    /// The field this key reads, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            SortKey::Unsorted => None,
            SortKey::Newest(f)
            | SortKey::Oldest(f)
            | SortKey::Alphabetical(f)
            | SortKey::NumberAsc(f)
            | SortKey::NumberDesc(f) => Some(f),
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            SortKey::Unsorted => "none",
            SortKey::Newest(_) => "newest",
            SortKey::Oldest(_) => "oldest",
            SortKey::Alphabetical(_) => "alpha",
            SortKey::NumberAsc(_) => "asc",
            SortKey::NumberDesc(_) => "desc",
        }
    }
}

/// Renders as `kind:field`, e.g. `newest:createdAt`.
impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field() {
            Some(field) => write!(f, "{}:{}", self.prefix(), field),
            None => f.write_str(self.prefix()),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "none" {
            return Ok(SortKey::Unsorted);
        }

        let (kind, field) = s
            .split_once(':')
            .ok_or_else(|| format!("Sort key '{}' must look like kind:field", s))?;
        let field = field.trim();
        if field.is_empty() {
            return Err(format!("Sort key '{}' names no field", s));
        }
        let field = field.to_string();

        match kind.trim() {
            "newest" => Ok(SortKey::Newest(field)),
            "oldest" => Ok(SortKey::Oldest(field)),
            "alpha" => Ok(SortKey::Alphabetical(field)),
            "asc" => Ok(SortKey::NumberAsc(field)),
            "desc" => Ok(SortKey::NumberDesc(field)),
            other => Err(format!("Unknown sort kind '{}'", other)),
        }
    }
}

fn present_first<T>(a: Option<T>, b: Option<T>, cmp: impl FnOnce(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn sort_text(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(fold(s)),
        Some(other) => Some(fold(&other.to_string())),
    }
}

/// Lowercase with diacritics stripped, so `Éclair` sorts with `eclair`.
fn fold(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Parse a date field.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DD[ HH:MM:SS]` strings and numbers
/// holding milliseconds since the Unix epoch.
pub fn parse_date(value: Option<&Value>) -> Option<NaiveDateTime> {
    match value? {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.naive_utc());
            }
            for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
                if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
                    return Some(dt);
                }
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.naive_utc()),
        _ => None,
    }
}

/// Parse a numeric field.
///
/// Strings are read from the first number onwards, dropping any currency
/// prefix and grouping separators, so `"Rs. 12,50,000"` reads as `1250000`.
pub fn parse_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let rest = &s[number_start(s)?..];
            let digits: String = rest
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            let number: f64 = digits.parse().ok()?;
            Some(if rest.starts_with('-') { -number } else { number })
        }
        _ => None,
    }
}

/// Byte offset where the number in `s` begins.
///
/// A `-` or `.` only starts a number when a digit follows and it is not the
/// tail of a word such as `Rs.`.
fn number_start(s: &str) -> Option<usize> {
    let mut prev: Option<char> = None;
    for (i, c) in s.char_indices() {
        if c.is_ascii_digit() {
            return Some(i);
        }
        let digit_follows = s[i + c.len_utf8()..].starts_with(|n: char| n.is_ascii_digit());
        let after_word = prev.is_some_and(char::is_alphabetic);
        if (c == '-' || c == '.') && digit_follows && !after_word {
            return Some(i);
        }
        prev = Some(c);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(values: Vec<Value>) -> Vec<Record> {
        values
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn sorted_ids(records: &[Record], key: &SortKey) -> Vec<i64> {
        let mut refs: Vec<&Record> = records.iter().collect();
        key.sort(&mut refs);
        refs.iter().map(|r| r["id"].as_i64().unwrap()).collect()
    }

    #[test]
    fn test_newest_and_oldest() {
        let data = records(vec![
            json!({ "id": 1, "createdAt": "2024-03-01T10:00:00Z" }),
            json!({ "id": 2, "createdAt": "2024-05-12" }),
            json!({ "id": 3, "createdAt": "not a date" }),
            json!({ "id": 4, "createdAt": "2023-12-31 23:59:59" }),
        ]);

        assert_eq!(
            sorted_ids(&data, &SortKey::Newest("createdAt".into())),
            vec![2, 1, 4, 3]
        );
        assert_eq!(
            sorted_ids(&data, &SortKey::Oldest("createdAt".into())),
            vec![4, 1, 2, 3]
        );
    }

    #[test]
    fn test_alphabetical_is_case_insensitive_and_stable() {
        let data = records(vec![
            json!({ "id": 1, "name": "bandra" }),
            json!({ "id": 2, "name": "Andheri" }),
            json!({ "id": 3, "name": "BANDRA" }),
            json!({ "id": 4 }),
            json!({ "id": 5, "name": "andheri" }),
        ]);

        assert_eq!(
            sorted_ids(&data, &SortKey::Alphabetical("name".into())),
            vec![2, 5, 1, 3, 4]
        );
    }

    #[test]
    fn test_numeric_sorts_read_formatted_prices() {
        let data = records(vec![
            json!({ "id": 1, "price": "₹ 12,50,000" }),
            json!({ "id": 2, "price": 899000 }),
            json!({ "id": 3, "price": "on request" }),
            json!({ "id": 4, "price": "1,050,000.50" }),
            json!({ "id": 5, "price": "Rs. 5,00,000" }),
            json!({ "id": 6, "price": "INR 9,50,000" }),
            json!({ "id": 7, "price": "Rs.15,00,000/-" }),
        ]);

        assert_eq!(
            sorted_ids(&data, &SortKey::NumberAsc("price".into())),
            vec![5, 2, 6, 4, 1, 7, 3]
        );
        assert_eq!(
            sorted_ids(&data, &SortKey::NumberDesc("price".into())),
            vec![7, 1, 4, 6, 2, 5, 3]
        );
    }

    #[test]
    fn test_parse_number_skips_currency_prefix() {
        assert_eq!(parse_number(Some(&json!("Rs. 12,50,000"))), Some(1250000.0));
        assert_eq!(parse_number(Some(&json!("Rs.5,00,000"))), Some(500000.0));
        assert_eq!(parse_number(Some(&json!("INR 9,00,000.75"))), Some(900000.75));
        assert_eq!(parse_number(Some(&json!("-4,500"))), Some(-4500.0));
        assert_eq!(parse_number(Some(&json!(".5 lakh"))), Some(0.5));
        assert_eq!(parse_number(Some(&json!("Rs."))), None);
        assert_eq!(parse_number(Some(&json!("1.2.3"))), None);
    }

    #[test]
    fn test_alphabetical_ignores_accents() {
        let data = records(vec![
            json!({ "id": 1, "name": "Zebra" }),
            json!({ "id": 2, "name": "Éclair" }),
            json!({ "id": 3, "name": "apple" }),
            json!({ "id": 4, "name": "eclair" }),
        ]);

        assert_eq!(
            sorted_ids(&data, &SortKey::Alphabetical("name".into())),
            vec![3, 2, 4, 1]
        );
    }

    #[test]
    fn test_sort_is_idempotent() {
        let data = records(vec![
            json!({ "id": 1, "year": 2020 }),
            json!({ "id": 2, "year": 2018 }),
            json!({ "id": 3, "year": 2020 }),
            json!({ "id": 4, "year": 2019 }),
        ]);
        let key = SortKey::NumberDesc("year".into());

        let mut once: Vec<&Record> = data.iter().collect();
        key.sort(&mut once);
        let mut twice = once.clone();
        key.sort(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_parse_and_display_round_trip() {
        let key: SortKey = "newest:createdAt".parse().unwrap();
        assert_eq!(key, SortKey::Newest("createdAt".into()));
        assert_eq!(key.to_string(), "newest:createdAt");

        assert_eq!("".parse::<SortKey>().unwrap(), SortKey::Unsorted);
        assert!("sideways:price".parse::<SortKey>().is_err());
        assert!("asc:".parse::<SortKey>().is_err());
        assert!("price".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_parse_date_from_epoch_millis() {
        let dt = parse_date(Some(&json!(0))).unwrap();
        assert_eq!(dt.to_string(), "1970-01-01 00:00:00");
        assert!(parse_date(Some(&json!(true))).is_none());
        assert!(parse_date(None).is_none());
    }
}
