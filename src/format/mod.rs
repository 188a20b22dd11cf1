//! Display helpers shared by listings and detail pages.

use num_format::{Locale, ToFormattedString};
use serde_json::Value;

use crate::listview::{parse_date, parse_number};

/// Placeholder shown for missing values.
pub const NOT_AVAILABLE: &str = "N/A";

/// Whether a field counts as not filled in.
///
/// Missing, null, whitespace-only strings and empty arrays are blank.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Render a field for display, falling back to `N/A`.
pub fn display_or_na(value: Option<&Value>) -> String {
    if is_blank(value) {
        return NOT_AVAILABLE.to_string();
    }
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Format a whole-unit amount with lakh/crore grouping and a currency symbol.
pub fn format_price(amount: i64, symbol: &str) -> String {
    format_price_in(amount, symbol, &Locale::en_IN)
}

/// Format a whole-unit amount grouped the way `locale` groups digits.
pub fn format_price_in(amount: i64, symbol: &str, locale: &Locale) -> String {
    let grouped = amount.unsigned_abs().to_formatted_string(locale);
    if amount < 0 {
        format!("-{}{}", symbol, grouped)
    } else {
        format!("{}{}", symbol, grouped)
    }
}

/// Format a price field, rounding to whole units.
pub fn format_price_value(value: Option<&Value>, symbol: &str) -> String {
    match parse_number(value) {
        Some(amount) if amount.is_finite() => format_price(amount.round() as i64, symbol),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Format a date field as `19 Oct 2026`.
pub fn format_date(value: Option<&Value>) -> String {
    parse_date(value)
        .map(|dt| dt.format("%d %b %Y").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_values() {
        assert!(is_blank(None));
        assert!(is_blank(Some(&json!(null))));
        assert!(is_blank(Some(&json!("   "))));
        assert!(is_blank(Some(&json!([]))));
        assert!(!is_blank(Some(&json!(0))));
        assert!(!is_blank(Some(&json!(false))));
        assert!(!is_blank(Some(&json!("Creta"))));
    }

    #[test]
    fn test_display_or_na() {
        assert_eq!(display_or_na(None), "N/A");
        assert_eq!(display_or_na(Some(&json!(""))), "N/A");
        assert_eq!(display_or_na(Some(&json!(" Petrol "))), "Petrol");
        assert_eq!(display_or_na(Some(&json!(5))), "5");
        assert_eq!(display_or_na(Some(&json!(["ABS", "Airbags"]))), "ABS, Airbags");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(1250000, "₹"), "₹12,50,000");
        assert_eq!(format_price(125000000, "₹"), "₹12,50,00,000");
        assert_eq!(format_price(0, "₹"), "₹0");
        assert_eq!(format_price(-4500, "₹"), "-₹4,500");
        assert_eq!(format_price_in(1250000, "$", &Locale::en), "$1,250,000");
        assert_eq!(format_price_value(Some(&json!("8,99,000.6")), "₹"), "₹8,99,001");
        assert_eq!(format_price_value(Some(&json!("Rs. 5,00,000")), "₹"), "₹5,00,000");
        assert_eq!(format_price_value(Some(&json!("on request")), "₹"), "N/A");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(Some(&json!("2026-10-19T08:30:00Z"))), "19 Oct 2026");
        assert_eq!(format_date(Some(&json!("2025-01-05"))), "05 Jan 2025");
        assert_eq!(format_date(Some(&json!("soon"))), "N/A");
        assert_eq!(format_date(None), "N/A");
    }
}
