//! Fail-soft parsing of numeric form fields.
//!
//! Quote and simulation fields arrive as free text. Nothing here returns an
//! error: a field that cannot be read falls back to a safe default (`1` for
//! quantities, `0` for amounts and percentages).

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

use crate::types::{Money, Percent};

/// Parse a line-item quantity.
///
/// Reads the leading integer (`"3.7"` → 3, `" 4 units"` → 4). Non-numeric,
/// zero, negative or overflowing input yields 1.
pub fn parse_quantity(raw: &str) -> u32 {
    let s = raw.trim_start();
    let (negative, rest) = split_sign(s);
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if negative || digits.is_empty() {
        return 1;
    }
    digits.parse::<u32>().ok().filter(|q| *q >= 1).unwrap_or(1)
}

/// Parse a currency amount such as `"₹1,25,000.50"`.
///
/// Thousands separators and a leading rupee sign are ignored. Invalid or
/// negative input yields 0.
pub fn parse_amount(raw: &str) -> Money {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('₹')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    match leading_decimal(&cleaned) {
        Some(v) if v >= Decimal::ZERO => v,
        _ => Decimal::ZERO,
    }
}

/// Parse a percentage field. Invalid input yields 0; values outside
/// `[0, 100]` are returned as given.
pub fn parse_percent(raw: &str) -> Percent {
    leading_decimal(raw).unwrap_or(Decimal::ZERO)
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

/// Quantity used when a form omits the field.
pub fn default_quantity() -> u32 {
    1
}

/// `deserialize_with` for quantities: accepts a number, a string or null and
/// falls back through [`parse_quantity`].
pub fn deserialize_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(parse_quantity(&field_text(Value::deserialize(deserializer)?)))
}

/// `deserialize_with` for amounts, via [`parse_amount`].
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<Money, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(parse_amount(&field_text(Value::deserialize(deserializer)?)))
}

/// `deserialize_with` for percentages, via [`parse_percent`].
pub fn deserialize_percent<'de, D>(deserializer: D) -> Result<Percent, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(parse_percent(&field_text(Value::deserialize(deserializer)?)))
}

fn field_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    }
}

/// Longest numeric prefix of `raw` (after leading whitespace), e.g.
/// `"12.5% off"` → 12.5, `"1e3"` → 1000.
fn leading_decimal(raw: &str) -> Option<Decimal> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'-' || bytes[end] == b'+') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        end = if frac_end > frac_start { frac_end } else { end };
    }
    if mantissa_digits == 0 {
        return None;
    }

    let mut exp_end = end;
    if exp_end < bytes.len() && (bytes[exp_end] == b'e' || bytes[exp_end] == b'E') {
        let mut j = exp_end + 1;
        if j < bytes.len() && (bytes[j] == b'-' || bytes[j] == b'+') {
            j += 1;
        }
        let digits_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > digits_start {
            exp_end = j;
        }
    }

    let mantissa = s[..end].trim_start_matches('+');
    let mantissa = mantissa.strip_suffix('.').unwrap_or(mantissa);
    let mut literal = match mantissa.strip_prefix('-') {
        Some(rest) if rest.starts_with('.') => format!("-0{rest}"),
        _ if mantissa.starts_with('.') => format!("0{mantissa}"),
        _ => mantissa.to_string(),
    };
    literal.push_str(&s[end..exp_end]);
    if exp_end > end {
        Decimal::from_scientific(&literal).ok()
    } else {
        Decimal::from_str(&literal).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quantity_defaults_to_one() {
        assert_eq!(parse_quantity(""), 1);
        assert_eq!(parse_quantity("abc"), 1);
        assert_eq!(parse_quantity("0"), 1);
        assert_eq!(parse_quantity("-3"), 1);
        assert_eq!(parse_quantity("99999999999999"), 1);
    }

    #[test]
    fn test_quantity_reads_leading_integer() {
        assert_eq!(parse_quantity("12"), 12);
        assert_eq!(parse_quantity(" 4 seats"), 4);
        assert_eq!(parse_quantity("3.7"), 3);
        assert_eq!(parse_quantity("+5"), 5);
    }

    #[test]
    fn test_amount_strips_separators() {
        assert_eq!(parse_amount("1,25,000"), dec!(125000));
        assert_eq!(parse_amount("₹ 2,500.75"), dec!(2500.75));
        assert_eq!(parse_amount("4999"), dec!(4999));
    }

    #[test]
    fn test_amount_invalid_is_zero() {
        assert_eq!(parse_amount("n/a"), Decimal::ZERO);
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("-500"), Decimal::ZERO);
    }

    #[test]
    fn test_percent_not_clamped() {
        assert_eq!(parse_percent("12.5"), dec!(12.5));
        assert_eq!(parse_percent("150"), dec!(150));
        assert_eq!(parse_percent("-5"), dec!(-5));
        assert_eq!(parse_percent("7% off"), dec!(7));
        assert_eq!(parse_percent("x"), Decimal::ZERO);
    }

    #[test]
    fn test_percent_scientific_and_trailing_dot() {
        assert_eq!(parse_percent("1e1"), dec!(10));
        assert_eq!(parse_percent("5."), dec!(5));
        assert_eq!(parse_percent(".5"), dec!(0.5));
    }

    #[derive(Deserialize)]
    struct Field {
        #[serde(default = "default_quantity", deserialize_with = "deserialize_quantity")]
        quantity: u32,
        #[serde(default, deserialize_with = "deserialize_amount")]
        price: Money,
        #[serde(default, deserialize_with = "deserialize_percent")]
        discount: Percent,
    }

    #[test]
    fn test_lenient_fields_accept_numbers_and_strings() {
        let f: Field =
            serde_json::from_str(r#"{"quantity": 3, "price": 1200.5, "discount": "12.5"}"#).unwrap();
        assert_eq!(f.quantity, 3);
        assert_eq!(f.price, dec!(1200.5));
        assert_eq!(f.discount, dec!(12.5));
    }

    #[test]
    fn test_lenient_fields_fall_back() {
        let f: Field = serde_json::from_str("{}").unwrap();
        assert_eq!(f.quantity, 1);
        assert_eq!(f.price, Decimal::ZERO);
        assert_eq!(f.discount, Decimal::ZERO);

        let f: Field =
            serde_json::from_str(r#"{"quantity": -2, "price": "abc", "discount": null}"#).unwrap();
        assert_eq!(f.quantity, 1);
        assert_eq!(f.price, Decimal::ZERO);
        assert_eq!(f.discount, Decimal::ZERO);
    }
}
