//! Rupee formatting for approval reasons, breakdown labels and CLI output.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::types::Money;

const CRORE: Decimal = dec!(10_000_000);
const LAKH: Decimal = dec!(100_000);

/// Whole rupees with Indian digit grouping: `₹1,00,00,000`.
pub fn format_inr(amount: Money) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = rounded.abs().trunc().to_string();
    format!("{sign}₹{}", group_indian(&digits))
}

/// Crore/lakh shorthand used on dashboards: `₹1.25 Cr`, `₹4.50 L`.
pub fn format_inr_compact(amount: Money) -> String {
    let magnitude = amount.abs();
    let sign = if amount.is_sign_negative() { "-" } else { "" };
    if magnitude >= CRORE {
        format!("{sign}₹{:.2} Cr", magnitude / CRORE)
    } else if magnitude >= LAKH {
        format!("{sign}₹{:.2} L", magnitude / LAKH)
    } else {
        format_inr(amount)
    }
}

/// Lakh notation with one decimal, used for slab labels: `₹10.0L`.
pub fn format_lakh(amount: Money) -> String {
    format!("₹{:.1}L", amount / LAKH)
}

/// Last three digits, then groups of two.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}
