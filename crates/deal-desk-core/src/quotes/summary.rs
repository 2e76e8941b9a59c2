use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::approval::{classify_quote, ApprovalDecision, ApprovalPolicy};
use super::line_item::LineItem;
use crate::parse::deserialize_percent;
use crate::types::{apply_percent, percent_of, with_metadata, ComputationOutput, Money, Percent};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteInput {
    pub line_items: Vec<LineItem>,
    #[serde(default, deserialize_with = "deserialize_percent")]
    pub quote_discount_percent: Percent,
    pub tax_rate_percent: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSummary {
    /// Sum of line totals (after line discounts)
    pub subtotal: Money,
    /// Sum of line discount amounts
    pub total_line_discount: Money,
    pub quote_discount_amount: Money,
    pub taxable_amount: Money,
    pub tax_amount: Money,
    pub grand_total: Money,
    /// Line and quote discounts blended over the pre-discount value
    pub total_discount_percent: Percent,
    /// Share of the list value actually realised
    pub net_realization_percent: Percent,
    pub max_line_discount_percent: Percent,
    /// Lines billed monthly, quarterly or yearly
    pub recurring_total: Money,
    pub one_time_total: Money,
    pub line_count: usize,
    pub approval: ApprovalDecision,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Roll a quote up into tax-inclusive totals and route it for approval.
///
/// subtotal      = Σ line total
/// quote disc    = subtotal * q / 100
/// taxable       = subtotal - quote disc
/// tax           = taxable * t / 100
/// grand total   = taxable + tax
///
/// Line totals are taken as already computed on each item; item order has no
/// effect. Never fails: unusual inputs are reported as warnings.
pub fn aggregate_quote(input: &QuoteInput, policy: &ApprovalPolicy) -> ComputationOutput<QuoteSummary> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let subtotal: Money = input.line_items.iter().map(LineItem::total_price).sum();
    let total_line_discount: Money = input.line_items.iter().map(LineItem::discount_amount).sum();

    let quote_discount_amount = apply_percent(subtotal, input.quote_discount_percent);
    let taxable_amount = subtotal - quote_discount_amount;
    let tax_amount = apply_percent(taxable_amount, input.tax_rate_percent);
    let grand_total = taxable_amount + tax_amount;

    let total_discount_percent = percent_of(
        total_line_discount + quote_discount_amount,
        subtotal + total_line_discount,
    );
    let net_realization_percent = percent_of(
        grand_total,
        grand_total + total_line_discount + quote_discount_amount,
    );

    let max_line_discount_percent = input
        .line_items
        .iter()
        .map(LineItem::discount_percent)
        .fold(Decimal::ZERO, Decimal::max);

    let (recurring, one_time): (Vec<&LineItem>, Vec<&LineItem>) = input
        .line_items
        .iter()
        .partition(|item| item.billing_frequency.is_recurring());
    let recurring_total: Money = recurring.iter().map(|i| i.total_price()).sum();
    let one_time_total: Money = one_time.iter().map(|i| i.total_price()).sum();

    let approval = classify_quote(
        grand_total,
        max_line_discount_percent,
        input.quote_discount_percent,
        policy,
    );

    // --- Warnings ---
    if input.line_items.is_empty() {
        warnings.push("Quote has no line items".into());
    }
    for item in &input.line_items {
        let d = item.discount_percent();
        if d < Decimal::ZERO || d > Decimal::ONE_HUNDRED {
            warnings.push(format!(
                "Line {} discount {d}% is outside 0-100%; applied as given",
                item.id
            ));
        }
    }
    let q = input.quote_discount_percent;
    if q < Decimal::ZERO || q > Decimal::ONE_HUNDRED {
        warnings.push(format!("Quote discount {q}% is outside 0-100%; applied as given"));
    }
    if grand_total < Decimal::ZERO {
        warnings.push(format!("Grand total is negative ({grand_total})"));
    }

    let output = QuoteSummary {
        subtotal,
        total_line_discount,
        quote_discount_amount,
        taxable_amount,
        tax_amount,
        grand_total,
        total_discount_percent,
        net_realization_percent,
        max_line_discount_percent,
        recurring_total,
        one_time_total,
        line_count: input.line_items.len(),
        approval,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    with_metadata(
        "Quote roll-up with value/discount approval cascade",
        input,
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
