use clap::Args;
use serde::Deserialize;
use serde_json::{json, Value};

use deal_desk_core::parse::{
    default_quantity, deserialize_amount, deserialize_percent, deserialize_quantity, parse_amount,
    parse_percent, parse_quantity,
};
use deal_desk_core::quotes::approval::classify_line_discount;
use deal_desk_core::quotes::discount::QuoteDiscount;
use deal_desk_core::quotes::line_item::{compute_line_totals, LineItem};
use deal_desk_core::quotes::summary::{aggregate_quote, QuoteInput};
use deal_desk_core::{Money, Percent};

use super::load_input;
use crate::config::DealDeskConfig;

/// Arguments for pricing a single line
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct LineTotalArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Quantity (non-numeric or < 1 is treated as 1)
    #[arg(long)]
    pub quantity: Option<String>,

    /// Unit list price
    #[arg(long)]
    pub base_price: Option<String>,

    /// Line discount in percent
    #[arg(long)]
    pub discount: Option<String>,
}

/// Arguments for rolling up a quote
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct QuoteArgs {
    /// Path to a quote file with `line_items` (or pipe JSON on stdin)
    #[arg(long)]
    pub input: Option<String>,

    /// Quote-level discount in percent (overrides the file)
    #[arg(long)]
    pub quote_discount: Option<String>,

    /// Tax rate in percent (overrides the file and config)
    #[arg(long)]
    pub tax_rate: Option<String>,
}

/// Arguments for resolving a quote-level discount
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct DiscountArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Deal value the discount applies to
    #[arg(long)]
    pub deal_value: Option<String>,

    /// Discount as a percentage
    #[arg(long, conflicts_with = "amount")]
    pub percent: Option<String>,

    /// Discount as a flat amount
    #[arg(long)]
    pub amount: Option<String>,
}

#[derive(Deserialize)]
struct LineTotalInput {
    #[serde(default = "default_quantity", deserialize_with = "deserialize_quantity")]
    quantity: u32,
    #[serde(default, deserialize_with = "deserialize_amount")]
    base_price: Money,
    #[serde(default, deserialize_with = "deserialize_percent")]
    discount_percent: Percent,
}

/// Quote file as written by hand: tax and quote discount may be omitted.
#[derive(Deserialize)]
struct QuoteFile {
    line_items: Vec<LineItem>,
    #[serde(default)]
    quote_discount_percent: Option<Percent>,
    #[serde(default)]
    tax_rate_percent: Option<Percent>,
}

#[derive(Deserialize)]
struct DiscountInput {
    deal_value: Money,
    discount: QuoteDiscount,
}

pub fn run_line_total(args: LineTotalArgs, config: &DealDeskConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let line: LineTotalInput = load_input(args.input.as_deref(), || {
        Ok(LineTotalInput {
            quantity: parse_quantity(args.quantity.as_deref().unwrap_or("1")),
            base_price: parse_amount(
                args.base_price
                    .as_deref()
                    .ok_or("--base-price is required (or provide --input)")?,
            ),
            discount_percent: parse_percent(args.discount.as_deref().unwrap_or("0")),
        })
    })?;

    let quantity = line.quantity.max(1);
    let totals = compute_line_totals(quantity, line.base_price, line.discount_percent);
    Ok(json!({
        "quantity": quantity,
        "base_price": line.base_price,
        "discount_percent": line.discount_percent,
        "discount_amount": totals.discount_amount,
        "net_price": totals.net_price,
        "total_price": totals.total_price,
        "discount_tier": classify_line_discount(line.discount_percent, &config.approval),
    }))
}

pub fn run_quote(args: QuoteArgs, config: &DealDeskConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let file: QuoteFile = load_input(args.input.as_deref(), || {
        Err("--input is required (or pipe a quote as JSON on stdin)".into())
    })?;

    let quote_input = QuoteInput {
        line_items: file.line_items,
        quote_discount_percent: args
            .quote_discount
            .as_deref()
            .map(parse_percent)
            .or(file.quote_discount_percent)
            .unwrap_or_default(),
        tax_rate_percent: args
            .tax_rate
            .as_deref()
            .map(parse_percent)
            .or(file.tax_rate_percent)
            .unwrap_or(config.tax_rate_percent),
    };

    let result = aggregate_quote(&quote_input, &config.approval);
    Ok(serde_json::to_value(result)?)
}

pub fn run_discount(args: DiscountArgs, config: &DealDeskConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let input: DiscountInput = load_input(args.input.as_deref(), || {
        let deal_value = parse_amount(
            args.deal_value
                .as_deref()
                .ok_or("--deal-value is required (or provide --input)")?,
        );
        let discount = match (args.percent.as_deref(), args.amount.as_deref()) {
            (Some(pct), _) => QuoteDiscount::Percentage(parse_percent(pct)),
            (None, Some(amount)) => QuoteDiscount::Amount(parse_amount(amount)),
            (None, None) => return Err("--percent or --amount is required".into()),
        };
        Ok(DiscountInput { deal_value, discount })
    })?;

    let resolution = input.discount.resolve(input.deal_value, &config.approval);
    Ok(json!({
        "deal_value": input.deal_value,
        "discount_amount": resolution.discount_amount,
        "discount_percent": resolution.discount_percent,
        "approval": resolution.approval,
        "requires_approval": resolution.approval.requires_approval(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_line_file_defaults_bad_fields() {
        let yaml = "quantity: -4\nbase_price: abc\n";
        let line: LineTotalInput = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(line.quantity, 1);
        assert_eq!(line.base_price, Decimal::ZERO);
        assert_eq!(line.discount_percent, Decimal::ZERO);
    }

    #[test]
    fn test_line_file_reads_numbers_and_strings() {
        let line: LineTotalInput =
            serde_json::from_str(r#"{"quantity": "3", "base_price": 1200, "discount_percent": "10"}"#).unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(line.base_price, dec!(1200));
        assert_eq!(line.discount_percent, dec!(10));
    }
}
