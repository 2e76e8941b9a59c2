use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;

use deal_desk_core::format::{format_inr, format_inr_compact, format_lakh};

/// Arguments for rupee formatting
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct FormatInrArgs {
    /// Amount in rupees (commas allowed)
    pub amount: String,

    /// Display style
    #[arg(long, default_value = "full")]
    pub style: InrStyle,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum InrStyle {
    /// ₹12,50,000
    Full,
    /// ₹12.50 L / ₹1.25 Cr
    Compact,
    /// ₹12.5L
    Lakh,
}

pub fn run_format_inr(args: FormatInrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cleaned: String = args
        .amount
        .trim()
        .trim_start_matches('₹')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let amount = Decimal::from_str(&cleaned)
        .map_err(|e| format!("Invalid amount '{}': {}", args.amount, e))?;

    let formatted = match args.style {
        InrStyle::Full => format_inr(amount),
        InrStyle::Compact => format_inr_compact(amount),
        InrStyle::Lakh => format_lakh(amount),
    };
    Ok(json!({ "amount": amount, "formatted": formatted }))
}
