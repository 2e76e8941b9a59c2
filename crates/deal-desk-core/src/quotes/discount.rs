use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::approval::{classify_discount_depth, ApprovalPolicy, ApprovalTier};
use crate::types::{apply_percent, percent_of, Money, Percent};

/// A quote-level discount, entered either as a percentage or a flat amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum QuoteDiscount {
    Percentage(Percent),
    Amount(Money),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountReason {
    Volume,
    Strategic,
    Competitive,
    Renewal,
    Bundle,
    EarlyPayment,
    Other(String),
}

impl DiscountReason {
    pub fn label(&self) -> &str {
        match self {
            DiscountReason::Volume => "Volume Discount",
            DiscountReason::Strategic => "Strategic Account",
            DiscountReason::Competitive => "Competitive Pressure",
            DiscountReason::Renewal => "Renewal Incentive",
            DiscountReason::Bundle => "Bundle Discount",
            DiscountReason::EarlyPayment => "Early Payment",
            DiscountReason::Other(text) => text,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountResolution {
    pub discount_amount: Money,
    pub discount_percent: Percent,
    pub approval: ApprovalTier,
}

impl QuoteDiscount {
    /// Express the discount both ways against `deal_value` and classify its depth.
    ///
    /// Flat amounts are capped to `[0, deal_value]`. A zero deal value gives a
    /// zero percentage.
    pub fn resolve(&self, deal_value: Money, policy: &ApprovalPolicy) -> DiscountResolution {
        let (discount_amount, discount_percent) = match *self {
            QuoteDiscount::Percentage(pct) => (apply_percent(deal_value, pct), pct),
            QuoteDiscount::Amount(amount) => {
                let capped = amount.min(deal_value).max(Decimal::ZERO);
                (capped, percent_of(capped, deal_value))
            }
        };
        DiscountResolution {
            discount_amount,
            discount_percent,
            approval: classify_discount_depth(discount_percent, policy),
        }
    }
}
