use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::approval::{classify_line_discount, ApprovalPolicy, ApprovalTier};
use crate::parse::{default_quantity, deserialize_amount, deserialize_percent, deserialize_quantity};
use crate::types::{apply_percent, Money, Percent};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BillingFrequency {
    Monthly,
    Quarterly,
    Yearly,
    #[default]
    OneTime,
}

impl BillingFrequency {
    /// Derived from a catalogue pricing unit such as "per user/year".
    pub fn from_pricing_unit(unit: &str) -> Self {
        if unit.contains("year") {
            BillingFrequency::Yearly
        } else if unit.contains("month") {
            BillingFrequency::Monthly
        } else {
            BillingFrequency::OneTime
        }
    }

    pub fn is_recurring(&self) -> bool {
        *self != BillingFrequency::OneTime
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PricingModel {
    Fixed,
    PerUser,
    PerMonth,
    PerYear,
    Usage,
    #[default]
    OneTime,
}

impl PricingModel {
    pub fn from_pricing_unit(unit: &str) -> Self {
        if unit.contains("year") {
            PricingModel::PerYear
        } else if unit.contains("month") {
            PricingModel::PerMonth
        } else {
            PricingModel::OneTime
        }
    }
}

/// Derived amounts for one quote line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTotals {
    /// quantity * base_price * discount / 100
    pub discount_amount: Money,
    /// Unit price after discount
    pub net_price: Money,
    /// quantity * base_price - discount_amount
    pub total_price: Money,
}

/// Raw line as supplied by a quote form. Totals are never trusted from input,
/// and unreadable numbers fall back to safe defaults.
#[derive(Debug, Clone, Deserialize)]
struct LineItemFields {
    id: String,
    #[serde(default)]
    product_id: String,
    #[serde(default)]
    product_name: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    unit: String,
    #[serde(default = "default_quantity", deserialize_with = "deserialize_quantity")]
    quantity: u32,
    #[serde(default, deserialize_with = "deserialize_amount")]
    base_price: Money,
    #[serde(default, deserialize_with = "deserialize_percent")]
    discount_percent: Percent,
    #[serde(default)]
    pricing_model: PricingModel,
    #[serde(default)]
    billing_frequency: BillingFrequency,
}

/// A product line on a quote. Totals are recomputed whenever an input
/// changes, so they can never drift from quantity, price and discount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LineItemFields")]
pub struct LineItem {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub unit: String,
    quantity: u32,
    base_price: Money,
    discount_percent: Percent,
    pub pricing_model: PricingModel,
    pub billing_frequency: BillingFrequency,
    #[serde(flatten)]
    totals: LineTotals,
}

impl From<LineItemFields> for LineItem {
    fn from(f: LineItemFields) -> Self {
        let mut item = LineItem::new(f.id, f.quantity, f.base_price, f.discount_percent);
        item.product_id = f.product_id;
        item.product_name = f.product_name;
        item.category = f.category;
        item.unit = f.unit;
        item.pricing_model = f.pricing_model;
        item.billing_frequency = f.billing_frequency;
        item
    }
}

impl LineItem {
    /// A bare line. Quantity below 1 is raised to 1.
    pub fn new(id: impl Into<String>, quantity: u32, base_price: Money, discount_percent: Percent) -> Self {
        let quantity = quantity.max(1);
        Self {
            id: id.into(),
            product_id: String::new(),
            product_name: String::new(),
            category: String::new(),
            unit: String::new(),
            quantity,
            base_price,
            discount_percent,
            pricing_model: PricingModel::default(),
            billing_frequency: BillingFrequency::default(),
            totals: compute_line_totals(quantity, base_price, discount_percent),
        }
    }

    pub fn billed(mut self, frequency: BillingFrequency) -> Self {
        self.billing_frequency = frequency;
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.set_quantity(quantity);
        self
    }

    pub fn with_discount(mut self, discount_percent: Percent) -> Self {
        self.set_discount(discount_percent);
        self
    }

    pub fn with_base_price(mut self, base_price: Money) -> Self {
        self.set_base_price(base_price);
        self
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity.max(1);
        self.recompute();
    }

    pub fn set_discount(&mut self, discount_percent: Percent) {
        self.discount_percent = discount_percent;
        self.recompute();
    }

    pub fn set_base_price(&mut self, base_price: Money) {
        self.base_price = base_price;
        self.recompute();
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn base_price(&self) -> Money {
        self.base_price
    }

    pub fn discount_percent(&self) -> Percent {
        self.discount_percent
    }

    pub fn totals(&self) -> LineTotals {
        self.totals
    }

    pub fn discount_amount(&self) -> Money {
        self.totals.discount_amount
    }

    pub fn net_price(&self) -> Money {
        self.totals.net_price
    }

    pub fn total_price(&self) -> Money {
        self.totals.total_price
    }

    /// Warning badge for this line's discount.
    pub fn discount_tier(&self, policy: &ApprovalPolicy) -> ApprovalTier {
        classify_line_discount(self.discount_percent, policy)
    }

    fn recompute(&mut self) {
        self.totals = compute_line_totals(self.quantity, self.base_price, self.discount_percent);
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Price one line. Pure; the discount is applied as given, without clamping.
///
/// discount_amount = qty * price * d / 100
/// net_price       = price * (1 - d / 100)
/// total_price     = qty * price - discount_amount
pub fn compute_line_totals(quantity: u32, base_price: Money, discount_percent: Percent) -> LineTotals {
    let gross = Decimal::from(quantity) * base_price;
    let discount_amount = apply_percent(gross, discount_percent);
    let net_price = base_price * (Decimal::ONE - discount_percent / Decimal::ONE_HUNDRED);
    LineTotals {
        discount_amount,
        net_price,
        total_price: gross - discount_amount,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
