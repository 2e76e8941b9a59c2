//! In-progress quote: products added from the catalogue, edited line by line,
//! and summarised on demand.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::approval::ApprovalPolicy;
use super::line_item::{BillingFrequency, LineItem, PricingModel};
use super::summary::{aggregate_quote, QuoteInput, QuoteSummary};
use crate::error::DealDeskError;
use crate::parse::{parse_amount, parse_percent, parse_quantity};
use crate::types::{ComputationOutput, Money, Percent};
use crate::DealDeskResult;

/// Days a quote stays valid after issue.
pub const QUOTE_VALIDITY_DAYS: i64 = 30;

/// Catalogue entry a line is created from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub base_price: Money,
    /// e.g. "per user/year", "per month", "one-time"
    pub pricing_unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteDraft {
    pub quote_id: String,
    pub issued_on: NaiveDate,
    pub valid_until: NaiveDate,
    quote_discount_percent: Percent,
    line_items: Vec<LineItem>,
    next_line: u64,
}

impl QuoteDraft {
    pub fn new(quote_id: impl Into<String>, issued_on: NaiveDate) -> Self {
        Self {
            quote_id: quote_id.into(),
            issued_on,
            valid_until: issued_on + Duration::days(QUOTE_VALIDITY_DAYS),
            quote_discount_percent: Percent::ZERO,
            line_items: Vec::new(),
            next_line: 1,
        }
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn quote_discount_percent(&self) -> Percent {
        self.quote_discount_percent
    }

    /// Quote-level discount from a form field; unreadable input clears it.
    pub fn set_quote_discount(&mut self, raw: &str) -> Percent {
        self.quote_discount_percent = parse_percent(raw);
        tracing::debug!(quote_id = %self.quote_id, discount = %self.quote_discount_percent, "quote discount set");
        self.quote_discount_percent
    }

    /// Add a catalogue product at quantity 1 with no discount. Each product
    /// may appear on a quote only once.
    pub fn add_product(&mut self, product: &Product) -> DealDeskResult<&LineItem> {
        if self.line_items.iter().any(|li| li.product_id == product.id) {
            return Err(DealDeskError::DuplicateProduct(product.id.clone()));
        }

        let id = format!("LI-{}", self.next_line);
        self.next_line += 1;

        let mut item = LineItem::new(id, 1, product.base_price, Percent::ZERO)
            .billed(BillingFrequency::from_pricing_unit(&product.pricing_unit));
        item.product_id = product.id.clone();
        item.product_name = product.name.clone();
        item.category = product.category.clone();
        item.unit = product.pricing_unit.clone();
        item.pricing_model = PricingModel::from_pricing_unit(&product.pricing_unit);

        tracing::debug!(quote_id = %self.quote_id, line_id = %item.id, product = %product.id, "line added");
        self.line_items.push(item);
        let idx = self.line_items.len() - 1;
        Ok(&self.line_items[idx])
    }

    pub fn set_quantity(&mut self, line_id: &str, raw: &str) -> DealDeskResult<&LineItem> {
        let quantity = parse_quantity(raw);
        let item = self.line_mut(line_id)?;
        item.set_quantity(quantity);
        Ok(&*item)
    }

    pub fn set_discount(&mut self, line_id: &str, raw: &str) -> DealDeskResult<&LineItem> {
        let discount = parse_percent(raw);
        let item = self.line_mut(line_id)?;
        item.set_discount(discount);
        Ok(&*item)
    }

    pub fn set_base_price(&mut self, line_id: &str, raw: &str) -> DealDeskResult<&LineItem> {
        let price = parse_amount(raw);
        let item = self.line_mut(line_id)?;
        item.set_base_price(price);
        Ok(&*item)
    }

    pub fn set_billing_frequency(
        &mut self,
        line_id: &str,
        frequency: BillingFrequency,
    ) -> DealDeskResult<&LineItem> {
        let item = self.line_mut(line_id)?;
        item.billing_frequency = frequency;
        Ok(&*item)
    }

    pub fn remove_line(&mut self, line_id: &str) -> DealDeskResult<LineItem> {
        let pos = self
            .line_items
            .iter()
            .position(|li| li.id == line_id)
            .ok_or_else(|| DealDeskError::LineItemNotFound(line_id.to_string()))?;
        Ok(self.line_items.remove(pos))
    }

    pub fn to_input(&self, tax_rate_percent: Percent) -> QuoteInput {
        QuoteInput {
            line_items: self.line_items.clone(),
            quote_discount_percent: self.quote_discount_percent,
            tax_rate_percent,
        }
    }

    pub fn summary(
        &self,
        tax_rate_percent: Percent,
        policy: &ApprovalPolicy,
    ) -> ComputationOutput<QuoteSummary> {
        aggregate_quote(&self.to_input(tax_rate_percent), policy)
    }

    fn line_mut(&mut self, line_id: &str) -> DealDeskResult<&mut LineItem> {
        self.line_items
            .iter_mut()
            .find(|li| li.id == line_id)
            .ok_or_else(|| DealDeskError::LineItemNotFound(line_id.to_string()))
    }
}
