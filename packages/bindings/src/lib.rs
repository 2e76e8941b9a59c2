use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use deal_desk_core::incentives::calculator::calculate_commission;
use deal_desk_core::incentives::payout::{settle_payout, summarize_payouts, PayoutInput, PayoutPolicy, PayoutRecord};
use deal_desk_core::incentives::plan::IncentivePlan;
use deal_desk_core::incentives::simulator::{simulate_payout, SimulationInput};
use deal_desk_core::payments::terms::{build_schedule, PaymentScheduleInput, PaymentTerms};
use deal_desk_core::quotes::approval::{classify_line_discount, ApprovalPolicy};
use deal_desk_core::quotes::discount::QuoteDiscount;
use deal_desk_core::quotes::line_item::compute_line_totals;
use deal_desk_core::quotes::summary::{aggregate_quote, QuoteInput};
use deal_desk_core::parse::{default_quantity, deserialize_amount, deserialize_percent, deserialize_quantity};
use deal_desk_core::{format, parse, Money, Percent};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn from_json<T: DeserializeOwned>(json: &str) -> NapiResult<T> {
    serde_json::from_str(json).map_err(to_napi_error)
}

/// Optional policy argument; absent means the standard thresholds.
fn policy_or_default<T: DeserializeOwned + Default>(json: Option<String>) -> NapiResult<T> {
    json.as_deref().map(from_json).transpose().map(Option::unwrap_or_default)
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct LineTotalInput {
    #[serde(default = "default_quantity", deserialize_with = "deserialize_quantity")]
    quantity: u32,
    #[serde(default, deserialize_with = "deserialize_amount")]
    base_price: Money,
    #[serde(default, deserialize_with = "deserialize_percent")]
    discount_percent: Percent,
}

#[napi]
pub fn line_total(input_json: String, policy_json: Option<String>) -> NapiResult<String> {
    let input: LineTotalInput = from_json(&input_json)?;
    let policy: ApprovalPolicy = policy_or_default(policy_json)?;
    let totals = compute_line_totals(input.quantity.max(1), input.base_price, input.discount_percent);
    let output = serde_json::json!({
        "discount_amount": totals.discount_amount,
        "net_price": totals.net_price,
        "total_price": totals.total_price,
        "discount_tier": classify_line_discount(input.discount_percent, &policy),
    });
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn aggregate(input_json: String, policy_json: Option<String>) -> NapiResult<String> {
    let input: QuoteInput = from_json(&input_json)?;
    let policy: ApprovalPolicy = policy_or_default(policy_json)?;
    let output = aggregate_quote(&input, &policy);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct DiscountInput {
    deal_value: Money,
    discount: QuoteDiscount,
}

#[napi]
pub fn resolve_discount(input_json: String, policy_json: Option<String>) -> NapiResult<String> {
    let input: DiscountInput = from_json(&input_json)?;
    let policy: ApprovalPolicy = policy_or_default(policy_json)?;
    let output = input.discount.resolve(input.deal_value, &policy);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

#[napi]
pub fn payment_template(template_id: String) -> NapiResult<String> {
    let terms = PaymentTerms::template(&template_id)
        .ok_or_else(|| to_napi_error(format!("Unknown payment template '{template_id}'")))?;
    serde_json::to_string(&terms).map_err(to_napi_error)
}

#[napi]
pub fn payment_schedule(input_json: String) -> NapiResult<String> {
    let input: PaymentScheduleInput = from_json(&input_json)?;
    let output = build_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Incentives
// ---------------------------------------------------------------------------

/// Plan JSON is validated on the way in; a malformed plan is rejected here.
#[napi]
pub fn simulate(plan_json: String, input_json: String) -> NapiResult<String> {
    let plan: IncentivePlan = from_json(&plan_json)?;
    let input: SimulationInput = from_json(&input_json)?;
    let output = simulate_payout(&plan, &input);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn commission_breakdown(plan_json: String, input_json: String) -> NapiResult<String> {
    let plan: IncentivePlan = from_json(&plan_json)?;
    let input: SimulationInput = from_json(&input_json)?;
    let output = calculate_commission(&plan, &input);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn settle(input_json: String, policy_json: Option<String>) -> NapiResult<String> {
    let input: PayoutInput = from_json(&input_json)?;
    let policy: PayoutPolicy = policy_or_default(policy_json)?;
    let output = settle_payout(&input, &policy).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn payout_summary(records_json: String) -> NapiResult<String> {
    let records: Vec<PayoutRecord> = from_json(&records_json)?;
    serde_json::to_string(&summarize_payouts(&records)).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Form fields and display
// ---------------------------------------------------------------------------

#[napi]
pub fn parse_quantity(raw: String) -> u32 {
    parse::parse_quantity(&raw)
}

/// Returned as a decimal string to keep full precision across the boundary.
#[napi]
pub fn parse_amount(raw: String) -> String {
    parse::parse_amount(&raw).to_string()
}

#[napi]
pub fn parse_percent(raw: String) -> String {
    parse::parse_percent(&raw).to_string()
}

#[napi]
pub fn format_inr(amount: String, compact: Option<bool>) -> NapiResult<String> {
    let value: Decimal = amount.trim().parse().map_err(to_napi_error)?;
    Ok(if compact.unwrap_or(false) {
        format::format_inr_compact(value)
    } else {
        format::format_inr(value)
    })
}
