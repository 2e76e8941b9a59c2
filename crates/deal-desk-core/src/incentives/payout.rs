use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::DealDeskError;
use crate::types::{apply_percent, with_metadata, ComputationOutput, Money, Percent};
use crate::DealDeskResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    PendingCalculation,
    Calculated,
    PendingApproval,
    Approved,
    OnHold,
    Released,
    ClawedBack,
}

/// Retention and reversal rules applied when settling commission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoutPolicy {
    /// Share of gross commission held back until collection
    pub holdback_percent: Percent,
    /// Days after deal closure during which clawbacks apply (inclusive)
    pub clawback_window_days: i64,
    pub payment_default_clawback_percent: Percent,
    pub cancellation_clawback_percent: Percent,
}

impl Default for PayoutPolicy {
    fn default() -> Self {
        Self {
            holdback_percent: dec!(10),
            clawback_window_days: 90,
            payment_default_clawback_percent: dec!(100),
            cancellation_clawback_percent: dec!(100),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClawbackKind {
    PaymentDefault,
    Cancellation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClawbackEvent {
    pub deal_id: String,
    pub kind: ClawbackKind,
    pub deal_closed_on: NaiveDate,
    pub event_on: NaiveDate,
    /// Commission previously paid on the affected deal
    pub commission_amount: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutInput {
    pub gross_amount: Money,
    #[serde(default)]
    pub clawback_events: Vec<ClawbackEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedClawback {
    pub deal_id: String,
    pub kind: ClawbackKind,
    pub days_after_closure: i64,
    pub amount: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutSettlement {
    pub gross_amount: Money,
    pub holdback_amount: Money,
    pub clawback_amount: Money,
    pub net_amount: Money,
    pub clawbacks: Vec<AppliedClawback>,
}

/// A payout as listed on the payouts dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutRecord {
    pub id: String,
    #[serde(default)]
    pub salesperson: String,
    pub net_amount: Money,
    pub status: PayoutStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutSummary {
    /// Pending approval plus approved but not yet released
    pub pending_amount: Money,
    pub released_amount: Money,
    pub on_hold_amount: Money,
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Settle a gross commission: retain the holdback and reverse commission on
/// deals that defaulted or were cancelled inside the clawback window.
///
/// net = gross - holdback - Σ clawback
pub fn settle_payout(
    input: &PayoutInput,
    policy: &PayoutPolicy,
) -> DealDeskResult<ComputationOutput<PayoutSettlement>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.gross_amount < Decimal::ZERO {
        return Err(DealDeskError::InvalidInput {
            field: "gross_amount".into(),
            reason: "Gross commission cannot be negative".into(),
        });
    }
    if policy.clawback_window_days < 0 {
        return Err(DealDeskError::InvalidInput {
            field: "clawback_window_days".into(),
            reason: "Clawback window cannot be negative".into(),
        });
    }

    let holdback_amount = apply_percent(input.gross_amount, policy.holdback_percent);

    let mut clawbacks: Vec<AppliedClawback> = Vec::new();
    for event in &input.clawback_events {
        let days = (event.event_on - event.deal_closed_on).num_days();
        if days < 0 {
            return Err(DealDeskError::InvalidInput {
                field: format!("clawback_events[{}].event_on", event.deal_id),
                reason: "Event precedes deal closure".into(),
            });
        }
        if days > policy.clawback_window_days {
            warnings.push(format!(
                "Deal {}: {:?} {days} days after closure is outside the {}-day clawback window; ignored",
                event.deal_id, event.kind, policy.clawback_window_days
            ));
            continue;
        }
        let rule = match event.kind {
            ClawbackKind::PaymentDefault => policy.payment_default_clawback_percent,
            ClawbackKind::Cancellation => policy.cancellation_clawback_percent,
        };
        clawbacks.push(AppliedClawback {
            deal_id: event.deal_id.clone(),
            kind: event.kind,
            days_after_closure: days,
            amount: apply_percent(event.commission_amount, rule),
        });
    }

    let clawback_amount: Money = clawbacks.iter().map(|c| c.amount).sum();
    let net_amount = input.gross_amount - holdback_amount - clawback_amount;
    if net_amount < Decimal::ZERO {
        warnings.push(format!(
            "Clawbacks exceed the payable amount; net payout is negative ({net_amount})"
        ));
    }

    tracing::debug!(%holdback_amount, %clawback_amount, %net_amount, "payout settled");

    let output = PayoutSettlement {
        gross_amount: input.gross_amount,
        holdback_amount,
        clawback_amount,
        net_amount,
        clawbacks,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Gross less retention holdback and in-window clawbacks",
        &serde_json::json!({ "payout": input, "policy": policy }),
        warnings,
        elapsed,
        output,
    ))
}

/// Dashboard totals over a set of payouts.
pub fn summarize_payouts(records: &[PayoutRecord]) -> PayoutSummary {
    let total_for = |statuses: &[PayoutStatus]| -> Money {
        records
            .iter()
            .filter(|r| statuses.contains(&r.status))
            .map(|r| r.net_amount)
            .sum()
    };
    PayoutSummary {
        pending_amount: total_for(&[PayoutStatus::PendingApproval, PayoutStatus::Approved]),
        released_amount: total_for(&[PayoutStatus::Released]),
        on_hold_amount: total_for(&[PayoutStatus::OnHold]),
        count: records.len(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
