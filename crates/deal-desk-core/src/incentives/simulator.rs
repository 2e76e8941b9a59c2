use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::plan::IncentivePlan;
use crate::types::{apply_percent, percent_of, with_metadata, ComputationOutput, Money, Percent};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// A hypothetical deal to price against a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationInput {
    pub deal_value: Money,
    #[serde(default)]
    pub discount_percent: Percent,
    pub margin_percent: Percent,
    #[serde(alias = "target_achievement")]
    pub target_achievement_percent: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub deal_value: Money,
    /// Index of the matched slab; `None` when the plan's base rate applied
    pub slab_index: Option<usize>,
    pub slab_rate: Percent,
    pub base_commission: Money,
    pub discount_penalty: Money,
    pub accelerator_bonus: Money,
    pub decelerator_reduction: Money,
    pub final_commission: Money,
    /// Final commission as a percentage of deal value (0 for a zero deal)
    pub effective_rate: Percent,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Simulate the payout a plan would produce for one deal.
///
/// rate     = first slab containing the deal value, else the base rate
/// base     = deal * rate / 100
/// penalty  = base * discount * penalty_rate / 100      (if enabled and discount > 0)
/// bonus    = base * (accel_mult - 1)                   (if achievement >= accel threshold)
/// decel    = base * (1 - decel_mult)                   (if margin < decel threshold)
/// final    = base - penalty + bonus - decel
///
/// No clamping anywhere: a negative final commission is returned as computed.
pub fn simulate_payout(
    plan: &IncentivePlan,
    input: &SimulationInput,
) -> ComputationOutput<SimulationResult> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    // --- Slab selection (first match wins) ---
    let (slab_index, slab_rate) = match plan.matching_slab(input.deal_value) {
        Some((idx, slab)) => (Some(idx), slab.rate),
        None => (None, plan.base_rate()),
    };
    tracing::debug!(plan = plan.id(), ?slab_index, %slab_rate, "slab selected");

    let base_commission = apply_percent(input.deal_value, slab_rate);

    // --- Adjustments ---
    let discount_penalty = if plan.discount_penalty_enabled() && input.discount_percent > Decimal::ZERO {
        base_commission * input.discount_percent * plan.discount_penalty_rate() / Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    let accelerator_applies = input.target_achievement_percent >= plan.accelerator_threshold();
    let accelerator_bonus = if accelerator_applies {
        base_commission * (plan.accelerator_multiplier() - Decimal::ONE)
    } else {
        Decimal::ZERO
    };

    let decelerator_applies = input.margin_percent < plan.decelerator_threshold();
    let decelerator_reduction = if decelerator_applies {
        base_commission * (Decimal::ONE - plan.decelerator_multiplier())
    } else {
        Decimal::ZERO
    };

    let final_commission = base_commission - discount_penalty + accelerator_bonus - decelerator_reduction;
    let effective_rate = percent_of(final_commission, input.deal_value);

    tracing::debug!(
        plan = plan.id(),
        %base_commission,
        %discount_penalty,
        %accelerator_bonus,
        %decelerator_reduction,
        %final_commission,
        "payout simulated"
    );

    // --- Warnings ---
    let overlaps = plan.overlapping_slabs();
    if !overlaps.is_empty() {
        warnings.push(format!(
            "Plan {} has overlapping slabs {overlaps:?}; the first matching slab was used",
            plan.id()
        ));
    }
    if input.deal_value.is_zero() {
        warnings.push("Deal value is zero; effective rate reported as 0".into());
    } else if input.deal_value < Decimal::ZERO {
        warnings.push(format!("Deal value is negative ({})", input.deal_value));
    }
    if input.discount_percent > Decimal::ONE_HUNDRED || input.discount_percent < Decimal::ZERO {
        warnings.push(format!(
            "Discount {}% is outside 0-100%; applied as given",
            input.discount_percent
        ));
    }
    if accelerator_applies && plan.accelerator_multiplier() < Decimal::ONE {
        warnings.push(format!(
            "Accelerator multiplier {} is below 1; the bonus is negative",
            plan.accelerator_multiplier()
        ));
    }
    if decelerator_applies && plan.decelerator_multiplier() > Decimal::ONE {
        warnings.push(format!(
            "Decelerator multiplier {} is above 1; the reduction acts as a bonus",
            plan.decelerator_multiplier()
        ));
    }
    if final_commission < Decimal::ZERO {
        warnings.push(format!("Final commission is negative ({final_commission})"));
    }

    let output = SimulationResult {
        deal_value: input.deal_value,
        slab_index,
        slab_rate,
        base_commission,
        discount_penalty,
        accelerator_bonus,
        decelerator_reduction,
        final_commission,
        effective_rate,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    with_metadata(
        "First-match slab rate with discount penalty, accelerator and decelerator",
        &serde_json::json!({ "plan": plan, "deal": input }),
        warnings,
        elapsed,
        output,
    )
}

/// Run the simulator for the plan picked in a selector. Returns `None` (a
/// no-op) when nothing is selected or the id matches no plan.
pub fn simulate_selected(
    plans: &[IncentivePlan],
    selected_plan_id: Option<&str>,
    input: &SimulationInput,
) -> Option<ComputationOutput<SimulationResult>> {
    let id = selected_plan_id?;
    let Some(plan) = plans.iter().find(|p| p.id() == id) else {
        tracing::debug!(plan = id, "no plan with this id; simulation skipped");
        return None;
    };
    Some(simulate_payout(plan, input))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
