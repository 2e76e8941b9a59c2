//! Commission calculator used on the plan administration screen.
//!
//! Unlike the payout simulator this honours the plan's commission model:
//! slab and tiered plans pay marginally across every slab the deal spans,
//! and accelerators/decelerators scale with how far past their threshold
//! the deal lands.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::plan::{CommissionModel, CommissionSlab, IncentivePlan};
use super::simulator::SimulationInput;
use crate::format::format_lakh;
use crate::types::{apply_percent, percent_of, with_metadata, ComputationOutput, Money, Percent};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownKind {
    Base,
    Add,
    Subtract,
}

/// One row of the commission breakdown. Subtractions carry a negative amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownLine {
    pub label: String,
    pub amount: Money,
    pub kind: BreakdownKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionBreakdown {
    pub base_commission: Money,
    /// Portion of the base earned through slabs (zero for flat plans)
    pub slab_commission: Money,
    pub accelerator_bonus: Money,
    pub decelerator_penalty: Money,
    pub discount_penalty: Money,
    pub final_commission: Money,
    pub effective_rate: Percent,
    pub lines: Vec<BreakdownLine>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn calculate_commission(
    plan: &IncentivePlan,
    input: &SimulationInput,
) -> ComputationOutput<CommissionBreakdown> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let mut lines: Vec<BreakdownLine> = Vec::new();
    let model = plan.commission_model();

    // --- Base commission ---
    let (base_commission, slab_commission) = if !plan.slabs().is_empty() && model.uses_slabs() {
        let slab_total = marginal_slab_commission(plan.slabs(), input.deal_value, &mut lines);
        (slab_total, slab_total)
    } else {
        let base = apply_percent(input.deal_value, plan.base_rate());
        lines.push(BreakdownLine {
            label: format!("Base Commission @ {}%", plan.base_rate().normalize()),
            amount: base,
            kind: BreakdownKind::Base,
        });
        (base, Decimal::ZERO)
    };

    // --- Accelerator (scaled by over-achievement) ---
    let mut accelerator_bonus = Decimal::ZERO;
    if model == CommissionModel::Accelerator
        && input.target_achievement_percent >= plan.accelerator_threshold()
    {
        let over = input.target_achievement_percent - plan.accelerator_threshold();
        accelerator_bonus = base_commission * (plan.accelerator_multiplier() - Decimal::ONE) * over
            / Decimal::ONE_HUNDRED;
        lines.push(BreakdownLine {
            label: format!(
                "Accelerator Bonus ({}x after {}%)",
                plan.accelerator_multiplier().normalize(),
                plan.accelerator_threshold().normalize()
            ),
            amount: accelerator_bonus,
            kind: BreakdownKind::Add,
        });
    }

    // --- Decelerator (scaled by margin shortfall) ---
    let mut decelerator_penalty = Decimal::ZERO;
    if matches!(model, CommissionModel::Decelerator | CommissionModel::MarginBased)
        && input.margin_percent < plan.decelerator_threshold()
    {
        let shortfall = plan.decelerator_threshold() - input.margin_percent;
        decelerator_penalty = base_commission
            * (Decimal::ONE - plan.decelerator_multiplier())
            * shortfall
            / Decimal::ONE_HUNDRED;
        lines.push(BreakdownLine {
            label: format!(
                "Margin Decelerator (below {}% margin)",
                plan.decelerator_threshold().normalize()
            ),
            amount: -decelerator_penalty,
            kind: BreakdownKind::Subtract,
        });
    }

    // --- Discount penalty ---
    let mut discount_penalty = Decimal::ZERO;
    if plan.discount_penalty_enabled() && input.discount_percent > Decimal::ZERO {
        discount_penalty = apply_percent(base_commission, plan.discount_penalty_rate()) * input.discount_percent;
        lines.push(BreakdownLine {
            label: format!(
                "Discount Penalty ({}% discount @ {}% penalty rate)",
                input.discount_percent.normalize(),
                plan.discount_penalty_rate().normalize()
            ),
            amount: -discount_penalty,
            kind: BreakdownKind::Subtract,
        });
    }

    let final_commission = base_commission + accelerator_bonus - decelerator_penalty - discount_penalty;
    let effective_rate = percent_of(final_commission, input.deal_value);

    if input.deal_value.is_zero() {
        warnings.push("Deal value is zero; effective rate reported as 0".into());
    }
    if final_commission < Decimal::ZERO {
        warnings.push(format!("Final commission is negative ({final_commission})"));
    }
    if model.uses_slabs() && plan.slabs().is_empty() {
        warnings.push(format!(
            "Plan {} uses a slab model but defines no slabs; base rate applied",
            plan.id()
        ));
    }

    tracing::debug!(plan = plan.id(), ?model, %base_commission, %final_commission, "commission calculated");

    let output = CommissionBreakdown {
        base_commission,
        slab_commission,
        accelerator_bonus,
        decelerator_penalty,
        discount_penalty,
        final_commission,
        effective_rate,
        lines,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    with_metadata(
        "Model-aware commission with marginal slabs and scaled adjustments",
        &serde_json::json!({ "plan": plan, "deal": input }),
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Walk the slabs in order, paying each slab's rate on the part of the deal
/// that falls inside its width.
fn marginal_slab_commission(
    slabs: &[CommissionSlab],
    deal_value: Money,
    lines: &mut Vec<BreakdownLine>,
) -> Money {
    let mut remaining = deal_value;
    let mut total = Decimal::ZERO;

    for slab in slabs {
        let available = remaining.max(Decimal::ZERO);
        let in_slab = match slab.max_value {
            Some(max) => available.min(max - slab.min_value),
            None => available,
        };
        if in_slab <= Decimal::ZERO {
            continue;
        }

        let commission = apply_percent(in_slab, slab.rate);
        total += commission;
        lines.push(BreakdownLine {
            label: slab_label(slab),
            amount: commission,
            kind: BreakdownKind::Add,
        });
        remaining -= in_slab;
    }
    total
}

fn slab_label(slab: &CommissionSlab) -> String {
    let upper = slab
        .max_value
        .map(format_lakh)
        .unwrap_or_else(|| "∞".to_string());
    format!(
        "Slab {} - {} @ {}%",
        format_lakh(slab.min_value),
        upper,
        slab.rate.normalize()
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incentives::plan::RawIncentivePlan;
    use rust_decimal_macros::dec;

    fn plan(model: CommissionModel, slabs: Vec<CommissionSlab>) -> IncentivePlan {
        IncentivePlan::try_from(RawIncentivePlan {
            id: "CALC".into(),
            name: String::new(),
            commission_model: model,
            base_rate: dec!(5),
            slabs,
            discount_penalty_enabled: false,
            discount_penalty_rate: dec!(2),
            accelerator_threshold: dec!(100),
            accelerator_multiplier: dec!(1.5),
            decelerator_threshold: dec!(20),
            decelerator_multiplier: dec!(0.5),
        })
        .unwrap()
    }

    fn tiers() -> Vec<CommissionSlab> {
        vec![
            CommissionSlab { min_value: dec!(0), max_value: Some(dec!(1000000)), rate: dec!(5) },
            CommissionSlab { min_value: dec!(1000000), max_value: None, rate: dec!(8) },
        ]
    }

    fn deal(value: Decimal) -> SimulationInput {
        SimulationInput {
            deal_value: value,
            discount_percent: Decimal::ZERO,
            margin_percent: dec!(30),
            target_achievement_percent: dec!(100),
        }
    }

    #[test]
    fn test_flat_base() {
        let out = calculate_commission(&plan(CommissionModel::FlatPercentage, tiers()), &deal(dec!(2000000)));
        assert_eq!(out.result.base_commission, dec!(100000));
        assert_eq!(out.result.slab_commission, Decimal::ZERO);
        assert_eq!(out.result.lines[0].label, "Base Commission @ 5%");
    }

    #[test]
    fn test_marginal_slabs() {
        let out = calculate_commission(&plan(CommissionModel::Tiered, tiers()), &deal(dec!(2500000)));
        // 10L @ 5% + 15L @ 8% = 50,000 + 1,20,000
        assert_eq!(out.result.base_commission, dec!(170000));
        assert_eq!(out.result.lines.len(), 2);
        assert_eq!(out.result.lines[0].label, "Slab ₹0.0L - ₹10.0L @ 5%");
        assert_eq!(out.result.lines[1].label, "Slab ₹10.0L - ∞ @ 8%");
        assert_eq!(out.result.lines[1].amount, dec!(120000));
    }

    #[test]
    fn test_deal_inside_first_slab() {
        let out = calculate_commission(&plan(CommissionModel::SlabBased, tiers()), &deal(dec!(400000)));
        assert_eq!(out.result.base_commission, dec!(20000));
        assert_eq!(out.result.lines.len(), 1);
    }

    #[test]
    fn test_scaled_accelerator() {
        let mut input = deal(dec!(1000000));
        input.target_achievement_percent = dec!(120);
        let out = calculate_commission(&plan(CommissionModel::Accelerator, vec![]), &input);
        // 50,000 * 0.5 * 20 / 100
        assert_eq!(out.result.accelerator_bonus, dec!(5000));
        assert_eq!(out.result.final_commission, dec!(55000));
    }

    #[test]
    fn test_accelerator_ignored_for_other_models() {
        let mut input = deal(dec!(1000000));
        input.target_achievement_percent = dec!(150);
        let out = calculate_commission(&plan(CommissionModel::FlatPercentage, vec![]), &input);
        assert_eq!(out.result.accelerator_bonus, Decimal::ZERO);
    }

    #[test]
    fn test_scaled_decelerator() {
        let mut input = deal(dec!(1000000));
        input.margin_percent = dec!(10);
        let out = calculate_commission(&plan(CommissionModel::MarginBased, vec![]), &input);
        // 50,000 * 0.5 * 10 / 100
        assert_eq!(out.result.decelerator_penalty, dec!(2500));
        let last = out.result.lines.last().unwrap();
        assert_eq!(last.amount, dec!(-2500));
        assert_eq!(last.kind, BreakdownKind::Subtract);
    }

    #[test]
    fn test_slab_model_without_slabs_warns() {
        let out = calculate_commission(&plan(CommissionModel::SlabBased, vec![]), &deal(dec!(100)));
        assert_eq!(out.result.base_commission, dec!(5));
        assert!(out.warnings.iter().any(|w| w.contains("no slabs")));
    }
}
