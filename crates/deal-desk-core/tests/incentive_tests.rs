use chrono::NaiveDate;
use deal_desk_core::incentives::calculator::calculate_commission;
use deal_desk_core::incentives::payout::{
    settle_payout, ClawbackEvent, ClawbackKind, PayoutInput, PayoutPolicy,
};
use deal_desk_core::incentives::plan::{CommissionModel, CommissionSlab, IncentivePlan, RawIncentivePlan};
use deal_desk_core::incentives::simulator::{simulate_payout, simulate_selected, SimulationInput};
use deal_desk_core::DealDeskError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

fn enterprise_raw() -> RawIncentivePlan {
    RawIncentivePlan {
        id: "PLAN-ENT-FY26".into(),
        name: "Enterprise AE".into(),
        commission_model: CommissionModel::SlabBased,
        base_rate: dec!(5),
        slabs: vec![
            CommissionSlab { min_value: dec!(0), max_value: Some(dec!(1_000_000)), rate: dec!(5) },
            CommissionSlab { min_value: dec!(1_000_001), max_value: None, rate: dec!(7) },
        ],
        discount_penalty_enabled: true,
        discount_penalty_rate: dec!(2),
        accelerator_threshold: dec!(90),
        accelerator_multiplier: dec!(1.2),
        decelerator_threshold: dec!(25),
        decelerator_multiplier: dec!(0.8),
    }
}

fn enterprise_plan() -> IncentivePlan {
    IncentivePlan::try_from(enterprise_raw()).unwrap()
}

fn deal(value: Decimal, discount: Decimal, margin: Decimal, achievement: Decimal) -> SimulationInput {
    SimulationInput {
        deal_value: value,
        discount_percent: discount,
        margin_percent: margin,
        target_achievement_percent: achievement,
    }
}

// ===========================================================================
// Payout simulator
// ===========================================================================

#[test]
fn test_reference_deal() {
    let out = simulate_payout(&enterprise_plan(), &deal(dec!(1_000_000), dec!(5), dec!(30), dec!(85)));
    let r = &out.result;
    assert_eq!(r.slab_rate, dec!(5));
    assert_eq!(r.base_commission, dec!(50_000));
    // 50,000 * 5 * 2 / 100
    assert_eq!(r.discount_penalty, dec!(5_000));
    assert_eq!(r.accelerator_bonus, Decimal::ZERO);
    assert_eq!(r.decelerator_reduction, Decimal::ZERO);
    assert_eq!(r.final_commission, dec!(45_000));
    assert_eq!(r.effective_rate, dec!(4.5));
}

#[test]
fn test_slab_first_match_at_boundary() {
    let mut raw = enterprise_raw();
    raw.slabs = vec![
        CommissionSlab { min_value: dec!(0), max_value: Some(dec!(499_999)), rate: dec!(5) },
        CommissionSlab { min_value: dec!(500_000), max_value: None, rate: dec!(8) },
    ];
    let plan = IncentivePlan::try_from(raw).unwrap();
    let r = simulate_payout(&plan, &deal(dec!(500_000), dec!(0), dec!(30), dec!(50))).result;
    assert_eq!(r.slab_rate, dec!(8));
    assert_eq!(r.slab_index, Some(1));
}

#[test]
fn test_overlapping_slabs_take_first_in_order() {
    let mut raw = enterprise_raw();
    raw.slabs = vec![
        CommissionSlab { min_value: dec!(0), max_value: None, rate: dec!(3) },
        CommissionSlab { min_value: dec!(100_000), max_value: None, rate: dec!(9) },
    ];
    let plan = IncentivePlan::try_from(raw).unwrap();
    let out = simulate_payout(&plan, &deal(dec!(200_000), dec!(0), dec!(30), dec!(50)));
    assert_eq!(out.result.slab_rate, dec!(3));
    assert!(out.warnings.iter().any(|w| w.contains("overlapping")));
}

#[test]
fn test_no_matching_slab_uses_base_rate() {
    let mut raw = enterprise_raw();
    raw.base_rate = dec!(4);
    raw.slabs = vec![CommissionSlab { min_value: dec!(5_000_000), max_value: None, rate: dec!(9) }];
    let plan = IncentivePlan::try_from(raw).unwrap();
    let r = simulate_payout(&plan, &deal(dec!(100_000), dec!(0), dec!(30), dec!(50))).result;
    assert_eq!(r.slab_index, None);
    assert_eq!(r.base_commission, dec!(4_000));
}

#[test]
fn test_accelerator_and_decelerator_together() {
    let mut raw = enterprise_raw();
    raw.accelerator_multiplier = dec!(1.5);
    raw.decelerator_multiplier = dec!(0.75);
    let plan = IncentivePlan::try_from(raw).unwrap();

    let r = simulate_payout(&plan, &deal(dec!(2_000_000), dec!(3), dec!(20), dec!(95))).result;
    assert_eq!(r.slab_rate, dec!(7));
    assert_eq!(r.base_commission, dec!(140_000));
    // 140,000 * 3 * 2 / 100
    assert_eq!(r.discount_penalty, dec!(8_400));
    assert_eq!(r.accelerator_bonus, dec!(70_000));
    assert_eq!(r.decelerator_reduction, dec!(35_000));
    assert_eq!(
        r.final_commission,
        r.base_commission - r.discount_penalty + r.accelerator_bonus - r.decelerator_reduction
    );
    assert_eq!(r.final_commission, dec!(166_600));
    assert_eq!(r.effective_rate, dec!(8.33));
}

#[test]
fn test_zero_deal_effective_rate_is_zero() {
    let r = simulate_payout(&enterprise_plan(), &deal(Decimal::ZERO, dec!(5), dec!(30), dec!(85))).result;
    assert_eq!(r.effective_rate, Decimal::ZERO);
}

#[test]
fn test_negative_commission_and_wide_discount_not_clamped() {
    let out = simulate_payout(&enterprise_plan(), &deal(dec!(1_000_000), dec!(150), dec!(30), dec!(85)));
    // penalty = 50,000 * 150 * 2 / 100 = 150,000
    assert_eq!(out.result.discount_penalty, dec!(150_000));
    assert_eq!(out.result.final_commission, dec!(-100_000));
    assert!(out.warnings.iter().any(|w| w.contains("outside 0-100%")));
    assert!(out.warnings.iter().any(|w| w.contains("negative")));
}

#[test]
fn test_simulation_requires_selected_plan() {
    let plans = vec![enterprise_plan()];
    let input = deal(dec!(1_000_000), dec!(5), dec!(30), dec!(85));
    assert!(simulate_selected(&plans, None, &input).is_none());
    assert!(simulate_selected(&[], Some("PLAN-ENT-FY26"), &input).is_none());
    assert!(simulate_selected(&plans, Some("PLAN-ENT-FY26"), &input).is_some());
}

// ===========================================================================
// Plan validation at the boundary
// ===========================================================================

#[test]
fn test_plan_from_json() {
    let json = r#"{
        "id": "PLAN-SMB",
        "name": "SMB Inside Sales",
        "commission_model": "flat_percentage",
        "base_rate": "6",
        "accelerator_threshold": "100",
        "accelerator_multiplier": "1.25",
        "decelerator_threshold": "15",
        "decelerator_multiplier": "0.9"
    }"#;
    let plan: IncentivePlan = serde_json::from_str(json).unwrap();
    assert_eq!(plan.base_rate(), dec!(6));
    assert!(plan.slabs().is_empty());
    assert!(!plan.discount_penalty_enabled());
}

#[test]
fn test_malformed_plan_rejected() {
    let mut raw = enterprise_raw();
    raw.decelerator_multiplier = dec!(-0.5);
    assert!(matches!(
        IncentivePlan::try_from(raw),
        Err(DealDeskError::InvalidPlan { .. })
    ));
}

// ===========================================================================
// Commission calculator
// ===========================================================================

#[test]
fn test_calculator_marginal_vs_simulator_first_match() {
    let plan = enterprise_plan();
    let input = deal(dec!(2_000_000), dec!(0), dec!(30), dec!(50));
    let calc = calculate_commission(&plan, &input).result;
    let sim = simulate_payout(&plan, &input).result;
    // 10L @ 5% + 10L @ 7%
    assert_eq!(calc.base_commission, dec!(120_000));
    assert_eq!(sim.base_commission, dec!(140_000));
}

// ===========================================================================
// Payout settlement
// ===========================================================================

#[test]
fn test_settlement_with_clawback() {
    let input = PayoutInput {
        gross_amount: dec!(200_000),
        clawback_events: vec![
            ClawbackEvent {
                deal_id: "DL-7".into(),
                kind: ClawbackKind::PaymentDefault,
                deal_closed_on: NaiveDate::from_ymd_opt(2026, 5, 10).unwrap(),
                event_on: NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
                commission_amount: dec!(30_000),
            },
            ClawbackEvent {
                deal_id: "DL-2".into(),
                kind: ClawbackKind::Cancellation,
                deal_closed_on: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
                event_on: NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
                commission_amount: dec!(12_000),
            },
        ],
    };
    let out = settle_payout(&input, &PayoutPolicy::default()).unwrap();
    assert_eq!(out.result.holdback_amount, dec!(20_000));
    assert_eq!(out.result.clawback_amount, dec!(30_000));
    assert_eq!(out.result.net_amount, dec!(150_000));
    assert_eq!(out.result.clawbacks.len(), 1);
    assert_eq!(out.warnings.len(), 1);
}
