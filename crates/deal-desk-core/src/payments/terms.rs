use rust_decimal::{Decimal, RoundingStrategy};
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
#[serde(rename_all = "kebab-case")]
pub enum DueCondition {
    WithPo,
    OnDelivery,
    OnUat,
    DaysAfterUat,
    NetDays,
    YearlyAdvance,
    QuarterlyAdvance,
    MonthlyArrears,
}

impl DueCondition {
    pub fn label(&self) -> &'static str {
        match self {
            DueCondition::WithPo => "With Purchase Order",
            DueCondition::OnDelivery => "On Delivery",
            DueCondition::OnUat => "On UAT Completion",
            DueCondition::DaysAfterUat => "Days After UAT",
            DueCondition::NetDays => "Net Days",
            DueCondition::YearlyAdvance => "Yearly Advance",
            DueCondition::QuarterlyAdvance => "Quarterly Advance",
            DueCondition::MonthlyArrears => "Monthly Arrears",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMilestone {
    pub name: String,
    pub percentage: Percent,
    pub due_condition: DueCondition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_days: Option<u32>,
}

impl PaymentMilestone {
    fn new(name: &str, percentage: Decimal, due_condition: DueCondition) -> Self {
        Self {
            name: name.to_string(),
            percentage,
            due_condition,
            due_days: None,
        }
    }

    fn due_in(mut self, days: u32) -> Self {
        self.due_days = Some(days);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTerms {
    pub template_id: String,
    pub template_name: String,
    pub milestones: Vec<PaymentMilestone>,
    pub credit_days: u32,
    pub requires_po: bool,
    pub requires_approval: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledPayment {
    pub milestone: String,
    pub percentage: Percent,
    pub amount: Money,
    pub due_condition: DueCondition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSchedule {
    pub template_id: String,
    pub grand_total: Money,
    pub payments: Vec<ScheduledPayment>,
    pub credit_days: u32,
    pub requires_po: bool,
    pub requires_approval: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentScheduleInput {
    pub terms: PaymentTerms,
    pub grand_total: Money,
}

/// Identifiers of the built-in templates, in display order.
pub const TEMPLATE_IDS: [&str; 6] = [
    "standard-100",
    "standard-50-50",
    "implementation",
    "subscription-yearly",
    "net-30",
    "custom",
];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

impl PaymentTerms {
    /// Built-in template by id.
    pub fn template(template_id: &str) -> Option<Self> {
        use DueCondition::*;
        let (name, milestones, credit_days, requires_po, requires_approval) = match template_id {
            "standard-100" => (
                "100% Advance",
                vec![PaymentMilestone::new("Full Payment", dec!(100), WithPo)],
                0,
                true,
                false,
            ),
            "standard-50-50" => (
                "50-50 Split",
                vec![
                    PaymentMilestone::new("Advance", dec!(50), WithPo),
                    PaymentMilestone::new("On Completion", dec!(50), OnDelivery),
                ],
                0,
                true,
                false,
            ),
            "implementation" => (
                "Implementation (50-30-20)",
                vec![
                    PaymentMilestone::new("Project Kickoff", dec!(50), WithPo),
                    PaymentMilestone::new("UAT Completion", dec!(30), OnUat),
                    PaymentMilestone::new("Go-Live", dec!(20), DaysAfterUat).due_in(30),
                ],
                0,
                true,
                false,
            ),
            "subscription-yearly" => (
                "Yearly Subscription",
                vec![PaymentMilestone::new("Annual Fee", dec!(100), YearlyAdvance)],
                0,
                true,
                false,
            ),
            "net-30" => (
                "Net 30 Days",
                vec![PaymentMilestone::new("Full Payment", dec!(100), NetDays).due_in(30)],
                30,
                false,
                true,
            ),
            "custom" => ("Custom Terms", Vec::new(), 0, false, true),
            _ => return None,
        };
        Some(Self {
            template_id: template_id.to_string(),
            template_name: name.to_string(),
            milestones,
            credit_days,
            requires_po,
            requires_approval,
        })
    }

    /// Custom terms. Every milestone must carry a positive share and the
    /// shares must total exactly 100%.
    pub fn custom(milestones: Vec<PaymentMilestone>) -> DealDeskResult<Self> {
        let terms = Self {
            milestones,
            ..Self::template("custom").ok_or_else(|| {
                DealDeskError::InvalidPaymentTerms("custom template missing".into())
            })?
        };
        terms.validate()?;
        Ok(terms)
    }

    pub fn total_percentage(&self) -> Percent {
        self.milestones.iter().map(|m| m.percentage).sum()
    }

    pub fn validate(&self) -> DealDeskResult<()> {
        if self.milestones.is_empty() {
            return Err(DealDeskError::InvalidPaymentTerms(
                "At least one milestone is required".into(),
            ));
        }
        if let Some(m) = self.milestones.iter().find(|m| m.percentage <= Decimal::ZERO) {
            return Err(DealDeskError::InvalidPaymentTerms(format!(
                "Milestone '{}' must have a positive percentage",
                m.name
            )));
        }
        let total = self.total_percentage();
        if total != Decimal::ONE_HUNDRED {
            return Err(DealDeskError::InvalidPaymentTerms(format!(
                "Milestone percentages must total 100%, got {total}%"
            )));
        }
        Ok(())
    }
}

/// Split a quote's grand total across the payment milestones.
///
/// Each amount is rounded to paise; the final milestone takes whatever
/// remains so the schedule always sums to the grand total.
pub fn build_schedule(input: &PaymentScheduleInput) -> DealDeskResult<ComputationOutput<PaymentSchedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let terms = &input.terms;

    terms.validate()?;
    if input.grand_total < Decimal::ZERO {
        warnings.push(format!(
            "Grand total is negative ({}); schedule amounts are negative",
            input.grand_total
        ));
    }

    let last = terms.milestones.len() - 1;
    let mut allocated = Decimal::ZERO;
    let mut payments = Vec::with_capacity(terms.milestones.len());
    for (idx, m) in terms.milestones.iter().enumerate() {
        let amount = if idx == last {
            input.grand_total - allocated
        } else {
            apply_percent(input.grand_total, m.percentage)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
        };
        allocated += amount;
        payments.push(ScheduledPayment {
            milestone: m.name.clone(),
            percentage: m.percentage,
            amount,
            due_condition: m.due_condition,
            due_days: m.due_days,
        });
    }

    let output = PaymentSchedule {
        template_id: terms.template_id.clone(),
        grand_total: input.grand_total,
        payments,
        credit_days: terms.credit_days,
        requires_po: terms.requires_po,
        requires_approval: terms.requires_approval,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Milestone split of grand total, remainder on final milestone",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_templates_resolve() {
        for id in TEMPLATE_IDS {
            let t = PaymentTerms::template(id).unwrap();
            assert_eq!(t.template_id, id);
            if id != "custom" {
                assert!(t.validate().is_ok(), "{id} should balance");
            }
        }
        assert!(PaymentTerms::template("net-45").is_none());
    }

    #[test]
    fn test_implementation_template() {
        let t = PaymentTerms::template("implementation").unwrap();
        assert_eq!(t.milestones.len(), 3);
        assert_eq!(t.milestones[2].due_days, Some(30));
        assert_eq!(t.milestones[2].due_condition, DueCondition::DaysAfterUat);
    }

    #[test]
    fn test_custom_must_total_100() {
        let err = PaymentTerms::custom(vec![
            PaymentMilestone::new("Advance", dec!(40), DueCondition::WithPo),
            PaymentMilestone::new("Delivery", dec!(40), DueCondition::OnDelivery),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("100%"));
    }

    #[test]
    fn test_custom_rejects_zero_share() {
        let result = PaymentTerms::custom(vec![
            PaymentMilestone::new("Advance", dec!(100), DueCondition::WithPo),
            PaymentMilestone::new("Nothing", dec!(0), DueCondition::OnDelivery),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_schedule_remainder_on_last() {
        let terms = PaymentTerms::custom(vec![
            PaymentMilestone::new("A", dec!(33.33), DueCondition::WithPo),
            PaymentMilestone::new("B", dec!(33.33), DueCondition::OnDelivery),
            PaymentMilestone::new("C", dec!(33.34), DueCondition::OnUat),
        ])
        .unwrap();
        let input = PaymentScheduleInput { terms, grand_total: dec!(1000.01) };
        let s = build_schedule(&input).unwrap().result;
        let total: Decimal = s.payments.iter().map(|p| p.amount).sum();
        assert_eq!(total, dec!(1000.01));
        assert_eq!(s.payments[0].amount, dec!(333.30));
    }

    #[test]
    fn test_schedule_from_empty_custom_rejected() {
        let input = PaymentScheduleInput {
            terms: PaymentTerms::template("custom").unwrap(),
            grand_total: dec!(100),
        };
        assert!(build_schedule(&input).is_err());
    }

    #[test]
    fn test_due_condition_serde() {
        let json = serde_json::to_string(&DueCondition::DaysAfterUat).unwrap();
        assert_eq!(json, "\"days-after-uat\"");
        assert_eq!(DueCondition::WithPo.label(), "With Purchase Order");
    }
}
