use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::format::format_inr_compact;
use crate::types::{Money, Percent};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Minimum role that must sign off a quote. Ordered by authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ApprovalTier {
    #[serde(rename = "Auto-Approved")]
    AutoApproved,
    #[serde(rename = "Sales Manager")]
    SalesManager,
    #[serde(rename = "Finance Head")]
    FinanceHead,
    #[serde(rename = "CEO")]
    Ceo,
}

impl ApprovalTier {
    pub fn label(&self) -> &'static str {
        match self {
            ApprovalTier::AutoApproved => "Auto-Approved",
            ApprovalTier::SalesManager => "Sales Manager",
            ApprovalTier::FinanceHead => "Finance Head",
            ApprovalTier::Ceo => "CEO",
        }
    }

    pub fn requires_approval(&self) -> bool {
        *self != ApprovalTier::AutoApproved
    }
}

impl std::fmt::Display for ApprovalTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Escalation thresholds. All comparisons are strict (`>`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApprovalPolicy {
    /// Grand total above which the CEO must approve regardless of discount
    pub ceo_deal_value: Money,
    /// Discount above which Finance Head approval is needed
    pub finance_discount_percent: Percent,
    /// Discount above which Sales Manager approval is needed
    pub manager_discount_percent: Percent,
    /// Quote-level discount above which the discount control escalates to the CEO
    pub ceo_discount_percent: Percent,
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self {
            ceo_deal_value: dec!(10_000_000),
            finance_discount_percent: dec!(10),
            manager_discount_percent: dec!(5),
            ceo_discount_percent: dec!(15),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalDecision {
    pub tier: ApprovalTier,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Whole-quote approval routing.
///
/// Ordered cascade, first match wins:
/// 1. grand total above `ceo_deal_value` → CEO
/// 2. any line discount or the quote discount above `finance_discount_percent` → Finance Head
/// 3. any line discount or the quote discount above `manager_discount_percent` → Sales Manager
/// 4. otherwise auto-approved
pub fn classify_quote(
    grand_total: Money,
    max_line_discount: Percent,
    quote_discount: Percent,
    policy: &ApprovalPolicy,
) -> ApprovalDecision {
    let decision = if grand_total > policy.ceo_deal_value {
        ApprovalDecision {
            tier: ApprovalTier::Ceo,
            reason: format!("Deal value > {}", format_inr_compact(policy.ceo_deal_value)),
        }
    } else if max_line_discount > policy.finance_discount_percent
        || quote_discount > policy.finance_discount_percent
    {
        ApprovalDecision {
            tier: ApprovalTier::FinanceHead,
            reason: discount_reason(policy.finance_discount_percent),
        }
    } else if max_line_discount > policy.manager_discount_percent
        || quote_discount > policy.manager_discount_percent
    {
        ApprovalDecision {
            tier: ApprovalTier::SalesManager,
            reason: discount_reason(policy.manager_discount_percent),
        }
    } else {
        ApprovalDecision {
            tier: ApprovalTier::AutoApproved,
            reason: "Within standard limits".into(),
        }
    };

    tracing::debug!(
        %grand_total,
        %max_line_discount,
        %quote_discount,
        tier = %decision.tier,
        "quote approval classified"
    );
    decision
}

/// Per-line warning badge. Never escalates to the CEO: deal value is a
/// whole-quote concern.
pub fn classify_line_discount(discount_percent: Percent, policy: &ApprovalPolicy) -> ApprovalTier {
    if discount_percent > policy.finance_discount_percent {
        ApprovalTier::FinanceHead
    } else if discount_percent > policy.manager_discount_percent {
        ApprovalTier::SalesManager
    } else {
        ApprovalTier::AutoApproved
    }
}

/// Tier shown on the quote-level discount control, driven by discount depth only.
pub fn classify_discount_depth(discount_percent: Percent, policy: &ApprovalPolicy) -> ApprovalTier {
    if discount_percent > policy.ceo_discount_percent {
        ApprovalTier::Ceo
    } else {
        classify_line_discount(discount_percent, policy)
    }
}

fn discount_reason(threshold: Decimal) -> String {
    format!("Discount > {}%", threshold.normalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(total: Decimal, line: Decimal, quote: Decimal) -> ApprovalTier {
        classify_quote(total, line, quote, &ApprovalPolicy::default()).tier
    }

    #[test]
    fn test_value_threshold_is_strict() {
        assert_eq!(classify(dec!(10_000_000), dec!(0), dec!(0)), ApprovalTier::AutoApproved);
        assert_eq!(classify(dec!(10_000_001), dec!(0), dec!(0)), ApprovalTier::Ceo);
    }

    #[test]
    fn test_finance_threshold_is_strict() {
        assert_eq!(classify(dec!(100), dec!(10), dec!(0)), ApprovalTier::SalesManager);
        assert_eq!(classify(dec!(100), dec!(10.01), dec!(0)), ApprovalTier::FinanceHead);
        assert_eq!(classify(dec!(100), dec!(0), dec!(10.01)), ApprovalTier::FinanceHead);
    }

    #[test]
    fn test_manager_threshold_is_strict() {
        assert_eq!(classify(dec!(100), dec!(5), dec!(5)), ApprovalTier::AutoApproved);
        assert_eq!(classify(dec!(100), dec!(5.01), dec!(0)), ApprovalTier::SalesManager);
        assert_eq!(classify(dec!(100), dec!(0), dec!(5.01)), ApprovalTier::SalesManager);
    }

    #[test]
    fn test_value_checked_before_discount() {
        let decision = classify_quote(
            dec!(20_000_000),
            dec!(25),
            dec!(0),
            &ApprovalPolicy::default(),
        );
        assert_eq!(decision.tier, ApprovalTier::Ceo);
        assert_eq!(decision.reason, "Deal value > ₹1.00 Cr");
    }

    #[test]
    fn test_reasons() {
        let policy = ApprovalPolicy::default();
        assert_eq!(
            classify_quote(dec!(1), dec!(11), dec!(0), &policy).reason,
            "Discount > 10%"
        );
        assert_eq!(
            classify_quote(dec!(1), dec!(6), dec!(0), &policy).reason,
            "Discount > 5%"
        );
        assert_eq!(
            classify_quote(dec!(1), dec!(0), dec!(0), &policy).reason,
            "Within standard limits"
        );
    }

    #[test]
    fn test_line_badge_never_ceo() {
        let policy = ApprovalPolicy::default();
        assert_eq!(classify_line_discount(dec!(90), &policy), ApprovalTier::FinanceHead);
        assert_eq!(classify_line_discount(dec!(7), &policy), ApprovalTier::SalesManager);
        assert_eq!(classify_line_discount(dec!(5), &policy), ApprovalTier::AutoApproved);
    }

    #[test]
    fn test_discount_depth_escalates_to_ceo() {
        let policy = ApprovalPolicy::default();
        assert_eq!(classify_discount_depth(dec!(15), &policy), ApprovalTier::FinanceHead);
        assert_eq!(classify_discount_depth(dec!(15.5), &policy), ApprovalTier::Ceo);
    }

    #[test]
    fn test_tier_serializes_as_role_label() {
        let json = serde_json::to_string(&ApprovalTier::AutoApproved).unwrap();
        assert_eq!(json, "\"Auto-Approved\"");
        assert!(ApprovalTier::Ceo > ApprovalTier::FinanceHead);
    }

    #[test]
    fn test_custom_policy() {
        let policy = ApprovalPolicy {
            ceo_deal_value: dec!(5_000_000),
            ..ApprovalPolicy::default()
        };
        let decision = classify_quote(dec!(5_000_001), dec!(0), dec!(0), &policy);
        assert_eq!(decision.tier, ApprovalTier::Ceo);
        assert_eq!(decision.reason, "Deal value > ₹50.00 L");
    }
}
