use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DealDeskError;
use crate::types::{Money, Multiplier, Percent};
use crate::DealDeskResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionModel {
    #[default]
    FlatPercentage,
    SlabBased,
    Tiered,
    ProductWise,
    MarginBased,
    DiscountLinked,
    Accelerator,
    Decelerator,
}

impl CommissionModel {
    /// Models whose base commission is computed slab by slab.
    pub fn uses_slabs(&self) -> bool {
        matches!(self, CommissionModel::SlabBased | CommissionModel::Tiered)
    }
}

/// A deal-value band and the commission rate paid inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionSlab {
    pub min_value: Money,
    /// `None` means no upper bound
    pub max_value: Option<Money>,
    pub rate: Percent,
}

impl CommissionSlab {
    /// Inclusive on both ends.
    pub fn contains(&self, deal_value: Money) -> bool {
        deal_value >= self.min_value && self.max_value.map_or(true, |max| deal_value <= max)
    }

    fn overlaps(&self, other: &CommissionSlab) -> bool {
        let self_below_other = self.max_value.is_some_and(|max| max < other.min_value);
        let other_below_self = other.max_value.is_some_and(|max| max < self.min_value);
        !self_below_other && !other_below_self
    }
}

/// Plan record as it arrives from an admin form or a JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawIncentivePlan {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub commission_model: CommissionModel,
    pub base_rate: Percent,
    #[serde(default)]
    pub slabs: Vec<CommissionSlab>,
    #[serde(default)]
    pub discount_penalty_enabled: bool,
    #[serde(default)]
    pub discount_penalty_rate: Percent,
    pub accelerator_threshold: Percent,
    pub accelerator_multiplier: Multiplier,
    pub decelerator_threshold: Percent,
    pub decelerator_multiplier: Multiplier,
}

/// A validated incentive plan. Construct through [`IncentivePlan::try_from`]
/// (or deserialize, which validates the same way); the fields cannot be
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawIncentivePlan")]
pub struct IncentivePlan {
    id: String,
    name: String,
    commission_model: CommissionModel,
    base_rate: Percent,
    slabs: Vec<CommissionSlab>,
    discount_penalty_enabled: bool,
    discount_penalty_rate: Percent,
    accelerator_threshold: Percent,
    accelerator_multiplier: Multiplier,
    decelerator_threshold: Percent,
    decelerator_multiplier: Multiplier,
}

impl TryFrom<RawIncentivePlan> for IncentivePlan {
    type Error = DealDeskError;

    fn try_from(raw: RawIncentivePlan) -> DealDeskResult<Self> {
        validate_plan(&raw)?;
        Ok(Self {
            id: raw.id,
            name: raw.name,
            commission_model: raw.commission_model,
            base_rate: raw.base_rate,
            slabs: raw.slabs,
            discount_penalty_enabled: raw.discount_penalty_enabled,
            discount_penalty_rate: raw.discount_penalty_rate,
            accelerator_threshold: raw.accelerator_threshold,
            accelerator_multiplier: raw.accelerator_multiplier,
            decelerator_threshold: raw.decelerator_threshold,
            decelerator_multiplier: raw.decelerator_multiplier,
        })
    }
}

impl IncentivePlan {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn commission_model(&self) -> CommissionModel {
        self.commission_model
    }

    pub fn base_rate(&self) -> Percent {
        self.base_rate
    }

    pub fn slabs(&self) -> &[CommissionSlab] {
        &self.slabs
    }

    pub fn discount_penalty_enabled(&self) -> bool {
        self.discount_penalty_enabled
    }

    pub fn discount_penalty_rate(&self) -> Percent {
        self.discount_penalty_rate
    }

    pub fn accelerator_threshold(&self) -> Percent {
        self.accelerator_threshold
    }

    pub fn accelerator_multiplier(&self) -> Multiplier {
        self.accelerator_multiplier
    }

    pub fn decelerator_threshold(&self) -> Percent {
        self.decelerator_threshold
    }

    pub fn decelerator_multiplier(&self) -> Multiplier {
        self.decelerator_multiplier
    }

    /// First slab (in configured order) containing `deal_value`, with its index.
    pub fn matching_slab(&self, deal_value: Money) -> Option<(usize, &CommissionSlab)> {
        self.slabs
            .iter()
            .enumerate()
            .find(|(_, slab)| slab.contains(deal_value))
    }

    /// Index pairs `(i, j)`, `i < j`, of slabs whose ranges intersect.
    pub fn overlapping_slabs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, a) in self.slabs.iter().enumerate() {
            for (j, b) in self.slabs.iter().enumerate().skip(i + 1) {
                if a.overlaps(b) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_plan(raw: &RawIncentivePlan) -> DealDeskResult<()> {
    let invalid = |reason: String| DealDeskError::InvalidPlan {
        plan_id: raw.id.clone(),
        reason,
    };

    if raw.id.trim().is_empty() {
        return Err(invalid("Plan id must not be empty".into()));
    }

    let non_negative = [
        ("base_rate", raw.base_rate),
        ("discount_penalty_rate", raw.discount_penalty_rate),
        ("accelerator_threshold", raw.accelerator_threshold),
        ("accelerator_multiplier", raw.accelerator_multiplier),
        ("decelerator_threshold", raw.decelerator_threshold),
        ("decelerator_multiplier", raw.decelerator_multiplier),
    ];
    for (field, value) in non_negative {
        if value < Decimal::ZERO {
            return Err(invalid(format!("{field} cannot be negative, got {value}")));
        }
    }

    for (idx, slab) in raw.slabs.iter().enumerate() {
        if slab.min_value < Decimal::ZERO {
            return Err(invalid(format!("slab {idx}: min_value cannot be negative")));
        }
        if slab.rate < Decimal::ZERO {
            return Err(invalid(format!("slab {idx}: rate cannot be negative")));
        }
        if let Some(max) = slab.max_value {
            if max < slab.min_value {
                return Err(invalid(format!(
                    "slab {idx}: max_value {max} is below min_value {}",
                    slab.min_value
                )));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
