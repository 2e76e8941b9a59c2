use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values (rupees). Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Percentages expressed in points (5 = 5%), the way sales users enter them.
pub type Percent = Decimal;

/// Commission multipliers (1.2 = 20% uplift)
pub type Multiplier = Decimal;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    for warning in &warnings {
        tracing::warn!(methodology, "{warning}");
    }
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Percentage of `part` in `whole`, returning zero when `whole` is zero.
pub fn percent_of(part: Decimal, whole: Decimal) -> Percent {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        part / whole * Decimal::ONE_HUNDRED
    }
}

/// `amount * pct / 100`
pub fn apply_percent(amount: Money, pct: Percent) -> Money {
    amount * pct / Decimal::ONE_HUNDRED
}
