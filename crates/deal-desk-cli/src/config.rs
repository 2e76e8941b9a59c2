use deal_desk_core::incentives::payout::PayoutPolicy;
use deal_desk_core::quotes::approval::ApprovalPolicy;
use deal_desk_core::Percent;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::input;

/// Thresholds and defaults shared by every subcommand.
///
/// Loaded from `--config` / `DEALDESK_CONFIG` (YAML or JSON); any field left
/// out keeps its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DealDeskConfig {
    /// GST applied to quotes that don't carry their own rate
    pub tax_rate_percent: Percent,
    pub approval: ApprovalPolicy,
    pub payout: PayoutPolicy,
}

impl Default for DealDeskConfig {
    fn default() -> Self {
        Self {
            tax_rate_percent: dec!(18),
            approval: ApprovalPolicy::default(),
            payout: PayoutPolicy::default(),
        }
    }
}

impl DealDeskConfig {
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        match path {
            Some(p) => {
                let config: DealDeskConfig = input::file::read_input(p)?;
                tracing::debug!(path = p, ?config, "loaded configuration");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
tax_rate_percent: "12"
approval:
  manager_discount_percent: "7.5"
"#;
        let config: DealDeskConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.tax_rate_percent, dec!(12));
        assert_eq!(config.approval.manager_discount_percent, dec!(7.5));
        assert_eq!(config.approval.finance_discount_percent, dec!(10));
        assert_eq!(config.payout, PayoutPolicy::default());
    }

    #[test]
    fn test_no_path_gives_defaults() {
        let config = DealDeskConfig::load(None).unwrap();
        assert_eq!(config.tax_rate_percent, dec!(18));
        assert_eq!(config.approval.ceo_deal_value, dec!(10000000));
    }
}
