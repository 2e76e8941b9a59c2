use clap::Args;
use serde_json::Value;

use deal_desk_core::parse::parse_amount;
use deal_desk_core::payments::terms::{build_schedule, PaymentScheduleInput, PaymentTerms, TEMPLATE_IDS};

use super::load_input;

/// Arguments for splitting a grand total into payment milestones
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PaymentScheduleArgs {
    /// Path to a file with `terms` and `grand_total` (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Built-in payment terms template
    #[arg(long, default_value = "standard-100")]
    pub template: String,

    /// Quote grand total to schedule
    #[arg(long)]
    pub grand_total: Option<String>,
}

pub fn run_payment_schedule(args: PaymentScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: PaymentScheduleInput = load_input(args.input.as_deref(), || {
        let terms = PaymentTerms::template(&args.template).ok_or_else(|| {
            format!(
                "Unknown payment template '{}'; expected one of: {}",
                args.template,
                TEMPLATE_IDS.join(", ")
            )
        })?;
        Ok(PaymentScheduleInput {
            terms,
            grand_total: parse_amount(
                args.grand_total
                    .as_deref()
                    .ok_or("--grand-total is required (or provide --input)")?,
            ),
        })
    })?;

    let result = build_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}
