use clap::Args;
use serde_json::{json, Value};

use deal_desk_core::incentives::calculator::calculate_commission;
use deal_desk_core::incentives::payout::{settle_payout, summarize_payouts, PayoutInput, PayoutRecord};
use deal_desk_core::incentives::plan::IncentivePlan;
use deal_desk_core::incentives::simulator::{simulate_selected, SimulationInput};
use deal_desk_core::parse::{parse_amount, parse_percent};

use super::load_input;
use crate::config::DealDeskConfig;
use crate::input;

/// Arguments shared by `simulate` and `commission`
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct DealArgs {
    /// Plan file (JSON/YAML): a single plan or a list of plans
    #[arg(long)]
    pub plans: String,

    /// Plan to use when the file holds more than one
    #[arg(long)]
    pub plan_id: Option<String>,

    /// Path to a deal file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Deal value
    #[arg(long)]
    pub deal_value: Option<String>,

    /// Discount given on the deal, in percent
    #[arg(long)]
    pub discount: Option<String>,

    /// Gross margin, in percent
    #[arg(long)]
    pub margin: Option<String>,

    /// Target achievement, in percent
    #[arg(long)]
    pub target_achievement: Option<String>,
}

/// Arguments for payout settlement
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct SettlePayoutArgs {
    /// Path to a payout file with `gross_amount` and `clawback_events`
    #[arg(long)]
    pub input: Option<String>,

    /// Gross commission (when no clawback events apply)
    #[arg(long)]
    pub gross: Option<String>,
}

/// Arguments for the payouts dashboard summary
#[derive(Args)]
pub struct PayoutSummaryArgs {
    /// Path to a JSON/YAML list of payouts
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_simulate(args: DealArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let plans = load_plans(&args.plans)?;
    let plan_id = selected_plan_id(&plans, args.plan_id.as_deref())?;
    let deal = load_deal(&args)?;

    let result = simulate_selected(&plans, Some(plan_id.as_str()), &deal)
        .ok_or_else(|| format!("No plan with id '{plan_id}' in {}", args.plans))?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_commission(args: DealArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let plans = load_plans(&args.plans)?;
    let plan_id = selected_plan_id(&plans, args.plan_id.as_deref())?;
    let plan = plans
        .iter()
        .find(|p| p.id() == plan_id)
        .ok_or_else(|| format!("No plan with id '{plan_id}' in {}", args.plans))?;
    let deal = load_deal(&args)?;

    let result = calculate_commission(plan, &deal);
    Ok(serde_json::to_value(result)?)
}

pub fn run_settle_payout(args: SettlePayoutArgs, config: &DealDeskConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let payout: PayoutInput = load_input(args.input.as_deref(), || {
        Ok(PayoutInput {
            gross_amount: parse_amount(
                args.gross
                    .as_deref()
                    .ok_or("--gross is required (or provide --input)")?,
            ),
            clawback_events: Vec::new(),
        })
    })?;

    let result = settle_payout(&payout, &config.payout)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_payout_summary(args: PayoutSummaryArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let records: Vec<PayoutRecord> = load_input(args.input.as_deref(), || {
        Err("--input is required (or pipe payouts as JSON on stdin)".into())
    })?;
    let summary = summarize_payouts(&records);
    Ok(json!({ "result": summary }))
}

fn load_plans(path: &str) -> Result<Vec<IncentivePlan>, Box<dyn std::error::Error>> {
    let plans: Vec<IncentivePlan> = match input::file::read_input::<Value>(path)? {
        list @ Value::Array(_) => serde_json::from_value(list)?,
        single => vec![serde_json::from_value(single)?],
    };
    tracing::debug!(path, count = plans.len(), "loaded incentive plans");
    Ok(plans)
}

/// The explicit `--plan-id`, or the only plan in the file.
fn selected_plan_id(plans: &[IncentivePlan], requested: Option<&str>) -> Result<String, Box<dyn std::error::Error>> {
    match (requested, plans) {
        (Some(id), _) => Ok(id.to_string()),
        (None, [only]) => Ok(only.id().to_string()),
        (None, []) => Err("Plan file contains no plans".into()),
        (None, _) => Err(format!(
            "--plan-id is required when the file holds {} plans",
            plans.len()
        )
        .into()),
    }
}

fn load_deal(args: &DealArgs) -> Result<SimulationInput, Box<dyn std::error::Error>> {
    load_input(args.input.as_deref(), || {
        Ok(SimulationInput {
            deal_value: parse_amount(
                args.deal_value
                    .as_deref()
                    .ok_or("--deal-value is required (or provide --input)")?,
            ),
            discount_percent: parse_percent(args.discount.as_deref().unwrap_or("0")),
            margin_percent: parse_percent(
                args.margin
                    .as_deref()
                    .ok_or("--margin is required (or provide --input)")?,
            ),
            target_achievement_percent: parse_percent(
                args.target_achievement
                    .as_deref()
                    .ok_or("--target-achievement is required (or provide --input)")?,
            ),
        })
    })
}
