mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::format::FormatInrArgs;
use commands::incentives::{DealArgs, PayoutSummaryArgs, SettlePayoutArgs};
use commands::payments::PaymentScheduleArgs;
use commands::quote::{DiscountArgs, LineTotalArgs, QuoteArgs};
use config::DealDeskConfig;

/// Quote pricing, approval routing and commission simulation
#[derive(Parser)]
#[command(
    name = "dealdesk",
    version,
    about = "Quote pricing, approval routing and commission simulation",
    long_about = "A CLI for the deal desk: price quote lines, roll quotes up with GST \
                  and route them for approval, split totals into payment milestones, \
                  and simulate incentive plan payouts, all with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Thresholds and defaults file (YAML or JSON)
    #[arg(long, env = "DEALDESK_CONFIG", global = true)]
    config: Option<String>,

    /// Log calculation decisions to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a single quote line
    LineTotal(LineTotalArgs),
    /// Roll up a quote and classify its approval tier
    Quote(QuoteArgs),
    /// Resolve a quote-level discount and its approval tier
    Discount(DiscountArgs),
    /// Split a grand total into payment milestones
    PaymentSchedule(PaymentScheduleArgs),
    /// Simulate the payout an incentive plan gives for one deal
    Simulate(DealArgs),
    /// Model-aware commission breakdown for one deal
    Commission(DealArgs),
    /// Apply holdback and clawbacks to a gross commission
    SettlePayout(SettlePayoutArgs),
    /// Totals for the payouts dashboard
    PayoutSummary(PayoutSummaryArgs),
    /// Format an amount in rupees with Indian digit grouping
    FormatInr(FormatInrArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,deal_desk_core=debug,dealdesk=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}

fn run(cli: Cli) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let config = DealDeskConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::LineTotal(args) => commands::quote::run_line_total(args, &config),
        Commands::Quote(args) => commands::quote::run_quote(args, &config),
        Commands::Discount(args) => commands::quote::run_discount(args, &config),
        Commands::PaymentSchedule(args) => commands::payments::run_payment_schedule(args),
        Commands::Simulate(args) => commands::incentives::run_simulate(args),
        Commands::Commission(args) => commands::incentives::run_commission(args),
        Commands::SettlePayout(args) => commands::incentives::run_settle_payout(args, &config),
        Commands::PayoutSummary(args) => commands::incentives::run_payout_summary(args),
        Commands::FormatInr(args) => commands::format::run_format_inr(args),
        Commands::Version => Ok(serde_json::json!({
            "name": "dealdesk",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let format = cli.output.clone();
    match run(cli) {
        Ok(value) => {
            output::format_output(&format, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
