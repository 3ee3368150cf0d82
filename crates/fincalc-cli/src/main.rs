mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::amortization::{AnnuityArgs, LoanScheduleArgs};
use commands::budget::{BudgetArgs, NormalizeArgs};
use commands::lease::LeaseArgs;
use commands::refinance::RefinanceArgs;
use commands::tax::TaxArgs;

/// Consumer financial calculators
#[derive(Parser)]
#[command(
    name = "fincalc",
    version,
    about = "Consumer financial calculators with decimal precision",
    long_about = "A CLI for annuity payouts, loan schedules, income tax, marriage \
                  penalty/bonus, leases, refinancing and budgets. Inputs are flags, \
                  a JSON/YAML file via --input, or JSON piped on stdin."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log filter for stderr diagnostics (e.g. "debug", "fincalc_core=trace")
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Annuity payout: solve the payment for a length, or the length for a payment
    Annuity(AnnuityArgs),
    /// Period-by-period (or yearly) schedule of a fixed-term loan
    LoanSchedule(LoanScheduleArgs),
    /// Federal income tax for a single filer
    Tax(TaxArgs),
    /// Federal income tax for a married couple filing jointly
    JointTax(TaxArgs),
    /// Marriage penalty or bonus: two single returns versus one joint return
    MarriageTax(TaxArgs),
    /// Lease payment or implied lease rate
    Lease(LeaseArgs),
    /// Compare an existing loan with a refinance candidate
    Refinance(RefinanceArgs),
    /// Monthly budget with a 50/30/20 allocation
    Budget(BudgetArgs),
    /// Convert an amount per week/biweekly/year to monthly
    Normalize(NormalizeArgs),
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

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_level.as_deref()) {
        eprintln!("{}: {}", "error".red().bold(), e);
        process::exit(2);
    }

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Annuity(args) => commands::amortization::run_annuity(args),
        Commands::LoanSchedule(args) => commands::amortization::run_loan_schedule(args),
        Commands::Tax(args) => commands::tax::run_individual(args),
        Commands::JointTax(args) => commands::tax::run_joint(args),
        Commands::MarriageTax(args) => commands::tax::run_marriage(args),
        Commands::Lease(args) => commands::lease::run_lease(args),
        Commands::Refinance(args) => commands::refinance::run_refinance(args),
        Commands::Budget(args) => commands::budget::run_budget(args),
        Commands::Normalize(args) => commands::budget::run_normalize(args),
        Commands::Version => {
            println!("fincalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
