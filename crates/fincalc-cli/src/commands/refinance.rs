use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::refinance::comparison::{
    self, CurrentLoan, NewLoanTerms, RefinanceInput, RefinancePolicy,
};

use crate::input;

/// Arguments for the refinance comparison
#[derive(Args)]
pub struct RefinanceArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Outstanding balance of the current loan
    #[arg(long)]
    pub balance: Option<Decimal>,

    /// Current monthly payment
    #[arg(long)]
    pub current_payment: Option<Decimal>,

    /// Current annual rate
    #[arg(long)]
    pub current_rate: Option<Decimal>,

    /// Candidate annual rate
    #[arg(long)]
    pub new_rate: Option<Decimal>,

    /// Candidate term in months
    #[arg(long)]
    pub new_term: Option<u32>,

    /// Discount points as a fraction of principal
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub points: Decimal,

    /// Flat closing costs
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub fees: Decimal,

    /// Cash taken out on refinancing
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub cash_out: Decimal,
}

pub fn run_refinance(args: RefinanceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let refi: RefinanceInput = match input::load(args.input.as_deref())? {
        Some(refi) => refi,
        None => RefinanceInput {
            current: CurrentLoan::Known {
                balance: args
                    .balance
                    .ok_or("--balance is required (or provide --input)")?,
                monthly_payment: args
                    .current_payment
                    .ok_or("--current-payment is required (or provide --input)")?,
                annual_rate: args
                    .current_rate
                    .ok_or("--current-rate is required (or provide --input)")?,
            },
            new_loan: NewLoanTerms {
                annual_rate: args
                    .new_rate
                    .ok_or("--new-rate is required (or provide --input)")?,
                term_periods: args
                    .new_term
                    .ok_or("--new-term is required (or provide --input)")?,
                points_rate: args.points,
                fees: args.fees,
                cash_out: args.cash_out,
            },
            policy: RefinancePolicy::default(),
        },
    };

    let result = comparison::compare_refinance(&refi)?;
    Ok(serde_json::to_value(result)?)
}
