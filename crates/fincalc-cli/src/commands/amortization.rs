use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::amortization::annuity::{self, LoanTerms, Solve};
use fincalc_core::PaymentFrequency;

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FrequencyArg {
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl From<FrequencyArg> for PaymentFrequency {
    fn from(arg: FrequencyArg) -> Self {
        match arg {
            FrequencyArg::Monthly => PaymentFrequency::Monthly,
            FrequencyArg::Quarterly => PaymentFrequency::Quarterly,
            FrequencyArg::SemiAnnual => PaymentFrequency::SemiAnnual,
            FrequencyArg::Annual => PaymentFrequency::Annual,
        }
    }
}

/// Arguments for the annuity payout calculator
#[derive(Args)]
pub struct AnnuityArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Starting principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal annual rate as a decimal (0.06 = 6%)
    #[arg(long)]
    pub annual_rate: Option<Decimal>,

    /// Payment frequency
    #[arg(long, value_enum, default_value = "monthly")]
    pub frequency: FrequencyArg,

    /// Payout length in years (solves for the payment)
    #[arg(long, conflicts_with = "payment")]
    pub years: Option<u32>,

    /// Fixed payout per period (solves for the length)
    #[arg(long)]
    pub payment: Option<Decimal>,
}

/// Arguments for a fixed-term loan schedule
#[derive(Args)]
pub struct LoanScheduleArgs {
    /// Loan amount
    #[arg(long)]
    pub principal: Decimal,

    /// Nominal annual rate as a decimal
    #[arg(long)]
    pub annual_rate: Decimal,

    /// Term in years
    #[arg(long)]
    pub years: u32,

    /// Payment frequency
    #[arg(long, value_enum, default_value = "monthly")]
    pub frequency: FrequencyArg,

    /// Print one row per year instead of one per payment
    #[arg(long)]
    pub yearly: bool,
}

pub fn run_annuity(args: AnnuityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms: LoanTerms = match input::load(args.input.as_deref())? {
        Some(terms) => terms,
        None => {
            let solve = match (args.years, args.payment) {
                (Some(years), None) => Solve::ForPayment { years },
                (None, Some(payment)) => Solve::ForDuration { payment },
                _ => return Err("one of --years or --payment is required (or provide --input)".into()),
            };
            LoanTerms {
                principal: args
                    .principal
                    .ok_or("--principal is required (or provide --input)")?,
                annual_rate: args
                    .annual_rate
                    .ok_or("--annual-rate is required (or provide --input)")?,
                frequency: args.frequency.into(),
                solve,
            }
        }
    };

    let result = annuity::calculate_annuity(&terms)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_loan_schedule(args: LoanScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = LoanTerms {
        principal: args.principal,
        annual_rate: args.annual_rate,
        frequency: args.frequency.into(),
        solve: Solve::ForPayment { years: args.years },
    };
    let output = annuity::calculate_annuity(&terms)?;

    let rows = if args.yearly {
        serde_json::to_value(&output.result.yearly_summary)?
    } else {
        serde_json::to_value(&output.result.schedule)?
    };
    Ok(rows)
}
