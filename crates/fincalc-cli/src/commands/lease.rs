use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::lease::payment::{self, LeaseSolve, LeaseTerms};

use crate::input;

/// Arguments for the lease calculator
#[derive(Args)]
pub struct LeaseArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Negotiated asset value
    #[arg(long)]
    pub asset_value: Option<Decimal>,

    /// Residual value at lease end
    #[arg(long)]
    pub residual_value: Option<Decimal>,

    /// Lease term in periods
    #[arg(long)]
    pub term: Option<u32>,

    /// Payment periods per year
    #[arg(long, default_value_t = 12)]
    pub periods_per_year: u32,

    /// Acquisition fee (capitalised)
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub acquisition_fee: Decimal,

    /// Security deposit
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub security_deposit: Decimal,

    /// Down payment (capitalised cost reduction)
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub down_payment: Decimal,

    /// Sales tax rate applied to each payment
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub sales_tax_rate: Decimal,

    /// Known annual rate (solves for the payment)
    #[arg(long, conflicts_with = "payment")]
    pub annual_rate: Option<Decimal>,

    /// Known payment including tax (solves for the rate)
    #[arg(long)]
    pub payment: Option<Decimal>,
}

pub fn run_lease(args: LeaseArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms: LeaseTerms = match input::load(args.input.as_deref())? {
        Some(terms) => terms,
        None => {
            let solve = match (args.annual_rate, args.payment) {
                (Some(annual_rate), None) => LeaseSolve::ForPayment { annual_rate },
                (None, Some(payment)) => LeaseSolve::ForRate { payment },
                _ => {
                    return Err(
                        "one of --annual-rate or --payment is required (or provide --input)".into(),
                    )
                }
            };
            LeaseTerms {
                asset_value: args
                    .asset_value
                    .ok_or("--asset-value is required (or provide --input)")?,
                residual_value: args
                    .residual_value
                    .ok_or("--residual-value is required (or provide --input)")?,
                term_periods: args.term.ok_or("--term is required (or provide --input)")?,
                periods_per_year: args.periods_per_year,
                acquisition_fee: args.acquisition_fee,
                security_deposit: args.security_deposit,
                down_payment: args.down_payment,
                sales_tax_rate: args.sales_tax_rate,
                solve,
            }
        }
    };

    let result = payment::calculate_lease(&terms)?;
    Ok(serde_json::to_value(result)?)
}
