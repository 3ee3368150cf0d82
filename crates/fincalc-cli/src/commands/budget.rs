use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::budget::aggregator::{self, BudgetInput};
use fincalc_core::budget::period::{self, NormalizeInput, PeriodUnit};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UnitArg {
    Month,
    Year,
    Week,
    Biweekly,
}

impl From<UnitArg> for PeriodUnit {
    fn from(arg: UnitArg) -> Self {
        match arg {
            UnitArg::Month => PeriodUnit::Month,
            UnitArg::Year => PeriodUnit::Year,
            UnitArg::Week => PeriodUnit::Week,
            UnitArg::Biweekly => PeriodUnit::Biweekly,
        }
    }
}

/// Arguments for the budget planner
#[derive(Args)]
pub struct BudgetArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for converting an amount to monthly
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct NormalizeArgs {
    /// Amount per period
    #[arg(long)]
    pub amount: Decimal,

    /// Period the amount is quoted in
    #[arg(long, value_enum, default_value = "month")]
    pub unit: UnitArg,
}

pub fn run_budget(args: BudgetArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let budget: BudgetInput = input::require(args.input.as_deref(), "budget")?;
    let result = aggregator::aggregate_budget(&budget)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_normalize(args: NormalizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let result = period::normalize_amount(&NormalizeInput {
        amount: args.amount,
        unit: args.unit.into(),
    })?;
    Ok(serde_json::to_value(result)?)
}
