use clap::Args;
use serde_json::Value;

use fincalc_core::tax::individual::{self, IndividualTaxInput, JointTaxInput};
use fincalc_core::tax::marriage::{self, MarriageComparisonInput};

use crate::input;

/// Arguments shared by the tax commands; returns have no flag form.
#[derive(Args)]
pub struct TaxArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_individual(args: TaxArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let tax_input: IndividualTaxInput = input::require(args.input.as_deref(), "tax")?;
    let result = individual::compute_individual_tax(&tax_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_joint(args: TaxArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let tax_input: JointTaxInput = input::require(args.input.as_deref(), "joint-tax")?;
    let result = individual::compute_joint_tax(&tax_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_marriage(args: TaxArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let comparison: MarriageComparisonInput =
        input::require(args.input.as_deref(), "marriage-tax")?;
    let result = marriage::compare_marriage_tax(&comparison)?;
    Ok(serde_json::to_value(result)?)
}
