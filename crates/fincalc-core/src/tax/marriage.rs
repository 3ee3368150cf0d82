//! Marriage penalty / bonus comparison.
//!
//! Compares two single returns against one joint return for the same pair
//! of taxpayers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::tax::config::{FilingStatus, TaxYearConfig};
use crate::tax::individual::{assess_return, TaxInputs, TaxResult};
use crate::types::{round_cents, with_metadata, ComputationOutput, Money, Rate};
use crate::FinCalcResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarriageComparisonInput {
    pub spouse_a: TaxInputs,
    pub spouse_b: TaxInputs,
    #[serde(default)]
    pub config: TaxYearConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarriageOutcome {
    Penalty,
    Bonus,
    #[default]
    Neutral,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarriageComparisonOutput {
    pub spouse_a_single: TaxResult,
    pub spouse_b_single: TaxResult,
    pub combined_single_tax: Money,
    pub joint: TaxResult,
    /// Joint tax minus combined single tax, rounded to cents
    pub difference: Money,
    /// `difference` over the couple's combined income
    pub difference_pct_of_income: Rate,
    pub outcome: MarriageOutcome,
}

pub fn compare_marriage_tax(
    input: &MarriageComparisonInput,
) -> FinCalcResult<ComputationOutput<MarriageComparisonOutput>> {
    let start = Instant::now();

    let (spouse_a_single, a_warnings) =
        assess_return(&[&input.spouse_a], FilingStatus::Single, &input.config)?;
    let (spouse_b_single, b_warnings) =
        assess_return(&[&input.spouse_b], FilingStatus::Single, &input.config)?;
    let (joint, joint_warnings) = assess_return(
        &[&input.spouse_a, &input.spouse_b],
        FilingStatus::MarriedFilingJointly,
        &input.config,
    )?;

    let mut warnings: Vec<String> = a_warnings
        .into_iter()
        .map(|w| format!("Spouse A (single): {w}"))
        .chain(b_warnings.into_iter().map(|w| format!("Spouse B (single): {w}")))
        .collect();
    warnings.extend(joint_warnings);

    let combined_single_tax = spouse_a_single.total_tax + spouse_b_single.total_tax;
    let difference = round_cents(joint.total_tax - combined_single_tax);
    let outcome = if difference > Decimal::ZERO {
        MarriageOutcome::Penalty
    } else if difference < Decimal::ZERO {
        MarriageOutcome::Bonus
    } else {
        MarriageOutcome::Neutral
    };

    let combined_income = joint.gross_income + joint.preferential_income;
    let difference_pct_of_income = if combined_income > Decimal::ZERO {
        difference / combined_income
    } else {
        Decimal::ZERO
    };

    tracing::debug!(%difference, ?outcome, "marriage comparison computed");

    let output = MarriageComparisonOutput {
        spouse_a_single,
        spouse_b_single,
        combined_single_tax,
        joint,
        difference,
        difference_pct_of_income,
        outcome,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Marriage penalty/bonus: two single returns versus one joint return",
        &serde_json::json!({ "tax_year": input.config.tax_year }),
        warnings,
        elapsed,
        output,
    ))
}
