//! Individual and joint income tax assessment.
//!
//! Both entry points run the same pipeline: gross income → adjustments →
//! AGI → deduction → taxable income → ordinary, preferential,
//! self-employment and supplemental (state/local) tax. A joint return sums
//! the spouses' components first and applies every cap to the combined
//! figure; it is not the sum of two individual returns.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::tax::brackets::{evaluate_preferential_tax, evaluate_progressive_tax, marginal_rate};
use crate::tax::config::{FilingStatus, TaxYearConfig};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionMethod {
    #[default]
    Standard,
    Itemized,
}

/// One taxpayer's annual figures. Missing fields default to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxInputs {
    pub salary: Money,
    pub interest_income: Money,
    pub rental_income: Money,
    pub short_term_gains: Money,
    pub long_term_gains: Money,
    pub qualified_dividends: Money,
    /// Pre-tax retirement contributions
    pub retirement_contributions: Money,
    pub student_loan_interest: Money,
    /// Salary is self-employment income subject to SE tax
    pub self_employed: bool,
    pub deduction_method: DeductionMethod,
    pub mortgage_interest: Money,
    pub charitable_donations: Money,
    pub child_care_expenses: Money,
    pub education_expenses: Money,
    /// Flat state/local rate applied to taxable income
    pub state_tax_rate: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualTaxInput {
    pub taxpayer: TaxInputs,
    #[serde(default)]
    pub config: TaxYearConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointTaxInput {
    pub spouse_a: TaxInputs,
    pub spouse_b: TaxInputs,
    #[serde(default)]
    pub config: TaxYearConfig,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    pub filing_status: FilingStatus,
    /// Salary + interest + rental + short-term gains
    pub gross_income: Money,
    /// Long-term gains + qualified dividends
    pub preferential_income: Money,
    pub adjusted_gross_income: Money,
    pub deduction_applied: Money,
    pub deduction_kind: DeductionMethod,
    /// Never negative
    pub taxable_income: Money,
    pub ordinary_tax: Money,
    pub preferential_tax: Money,
    pub supplemental_tax: Money,
    pub self_employment_tax: Money,
    /// Sum of the four components above
    pub total_tax: Money,
    /// Total tax over gross plus preferential income (0 with no income)
    pub effective_rate: Rate,
    pub marginal_rate: Rate,
    pub after_tax_income: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn compute_individual_tax(
    input: &IndividualTaxInput,
) -> FinCalcResult<ComputationOutput<TaxResult>> {
    let start = Instant::now();
    let (result, warnings) = assess_return(&[&input.taxpayer], FilingStatus::Single, &input.config)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Progressive bracket tax with preferential-rate stacking (single filer)",
        &assumptions(input.config.tax_year, FilingStatus::Single),
        warnings,
        elapsed,
        result,
    ))
}

pub fn compute_joint_tax(input: &JointTaxInput) -> FinCalcResult<ComputationOutput<TaxResult>> {
    let start = Instant::now();
    let (result, warnings) = assess_return(
        &[&input.spouse_a, &input.spouse_b],
        FilingStatus::MarriedFilingJointly,
        &input.config,
    )?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Progressive bracket tax with preferential-rate stacking (married filing jointly, \
         combined components and caps)",
        &assumptions(input.config.tax_year, FilingStatus::MarriedFilingJointly),
        warnings,
        elapsed,
        result,
    ))
}

/// Assess one return covering every taxpayer in `taxpayers`.
///
/// Amounts are summed before any cap or deduction is applied. The household
/// state rate is the first taxpayer's.
pub(crate) fn assess_return(
    taxpayers: &[&TaxInputs],
    status: FilingStatus,
    config: &TaxYearConfig,
) -> FinCalcResult<(TaxResult, Vec<String>)> {
    let mut warnings: Vec<String> = Vec::new();
    for (idx, taxpayer) in taxpayers.iter().enumerate() {
        validate_taxpayer(idx, taxpayer)?;
    }

    let state_tax_rate = taxpayers.first().map(|t| t.state_tax_rate).unwrap_or_default();
    if taxpayers.iter().any(|t| t.state_tax_rate != state_tax_rate) {
        warnings.push(format!(
            "Spouses report different state rates; the household rate of {state_tax_rate} is used"
        ));
    }

    let sum = |field: fn(&TaxInputs) -> Money| -> Money { taxpayers.iter().map(|t| field(t)).sum() };

    let gross_income = sum(|t| t.salary + t.interest_income + t.rental_income + t.short_term_gains);
    let preferential_income = sum(|t| t.long_term_gains + t.qualified_dividends);

    let se_eligible: Money = taxpayers
        .iter()
        .filter(|t| t.self_employed)
        .map(|t| t.salary)
        .sum();
    let self_employment_tax =
        se_eligible * config.self_employment_earnings_factor * config.self_employment_tax_rate;

    let student_loan = sum(|t| t.student_loan_interest).min(config.student_loan_interest_cap);
    let adjustments =
        sum(|t| t.retirement_contributions) + self_employment_tax / Decimal::TWO + student_loan;
    let adjusted_gross_income = (gross_income - adjustments).max(Decimal::ZERO);

    let tables = config.tables(status);
    let itemized_total = sum(|t| t.mortgage_interest + t.charitable_donations)
        + sum(|t| t.child_care_expenses).min(config.child_care_cap)
        + sum(|t| t.education_expenses).min(config.education_cap);
    let wants_itemized = taxpayers
        .iter()
        .any(|t| t.deduction_method == DeductionMethod::Itemized);
    let (deduction_applied, deduction_kind) =
        if wants_itemized && itemized_total > tables.standard_deduction {
            (itemized_total, DeductionMethod::Itemized)
        } else {
            if wants_itemized {
                warnings.push(format!(
                    "Itemized deductions ({itemized_total}) do not exceed the standard deduction; \
                     standard deduction applied"
                ));
            }
            (tables.standard_deduction, DeductionMethod::Standard)
        };

    let taxable_income = (adjusted_gross_income - deduction_applied).max(Decimal::ZERO);

    let ordinary_tax = evaluate_progressive_tax(taxable_income, &tables.ordinary);
    let preferential_tax =
        evaluate_preferential_tax(taxable_income, preferential_income, &tables.preferential);
    let supplemental_tax = taxable_income * state_tax_rate;
    let total_tax = ordinary_tax + preferential_tax + supplemental_tax + self_employment_tax;

    let total_income = gross_income + preferential_income;
    let effective_rate = if total_income > Decimal::ZERO {
        total_tax / total_income
    } else {
        Decimal::ZERO
    };

    tracing::debug!(
        ?status,
        %taxable_income,
        %total_tax,
        "tax return assessed"
    );

    Ok((
        TaxResult {
            filing_status: status,
            gross_income,
            preferential_income,
            adjusted_gross_income,
            deduction_applied,
            deduction_kind,
            taxable_income,
            ordinary_tax,
            preferential_tax,
            supplemental_tax,
            self_employment_tax,
            total_tax,
            effective_rate,
            marginal_rate: marginal_rate(taxable_income, &tables.ordinary),
            after_tax_income: total_income - total_tax,
        },
        warnings,
    ))
}

fn assumptions(tax_year: i32, status: FilingStatus) -> serde_json::Value {
    serde_json::json!({
        "tax_year": tax_year,
        "filing_status": status,
    })
}

fn validate_taxpayer(idx: usize, t: &TaxInputs) -> FinCalcResult<()> {
    let amounts = [
        ("salary", t.salary),
        ("interest_income", t.interest_income),
        ("rental_income", t.rental_income),
        ("short_term_gains", t.short_term_gains),
        ("long_term_gains", t.long_term_gains),
        ("qualified_dividends", t.qualified_dividends),
        ("retirement_contributions", t.retirement_contributions),
        ("student_loan_interest", t.student_loan_interest),
        ("mortgage_interest", t.mortgage_interest),
        ("charitable_donations", t.charitable_donations),
        ("child_care_expenses", t.child_care_expenses),
        ("education_expenses", t.education_expenses),
    ];
    for (field, value) in amounts {
        if value < Decimal::ZERO {
            return Err(FinCalcError::InvalidInput {
                field: format!("taxpayer[{idx}].{field}"),
                reason: "Amount cannot be negative".into(),
            });
        }
    }
    if t.state_tax_rate < Decimal::ZERO || t.state_tax_rate > Decimal::ONE {
        return Err(FinCalcError::InvalidInput {
            field: format!("taxpayer[{idx}].state_tax_rate"),
            reason: "State tax rate must be between 0 and 1".into(),
        });
    }
    Ok(())
}
