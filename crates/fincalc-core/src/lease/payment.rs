//! Lease payment model: depreciation fee plus finance fee.
//!
//! The finance fee uses the average-balance ("money factor") convention:
//! the periodic rate is charged on net capitalised cost plus residual, not
//! on an amortising balance. Sales tax is an overlay on the base payment.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::types::{schedule_period_cap, with_metadata, ComputationOutput, Money, Rate};
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LeaseSolve {
    /// Known nominal annual rate: derive the payment
    ForPayment { annual_rate: Rate },
    /// Known payment (tax included): derive the implied annual rate
    ForRate { payment: Money },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseTerms {
    /// Negotiated value of the asset
    pub asset_value: Money,
    /// Expected value at lease end; must be below `asset_value`
    pub residual_value: Money,
    pub term_periods: u32,
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: u32,
    #[serde(default)]
    pub acquisition_fee: Money,
    #[serde(default)]
    pub security_deposit: Money,
    #[serde(default)]
    pub down_payment: Money,
    #[serde(default)]
    pub sales_tax_rate: Rate,
    pub solve: LeaseSolve,
}

fn default_periods_per_year() -> u32 {
    12
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseScheduleEntry {
    pub period: u32,
    pub depreciation: Money,
    pub finance_charge: Money,
    pub sales_tax: Money,
    pub payment: Money,
    pub cumulative_depreciation: Money,
    pub cumulative_finance_charge: Money,
    /// Capitalised value still outstanding; never below the residual
    pub remaining_value: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseResult {
    pub net_capitalized_cost: Money,
    pub depreciation_fee: Money,
    pub finance_fee: Money,
    pub base_payment: Money,
    pub sales_tax_per_period: Money,
    /// Payment including sales tax
    pub payment: Money,
    pub annual_rate: Rate,
    /// Periodic multiplier applied to (net cap cost + residual)
    pub money_factor: Rate,
    pub total_payments: Money,
    pub total_depreciation: Money,
    pub total_finance_charges: Money,
    pub total_sales_tax: Money,
    /// Total payments plus the down payment
    pub total_lease_cost: Money,
    pub schedule: Vec<LeaseScheduleEntry>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn calculate_lease(terms: &LeaseTerms) -> FinCalcResult<ComputationOutput<LeaseResult>> {
    let start = Instant::now();

    let (result, methodology) = match &terms.solve {
        LeaseSolve::ForPayment { annual_rate } => (
            solve_fixed_rate_lease(terms, *annual_rate)?,
            "Lease payment: depreciation fee + money-factor finance fee, sales tax overlay",
        ),
        LeaseSolve::ForRate { payment } => (
            solve_effective_rate(terms, *payment)?,
            "Lease effective rate: finance fee isolated from payment, rate backed out of money factor",
        ),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, terms, Vec::new(), elapsed, result))
}

/// Payment for a lease at a known nominal annual rate.
pub fn solve_fixed_rate_lease(terms: &LeaseTerms, annual_rate: Rate) -> FinCalcResult<LeaseResult> {
    let net_cap = validate_terms(terms)?;
    if annual_rate < Decimal::ZERO {
        return Err(FinCalcError::invalid("annual_rate", "Annual rate cannot be negative"));
    }

    let money_factor = annual_rate / Decimal::from(terms.periods_per_year);
    let depreciation_fee = depreciation_fee(terms, net_cap);
    let finance_fee = (net_cap + terms.residual_value) * money_factor;

    tracing::debug!(%net_cap, %depreciation_fee, %finance_fee, "lease payment solved");
    Ok(build_result(terms, net_cap, depreciation_fee, finance_fee, annual_rate, money_factor))
}

/// Implied annual rate for a lease with a known, tax-inclusive payment.
pub fn solve_effective_rate(terms: &LeaseTerms, payment: Money) -> FinCalcResult<LeaseResult> {
    let net_cap = validate_terms(terms)?;
    if payment <= Decimal::ZERO {
        return Err(FinCalcError::invalid("payment", "Payment must be positive"));
    }

    let base_payment = payment / (Decimal::ONE + terms.sales_tax_rate);
    let depreciation_fee = depreciation_fee(terms, net_cap);
    let finance_fee = base_payment - depreciation_fee;
    if finance_fee < Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "payment",
            format!(
                "Payment before tax ({}) does not cover the depreciation fee ({})",
                base_payment.round_dp(2),
                depreciation_fee.round_dp(2)
            ),
        ));
    }

    // net_cap > residual >= 0, so the base is strictly positive
    let money_factor = finance_fee / (net_cap + terms.residual_value);
    let annual_rate = money_factor * Decimal::from(terms.periods_per_year);

    tracing::debug!(%net_cap, %finance_fee, %annual_rate, "lease rate solved");
    Ok(build_result(terms, net_cap, depreciation_fee, finance_fee, annual_rate, money_factor))
}

fn depreciation_fee(terms: &LeaseTerms, net_cap: Money) -> Money {
    (net_cap - terms.residual_value) / Decimal::from(terms.term_periods)
}

fn build_result(
    terms: &LeaseTerms,
    net_cap: Money,
    depreciation_fee: Money,
    finance_fee: Money,
    annual_rate: Rate,
    money_factor: Rate,
) -> LeaseResult {
    let base_payment = depreciation_fee + finance_fee;
    let sales_tax_per_period = base_payment * terms.sales_tax_rate;
    let payment = base_payment + sales_tax_per_period;

    let mut schedule = Vec::with_capacity(terms.term_periods as usize);
    let mut cumulative_depreciation = Decimal::ZERO;
    let mut cumulative_finance_charge = Decimal::ZERO;
    for period in 1..=terms.term_periods {
        cumulative_depreciation += depreciation_fee;
        cumulative_finance_charge += finance_fee;
        // Division residue must not leave the final period off the residual
        let remaining_value = if period == terms.term_periods {
            terms.residual_value
        } else {
            (net_cap - cumulative_depreciation).max(terms.residual_value)
        };
        schedule.push(LeaseScheduleEntry {
            period,
            depreciation: depreciation_fee,
            finance_charge: finance_fee,
            sales_tax: sales_tax_per_period,
            payment,
            cumulative_depreciation,
            cumulative_finance_charge,
            remaining_value,
        });
    }

    let n = Decimal::from(terms.term_periods);
    let total_payments = payment * n;
    LeaseResult {
        net_capitalized_cost: net_cap,
        depreciation_fee,
        finance_fee,
        base_payment,
        sales_tax_per_period,
        payment,
        annual_rate,
        money_factor,
        total_payments,
        total_depreciation: depreciation_fee * n,
        total_finance_charges: finance_fee * n,
        total_sales_tax: sales_tax_per_period * n,
        total_lease_cost: total_payments + terms.down_payment,
        schedule,
    }
}

/// Validates the terms and returns the net capitalised cost.
fn validate_terms(terms: &LeaseTerms) -> FinCalcResult<Money> {
    if terms.asset_value <= Decimal::ZERO {
        return Err(FinCalcError::invalid("asset_value", "Asset value must be positive"));
    }
    if terms.residual_value < Decimal::ZERO {
        return Err(FinCalcError::invalid("residual_value", "Residual value cannot be negative"));
    }
    if terms.residual_value >= terms.asset_value {
        return Err(FinCalcError::invalid(
            "residual_value",
            "Residual value must be below the asset value",
        ));
    }
    if terms.periods_per_year == 0 {
        return Err(FinCalcError::invalid(
            "periods_per_year",
            "Periods per year must be at least 1",
        ));
    }
    if terms.term_periods == 0 {
        return Err(FinCalcError::invalid("term_periods", "Lease term must be at least 1 period"));
    }
    if terms.term_periods > schedule_period_cap(terms.periods_per_year) {
        return Err(FinCalcError::invalid("term_periods", "Lease term exceeds 100 years"));
    }
    for (field, value) in [
        ("acquisition_fee", terms.acquisition_fee),
        ("security_deposit", terms.security_deposit),
        ("down_payment", terms.down_payment),
    ] {
        if value < Decimal::ZERO {
            return Err(FinCalcError::invalid(field, "Amount cannot be negative"));
        }
    }
    if terms.sales_tax_rate < Decimal::ZERO || terms.sales_tax_rate > Decimal::ONE {
        return Err(FinCalcError::invalid(
            "sales_tax_rate",
            "Sales tax rate must be between 0 and 1",
        ));
    }

    let net_cap = terms.asset_value + terms.acquisition_fee + terms.security_deposit
        - terms.down_payment;
    if net_cap <= terms.residual_value {
        return Err(FinCalcError::invalid(
            "down_payment",
            "Net capitalised cost must exceed the residual value",
        ));
    }
    Ok(net_cap)
}
