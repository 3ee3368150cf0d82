//! Refinance comparison: the existing loan against a candidate replacement.
//!
//! Both sides are priced with the shared time-value primitives. Payments
//! are monthly.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::time_value::{solve_duration, solve_payment, solve_remaining_balance, DurationSolution};
use crate::types::{schedule_period_cap, with_metadata, ComputationOutput, Money, Periods, Rate};
use crate::FinCalcResult;

const PERIODS_PER_YEAR: u32 = 12;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// How the existing loan is described.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum CurrentLoan {
    /// Balance and payment read off a statement
    Known {
        balance: Money,
        monthly_payment: Money,
        annual_rate: Rate,
    },
    /// Original loan terms plus the number of payments already made
    FromOriginal {
        original_principal: Money,
        annual_rate: Rate,
        term_periods: u32,
        periods_elapsed: u32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLoanTerms {
    pub annual_rate: Rate,
    pub term_periods: u32,
    /// Discount points as a fraction of the new principal (0.02 = 2 points)
    #[serde(default)]
    pub points_rate: Rate,
    /// Flat closing costs
    #[serde(default)]
    pub fees: Money,
    #[serde(default)]
    pub cash_out: Money,
}

/// Thresholds for the worthwhile heuristic.
///
/// A refinance with positive total savings is always worthwhile. Otherwise
/// it needs positive monthly savings and a break-even under
/// `max_break_even_periods` (and, when `require_break_even_within_term` is
/// set, inside the new term).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinancePolicy {
    pub max_break_even_periods: Periods,
    pub require_break_even_within_term: bool,
}

impl Default for RefinancePolicy {
    fn default() -> Self {
        RefinancePolicy {
            max_break_even_periods: dec!(60),
            require_break_even_within_term: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceInput {
    pub current: CurrentLoan,
    pub new_loan: NewLoanTerms,
    #[serde(default)]
    pub policy: RefinancePolicy,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentLoanState {
    pub balance: Money,
    pub monthly_payment: Money,
    pub annual_rate: Rate,
    /// May be fractional when solved from a known payment
    pub remaining_periods: Periods,
    pub remaining_payments: Money,
    pub remaining_interest: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateLoanState {
    /// Current balance plus cash out
    pub principal: Money,
    pub monthly_payment: Money,
    pub annual_rate: Rate,
    pub term_periods: u32,
    /// Points plus flat fees
    pub upfront_costs: Money,
    pub total_payments: Money,
    pub total_interest: Money,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BreakEven {
    /// No upfront cost to recover
    Immediate,
    AfterPeriods {
        periods: Periods,
    },
    /// Monthly savings never recover the upfront cost
    #[default]
    Never,
}

impl BreakEven {
    pub fn periods(&self) -> Option<Periods> {
        match self {
            BreakEven::Immediate => Some(Decimal::ZERO),
            BreakEven::AfterPeriods { periods } => Some(*periods),
            BreakEven::Never => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinanceOutput {
    pub current: CurrentLoanState,
    pub candidate: CandidateLoanState,
    /// Current payment minus new payment; negative when the payment rises
    pub monthly_savings: Money,
    /// Remaining current payments minus (new payments plus upfront costs)
    pub total_savings: Money,
    pub interest_savings: Money,
    pub break_even: BreakEven,
    pub break_even_periods: Option<Periods>,
    pub is_worthwhile: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn compare_refinance(input: &RefinanceInput) -> FinCalcResult<ComputationOutput<RefinanceOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let current = resolve_current_loan(&input.current)?;
    let candidate = price_candidate(current.balance, &input.new_loan)?;

    let monthly_savings = current.monthly_payment - candidate.monthly_payment;
    let total_savings =
        current.remaining_payments - (candidate.total_payments + candidate.upfront_costs);
    let interest_savings = current.remaining_interest - candidate.total_interest;

    let break_even = break_even(candidate.upfront_costs, monthly_savings);
    let is_worthwhile = is_worthwhile(
        total_savings,
        monthly_savings,
        break_even,
        candidate.term_periods,
        &input.policy,
    );

    if monthly_savings <= Decimal::ZERO {
        warnings.push("New payment is not lower than the current payment".into());
    }
    if input.new_loan.cash_out > Decimal::ZERO {
        warnings.push(format!(
            "Cash out of {} increases the new principal",
            input.new_loan.cash_out
        ));
    }
    if Decimal::from(candidate.term_periods) > current.remaining_periods {
        warnings.push("New term extends past the current loan's remaining term".into());
    }

    tracing::debug!(%monthly_savings, %total_savings, ?break_even, is_worthwhile, "refinance compared");

    let output = RefinanceOutput {
        break_even_periods: break_even.periods(),
        current,
        candidate,
        monthly_savings,
        total_savings,
        interest_savings,
        break_even,
        is_worthwhile,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Refinance comparison: remaining current payments vs new annuity plus upfront costs",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Upfront cost divided by monthly savings.
pub fn break_even(upfront_costs: Money, monthly_savings: Money) -> BreakEven {
    if upfront_costs.is_zero() {
        BreakEven::Immediate
    } else if monthly_savings > Decimal::ZERO {
        BreakEven::AfterPeriods {
            periods: upfront_costs / monthly_savings,
        }
    } else {
        BreakEven::Never
    }
}

pub fn is_worthwhile(
    total_savings: Money,
    monthly_savings: Money,
    break_even: BreakEven,
    new_term_periods: u32,
    policy: &RefinancePolicy,
) -> bool {
    if total_savings > Decimal::ZERO {
        return true;
    }
    if monthly_savings <= Decimal::ZERO {
        return false;
    }
    match break_even.periods() {
        Some(periods) => {
            let within_term = !policy.require_break_even_within_term
                || periods < Decimal::from(new_term_periods);
            within_term && periods < policy.max_break_even_periods
        }
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn resolve_current_loan(loan: &CurrentLoan) -> FinCalcResult<CurrentLoanState> {
    match *loan {
        CurrentLoan::Known {
            balance,
            monthly_payment,
            annual_rate,
        } => {
            validate_annual_rate("current.annual_rate", annual_rate)?;
            let rate = annual_rate / Decimal::from(PERIODS_PER_YEAR);
            let remaining_periods = match solve_duration(balance, rate, monthly_payment)? {
                DurationSolution::Finite { periods } => periods,
                DurationSolution::Perpetuity => {
                    return Err(FinCalcError::invalid(
                        "current.monthly_payment",
                        "Current payment does not cover the monthly interest",
                    ));
                }
            };
            let remaining_payments = monthly_payment * remaining_periods;
            Ok(CurrentLoanState {
                balance,
                monthly_payment,
                annual_rate,
                remaining_periods,
                remaining_payments,
                remaining_interest: remaining_payments - balance,
            })
        }
        CurrentLoan::FromOriginal {
            original_principal,
            annual_rate,
            term_periods,
            periods_elapsed,
        } => {
            validate_annual_rate("current.annual_rate", annual_rate)?;
            if periods_elapsed >= term_periods {
                return Err(FinCalcError::invalid(
                    "current.periods_elapsed",
                    "Current loan is already repaid",
                ));
            }
            let rate = annual_rate / Decimal::from(PERIODS_PER_YEAR);
            let monthly_payment = solve_payment(original_principal, rate, term_periods)?;
            let balance =
                solve_remaining_balance(original_principal, rate, term_periods, periods_elapsed)?;
            let remaining_periods = Decimal::from(term_periods - periods_elapsed);
            let remaining_payments = monthly_payment * remaining_periods;
            Ok(CurrentLoanState {
                balance,
                monthly_payment,
                annual_rate,
                remaining_periods,
                remaining_payments,
                remaining_interest: remaining_payments - balance,
            })
        }
    }
}

fn price_candidate(balance: Money, terms: &NewLoanTerms) -> FinCalcResult<CandidateLoanState> {
    validate_new_loan(terms)?;

    let principal = balance + terms.cash_out;
    let upfront_costs = principal * terms.points_rate + terms.fees;
    let rate = terms.annual_rate / Decimal::from(PERIODS_PER_YEAR);
    let monthly_payment = solve_payment(principal, rate, terms.term_periods)?;
    let total_payments = monthly_payment * Decimal::from(terms.term_periods);

    Ok(CandidateLoanState {
        principal,
        monthly_payment,
        annual_rate: terms.annual_rate,
        term_periods: terms.term_periods,
        upfront_costs,
        total_payments,
        total_interest: total_payments - principal,
    })
}

fn validate_new_loan(terms: &NewLoanTerms) -> FinCalcResult<()> {
    validate_annual_rate("new_loan.annual_rate", terms.annual_rate)?;
    if terms.term_periods == 0 {
        return Err(FinCalcError::invalid(
            "new_loan.term_periods",
            "New term must be at least 1 period",
        ));
    }
    if terms.term_periods > schedule_period_cap(PERIODS_PER_YEAR) {
        return Err(FinCalcError::invalid(
            "new_loan.term_periods",
            "New term exceeds 100 years",
        ));
    }
    if terms.points_rate < Decimal::ZERO || terms.points_rate > Decimal::ONE {
        return Err(FinCalcError::invalid(
            "new_loan.points_rate",
            "Points must be between 0 and 1 of the principal",
        ));
    }
    if terms.fees < Decimal::ZERO {
        return Err(FinCalcError::invalid("new_loan.fees", "Fees cannot be negative"));
    }
    if terms.cash_out < Decimal::ZERO {
        return Err(FinCalcError::invalid("new_loan.cash_out", "Cash out cannot be negative"));
    }
    Ok(())
}

fn validate_annual_rate(field: &str, rate: Rate) -> FinCalcResult<()> {
    if rate < Decimal::ZERO {
        return Err(FinCalcError::invalid(field, "Annual rate cannot be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assert_close(actual: Decimal, expected: Decimal, tolerance: Decimal, msg: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tolerance,
            "{msg}: expected ~{expected}, got {actual} (diff={diff}, tol={tolerance})"
        );
    }

    fn statement_loan() -> CurrentLoan {
        CurrentLoan::Known {
            balance: dec!(250_000),
            monthly_payment: dec!(1_800),
            annual_rate: dec!(0.07),
        }
    }

    fn twenty_year_at_six() -> NewLoanTerms {
        NewLoanTerms {
            annual_rate: dec!(0.06),
            term_periods: 240,
            points_rate: dec!(0.02),
            fees: dec!(1_500),
            cash_out: Decimal::ZERO,
        }
    }

    #[test]
    fn test_refinance_reference_scenario() {
        let out = compare_refinance(&RefinanceInput {
            current: statement_loan(),
            new_loan: twenty_year_at_six(),
            policy: RefinancePolicy::default(),
        })
        .unwrap()
        .result;

        assert_close(out.current.remaining_periods, dec!(285.694), dec!(0.001), "remaining");
        assert_eq!(out.candidate.upfront_costs, dec!(6_500));
        assert_close(out.candidate.monthly_payment, dec!(1791.0776), dec!(0.0001), "new payment");
        assert_close(out.monthly_savings, dec!(8.9224), dec!(0.0001), "monthly savings");
        assert_eq!(
            out.break_even_periods,
            Some(dec!(6_500) / out.monthly_savings)
        );
        assert_close(out.total_savings, dec!(77_890.55), dec!(0.05), "total savings");
        // Total savings alone carry it; break-even is far past 60 periods
        assert!(out.is_worthwhile);
    }

    #[test]
    fn test_no_upfront_cost_breaks_even_immediately() {
        assert_eq!(break_even(Decimal::ZERO, dec!(50)), BreakEven::Immediate);
        assert_eq!(break_even(Decimal::ZERO, dec!(-50)), BreakEven::Immediate);
        assert_eq!(break_even(dec!(1_000), Decimal::ZERO), BreakEven::Never);
        assert_eq!(
            break_even(dec!(1_000), dec!(50)),
            BreakEven::AfterPeriods { periods: dec!(20) }
        );
    }

    #[test]
    fn test_worthwhile_heuristic_respects_policy() {
        let policy = RefinancePolicy::default();
        let quick = BreakEven::AfterPeriods { periods: dec!(30) };
        let slow = BreakEven::AfterPeriods { periods: dec!(90) };

        assert!(is_worthwhile(dec!(-10), dec!(100), quick, 360, &policy));
        assert!(!is_worthwhile(dec!(-10), dec!(100), slow, 360, &policy));
        assert!(!is_worthwhile(dec!(-10), dec!(100), quick, 24, &policy));
        assert!(!is_worthwhile(dec!(-10), dec!(-5), BreakEven::Immediate, 360, &policy));

        let relaxed = RefinancePolicy {
            max_break_even_periods: dec!(120),
            require_break_even_within_term: false,
        };
        assert!(is_worthwhile(dec!(-10), dec!(100), slow, 24, &relaxed));
    }

    #[test]
    fn test_current_loan_from_original_terms() {
        let out = compare_refinance(&RefinanceInput {
            current: CurrentLoan::FromOriginal {
                original_principal: dec!(300_000),
                annual_rate: dec!(0.065),
                term_periods: 360,
                periods_elapsed: 60,
            },
            new_loan: NewLoanTerms {
                annual_rate: dec!(0.055),
                term_periods: 300,
                points_rate: Decimal::ZERO,
                fees: dec!(3_000),
                cash_out: Decimal::ZERO,
            },
            policy: RefinancePolicy::default(),
        })
        .unwrap()
        .result;

        assert_close(out.current.monthly_payment, dec!(1896.20), dec!(0.01), "payment");
        assert_close(out.current.balance, dec!(280_832.93), dec!(0.01), "balance");
        assert_eq!(out.current.remaining_periods, dec!(300));
        assert_eq!(out.candidate.principal, out.current.balance);
    }

    #[test]
    fn test_payment_below_interest_is_rejected() {
        let result = compare_refinance(&RefinanceInput {
            current: CurrentLoan::Known {
                balance: dec!(250_000),
                monthly_payment: dec!(1_000),
                annual_rate: dec!(0.07),
            },
            new_loan: twenty_year_at_six(),
            policy: RefinancePolicy::default(),
        });
        assert!(matches!(result, Err(FinCalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_cash_out_adds_to_principal_and_points() {
        let mut new_loan = twenty_year_at_six();
        new_loan.cash_out = dec!(50_000);
        let out = compare_refinance(&RefinanceInput {
            current: statement_loan(),
            new_loan,
            policy: RefinancePolicy::default(),
        })
        .unwrap();
        assert_eq!(out.result.candidate.principal, dec!(300_000));
        assert_eq!(out.result.candidate.upfront_costs, dec!(7_500));
        assert!(out.warnings.iter().any(|w| w.contains("Cash out")));
    }
}
