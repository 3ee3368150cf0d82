//! Annuity payout calculator.
//!
//! Given a starting balance and a growth rate, either derive the level
//! payout that exhausts the balance over a fixed length, or derive how long
//! a fixed payout lasts (possibly forever).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::schedule::{
    fixed_payment_schedule, fixed_term_schedule, yearly_summary, Schedule, ScheduleEntry,
    YearSummary,
};
use crate::error::FinCalcError;
use crate::time_value::{solve_duration, DurationSolution};
use crate::types::{with_metadata, ComputationOutput, Money, PaymentFrequency, Periods, Rate};
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Which quantity the calculator solves for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Solve {
    /// Fixed length: derive the payout
    ForPayment { years: u32 },
    /// Fixed payout: derive the length
    ForDuration { payment: Money },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Starting balance
    pub principal: Money,
    /// Nominal annual rate (0.06 = 6%)
    pub annual_rate: Rate,
    #[serde(default)]
    pub frequency: PaymentFrequency,
    pub solve: Solve,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PayoutDuration {
    Finite {
        periods: Periods,
        years: Decimal,
    },
    #[default]
    Perpetual,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnuityOutput {
    /// Level payout per period
    pub payment: Money,
    pub periods_per_year: u32,
    pub duration: PayoutDuration,
    pub total_payments: Money,
    /// Growth credited to the balance over the payout
    pub total_interest: Money,
    pub schedule: Vec<ScheduleEntry>,
    pub yearly_summary: Vec<YearSummary>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn calculate_annuity(input: &LoanTerms) -> FinCalcResult<ComputationOutput<AnnuityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate_terms(input)?;

    let periods_per_year = input.frequency.periods_per_year();
    let rate_per_period = input.annual_rate / Decimal::from(periods_per_year);

    let (output, methodology) = match &input.solve {
        Solve::ForPayment { years } => {
            let total_periods = years.checked_mul(periods_per_year).ok_or_else(|| {
                FinCalcError::invalid("years", "Payout length is too long")
            })?;
            let schedule = fixed_term_schedule(input.principal, rate_per_period, total_periods)?;
            if schedule.payment.is_zero() {
                warnings.push(format!(
                    "The level payout rounds to zero cents; the whole balance of {} is paid in period {}",
                    input.principal, total_periods
                ));
            } else if let Some(last) = schedule.depletion_period.filter(|p| *p < total_periods) {
                warnings.push(format!(
                    "Cent rounding raises the payout to {}; the balance runs out after {last} of {total_periods} periods",
                    schedule.payment
                ));
            }
            let duration = PayoutDuration::Finite {
                periods: Decimal::from(total_periods),
                years: Decimal::from(*years),
            };
            (
                build_output(&schedule, periods_per_year, duration),
                "Annuity payout (fixed length): level annuity payment",
            )
        }
        Solve::ForDuration { payment } => {
            let solution = solve_duration(input.principal, rate_per_period, *payment)?;
            let output = match solution {
                DurationSolution::Perpetuity => {
                    warnings.push(format!(
                        "A payout of {payment} never exceeds the {} of growth per period; \
                         the balance is never depleted",
                        input.principal * rate_per_period
                    ));
                    AnnuityOutput {
                        payment: *payment,
                        periods_per_year,
                        duration: PayoutDuration::Perpetual,
                        ..AnnuityOutput::default()
                    }
                }
                DurationSolution::Finite { periods } => {
                    let schedule = fixed_payment_schedule(
                        input.principal,
                        rate_per_period,
                        *payment,
                        periods_per_year,
                    )?;
                    if schedule.entries.is_empty() {
                        warnings.push(format!(
                            "A payout of {payment} barely exceeds the {} of growth per period; \
                             after cent rounding no schedule rows are produced",
                            input.principal * rate_per_period
                        ));
                    } else if schedule.capped {
                        warnings.push(format!(
                            "Schedule truncated after {} periods; the payout runs for roughly {} periods",
                            schedule.entries.len(),
                            periods.round_dp(2)
                        ));
                    }
                    let duration = PayoutDuration::Finite {
                        periods,
                        years: periods / Decimal::from(periods_per_year),
                    };
                    build_output(&schedule, periods_per_year, duration)
                }
            };
            (output, "Annuity payout (fixed payment): logarithmic duration solve")
        }
    };

    tracing::debug!(
        principal = %input.principal,
        payment = %output.payment,
        periods = output.schedule.len(),
        "annuity payout computed"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, warnings, elapsed, output))
}

fn build_output(schedule: &Schedule, periods_per_year: u32, duration: PayoutDuration) -> AnnuityOutput {
    AnnuityOutput {
        payment: schedule.payment,
        periods_per_year,
        duration,
        total_payments: schedule.total_paid,
        total_interest: schedule.total_interest,
        yearly_summary: yearly_summary(schedule, periods_per_year),
        schedule: schedule.entries.clone(),
    }
}

fn validate_terms(input: &LoanTerms) -> FinCalcResult<()> {
    if input.principal <= Decimal::ZERO {
        return Err(FinCalcError::invalid("principal", "Principal must be positive"));
    }
    if input.annual_rate < Decimal::ZERO {
        return Err(FinCalcError::invalid("annual_rate", "Annual rate cannot be negative"));
    }
    match &input.solve {
        Solve::ForPayment { years } if *years == 0 => Err(FinCalcError::invalid(
            "years",
            "Payout length must be at least 1 year",
        )),
        Solve::ForDuration { payment } if *payment <= Decimal::ZERO => Err(
            FinCalcError::invalid("payment", "Payout must be positive"),
        ),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn terms(solve: Solve) -> LoanTerms {
        LoanTerms {
            principal: dec!(500_000),
            annual_rate: dec!(0.06),
            frequency: PaymentFrequency::Monthly,
            solve,
        }
    }

    #[test]
    fn test_fixed_length_payout() {
        let out = calculate_annuity(&terms(Solve::ForPayment { years: 10 }))
            .unwrap()
            .result;
        assert_eq!(out.payment, dec!(5551.03));
        assert_eq!(out.schedule.len(), 120);
        assert_eq!(out.yearly_summary.len(), 10);
        assert_eq!(out.total_interest, out.total_payments - dec!(500_000));
        assert_eq!(
            out.duration,
            PayoutDuration::Finite {
                periods: dec!(120),
                years: dec!(10)
            }
        );
    }

    #[test]
    fn test_fixed_payment_payout_duration() {
        let out = calculate_annuity(&terms(Solve::ForDuration { payment: dec!(5551.03) }))
            .unwrap()
            .result;
        match out.duration {
            PayoutDuration::Finite { years, .. } => {
                assert!((years - dec!(10)).abs() < dec!(0.01), "years = {years}")
            }
            PayoutDuration::Perpetual => panic!("expected a finite payout"),
        }
        assert_eq!(out.schedule.last().unwrap().ending_balance, Decimal::ZERO);
    }

    #[test]
    fn test_payout_below_growth_is_perpetual() {
        let result = calculate_annuity(&terms(Solve::ForDuration { payment: dec!(2_500) })).unwrap();
        assert_eq!(result.result.duration, PayoutDuration::Perpetual);
        assert!(result.result.schedule.is_empty());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_payout_just_above_exact_growth_warns_when_schedule_is_empty() {
        let input = LoanTerms {
            principal: dec!(100_000),
            annual_rate: dec!(0.0599995),
            frequency: PaymentFrequency::Monthly,
            solve: Solve::ForDuration { payment: dec!(499.999) },
        };
        let out = calculate_annuity(&input).unwrap();
        assert!(matches!(out.result.duration, PayoutDuration::Finite { .. }));
        assert!(out.result.schedule.is_empty());
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("no schedule rows"));
    }

    #[test]
    fn test_payout_rounding_to_zero_cents_warns() {
        let input = LoanTerms {
            principal: dec!(0.01),
            annual_rate: dec!(0.12),
            frequency: PaymentFrequency::Monthly,
            solve: Solve::ForPayment { years: 30 },
        };
        let out = calculate_annuity(&input).unwrap();
        assert_eq!(out.result.payment, Decimal::ZERO);
        assert_eq!(out.result.schedule.len(), 360);
        assert_eq!(out.result.schedule.last().unwrap().payment, dec!(0.01));
        assert!(out.warnings.iter().any(|w| w.contains("zero cents")));
    }

    #[test]
    fn test_rounded_up_payout_ending_early_warns() {
        // 0.10 over 12 months rounds 0.00833 up to 0.01
        let input = LoanTerms {
            principal: dec!(0.10),
            annual_rate: Decimal::ZERO,
            frequency: PaymentFrequency::Monthly,
            solve: Solve::ForPayment { years: 1 },
        };
        let out = calculate_annuity(&input).unwrap();
        assert_eq!(out.result.payment, dec!(0.01));
        assert_eq!(out.result.schedule.len(), 10);
        assert!(out.warnings.iter().any(|w| w.contains("after 10 of 12 periods")));
    }

    #[test]
    fn test_quarterly_frequency() {
        let input = LoanTerms {
            frequency: PaymentFrequency::Quarterly,
            ..terms(Solve::ForPayment { years: 5 })
        };
        let out = calculate_annuity(&input).unwrap().result;
        assert_eq!(out.periods_per_year, 4);
        assert_eq!(out.schedule.len(), 20);
        assert_eq!(out.yearly_summary.len(), 5);
    }

    #[test]
    fn test_rejects_zero_years() {
        assert!(calculate_annuity(&terms(Solve::ForPayment { years: 0 })).is_err());
    }

    #[test]
    fn test_serde_tagged_solve_mode() {
        let json = r#"{"principal":"100000","annual_rate":"0.05","solve":{"mode":"for_duration","payment":"1000"}}"#;
        let parsed: LoanTerms = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.frequency, PaymentFrequency::Monthly);
        assert_eq!(parsed.solve, Solve::ForDuration { payment: dec!(1000) });
    }
}
