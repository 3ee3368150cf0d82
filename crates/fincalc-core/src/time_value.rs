use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};

use crate::error::FinCalcError;
use crate::types::{Money, Periods, Rate};
use crate::FinCalcResult;

/// Outcome of solving for how many periods a payment stream lasts.
///
/// `Perpetuity` is a terminal state, not a failure: the payment never
/// exceeds the interest accruing on the balance, so the balance is never
/// depleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DurationSolution {
    Finite {
        periods: Periods,
    },
    #[default]
    Perpetuity,
}

impl DurationSolution {
    pub fn is_depleted(&self) -> bool {
        matches!(self, DurationSolution::Finite { .. })
    }

    pub fn periods(&self) -> Option<Periods> {
        match self {
            DurationSolution::Finite { periods } => Some(*periods),
            DurationSolution::Perpetuity => None,
        }
    }
}

/// (1 + r)^n, failing instead of overflowing for extreme inputs.
pub fn compound_factor(rate_per_period: Rate, periods: u32) -> FinCalcResult<Decimal> {
    (Decimal::ONE + rate_per_period)
        .checked_powi(i64::from(periods))
        .ok_or_else(|| {
            FinCalcError::FinancialImpossibility(format!(
                "(1 + {rate_per_period})^{periods} exceeds decimal range"
            ))
        })
}

/// Level payment that retires `principal` over `total_periods`.
///
/// Standard annuity formula `P·r·(1+r)^n / ((1+r)^n − 1)`, collapsing to
/// `P / n` when the periodic rate is zero.
pub fn solve_payment(principal: Money, rate_per_period: Rate, total_periods: u32) -> FinCalcResult<Money> {
    validate_principal(principal)?;
    validate_rate(rate_per_period)?;
    if total_periods == 0 {
        return Err(FinCalcError::invalid(
            "total_periods",
            "Number of periods must be > 0",
        ));
    }

    if rate_per_period.is_zero() {
        return Ok(principal / Decimal::from(total_periods));
    }

    let factor = compound_factor(rate_per_period, total_periods)?;
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return Err(FinCalcError::DivisionByZero {
            context: "annuity payment factor".into(),
        });
    }

    Ok(principal * rate_per_period * (factor / denominator))
}

/// Number of periods a fixed payment takes to deplete `principal`.
///
/// The perpetuity test is exact: a payment equal to the first period's
/// interest never depletes the balance.
pub fn solve_duration(principal: Money, rate_per_period: Rate, payment: Money) -> FinCalcResult<DurationSolution> {
    validate_principal(principal)?;
    validate_rate(rate_per_period)?;
    if payment <= Decimal::ZERO {
        return Err(FinCalcError::invalid("payment", "Payment must be positive"));
    }

    if rate_per_period.is_zero() {
        return Ok(DurationSolution::Finite {
            periods: principal / payment,
        });
    }

    let ratio = principal * rate_per_period / payment;
    if ratio >= Decimal::ONE {
        tracing::debug!(%principal, %rate_per_period, %payment, "payment never exceeds interest");
        return Ok(DurationSolution::Perpetuity);
    }

    let numerator = (Decimal::ONE - ratio).checked_ln().ok_or_else(|| {
        FinCalcError::FinancialImpossibility("ln(1 - interest/payment) undefined".into())
    })?;
    let denominator = (Decimal::ONE + rate_per_period).checked_ln().ok_or_else(|| {
        FinCalcError::FinancialImpossibility("ln(1 + rate) undefined".into())
    })?;
    if denominator.is_zero() {
        return Err(FinCalcError::DivisionByZero {
            context: "duration log ratio".into(),
        });
    }

    Ok(DurationSolution::Finite {
        periods: -numerator / denominator,
    })
}

/// Outstanding balance of a level-payment loan after `periods_elapsed`.
pub fn solve_remaining_balance(
    original_principal: Money,
    rate_per_period: Rate,
    total_periods: u32,
    periods_elapsed: u32,
) -> FinCalcResult<Money> {
    validate_principal(original_principal)?;
    validate_rate(rate_per_period)?;
    if total_periods == 0 {
        return Err(FinCalcError::invalid(
            "total_periods",
            "Number of periods must be > 0",
        ));
    }
    if periods_elapsed > total_periods {
        return Err(FinCalcError::invalid(
            "periods_elapsed",
            format!("Elapsed periods ({periods_elapsed}) exceed the loan term ({total_periods})"),
        ));
    }
    if periods_elapsed == total_periods {
        return Ok(Decimal::ZERO);
    }

    if rate_per_period.is_zero() {
        let per_period = original_principal / Decimal::from(total_periods);
        return Ok(original_principal - per_period * Decimal::from(periods_elapsed));
    }

    let full = compound_factor(rate_per_period, total_periods)?;
    let elapsed = compound_factor(rate_per_period, periods_elapsed)?;
    let denominator = full - Decimal::ONE;
    if denominator.is_zero() {
        return Err(FinCalcError::DivisionByZero {
            context: "remaining balance factor".into(),
        });
    }

    Ok(original_principal * ((full - elapsed) / denominator))
}

fn validate_principal(principal: Money) -> FinCalcResult<()> {
    if principal <= Decimal::ZERO {
        return Err(FinCalcError::invalid("principal", "Principal must be positive"));
    }
    Ok(())
}

fn validate_rate(rate_per_period: Rate) -> FinCalcResult<()> {
    if rate_per_period < Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "rate_per_period",
            "Periodic rate cannot be negative",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal) {
        let diff = (actual - expected).abs();
        assert!(diff <= tol, "expected ~{expected}, got {actual} (diff = {diff})");
    }

    #[test]
    fn test_payment_zero_rate_is_straight_division() {
        let payment = solve_payment(dec!(12_000), Decimal::ZERO, 48).unwrap();
        assert_eq!(payment, dec!(250));
    }

    #[test]
    fn test_payment_standard_mortgage() {
        // 500k at 6% nominal, monthly, 10 years
        let payment = solve_payment(dec!(500_000), dec!(0.005), 120).unwrap();
        assert_close(payment, dec!(5551.03), dec!(0.01));
    }

    #[test]
    fn test_payment_rejects_non_positive_principal() {
        assert!(matches!(
            solve_payment(Decimal::ZERO, dec!(0.01), 12),
            Err(FinCalcError::InvalidInput { .. })
        ));
        assert!(solve_payment(dec!(-5), dec!(0.01), 12).is_err());
    }

    #[test]
    fn test_payment_rejects_zero_periods() {
        assert!(matches!(
            solve_payment(dec!(1_000), dec!(0.01), 0),
            Err(FinCalcError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_duration_zero_rate() {
        let d = solve_duration(dec!(10_000), Decimal::ZERO, dec!(400)).unwrap();
        assert_eq!(d, DurationSolution::Finite { periods: dec!(25) });
    }

    #[test]
    fn test_duration_inverts_payment() {
        let payment = solve_payment(dec!(250_000), dec!(0.0045), 360).unwrap();
        let periods = solve_duration(dec!(250_000), dec!(0.0045), payment)
            .unwrap()
            .periods()
            .unwrap();
        assert_close(periods, dec!(360), dec!(0.00036));
    }

    #[test]
    fn test_duration_perpetuity_at_exact_interest() {
        // interest on 100k at 0.5% = 500 per period
        let d = solve_duration(dec!(100_000), dec!(0.005), dec!(500)).unwrap();
        assert_eq!(d, DurationSolution::Perpetuity);
        assert!(!d.is_depleted());

        let below = solve_duration(dec!(100_000), dec!(0.005), dec!(499.99)).unwrap();
        assert_eq!(below, DurationSolution::Perpetuity);

        let above = solve_duration(dec!(100_000), dec!(0.005), dec!(500.01)).unwrap();
        assert!(above.is_depleted());
    }

    #[test]
    fn test_duration_rejects_non_positive_payment() {
        assert!(solve_duration(dec!(1_000), dec!(0.01), Decimal::ZERO).is_err());
    }

    #[test]
    fn test_remaining_balance_endpoints() {
        let start = solve_remaining_balance(dec!(200_000), dec!(0.005), 360, 0).unwrap();
        assert_close(start, dec!(200_000), dec!(0.000001));

        let end = solve_remaining_balance(dec!(200_000), dec!(0.005), 360, 360).unwrap();
        assert_eq!(end, Decimal::ZERO);
    }

    #[test]
    fn test_remaining_balance_zero_rate_is_linear() {
        let bal = solve_remaining_balance(dec!(12_000), Decimal::ZERO, 12, 3).unwrap();
        assert_eq!(bal, dec!(9_000));
    }

    #[test]
    fn test_remaining_balance_matches_manual_roll_forward() {
        let principal = dec!(100_000);
        let r = dec!(0.004);
        let payment = solve_payment(principal, r, 180).unwrap();
        let mut balance = principal;
        for _ in 0..24 {
            balance = balance * (Decimal::ONE + r) - payment;
        }
        let closed = solve_remaining_balance(principal, r, 180, 24).unwrap();
        assert_close(closed, balance, dec!(0.0001));
    }

    #[test]
    fn test_remaining_balance_rejects_elapsed_beyond_term() {
        assert!(solve_remaining_balance(dec!(1_000), dec!(0.01), 12, 13).is_err());
    }
}
