use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::FinCalcError;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Period counts that may be fractional (analytically solved durations)
pub type Periods = Decimal;

/// Upper bound on simulated schedules, in years of periods.
pub const MAX_SCHEDULE_YEARS: u32 = 100;

/// How often payments fall due within a year
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    #[default]
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl PaymentFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Quarterly => 4,
            PaymentFrequency::SemiAnnual => 2,
            PaymentFrequency::Annual => 1,
        }
    }
}

/// Iteration ceiling for a schedule running at `periods_per_year`.
pub fn schedule_period_cap(periods_per_year: u32) -> u32 {
    MAX_SCHEDULE_YEARS.saturating_mul(periods_per_year.max(1))
}

/// Rounds to cents, half away from zero.
pub fn round_cents(value: Money) -> Money {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Collapse a failed computation into the calculator's blank result.
///
/// Presentation callers render a zeroed result instead of an error state;
/// the error text travels along as the single warning.
pub fn blank_on_error<T: Serialize + Default>(
    methodology: &str,
    outcome: Result<ComputationOutput<T>, FinCalcError>,
) -> ComputationOutput<T> {
    match outcome {
        Ok(output) => output,
        Err(e) => {
            tracing::debug!(error = %e, methodology, "returning blank result");
            with_metadata(
                methodology,
                &serde_json::Value::Null,
                vec![e.to_string()],
                0,
                T::default(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_cents_midpoint_away_from_zero() {
        assert_eq!(round_cents(dec!(10.005)), dec!(10.01));
        assert_eq!(round_cents(dec!(10.004)), dec!(10.00));
        assert_eq!(round_cents(dec!(-10.005)), dec!(-10.01));
    }

    #[test]
    fn test_schedule_cap_is_a_century_of_periods() {
        assert_eq!(schedule_period_cap(12), 1200);
        assert_eq!(schedule_period_cap(1), 100);
        assert_eq!(schedule_period_cap(0), 100);
    }

    #[test]
    fn test_blank_on_error_yields_default_with_warning() {
        let outcome: Result<ComputationOutput<Vec<u32>>, FinCalcError> =
            Err(FinCalcError::invalid("principal", "must be positive"));
        let blank = blank_on_error("Test", outcome);
        assert!(blank.result.is_empty());
        assert_eq!(blank.warnings.len(), 1);
        assert!(blank.warnings[0].contains("principal"));
    }
}
