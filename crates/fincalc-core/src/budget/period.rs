use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::{with_metadata, ComputationOutput, Money};
use crate::FinCalcResult;

/// Period an amount is quoted in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodUnit {
    #[default]
    Month,
    Year,
    Week,
    Biweekly,
}

/// Converts `amount` per `unit` into a monthly amount. Negative amounts
/// count as zero.
pub fn normalize_to_monthly(amount: Money, unit: PeriodUnit) -> Money {
    if amount <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    match unit {
        PeriodUnit::Month => amount,
        PeriodUnit::Year => amount / dec!(12),
        PeriodUnit::Week => amount * dec!(52) / dec!(12),
        PeriodUnit::Biweekly => amount * dec!(26) / dec!(12),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeInput {
    pub amount: Money,
    #[serde(default)]
    pub unit: PeriodUnit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedAmount {
    pub original: Money,
    pub unit: PeriodUnit,
    pub monthly: Money,
    pub annual: Money,
}

pub fn normalize_amount(input: &NormalizeInput) -> FinCalcResult<ComputationOutput<NormalizedAmount>> {
    let start = Instant::now();
    let mut warnings = Vec::new();
    if input.amount < Decimal::ZERO {
        warnings.push(format!("Negative amount {} treated as zero", input.amount));
    }

    let monthly = normalize_to_monthly(input.amount, input.unit);
    let output = NormalizedAmount {
        original: input.amount,
        unit: input.unit,
        monthly,
        annual: monthly * dec!(12),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Period normalisation: year /12, week x52/12, biweekly x26/12",
        input,
        warnings,
        elapsed,
        output,
    ))
}
