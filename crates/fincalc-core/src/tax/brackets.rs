//! Progressive bracket tables and their evaluation.
//!
//! A [`BracketTable`] is contiguous and gapless by construction: it starts
//! at zero, each bracket begins where the previous one ends, and only the
//! last bracket is unbounded. Tables that break this are configuration
//! errors and are rejected when built or deserialised.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FinCalcError;
use crate::types::{Money, Rate};
use crate::FinCalcResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub lower_bound: Money,
    /// `None` for the top, unbounded bracket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<Money>,
    /// Marginal rate applied to income inside the bracket
    pub rate: Rate,
}

impl TaxBracket {
    pub fn width(&self) -> Option<Money> {
        self.upper_bound.map(|upper| upper - self.lower_bound)
    }

    fn contains(&self, income: Money) -> bool {
        income >= self.lower_bound && self.upper_bound.map_or(true, |upper| income < upper)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct BracketTable {
    brackets: Vec<TaxBracket>,
}

impl BracketTable {
    pub fn new(brackets: Vec<TaxBracket>) -> FinCalcResult<Self> {
        let table = BracketTable { brackets };
        table.validate()?;
        Ok(table)
    }

    /// Build a table from ascending `(upper_bound, rate)` tiers plus the
    /// rate of the unbounded top bracket.
    ///
    /// Only used for statutory tables compiled into the crate, so a
    /// malformed tier list is a programming error.
    pub(crate) fn statutory(tiers: &[(Money, Rate)], top_rate: Rate) -> Self {
        let mut brackets = Vec::with_capacity(tiers.len() + 1);
        let mut lower_bound = Decimal::ZERO;
        for &(upper, rate) in tiers {
            brackets.push(TaxBracket {
                lower_bound,
                upper_bound: Some(upper),
                rate,
            });
            lower_bound = upper;
        }
        brackets.push(TaxBracket {
            lower_bound,
            upper_bound: None,
            rate: top_rate,
        });

        let table = BracketTable { brackets };
        if let Err(e) = table.validate() {
            panic!("statutory bracket table is malformed: {e}");
        }
        table
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    fn validate(&self) -> FinCalcResult<()> {
        let Some(first) = self.brackets.first() else {
            return Err(FinCalcError::InvalidConfiguration(
                "bracket table is empty".into(),
            ));
        };
        if !first.lower_bound.is_zero() {
            return Err(FinCalcError::InvalidConfiguration(format!(
                "first bracket starts at {} instead of 0",
                first.lower_bound
            )));
        }

        let last_idx = self.brackets.len() - 1;
        for (idx, bracket) in self.brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(FinCalcError::InvalidConfiguration(format!(
                    "bracket {idx} rate {} outside [0, 1]",
                    bracket.rate
                )));
            }
            match (bracket.upper_bound, idx == last_idx) {
                (None, true) => {}
                (None, false) => {
                    return Err(FinCalcError::InvalidConfiguration(format!(
                        "bracket {idx} is unbounded but is not the last bracket"
                    )));
                }
                (Some(_), true) => {
                    return Err(FinCalcError::InvalidConfiguration(
                        "top bracket must be unbounded".into(),
                    ));
                }
                (Some(upper), false) => {
                    if upper <= bracket.lower_bound {
                        return Err(FinCalcError::InvalidConfiguration(format!(
                            "bracket {idx} is empty or inverted ({} to {upper})",
                            bracket.lower_bound
                        )));
                    }
                    let next = &self.brackets[idx + 1];
                    if next.lower_bound != upper {
                        return Err(FinCalcError::InvalidConfiguration(format!(
                            "bracket {} starts at {} but bracket {idx} ends at {upper}",
                            idx + 1,
                            next.lower_bound
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

impl TryFrom<Vec<TaxBracket>> for BracketTable {
    type Error = FinCalcError;

    fn try_from(brackets: Vec<TaxBracket>) -> Result<Self, Self::Error> {
        BracketTable::new(brackets)
    }
}

impl From<BracketTable> for Vec<TaxBracket> {
    fn from(table: BracketTable) -> Self {
        table.brackets
    }
}

/// Tax on `taxable_income` under a progressive table.
pub fn evaluate_progressive_tax(taxable_income: Money, table: &BracketTable) -> Money {
    if taxable_income <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut tax = Decimal::ZERO;
    let mut remaining = taxable_income;
    for bracket in table.brackets() {
        if remaining <= Decimal::ZERO {
            break;
        }
        let slice = match bracket.width() {
            Some(width) => remaining.min(width),
            None => remaining,
        };
        tax += slice * bracket.rate;
        remaining -= slice;
    }
    tax
}

/// Tax on preferential income stacked on top of ordinary taxable income.
///
/// The preferential income fills the slice
/// `[ordinary_taxable_income, ordinary_taxable_income + preferential_income]`
/// of the preferential table, so more ordinary income pushes the same gains
/// into higher preferential brackets.
pub fn evaluate_preferential_tax(
    ordinary_taxable_income: Money,
    preferential_income: Money,
    table: &BracketTable,
) -> Money {
    if preferential_income <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let floor = ordinary_taxable_income.max(Decimal::ZERO);
    let ceiling = floor + preferential_income;
    evaluate_progressive_tax(ceiling, table) - evaluate_progressive_tax(floor, table)
}

/// Rate applied to the next dollar above `income`.
pub fn marginal_rate(income: Money, table: &BracketTable) -> Rate {
    let income = income.max(Decimal::ZERO);
    table
        .brackets()
        .iter()
        .find(|b| b.contains(income))
        .map(|b| b.rate)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn simple_table() -> BracketTable {
        BracketTable::statutory(&[(dec!(10_000), dec!(0.10)), (dec!(40_000), dec!(0.20))], dec!(0.30))
    }

    fn ltcg_table() -> BracketTable {
        BracketTable::statutory(&[(dec!(47_025), dec!(0)), (dec!(518_900), dec!(0.15))], dec!(0.20))
    }

    #[test]
    fn test_income_at_upper_bound_taxes_full_width_only() {
        let tax = evaluate_progressive_tax(dec!(10_000), &simple_table());
        assert_eq!(tax, dec!(1_000));
    }

    #[test]
    fn test_one_dollar_past_edge_uses_next_rate() {
        let table = simple_table();
        let at_edge = evaluate_progressive_tax(dec!(40_000), &table);
        let past_edge = evaluate_progressive_tax(dec!(40_001), &table);
        assert_eq!(at_edge, dec!(7_000));
        assert_eq!(past_edge - at_edge, dec!(0.30));
    }

    #[test]
    fn test_zero_and_negative_income_owe_nothing() {
        assert_eq!(evaluate_progressive_tax(Decimal::ZERO, &simple_table()), Decimal::ZERO);
        assert_eq!(evaluate_progressive_tax(dec!(-500), &simple_table()), Decimal::ZERO);
    }

    #[test]
    fn test_preferential_income_stacks_on_ordinary() {
        let table = ltcg_table();
        let gains = dec!(20_000);

        // Entirely inside the 0% band
        assert_eq!(evaluate_preferential_tax(dec!(20_000), gains, &table), Decimal::ZERO);

        // Same gains, more ordinary income: 12,975 spills into 15%
        let tax = evaluate_preferential_tax(dec!(40_000), gains, &table);
        assert_eq!(tax, dec!(12_975) * dec!(0.15));

        // Ordinary income already above the 0% band: all gains at 15%
        let tax = evaluate_preferential_tax(dec!(60_000), gains, &table);
        assert_eq!(tax, dec!(3_000));
    }

    #[test]
    fn test_marginal_rate_at_boundary_is_next_bracket() {
        let table = simple_table();
        assert_eq!(marginal_rate(dec!(9_999), &table), dec!(0.10));
        assert_eq!(marginal_rate(dec!(10_000), &table), dec!(0.20));
        assert_eq!(marginal_rate(dec!(1_000_000), &table), dec!(0.30));
    }

    #[test]
    fn test_rejects_gap_between_brackets() {
        let result = BracketTable::new(vec![
            TaxBracket { lower_bound: dec!(0), upper_bound: Some(dec!(100)), rate: dec!(0.1) },
            TaxBracket { lower_bound: dec!(150), upper_bound: None, rate: dec!(0.2) },
        ]);
        assert!(matches!(result, Err(FinCalcError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_rejects_overlap_and_bounded_top() {
        let overlap = BracketTable::new(vec![
            TaxBracket { lower_bound: dec!(0), upper_bound: Some(dec!(100)), rate: dec!(0.1) },
            TaxBracket { lower_bound: dec!(50), upper_bound: None, rate: dec!(0.2) },
        ]);
        assert!(overlap.is_err());

        let bounded_top = BracketTable::new(vec![TaxBracket {
            lower_bound: dec!(0),
            upper_bound: Some(dec!(100)),
            rate: dec!(0.1),
        }]);
        assert!(bounded_top.is_err());

        assert!(BracketTable::new(Vec::new()).is_err());
    }

    #[test]
    fn test_deserialise_validates_table() {
        let gapped = r#"[
            {"lower_bound": "0", "upper_bound": "100", "rate": "0.1"},
            {"lower_bound": "200", "rate": "0.2"}
        ]"#;
        assert!(serde_json::from_str::<BracketTable>(gapped).is_err());

        let ok = r#"[
            {"lower_bound": "0", "upper_bound": "100", "rate": "0.1"},
            {"lower_bound": "100", "rate": "0.2"}
        ]"#;
        let table: BracketTable = serde_json::from_str(ok).unwrap();
        assert_eq!(table.brackets().len(), 2);
    }
}
