//! Tax-year parameters: bracket tables, standard deductions and caps.
//!
//! The default configuration holds the 2024 US federal figures. Callers can
//! deserialise a different year; bracket tables are validated on load.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::tax::brackets::BracketTable;
use crate::types::{Money, Rate};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    #[default]
    Single,
    MarriedFilingJointly,
}

/// Tables that vary by filing status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingTables {
    pub ordinary: BracketTable,
    /// Long-term capital gains and qualified dividends (0% / 15% / 20%)
    pub preferential: BracketTable,
    pub standard_deduction: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearConfig {
    pub tax_year: i32,
    pub single: FilingTables,
    pub married_filing_jointly: FilingTables,
    /// Maximum student-loan interest adjustment (per return)
    pub student_loan_interest_cap: Money,
    /// Maximum child-care expenses counted toward itemised deductions
    pub child_care_cap: Money,
    /// Maximum education expenses counted toward itemised deductions
    pub education_cap: Money,
    /// Combined Social Security and Medicare rate on self-employment earnings
    pub self_employment_tax_rate: Rate,
    /// Share of net self-employment income subject to SE tax
    pub self_employment_earnings_factor: Rate,
}

impl TaxYearConfig {
    pub fn federal_2024() -> Self {
        TaxYearConfig {
            tax_year: 2024,
            single: FilingTables {
                ordinary: BracketTable::statutory(
                    &[
                        (dec!(11_600), dec!(0.10)),
                        (dec!(47_150), dec!(0.12)),
                        (dec!(100_525), dec!(0.22)),
                        (dec!(191_950), dec!(0.24)),
                        (dec!(243_725), dec!(0.32)),
                        (dec!(609_350), dec!(0.35)),
                    ],
                    dec!(0.37),
                ),
                preferential: BracketTable::statutory(
                    &[(dec!(47_025), Decimal::ZERO), (dec!(518_900), dec!(0.15))],
                    dec!(0.20),
                ),
                standard_deduction: dec!(14_600),
            },
            married_filing_jointly: FilingTables {
                ordinary: BracketTable::statutory(
                    &[
                        (dec!(23_200), dec!(0.10)),
                        (dec!(94_300), dec!(0.12)),
                        (dec!(201_050), dec!(0.22)),
                        (dec!(383_900), dec!(0.24)),
                        (dec!(487_450), dec!(0.32)),
                        (dec!(731_200), dec!(0.35)),
                    ],
                    dec!(0.37),
                ),
                preferential: BracketTable::statutory(
                    &[(dec!(94_050), Decimal::ZERO), (dec!(583_750), dec!(0.15))],
                    dec!(0.20),
                ),
                standard_deduction: dec!(29_200),
            },
            student_loan_interest_cap: dec!(2_500),
            child_care_cap: dec!(3_000),
            education_cap: dec!(4_000),
            self_employment_tax_rate: dec!(0.153),
            self_employment_earnings_factor: dec!(0.9235),
        }
    }

    pub fn tables(&self, status: FilingStatus) -> &FilingTables {
        match status {
            FilingStatus::Single => &self.single,
            FilingStatus::MarriedFilingJointly => &self.married_filing_jointly,
        }
    }
}

impl Default for TaxYearConfig {
    fn default() -> Self {
        TaxYearConfig::federal_2024()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_is_2024_federal() {
        let config = TaxYearConfig::default();
        assert_eq!(config.tax_year, 2024);
        assert_eq!(config.tables(FilingStatus::Single).standard_deduction, dec!(14_600));
        assert_eq!(
            config.tables(FilingStatus::MarriedFilingJointly).ordinary.brackets().len(),
            7
        );
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = TaxYearConfig::federal_2024();
        let json = serde_json::to_string(&config).unwrap();
        let back: TaxYearConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
