#![cfg(feature = "tax")]

use fincalc_core::tax::brackets::{evaluate_progressive_tax, BracketTable, TaxBracket};
use fincalc_core::tax::config::{FilingStatus, TaxYearConfig};
use fincalc_core::tax::individual::{
    compute_individual_tax, compute_joint_tax, IndividualTaxInput, JointTaxInput, TaxInputs,
};
use fincalc_core::tax::marriage::{compare_marriage_tax, MarriageComparisonInput, MarriageOutcome};
use fincalc_core::FinCalcError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn salaried(salary: Decimal) -> TaxInputs {
    TaxInputs {
        salary,
        ..TaxInputs::default()
    }
}

// ===========================================================================
// Individual returns
// ===========================================================================

#[test]
fn test_single_filer_hundred_thousand() {
    let out = compute_individual_tax(&IndividualTaxInput {
        taxpayer: salaried(dec!(100_000)),
        config: TaxYearConfig::default(),
    })
    .unwrap();
    let r = &out.result;
    assert_eq!(r.filing_status, FilingStatus::Single);
    assert_eq!(r.taxable_income, dec!(85_400));
    assert_eq!(r.total_tax, dec!(13_841));
    assert_eq!(r.marginal_rate, dec!(0.22));
    assert_eq!(r.after_tax_income, dec!(86_159));
}

#[test]
fn test_long_term_gains_stack_on_ordinary_income() {
    let out = compute_individual_tax(&IndividualTaxInput {
        taxpayer: TaxInputs {
            salary: dec!(60_000),
            long_term_gains: dec!(30_000),
            ..TaxInputs::default()
        },
        config: TaxYearConfig::default(),
    })
    .unwrap();
    let r = &out.result;
    // 45,400 ordinary taxable; gains fill 45,400..75,400 of the 0/15/20 table
    assert_eq!(r.ordinary_tax, dec!(5_216));
    assert_eq!(r.preferential_tax, dec!(4_256.25));
    assert_eq!(r.total_tax, dec!(9_472.25));
}

#[test]
fn test_joint_return_uses_joint_tables() {
    let out = compute_joint_tax(&JointTaxInput {
        spouse_a: salaried(dec!(150_000)),
        spouse_b: TaxInputs::default(),
        config: TaxYearConfig::default(),
    })
    .unwrap();
    assert_eq!(out.result.filing_status, FilingStatus::MarriedFilingJointly);
    assert_eq!(out.result.deduction_applied, dec!(29_200));
    assert_eq!(out.result.total_tax, dec!(16_682));
}

#[test]
fn test_custom_year_config_from_json() {
    let mut config = TaxYearConfig::default();
    config.tax_year = 2025;
    config.single.ordinary = BracketTable::new(vec![
        TaxBracket {
            lower_bound: Decimal::ZERO,
            upper_bound: Some(dec!(50_000)),
            rate: dec!(0.10),
        },
        TaxBracket {
            lower_bound: dec!(50_000),
            upper_bound: None,
            rate: dec!(0.20),
        },
    ])
    .unwrap();
    let json = serde_json::to_string(&config).unwrap();
    let parsed: TaxYearConfig = serde_json::from_str(&json).unwrap();

    assert_eq!(
        evaluate_progressive_tax(dec!(60_000), &parsed.single.ordinary),
        dec!(7_000)
    );
}

#[test]
fn test_negative_salary_rejected() {
    let result = compute_individual_tax(&IndividualTaxInput {
        taxpayer: salaried(dec!(-1)),
        config: TaxYearConfig::default(),
    });
    assert!(matches!(result, Err(FinCalcError::InvalidInput { .. })));
}

// ===========================================================================
// Marriage comparison
// ===========================================================================

#[test]
fn test_marriage_outcomes() {
    let compare = |a: Decimal, b: Decimal| {
        compare_marriage_tax(&MarriageComparisonInput {
            spouse_a: salaried(a),
            spouse_b: salaried(b),
            config: TaxYearConfig::default(),
        })
        .unwrap()
        .result
    };

    assert_eq!(compare(dec!(100_000), dec!(100_000)).outcome, MarriageOutcome::Neutral);
    assert_eq!(compare(dec!(150_000), Decimal::ZERO).outcome, MarriageOutcome::Bonus);
    assert_eq!(compare(dec!(400_000), dec!(400_000)).outcome, MarriageOutcome::Penalty);
}

#[test]
fn test_marriage_difference_is_joint_minus_singles() {
    let out = compare_marriage_tax(&MarriageComparisonInput {
        spouse_a: salaried(dec!(90_000)),
        spouse_b: salaried(dec!(35_000)),
        config: TaxYearConfig::default(),
    })
    .unwrap()
    .result;
    assert_eq!(
        out.combined_single_tax,
        out.spouse_a_single.total_tax + out.spouse_b_single.total_tax
    );
    assert_eq!(
        out.difference,
        (out.joint.total_tax - out.combined_single_tax).round_dp(2)
    );
}
