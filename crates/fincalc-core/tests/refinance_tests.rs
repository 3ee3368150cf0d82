#![cfg(feature = "refinance")]

use fincalc_core::refinance::comparison::{
    compare_refinance, BreakEven, CurrentLoan, NewLoanTerms, RefinanceInput, RefinancePolicy,
};
use fincalc_core::FinCalcError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn assert_close(actual: Decimal, expected: Decimal, tolerance: Decimal, msg: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{msg}: expected ~{expected}, got {actual} (diff={diff}, tol={tolerance})"
    );
}

fn reference_input() -> RefinanceInput {
    RefinanceInput {
        current: CurrentLoan::Known {
            balance: dec!(250_000),
            monthly_payment: dec!(1_800),
            annual_rate: dec!(0.07),
        },
        new_loan: NewLoanTerms {
            annual_rate: dec!(0.06),
            term_periods: 240,
            points_rate: dec!(0.02),
            fees: dec!(1_500),
            cash_out: Decimal::ZERO,
        },
        policy: RefinancePolicy::default(),
    }
}

// ===========================================================================
// Reference scenario
// ===========================================================================

#[test]
fn test_upfront_costs_and_break_even() {
    let r = compare_refinance(&reference_input()).unwrap().result;
    assert_eq!(r.candidate.upfront_costs, dec!(6_500));
    match r.break_even {
        BreakEven::AfterPeriods { periods } => {
            assert_eq!(periods, dec!(6_500) / r.monthly_savings);
            assert_close(periods, dec!(728.51), dec!(0.01), "break-even");
        }
        other => panic!("expected a finite break-even, got {other:?}"),
    }
}

#[test]
fn test_recommendation_follows_compound_rule() {
    let r = compare_refinance(&reference_input()).unwrap().result;
    let be = r.break_even_periods.unwrap();
    let rule = r.total_savings > Decimal::ZERO
        || (r.monthly_savings > Decimal::ZERO && be < dec!(240) && be < dec!(60));
    assert_eq!(r.is_worthwhile, rule);
    assert!(r.is_worthwhile);
}

#[test]
fn test_interest_savings_reported() {
    let r = compare_refinance(&reference_input()).unwrap().result;
    assert_close(r.current.remaining_interest, dec!(264_249.19), dec!(0.05), "current interest");
    assert_close(r.candidate.total_interest, dec!(179_858.64), dec!(0.05), "new interest");
    assert_eq!(
        r.interest_savings,
        r.current.remaining_interest - r.candidate.total_interest
    );
}

// ===========================================================================
// Edge cases
// ===========================================================================

#[test]
fn test_higher_rate_never_breaks_even() {
    let mut input = reference_input();
    input.new_loan.annual_rate = dec!(0.09);
    input.new_loan.term_periods = 360;
    let out = compare_refinance(&input).unwrap();
    assert!(out.result.monthly_savings < Decimal::ZERO);
    assert_eq!(out.result.break_even, BreakEven::Never);
    assert_eq!(out.result.break_even_periods, None);
    assert!(!out.result.is_worthwhile);
    assert!(!out.warnings.is_empty());
}

#[test]
fn test_free_refinance_breaks_even_immediately() {
    let mut input = reference_input();
    input.new_loan.points_rate = Decimal::ZERO;
    input.new_loan.fees = Decimal::ZERO;
    let r = compare_refinance(&input).unwrap().result;
    assert_eq!(r.break_even, BreakEven::Immediate);
    assert_eq!(r.break_even_periods, Some(Decimal::ZERO));
}

#[test]
fn test_perpetual_current_loan_rejected() {
    let mut input = reference_input();
    input.current = CurrentLoan::Known {
        balance: dec!(250_000),
        monthly_payment: dec!(1_400),
        annual_rate: dec!(0.07),
    };
    assert!(matches!(
        compare_refinance(&input),
        Err(FinCalcError::InvalidInput { .. })
    ));
}

#[test]
fn test_input_deserialises_from_tagged_json() {
    let json = r#"{
        "current": {
            "source": "from_original",
            "original_principal": "300000",
            "annual_rate": "0.065",
            "term_periods": 360,
            "periods_elapsed": 60
        },
        "new_loan": { "annual_rate": "0.055", "term_periods": 300 }
    }"#;
    let input: RefinanceInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.policy.max_break_even_periods, dec!(60));
    let r = compare_refinance(&input).unwrap().result;
    assert_eq!(r.break_even, BreakEven::Immediate);
    assert!(r.is_worthwhile);
}
