use napi::Result as NapiResult;
use napi_derive::napi;
use serde::{de::DeserializeOwned, Serialize};

use fincalc_core::{blank_on_error, ComputationOutput, FinCalcResult};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse `input_json`, run `calc`, and serialise the envelope.
///
/// Malformed JSON is a thrown error. Business-rule failures come back as the
/// calculator's zeroed result with the error text as its only warning, so
/// form-driven callers always have something to render.
fn run<I, T>(
    methodology: &str,
    input_json: &str,
    calc: impl FnOnce(&I) -> FinCalcResult<ComputationOutput<T>>,
) -> NapiResult<String>
where
    I: DeserializeOwned,
    T: Serialize + Default,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let output = blank_on_error(methodology, calc(&input));
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_annuity(input_json: String) -> NapiResult<String> {
    run(
        "Annuity payout",
        &input_json,
        fincalc_core::amortization::annuity::calculate_annuity,
    )
}

// ---------------------------------------------------------------------------
// Tax
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_individual_tax(input_json: String) -> NapiResult<String> {
    run(
        "Individual income tax",
        &input_json,
        fincalc_core::tax::individual::compute_individual_tax,
    )
}

#[napi]
pub fn compute_joint_tax(input_json: String) -> NapiResult<String> {
    run(
        "Joint income tax",
        &input_json,
        fincalc_core::tax::individual::compute_joint_tax,
    )
}

#[napi]
pub fn compare_marriage_tax(input_json: String) -> NapiResult<String> {
    run(
        "Marriage penalty/bonus",
        &input_json,
        fincalc_core::tax::marriage::compare_marriage_tax,
    )
}

// ---------------------------------------------------------------------------
// Lease
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_lease(input_json: String) -> NapiResult<String> {
    run(
        "Lease payment",
        &input_json,
        fincalc_core::lease::payment::calculate_lease,
    )
}

// ---------------------------------------------------------------------------
// Refinance
// ---------------------------------------------------------------------------

#[napi]
pub fn compare_refinance(input_json: String) -> NapiResult<String> {
    run(
        "Refinance comparison",
        &input_json,
        fincalc_core::refinance::comparison::compare_refinance,
    )
}

// ---------------------------------------------------------------------------
// Budget
// ---------------------------------------------------------------------------

#[napi]
pub fn aggregate_budget(input_json: String) -> NapiResult<String> {
    run(
        "Budget aggregation",
        &input_json,
        fincalc_core::budget::aggregator::aggregate_budget,
    )
}

#[napi]
pub fn normalize_amount(input_json: String) -> NapiResult<String> {
    run(
        "Period normalisation",
        &input_json,
        fincalc_core::budget::period::normalize_amount,
    )
}
