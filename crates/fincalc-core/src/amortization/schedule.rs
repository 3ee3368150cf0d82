//! Period-by-period amortization schedules.
//!
//! Interest is rounded to cents each period, so schedules carry the same
//! rounding a lender's statement would. The final payment is truncated to
//! exactly the outstanding balance plus interest, which lands the balance on
//! zero instead of leaving residual cents or going negative.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FinCalcError;
use crate::time_value::solve_payment;
use crate::types::{round_cents, schedule_period_cap, Money, Rate};
use crate::FinCalcResult;

/// A single row of an amortization schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Period number (1-indexed)
    pub period: u32,
    pub beginning_balance: Money,
    /// Amount actually paid this period (the last one may be smaller)
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    /// Never negative
    pub ending_balance: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Level payment before any final-period truncation
    pub payment: Money,
    pub entries: Vec<ScheduleEntry>,
    /// True once the balance reached zero
    pub depleted: bool,
    pub depletion_period: Option<u32>,
    /// True when the iteration ceiling stopped the simulation early
    pub capped: bool,
    pub total_paid: Money,
    pub total_interest: Money,
}

/// Calendar-year roll-up of a schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: u32,
    pub beginning_balance: Money,
    pub payments: Money,
    pub interest: Money,
    pub principal: Money,
    pub ending_balance: Money,
}

/// Simulate a fixed payment against `principal` until the balance is gone.
///
/// A payment that does not exceed the exact periodic interest `principal *
/// rate_per_period` never depletes the balance; that case returns an empty,
/// non-depleted schedule, matching [`solve_duration`]'s perpetuity test. A
/// payment that clears the exact interest but not the cent-rounded interest
/// cannot move a cent-rounded balance either and also yields no rows.
/// Otherwise the loop stops at zero balance or after 100 years of periods.
///
/// [`solve_duration`]: crate::time_value::solve_duration
pub fn fixed_payment_schedule(
    principal: Money,
    rate_per_period: Rate,
    payment: Money,
    periods_per_year: u32,
) -> FinCalcResult<Schedule> {
    validate(principal, rate_per_period, periods_per_year)?;
    if payment <= Decimal::ZERO {
        return Err(FinCalcError::invalid("payment", "Payment must be positive"));
    }

    let exact_interest = principal * rate_per_period;
    if payment <= exact_interest {
        tracing::debug!(%payment, %exact_interest, "payment never exceeds interest; no schedule");
        return Ok(Schedule {
            payment,
            ..Schedule::default()
        });
    }
    let first_interest = round_cents(exact_interest);
    if payment <= first_interest {
        tracing::warn!(
            %payment,
            %first_interest,
            "payment clears the exact interest but not the rounded interest; no schedule"
        );
        return Ok(Schedule {
            payment,
            ..Schedule::default()
        });
    }

    let cap = schedule_period_cap(periods_per_year);
    let schedule = run_schedule(principal, rate_per_period, payment, cap, false);
    if schedule.capped {
        tracing::warn!(
            periods = cap,
            remaining = %schedule.entries.last().map(|e| e.ending_balance).unwrap_or_default(),
            "schedule hit the iteration ceiling before depletion"
        );
    }
    Ok(schedule)
}

/// Amortize `principal` over exactly `total_periods` level payments.
///
/// The payment is the annuity payment rounded to cents; the last period
/// settles whatever balance the rounding left behind.
pub fn fixed_term_schedule(
    principal: Money,
    rate_per_period: Rate,
    total_periods: u32,
) -> FinCalcResult<Schedule> {
    let payment = round_cents(solve_payment(principal, rate_per_period, total_periods)?);
    Ok(run_schedule(
        principal,
        rate_per_period,
        payment,
        total_periods,
        true,
    ))
}

/// Group schedule rows into years of `periods_per_year` rows.
pub fn yearly_summary(schedule: &Schedule, periods_per_year: u32) -> Vec<YearSummary> {
    let per_year = periods_per_year.max(1) as usize;
    schedule
        .entries
        .chunks(per_year)
        .enumerate()
        .map(|(idx, rows)| {
            let beginning_balance = rows.first().map(|r| r.beginning_balance).unwrap_or_default();
            let ending_balance = rows.last().map(|r| r.ending_balance).unwrap_or_default();
            YearSummary {
                year: idx as u32 + 1,
                beginning_balance,
                payments: rows.iter().map(|r| r.payment).sum(),
                interest: rows.iter().map(|r| r.interest).sum(),
                principal: rows.iter().map(|r| r.principal).sum(),
                ending_balance,
            }
        })
        .collect()
}

fn run_schedule(
    principal: Money,
    rate_per_period: Rate,
    payment: Money,
    limit: u32,
    settle_at_limit: bool,
) -> Schedule {
    let mut entries = Vec::with_capacity(limit.min(1200) as usize);
    let mut balance = principal;
    let mut total_paid = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;
    let mut depletion_period = None;

    for period in 1..=limit {
        let interest = round_cents(balance * rate_per_period);
        let due = balance + interest;
        let settles = payment >= due || (settle_at_limit && period == limit);
        let paid = if settles { due } else { payment };

        let mut ending_balance = due - paid;
        if ending_balance < Decimal::ZERO {
            ending_balance = Decimal::ZERO;
        }

        entries.push(ScheduleEntry {
            period,
            beginning_balance: balance,
            payment: paid,
            interest,
            principal: paid - interest,
            ending_balance,
        });
        total_paid += paid;
        total_interest += interest;
        balance = ending_balance;

        if balance.is_zero() {
            depletion_period = Some(period);
            break;
        }
    }

    Schedule {
        payment,
        entries,
        depleted: depletion_period.is_some(),
        depletion_period,
        capped: depletion_period.is_none(),
        total_paid,
        total_interest,
    }
}

fn validate(principal: Money, rate_per_period: Rate, periods_per_year: u32) -> FinCalcResult<()> {
    if principal <= Decimal::ZERO {
        return Err(FinCalcError::invalid("principal", "Principal must be positive"));
    }
    if rate_per_period < Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "rate_per_period",
            "Periodic rate cannot be negative",
        ));
    }
    if periods_per_year == 0 {
        return Err(FinCalcError::invalid(
            "periods_per_year",
            "Periods per year must be at least 1",
        ));
    }
    Ok(())
}
