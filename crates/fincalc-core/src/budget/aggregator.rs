//! Monthly budget aggregation and the 50/30/20 split.
//!
//! "Needs" blends whole categories with partial weights of mixed ones: all
//! housing and healthcare, 70% of living expenses and 80% of
//! transportation. This is an approximation, not a strict categorical split.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::budget::period::{normalize_to_monthly, PeriodUnit};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::FinCalcResult;

const NEEDS_TARGET: Rate = dec!(0.50);
const WANTS_TARGET: Rate = dec!(0.30);
const SAVINGS_TARGET: Rate = dec!(0.20);
const LIVING_NEEDS_WEIGHT: Rate = dec!(0.7);
const TRANSPORT_NEEDS_WEIGHT: Rate = dec!(0.8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Housing,
    Transportation,
    LivingExpenses,
    Healthcare,
    Entertainment,
    Savings,
    DebtRepayment,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 8] = [
        ExpenseCategory::Housing,
        ExpenseCategory::Transportation,
        ExpenseCategory::LivingExpenses,
        ExpenseCategory::Healthcare,
        ExpenseCategory::Entertainment,
        ExpenseCategory::Savings,
        ExpenseCategory::DebtRepayment,
        ExpenseCategory::Other,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeItem {
    #[serde(default)]
    pub name: String,
    pub amount: Money,
    #[serde(default)]
    pub unit: PeriodUnit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseItem {
    #[serde(default)]
    pub name: String,
    pub category: ExpenseCategory,
    pub amount: Money,
    #[serde(default)]
    pub unit: PeriodUnit,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BudgetInput {
    #[serde(default)]
    pub income: Vec<IncomeItem>,
    #[serde(default)]
    pub expenses: Vec<ExpenseItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub monthly: Money,
    pub annual: Money,
    /// Share of monthly income; zero when there is no income
    pub share_of_income: Rate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketStatus {
    #[default]
    OnTarget,
    Over,
    Under,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketAllocation {
    pub target_share: Rate,
    pub target: Money,
    pub actual: Money,
    pub actual_share: Rate,
    pub status: BucketStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiftyThirtyTwenty {
    pub needs: BucketAllocation,
    pub wants: BucketAllocation,
    pub savings: BucketAllocation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetOutput {
    pub monthly_income: Money,
    pub annual_income: Money,
    pub monthly_expenses: Money,
    pub annual_expenses: Money,
    /// Income minus expenses; negative when overspending
    pub monthly_surplus: Money,
    /// Savings and debt repayment over income
    pub savings_rate: Rate,
    pub categories: Vec<CategoryTotal>,
    pub allocation: FiftyThirtyTwenty,
}

pub fn aggregate_budget(input: &BudgetInput) -> FinCalcResult<ComputationOutput<BudgetOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let monthly_income: Money = input
        .income
        .iter()
        .map(|item| normalize_to_monthly(item.amount, item.unit))
        .sum();

    let negatives = input.income.iter().filter(|i| i.amount < Decimal::ZERO).count()
        + input.expenses.iter().filter(|e| e.amount < Decimal::ZERO).count();
    if negatives > 0 {
        warnings.push(format!("{negatives} negative amount(s) treated as zero"));
    }

    let category_monthly = |category: ExpenseCategory| -> Money {
        input
            .expenses
            .iter()
            .filter(|e| e.category == category)
            .map(|e| normalize_to_monthly(e.amount, e.unit))
            .sum()
    };

    let categories: Vec<CategoryTotal> = ExpenseCategory::ALL
        .iter()
        .map(|&category| {
            let monthly = category_monthly(category);
            CategoryTotal {
                category,
                monthly,
                annual: monthly * dec!(12),
                share_of_income: share(monthly, monthly_income),
            }
        })
        .collect();

    let total_of = |category: ExpenseCategory| -> Money {
        categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.monthly)
            .unwrap_or_default()
    };

    let monthly_expenses: Money = categories.iter().map(|c| c.monthly).sum();
    let needs = total_of(ExpenseCategory::Housing)
        + total_of(ExpenseCategory::Healthcare)
        + total_of(ExpenseCategory::LivingExpenses) * LIVING_NEEDS_WEIGHT
        + total_of(ExpenseCategory::Transportation) * TRANSPORT_NEEDS_WEIGHT;
    let savings = total_of(ExpenseCategory::Savings) + total_of(ExpenseCategory::DebtRepayment);
    let wants = monthly_expenses - needs - savings;

    let allocation = FiftyThirtyTwenty {
        needs: bucket(needs, NEEDS_TARGET, monthly_income, false),
        wants: bucket(wants, WANTS_TARGET, monthly_income, false),
        savings: bucket(savings, SAVINGS_TARGET, monthly_income, true),
    };

    if monthly_income.is_zero() {
        warnings.push("No income entered; shares are reported as zero".into());
    }
    let monthly_surplus = monthly_income - monthly_expenses;
    if monthly_surplus < Decimal::ZERO {
        warnings.push(format!(
            "Expenses exceed income by {} per month",
            (-monthly_surplus).round_dp(2)
        ));
    }

    tracing::debug!(%monthly_income, %monthly_expenses, %monthly_surplus, "budget aggregated");

    let output = BudgetOutput {
        monthly_income,
        annual_income: monthly_income * dec!(12),
        monthly_expenses,
        annual_expenses: monthly_expenses * dec!(12),
        monthly_surplus,
        savings_rate: share(savings, monthly_income),
        categories,
        allocation,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Budget aggregation: monthly normalisation with 50/30/20 allocation",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn share(part: Money, income: Money) -> Rate {
    if income > Decimal::ZERO {
        part / income
    } else {
        Decimal::ZERO
    }
}

/// Needs and wants are flagged when over target, savings when under.
fn bucket(actual: Money, target_share: Rate, income: Money, is_floor: bool) -> BucketAllocation {
    let target = income * target_share;
    let status = if is_floor && actual < target {
        BucketStatus::Under
    } else if !is_floor && actual > target {
        BucketStatus::Over
    } else {
        BucketStatus::OnTarget
    };
    BucketAllocation {
        target_share,
        target,
        actual,
        actual_share: share(actual, income),
        status,
    }
}
