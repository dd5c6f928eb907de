//! The read-only summary types produced by the statistics engine.
//!
//! Bucketed values use `BTreeMap` keyed by month number (1-12) or
//! day-of-month (1-31) so serialized output is stable. Buckets with no
//! records are simply absent unless documented otherwise.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::Transaction;

/// Totals for one transaction type over a calendar year, bucketed by month.
#[derive(Debug, PartialEq, Serialize)]
pub struct YearlySummary {
    /// The transactions the totals were computed from.
    pub records: Vec<Transaction>,
    /// Total amount per month number.
    pub monthly_totals: BTreeMap<u8, Decimal>,
    /// Total amount over the whole year.
    pub yearly_total: Decimal,
}

/// Totals for one transaction type over one calendar month.
#[derive(Debug, PartialEq, Serialize)]
pub struct MonthlySummary {
    /// The transactions the total was computed from.
    pub records: Vec<Transaction>,
    /// Total amount over the month.
    pub monthly_total: Decimal,
}

/// Expense and income totals and record counts for a calendar year,
/// bucketed by month.
#[derive(Debug, PartialEq, Serialize)]
pub struct CombinedYearlySummary {
    /// Expense total per month number.
    pub monthly_expenses: BTreeMap<u8, Decimal>,
    /// Income total per month number.
    pub monthly_incomes: BTreeMap<u8, Decimal>,
    /// Number of expense records per month number.
    pub monthly_expense_counts: BTreeMap<u8, u64>,
    /// Number of income records per month number.
    pub monthly_income_counts: BTreeMap<u8, u64>,
    /// The earliest year seen in the returned records, if any.
    ///
    /// Derived from the data this query returned, not from a scan of the
    /// whole ledger.
    pub min_year: Option<i32>,
    /// The latest year seen in the returned records, if any.
    pub max_year: Option<i32>,
}

/// Expense and income totals and record counts bucketed by day of month.
#[derive(Debug, PartialEq, Serialize)]
pub struct CombinedMonthlySummary {
    /// Expense total per day of month.
    pub daily_expenses: BTreeMap<u8, Decimal>,
    /// Income total per day of month.
    pub daily_incomes: BTreeMap<u8, Decimal>,
    /// Number of expense records per day of month.
    pub daily_expense_counts: BTreeMap<u8, u64>,
    /// Number of income records per day of month.
    pub daily_income_counts: BTreeMap<u8, u64>,
}

/// Expense totals grouped by category name and income totals grouped by
/// source, for one calendar year.
#[derive(Debug, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    /// Expense total per top-level category display name.
    pub expenses_by_category: BTreeMap<String, Decimal>,
    /// Income total per source string.
    pub incomes_by_source: BTreeMap<String, Decimal>,
}

/// The eight totals used by the month-over-month and year-over-year
/// comparison view.
#[derive(Debug, PartialEq, Serialize)]
pub struct ComparisonSummary {
    /// Expense total for the requested month.
    pub current_month_expenses: Decimal,
    /// Expense total for the month before the requested one.
    pub previous_month_expenses: Decimal,
    /// Income total for the requested month.
    pub current_month_incomes: Decimal,
    /// Income total for the month before the requested one.
    pub previous_month_incomes: Decimal,
    /// Expense total for the requested year.
    pub current_year_expenses: Decimal,
    /// Expense total for the year before the requested one.
    pub previous_year_expenses: Decimal,
    /// Income total for the requested year.
    pub current_year_incomes: Decimal,
    /// Income total for the year before the requested one.
    pub previous_year_incomes: Decimal,
}

/// The savings rate per month of one calendar year.
#[derive(Debug, PartialEq, Serialize)]
pub struct SavingsSummary {
    /// `(income - expense) / income` as a percentage, for every month 1-12.
    ///
    /// A month whose income is zero or negative has a rate of exactly 0
    /// rather than being absent or undefined.
    pub monthly_savings_rate: BTreeMap<u8, Decimal>,
}

/// All-time totals for one user, with no time filtering.
#[derive(Debug, PartialEq, Serialize)]
pub struct GrandTotalSummary {
    /// Sum of every income amount.
    pub total_incomes: Decimal,
    /// Sum of every expense amount.
    pub total_expenses: Decimal,
    /// `total_incomes - total_expenses`.
    pub net_balance: Decimal,
}
