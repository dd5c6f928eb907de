//! Derives read-only summaries from a user's transactions.
//!
//! Every operation is a pure function of the transactions it reads: nothing
//! here mutates the ledger. A store failure aborts the whole request; no
//! partial summary is ever returned.

mod summaries;

pub use summaries::{
    CategoryBreakdown, CombinedMonthlySummary, CombinedYearlySummary, ComparisonSummary,
    GrandTotalSummary, MonthlySummary, SavingsSummary, YearlySummary,
};

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    Error,
    models::{Transaction, TransactionDetails, TransactionType, UserID},
    stores::{LedgerStore, SubCategoryStore},
};

/// Computes summaries over a user's expenses and incomes.
pub struct StatsEngine<L, C> {
    ledger: L,
    sub_categories: C,
}

fn month_of(transaction: &Transaction) -> u8 {
    u8::from(transaction.date().month())
}

fn total(transactions: &[Transaction]) -> Decimal {
    transactions.iter().map(Transaction::amount).sum()
}

impl<L, C> StatsEngine<L, C>
where
    L: LedgerStore,
    C: SubCategoryStore,
{
    /// Create an engine over the given stores.
    pub fn new(ledger: L, sub_categories: C) -> Self {
        Self {
            ledger,
            sub_categories,
        }
    }

    /// Totals for one transaction type over the calendar year `year`,
    /// bucketed by month, together with the matching records.
    pub fn yearly_summary(
        &self,
        user_id: UserID,
        transaction_type: TransactionType,
        year: i32,
    ) -> Result<YearlySummary, Error> {
        let records = self.ledger.get_by_year(transaction_type, user_id, year)?;

        let mut monthly_totals = BTreeMap::new();
        let mut yearly_total = Decimal::ZERO;

        for record in &records {
            *monthly_totals
                .entry(month_of(record))
                .or_insert(Decimal::ZERO) += record.amount();
            yearly_total += record.amount();
        }

        Ok(YearlySummary {
            records,
            monthly_totals,
            yearly_total,
        })
    }

    /// The total for one transaction type over one calendar month, together
    /// with the matching records.
    pub fn monthly_summary(
        &self,
        user_id: UserID,
        transaction_type: TransactionType,
        year: i32,
        month: u8,
    ) -> Result<MonthlySummary, Error> {
        let records = self
            .ledger
            .get_by_year_and_month(transaction_type, user_id, year, month)?;

        let monthly_total = total(&records);

        Ok(MonthlySummary {
            records,
            monthly_total,
        })
    }

    /// The earliest year in which the user has a record of the given type.
    ///
    /// `None` means the user has no records of that type at all, which is
    /// distinct from having records that total zero.
    pub fn min_year(
        &self,
        user_id: UserID,
        transaction_type: TransactionType,
    ) -> Result<Option<i32>, Error> {
        self.ledger.min_year(transaction_type, user_id)
    }

    /// The latest year in which the user has a record of the given type.
    pub fn max_year(
        &self,
        user_id: UserID,
        transaction_type: TransactionType,
    ) -> Result<Option<i32>, Error> {
        self.ledger.max_year(transaction_type, user_id)
    }

    /// Expense and income totals and counts for `year`, bucketed by month.
    ///
    /// The reported min/max year are derived from the records this query
    /// returned, so they can only ever be `year` itself or `None`.
    pub fn combined_yearly_summary(
        &self,
        user_id: UserID,
        year: i32,
    ) -> Result<CombinedYearlySummary, Error> {
        let expenses = self
            .ledger
            .get_by_year(TransactionType::Expense, user_id, year)?;
        let incomes = self
            .ledger
            .get_by_year(TransactionType::Income, user_id, year)?;

        let mut summary = CombinedYearlySummary {
            monthly_expenses: BTreeMap::new(),
            monthly_incomes: BTreeMap::new(),
            monthly_expense_counts: BTreeMap::new(),
            monthly_income_counts: BTreeMap::new(),
            min_year: None,
            max_year: None,
        };

        let observe_year = |record_year: i32, summary: &mut CombinedYearlySummary| {
            summary.min_year = Some(summary.min_year.map_or(record_year, |min: i32| {
                min.min(record_year)
            }));
            summary.max_year = Some(summary.max_year.map_or(record_year, |max: i32| {
                max.max(record_year)
            }));
        };

        for expense in &expenses {
            observe_year(expense.date().year(), &mut summary);
            let month = month_of(expense);
            *summary
                .monthly_expenses
                .entry(month)
                .or_insert(Decimal::ZERO) += expense.amount();
            *summary.monthly_expense_counts.entry(month).or_insert(0) += 1;
        }

        for income in &incomes {
            observe_year(income.date().year(), &mut summary);
            let month = month_of(income);
            *summary
                .monthly_incomes
                .entry(month)
                .or_insert(Decimal::ZERO) += income.amount();
            *summary.monthly_income_counts.entry(month).or_insert(0) += 1;
        }

        Ok(summary)
    }

    /// Expense and income totals and counts bucketed by day of month.
    ///
    /// The month is part of the request shape, but the buckets are filled
    /// from the whole year's records: every record from `year` lands in its
    /// day-of-month bucket regardless of which month it belongs to.
    pub fn combined_monthly_summary(
        &self,
        user_id: UserID,
        year: i32,
        _month: u8,
    ) -> Result<CombinedMonthlySummary, Error> {
        let expenses = self
            .ledger
            .get_by_year(TransactionType::Expense, user_id, year)?;
        let incomes = self
            .ledger
            .get_by_year(TransactionType::Income, user_id, year)?;

        let mut summary = CombinedMonthlySummary {
            daily_expenses: BTreeMap::new(),
            daily_incomes: BTreeMap::new(),
            daily_expense_counts: BTreeMap::new(),
            daily_income_counts: BTreeMap::new(),
        };

        for expense in &expenses {
            let day = expense.date().day();
            *summary.daily_expenses.entry(day).or_insert(Decimal::ZERO) += expense.amount();
            *summary.daily_expense_counts.entry(day).or_insert(0) += 1;
        }

        for income in &incomes {
            let day = income.date().day();
            *summary.daily_incomes.entry(day).or_insert(Decimal::ZERO) += income.amount();
            *summary.daily_income_counts.entry(day).or_insert(0) += 1;
        }

        Ok(summary)
    }

    /// Expense totals grouped by top-level category display name and income
    /// totals grouped by source, for `year`.
    ///
    /// # Errors
    /// - [Error::NotFound] if an expense references a subcategory that no
    ///   longer exists; grouping keys are expected to always resolve, so
    ///   this indicates a data-integrity violation upstream.
    /// - [Error::Forbidden] if an expense references another user's
    ///   subcategory.
    pub fn category_breakdown(
        &self,
        user_id: UserID,
        year: i32,
    ) -> Result<CategoryBreakdown, Error> {
        let expenses = self
            .ledger
            .get_by_year(TransactionType::Expense, user_id, year)?;
        let incomes = self
            .ledger
            .get_by_year(TransactionType::Income, user_id, year)?;

        let mut expenses_by_category = BTreeMap::new();
        let mut incomes_by_source = BTreeMap::new();

        for expense in &expenses {
            let TransactionDetails::Expense { sub_category_id } = expense.details() else {
                continue;
            };

            let sub_category = self.sub_categories.get(*sub_category_id)?;

            if sub_category.user_id() != expense.user_id() {
                return Err(Error::Forbidden);
            }

            let category = sub_category.category().display_name().to_owned();
            *expenses_by_category
                .entry(category)
                .or_insert(Decimal::ZERO) += expense.amount();
        }

        for income in &incomes {
            let TransactionDetails::Income { source } = income.details() else {
                continue;
            };

            *incomes_by_source
                .entry(source.clone())
                .or_insert(Decimal::ZERO) += income.amount();
        }

        Ok(CategoryBreakdown {
            expenses_by_category,
            incomes_by_source,
        })
    }

    /// The eight totals comparing the requested month and year against the
    /// preceding ones.
    ///
    /// For January the "previous month" is December of the *same* requested
    /// year, not December of the year before.
    pub fn comparison_summary(
        &self,
        user_id: UserID,
        year: i32,
        month: u8,
    ) -> Result<ComparisonSummary, Error> {
        let previous_month = if month == 1 { 12 } else { month - 1 };

        let current_month_expenses = self.ledger.get_by_year_and_month(
            TransactionType::Expense,
            user_id,
            year,
            month,
        )?;
        let current_month_incomes = self.ledger.get_by_year_and_month(
            TransactionType::Income,
            user_id,
            year,
            month,
        )?;
        let previous_month_expenses = self.ledger.get_by_year_and_month(
            TransactionType::Expense,
            user_id,
            year,
            previous_month,
        )?;
        let previous_month_incomes = self.ledger.get_by_year_and_month(
            TransactionType::Income,
            user_id,
            year,
            previous_month,
        )?;
        let current_year_expenses =
            self.ledger
                .get_by_year(TransactionType::Expense, user_id, year)?;
        let current_year_incomes =
            self.ledger
                .get_by_year(TransactionType::Income, user_id, year)?;
        let previous_year_expenses =
            self.ledger
                .get_by_year(TransactionType::Expense, user_id, year - 1)?;
        let previous_year_incomes =
            self.ledger
                .get_by_year(TransactionType::Income, user_id, year - 1)?;

        Ok(ComparisonSummary {
            current_month_expenses: total(&current_month_expenses),
            previous_month_expenses: total(&previous_month_expenses),
            current_month_incomes: total(&current_month_incomes),
            previous_month_incomes: total(&previous_month_incomes),
            current_year_expenses: total(&current_year_expenses),
            previous_year_expenses: total(&previous_year_expenses),
            current_year_incomes: total(&current_year_incomes),
            previous_year_incomes: total(&previous_year_incomes),
        })
    }

    /// The savings rate for every month of `year`.
    ///
    /// The rate is `(income - expense) / income` with the division fixed to
    /// two decimal places (rounding half up), times 100. A month with zero
    /// or negative income has a rate of exactly 0.
    pub fn savings_rate(&self, user_id: UserID, year: i32) -> Result<SavingsSummary, Error> {
        let expenses = self
            .ledger
            .get_by_year(TransactionType::Expense, user_id, year)?;
        let incomes = self
            .ledger
            .get_by_year(TransactionType::Income, user_id, year)?;

        let mut monthly_expense_totals: BTreeMap<u8, Decimal> = BTreeMap::new();
        let mut monthly_income_totals: BTreeMap<u8, Decimal> = BTreeMap::new();

        for expense in &expenses {
            *monthly_expense_totals
                .entry(month_of(expense))
                .or_insert(Decimal::ZERO) += expense.amount();
        }

        for income in &incomes {
            *monthly_income_totals
                .entry(month_of(income))
                .or_insert(Decimal::ZERO) += income.amount();
        }

        let mut monthly_savings_rate = BTreeMap::new();

        for month in 1..=12u8 {
            let income = monthly_income_totals
                .get(&month)
                .copied()
                .unwrap_or(Decimal::ZERO);
            let expense = monthly_expense_totals
                .get(&month)
                .copied()
                .unwrap_or(Decimal::ZERO);

            let rate = if income > Decimal::ZERO {
                ((income - expense) / income)
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                    * Decimal::ONE_HUNDRED
            } else {
                Decimal::ZERO
            };

            monthly_savings_rate.insert(month, rate);
        }

        Ok(SavingsSummary {
            monthly_savings_rate,
        })
    }

    /// All-time totals for the user: incomes, expenses and their difference.
    pub fn grand_totals(&self, user_id: UserID) -> Result<GrandTotalSummary, Error> {
        let incomes = self
            .ledger
            .get_by_user(user_id, TransactionType::Income)?;
        let expenses = self
            .ledger
            .get_by_user(user_id, TransactionType::Expense)?;

        let total_incomes = total(&incomes);
        let total_expenses = total(&expenses);

        Ok(GrandTotalSummary {
            total_incomes,
            total_expenses,
            net_balance: total_incomes - total_expenses,
        })
    }
}
