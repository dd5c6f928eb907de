//! This file defines the type `Transaction`, the core type of the ledger.
//!
//! Expenses and incomes share one struct; what separates them is the tagged
//! [TransactionDetails] variant, so the recurrence, conversion and statistics
//! engines can treat both uniformly and still reach the expense subcategory
//! or the income source when they need to.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::{
    Error,
    models::{CurrencyCode, DatabaseID, UserID},
};

/// Whether a transaction is money spent or money earned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Money spent.
    Expense,
    /// Money earned.
    Income,
}

impl TransactionType {
    /// The stable code used in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }
}

/// How often a recurring transaction repeats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecurrencePeriod {
    /// Every 7 days.
    Weekly,
    /// Every calendar month, clamping to the last day of shorter months.
    Monthly,
    /// Every calendar year, clamping February 29 to February 28.
    Yearly,
}

impl RecurrencePeriod {
    /// Parse the stable storage code, e.g. `"WEEKLY"`.
    ///
    /// Returns `None` for unrecognized codes. Rows carrying an unrecognized
    /// code are treated as having no period at all, which makes the
    /// recurrence engine skip them instead of failing the whole scan.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "WEEKLY" => Some(Self::Weekly),
            "MONTHLY" => Some(Self::Monthly),
            "YEARLY" => Some(Self::Yearly),
            _ => None,
        }
    }

    /// The stable code used in the database.
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }
}

impl FromStr for RecurrencePeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| Error::InvalidPeriod(s.to_owned()))
    }
}

/// The data that differs between the two transaction types.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TransactionDetails {
    /// An expense points at one of the owner's subcategories.
    Expense {
        /// The subcategory the expense is filed under.
        sub_category_id: DatabaseID,
    },
    /// An income carries a free-text source, e.g. "Salary".
    Income {
        /// Where the money came from.
        source: String,
    },
}

impl TransactionDetails {
    /// The discriminant for this variant.
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Self::Expense { .. } => TransactionType::Expense,
            Self::Income { .. } => TransactionType::Income,
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// For a recurring transaction, `date` is always the timestamp of its most
/// recently materialized occurrence, not the original creation time. The
/// recurrence engine advances the date to mark an occurrence as generated.
///
/// To create a new `Transaction`, build a [NewTransaction] and pass it to
/// [LedgerStore::create](crate::stores::LedgerStore::create).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: DatabaseID,
    user_id: UserID,
    description: String,
    amount: Decimal,
    currency: CurrencyCode,
    date: PrimitiveDateTime,
    recurring: bool,
    period: Option<RecurrencePeriod>,
    details: TransactionDetails,
}

impl Transaction {
    /// Create a transaction without validating the fields.
    ///
    /// Should only be called on values from a trusted source such as the
    /// application's database.
    #[allow(clippy::too_many_arguments)]
    pub fn new_unchecked(
        id: DatabaseID,
        user_id: UserID,
        description: String,
        amount: Decimal,
        currency: CurrencyCode,
        date: PrimitiveDateTime,
        recurring: bool,
        period: Option<RecurrencePeriod>,
        details: TransactionDetails,
    ) -> Self {
        Self {
            id,
            user_id,
            description,
            amount,
            currency,
            date,
            recurring,
            period,
            details,
        }
    }

    /// The ID of the transaction.
    pub fn id(&self) -> DatabaseID {
        self.id
    }

    /// The ID of the user that owns this transaction.
    pub fn user_id(&self) -> UserID {
        self.user_id
    }

    /// A text description of what the transaction was for.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The amount of money spent or earned, always positive.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// The currency the amount is denominated in.
    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    /// When the transaction happened, or for a recurring transaction, when
    /// its latest occurrence was materialized.
    pub fn date(&self) -> PrimitiveDateTime {
        self.date
    }

    /// Whether this transaction automatically produces future occurrences.
    pub fn recurring(&self) -> bool {
        self.recurring
    }

    /// How often the transaction repeats, if it recurs.
    pub fn period(&self) -> Option<RecurrencePeriod> {
        self.period
    }

    /// The expense- or income-specific data.
    pub fn details(&self) -> &TransactionDetails {
        &self.details
    }

    /// Whether this is an expense or an income.
    pub fn transaction_type(&self) -> TransactionType {
        self.details.transaction_type()
    }

    pub(crate) fn set_amount(&mut self, amount: Decimal) {
        self.amount = amount;
    }

    pub(crate) fn set_currency(&mut self, currency: CurrencyCode) {
        self.currency = currency;
    }

    pub(crate) fn set_date(&mut self, date: PrimitiveDateTime) {
        self.date = date;
    }
}

/// The data for a transaction that has not been persisted yet.
///
/// The function for finalizing the builder is
/// [LedgerStore::create](crate::stores::LedgerStore::create).
#[derive(Clone, Debug, PartialEq)]
pub struct NewTransaction {
    pub(crate) user_id: UserID,
    pub(crate) description: String,
    pub(crate) amount: Decimal,
    pub(crate) currency: CurrencyCode,
    pub(crate) date: PrimitiveDateTime,
    pub(crate) recurring: bool,
    pub(crate) period: Option<RecurrencePeriod>,
    pub(crate) details: TransactionDetails,
}

impl NewTransaction {
    /// Start building a non-recurring transaction.
    ///
    /// # Errors
    /// Returns [Error::NonPositiveAmount] if `amount` is zero or negative.
    pub fn new(
        user_id: UserID,
        amount: Decimal,
        date: PrimitiveDateTime,
        currency: CurrencyCode,
        details: TransactionDetails,
    ) -> Result<Self, Error> {
        if amount <= Decimal::ZERO {
            return Err(Error::NonPositiveAmount);
        }

        Ok(Self {
            user_id,
            description: String::new(),
            amount,
            currency,
            date,
            recurring: false,
            period: None,
            details,
        })
    }

    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Mark the transaction as recurring with the given period.
    ///
    /// A recurring transaction always carries a period and a non-recurring
    /// one never does; this builder is the only way to set either flag, so
    /// the two cannot contradict each other.
    pub fn recurring(mut self, period: RecurrencePeriod) -> Self {
        self.recurring = true;
        self.period = Some(period);
        self
    }
}


#[cfg(test)]
mod recurrence_period_tests {
    use crate::{Error, models::RecurrencePeriod};

    #[test]
    fn codes_round_trip() {
        for period in [
            RecurrencePeriod::Weekly,
            RecurrencePeriod::Monthly,
            RecurrencePeriod::Yearly,
        ] {
            assert_eq!(RecurrencePeriod::from_code(period.as_code()), Some(period));
        }
    }

    #[test]
    fn from_code_returns_none_for_unknown_code() {
        assert_eq!(RecurrencePeriod::from_code("FORTNIGHTLY"), None);
    }

    #[test]
    fn from_str_reports_the_bad_code() {
        let result = "DAILY".parse::<RecurrencePeriod>();

        assert_eq!(result, Err(Error::InvalidPeriod("DAILY".to_owned())));
    }
}
