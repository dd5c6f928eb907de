//! The domain models shared by the stores and engines.

mod category;
mod currency;
mod transaction;
mod user;

pub use category::{ExpenseCategory, NewSubCategory, SubCategory};
pub use currency::{Currency, CurrencyCode};
pub use transaction::{
    NewTransaction, RecurrencePeriod, Transaction, TransactionDetails, TransactionType,
};
pub use user::{User, UserID};

/// Alias for the integer type used for database primary keys.
pub type DatabaseID = i64;
