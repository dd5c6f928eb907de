//! Defines the crate level error type shared by the stores and engines.

use thiserror::Error;

/// The errors that may occur in the application.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// A zero or negative amount was used to create a transaction.
    ///
    /// Transactions record money actually spent or earned, so their amounts
    /// must be strictly positive. The sign of a transaction comes from it
    /// being an expense or an income, never from the amount.
    #[error("transaction amounts must be greater than zero")]
    NonPositiveAmount,

    /// A string that is not one of the recognized recurrence period codes
    /// (`WEEKLY`, `MONTHLY`, `YEARLY`) was used where a period was required.
    #[error("\"{0}\" is not a valid recurrence period")]
    InvalidPeriod(String),

    /// A month number outside 1-12 was used in a query.
    #[error("{0} is not a valid month number")]
    InvalidMonth(u8),

    /// A string that is not a known 3-letter currency code.
    ///
    /// Codes are checked against the currency table, which is refreshed from
    /// the rate source, so a code can become known without a code change.
    #[error("\"{0}\" is not a recognized currency code")]
    UnknownCurrency(String),

    /// The user has already reached the daily quota of currency changes.
    #[error("the daily limit of currency changes has been reached")]
    RateLimited,

    /// The rate table for the base currency has no entry for the target
    /// currency.
    #[error("no exchange rate is available from {from} to {to}")]
    RateUnavailable {
        /// The base currency of the rate table that was consulted.
        from: String,
        /// The currency the amount should have been converted to.
        to: String,
    },

    /// The rate source could not be reached or returned a malformed table.
    #[error("could not fetch exchange rates: {0}")]
    RateFetchFailed(String),

    /// The requested resource could not be found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The resource exists but belongs to another user.
    ///
    /// Surfaced separately from [Error::NotFound] so callers can distinguish
    /// an ownership violation from a stale identifier.
    #[error("the resource belongs to another user")]
    Forbidden,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            // Code 787 occurs when a FOREIGN KEY constraint failed, i.e. a
            // write referenced a user or subcategory that does not exist.
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == 787 =>
            {
                Error::NotFound
            }
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
