//! Fiscus is the financial-data core of a personal expense and income
//! tracker.
//!
//! The crate owns the three pieces of the system that have to be numerically
//! and temporally correct over a growing, mutable ledger:
//!
//! - the [recurrence engine](crate::recurrence::RecurrenceEngine), which
//!   materializes due occurrences of periodic transactions,
//! - the [currency converter](crate::currency::CurrencyConverter), which
//!   re-denominates stored amounts when a user changes preferred currency,
//! - the [statistics engine](crate::stats::StatsEngine), which derives
//!   yearly, monthly, daily, category, comparison and savings summaries.
//!
//! Everything else (HTTP, authentication, schedulers) lives outside this
//! crate and talks to it through the traits in [stores] and
//! [currency::RateSource].

#![warn(missing_docs)]

pub mod currency;
pub mod db;
mod error;
pub mod models;
pub mod recurrence;
pub mod stats;
pub mod stores;

pub use error::Error;
