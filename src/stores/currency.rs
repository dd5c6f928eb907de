//! Defines the currency table store trait.

use crate::{
    Error,
    models::{Currency, CurrencyCode},
};

/// Handles the persistence of the currency table.
///
/// Rows are only ever inserted or refreshed, never deleted, so the set of
/// recognized currency codes can grow but not shrink.
pub trait CurrencyStore {
    /// Insert the currency, or overwrite the stored row with the same code.
    fn upsert(&mut self, currency: &Currency) -> Result<(), Error>;

    /// Retrieve a currency by its code.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the code is not in the table.
    fn get(&self, code: &CurrencyCode) -> Result<Currency, Error>;

    /// Retrieve the whole currency table, ordered by code.
    fn get_all(&self) -> Result<Vec<Currency>, Error>;
}
