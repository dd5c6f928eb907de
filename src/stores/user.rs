//! Defines the user store trait.

use crate::{
    Error,
    models::{CurrencyCode, User, UserID},
};

/// Handles the persistence of user accounts, reduced to what the engines
/// need: ownership and the preferred currency.
pub trait UserStore {
    /// Create a new user in the store.
    fn create(&mut self, email: &str, preferred_currency: CurrencyCode) -> Result<User, Error>;

    /// Retrieve a user by their `id`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no user with that ID exists.
    fn get(&self, id: UserID) -> Result<User, Error>;

    /// Persist a new preferred currency for the user.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no user with that ID exists.
    fn set_preferred_currency(
        &mut self,
        id: UserID,
        currency: &CurrencyCode,
    ) -> Result<(), Error>;
}
