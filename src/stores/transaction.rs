//! Defines the ledger store trait.

use crate::{
    Error,
    models::{DatabaseID, NewTransaction, Transaction, TransactionType, UserID},
};

/// Handles the persistence of expenses and incomes.
///
/// The ledger is the sole shared mutable resource of the system. Writes are
/// committed per record with last-write-wins semantics; there is no
/// engine-level locking or optimistic versioning on top of it.
pub trait LedgerStore {
    /// Create a new transaction in the store and assign it an ID.
    fn create(&mut self, new_transaction: NewTransaction) -> Result<Transaction, Error>;

    /// Overwrite the stored transaction that has `transaction`'s ID.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no transaction with that ID exists.
    fn update(&mut self, transaction: &Transaction) -> Result<(), Error>;

    /// Delete the transaction with `id`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no transaction with that ID exists.
    fn delete(&mut self, id: DatabaseID) -> Result<(), Error>;

    /// Retrieve a single transaction by its `id`.
    fn get(&self, id: DatabaseID) -> Result<Transaction, Error>;

    /// Retrieve every transaction in the store, across all users and both
    /// transaction types.
    fn get_all(&self) -> Result<Vec<Transaction>, Error>;

    /// Retrieve all of a user's transactions of one type, with no time
    /// filter.
    fn get_by_user(
        &self,
        user_id: UserID,
        transaction_type: TransactionType,
    ) -> Result<Vec<Transaction>, Error>;

    /// Retrieve every transaction flagged as recurring, across all users and
    /// both transaction types.
    fn get_recurring(&self) -> Result<Vec<Transaction>, Error>;

    /// Retrieve a user's transactions of one type dated within the calendar
    /// year `year`.
    fn get_by_year(
        &self,
        transaction_type: TransactionType,
        user_id: UserID,
        year: i32,
    ) -> Result<Vec<Transaction>, Error>;

    /// Retrieve a user's transactions of one type dated within the given
    /// calendar month.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] if `month` is not in 1-12.
    fn get_by_year_and_month(
        &self,
        transaction_type: TransactionType,
        user_id: UserID,
        year: i32,
        month: u8,
    ) -> Result<Vec<Transaction>, Error>;

    /// The earliest calendar year in which the user has a transaction of the
    /// given type, or `None` if they have none at all.
    fn min_year(
        &self,
        transaction_type: TransactionType,
        user_id: UserID,
    ) -> Result<Option<i32>, Error>;

    /// The latest calendar year in which the user has a transaction of the
    /// given type, or `None` if they have none at all.
    fn max_year(
        &self,
        transaction_type: TransactionType,
        user_id: UserID,
    ) -> Result<Option<i32>, Error>;
}
