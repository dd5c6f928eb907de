//! SQLite backed implementations of the store traits.
//!
//! All stores share one [Connection] behind an `Arc<Mutex<_>>`; concurrent
//! correctness is whatever SQLite's per-statement semantics give us
//! (last write wins), which is all the engines assume.

mod category;
mod currency;
mod transaction;
mod user;

pub use category::SQLiteSubCategoryStore;
pub use currency::SQLiteCurrencyStore;
pub use transaction::SQLiteLedgerStore;
pub use user::SQLiteUserStore;

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, db::initialize};

/// The full set of SQLite backed stores over one shared connection.
#[derive(Debug, Clone)]
pub struct SqliteStores {
    /// The transaction (expense and income) store.
    pub ledger: SQLiteLedgerStore,
    /// The user store.
    pub users: SQLiteUserStore,
    /// The currency table store.
    pub currencies: SQLiteCurrencyStore,
    /// The expense subcategory store.
    pub sub_categories: SQLiteSubCategoryStore,
}

/// Create the set of SQLite stores for `db_connection`.
///
/// This function will modify the database by adding the tables for the
/// domain models, if they do not exist yet.
///
/// # Errors
/// Returns an error if the database cannot be initialized.
pub fn create_stores(db_connection: Connection) -> Result<SqliteStores, Error> {
    initialize(&db_connection)?;

    let connection = Arc::new(Mutex::new(db_connection));

    Ok(SqliteStores {
        ledger: SQLiteLedgerStore::new(connection.clone()),
        users: SQLiteUserStore::new(connection.clone()),
        currencies: SQLiteCurrencyStore::new(connection.clone()),
        sub_categories: SQLiteSubCategoryStore::new(connection),
    })
}
