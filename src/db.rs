/*! Defines traits for creating and reading the application's database tables. */

use std::str::FromStr;

use rusqlite::{Connection, Error, Row, Transaction as SqlTransaction, types::Type};
use rust_decimal::Decimal;

use crate::stores::{
    SQLiteCurrencyStore, SQLiteLedgerStore, SQLiteSubCategoryStore, SQLiteUserStore,
};

/// A trait for adding an object schema to a database.
pub trait CreateTable {
    /// Create a table for the model.
    ///
    /// # Errors
    /// Returns an error if the table already exists or if there is an SQL error.
    fn create_table(connection: &Connection) -> Result<(), Error>;
}

/// A trait for mapping from a `rusqlite::Row` from a SQLite database to a concrete rust type.
pub trait MapRow {
    /// The type that rows are mapped to.
    type ReturnType;

    /// Convert a row into a concrete type.
    ///
    /// **Note:** This function expects that the row object contains all the
    /// table columns in the order they were defined.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the
    /// corresponding rust type, or if an invalid column index was used.
    fn map_row(row: &Row) -> Result<Self::ReturnType, Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Convert a row into a concrete type.
    ///
    /// The `offset` indicates which column the row should be read from.
    /// This is useful in cases where tables have been joined and you want to
    /// construct two different types from the one query.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the
    /// corresponding rust type, or if an invalid column index was used.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, Error>;
}

/// Read a monetary value stored as text into an exact decimal.
///
/// Amounts and exchange rates are stored as their canonical string form so
/// that SQLite never coerces them through binary floating point.
pub(crate) fn decimal_from_column(row: &Row, index: usize) -> Result<Decimal, Error> {
    let text = row.get::<_, String>(index)?;

    Decimal::from_str(&text)
        .map_err(|error| Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}

/// Create the tables for the domain models.
///
/// The tables are created in a single exclusive transaction so that a
/// half-initialized schema is never left behind.
///
/// # Errors
/// Returns an error if the tables already exist or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), crate::Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    SQLiteUserStore::create_table(&transaction)?;
    SQLiteSubCategoryStore::create_table(&transaction)?;
    SQLiteLedgerStore::create_table(&transaction)?;
    SQLiteCurrencyStore::create_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
