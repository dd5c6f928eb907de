//! Implements a SQLite backed currency table store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, named_params};

use crate::{
    Error,
    db::{CreateTable, MapRow, decimal_from_column},
    models::{Currency, CurrencyCode},
    stores::CurrencyStore,
};

/// Stores the currency table in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteCurrencyStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteCurrencyStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl CurrencyStore for SQLiteCurrencyStore {
    fn upsert(&mut self, currency: &Currency) -> Result<(), Error> {
        self.connection.lock().unwrap().execute(
            "INSERT INTO currency (code, name, rate, last_updated)
             VALUES (:code, :name, :rate, :last_updated)
             ON CONFLICT(code) DO UPDATE
             SET name = excluded.name, rate = excluded.rate, last_updated = excluded.last_updated",
            named_params! {
                ":code": currency.code().as_str(),
                ":name": currency.name(),
                ":rate": currency.rate().to_string(),
                ":last_updated": currency.last_updated(),
            },
        )?;

        Ok(())
    }

    fn get(&self, code: &CurrencyCode) -> Result<Currency, Error> {
        let currency = self
            .connection
            .lock()
            .unwrap()
            .prepare("SELECT code, name, rate, last_updated FROM currency WHERE code = :code")?
            .query_row(&[(":code", &code.as_str())], Self::map_row)?;

        Ok(currency)
    }

    fn get_all(&self) -> Result<Vec<Currency>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare("SELECT code, name, rate, last_updated FROM currency ORDER BY code")?
            .query_map((), Self::map_row)?
            .map(|maybe_currency| maybe_currency.map_err(Error::from))
            .collect()
    }
}

impl CreateTable for SQLiteCurrencyStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS currency (
                    code TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    rate TEXT NOT NULL,
                    last_updated TEXT NOT NULL
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteCurrencyStore {
    type ReturnType = Currency;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(Currency::new(
            CurrencyCode::new_unchecked(row.get(offset)?),
            row.get(offset + 1)?,
            decimal_from_column(row, offset + 2)?,
            row.get(offset + 3)?,
        ))
    }
}

#[cfg(test)]
mod sqlite_currency_store_tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::macros::datetime;

    use crate::{
        Error,
        models::{Currency, CurrencyCode},
        stores::{CurrencyStore, sqlite::create_stores},
    };

    fn get_store() -> super::SQLiteCurrencyStore {
        let conn = Connection::open_in_memory().unwrap();
        create_stores(conn).unwrap().currencies
    }

    fn us_dollar(rate: Decimal) -> Currency {
        Currency::new(
            CurrencyCode::new("USD").unwrap(),
            "United States Dollar".to_owned(),
            rate,
            datetime!(2024-06-01 00:00),
        )
    }

    #[test]
    fn upsert_inserts_then_refreshes() {
        let mut store = get_store();
        let code = CurrencyCode::new("USD").unwrap();

        store.upsert(&us_dollar(Decimal::new(108, 2))).unwrap();
        assert_eq!(store.get(&code).unwrap().rate(), Decimal::new(108, 2));

        store.upsert(&us_dollar(Decimal::new(112, 2))).unwrap();
        assert_eq!(store.get(&code).unwrap().rate(), Decimal::new(112, 2));

        // Refreshing must not duplicate the row.
        assert_eq!(store.get_all().unwrap().len(), 1);
    }

    #[test]
    fn get_fails_on_unknown_code() {
        let store = get_store();

        let result = store.get(&CurrencyCode::new("XXX").unwrap());

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_all_is_ordered_by_code() {
        let mut store = get_store();

        for (code, name) in [("USD", "United States Dollar"), ("EUR", "Euro")] {
            store
                .upsert(&Currency::new(
                    CurrencyCode::new(code).unwrap(),
                    name.to_owned(),
                    Decimal::ONE,
                    datetime!(2024-06-01 00:00),
                ))
                .unwrap();
        }

        let codes: Vec<String> = store
            .get_all()
            .unwrap()
            .iter()
            .map(|currency| currency.code().as_str().to_owned())
            .collect();

        assert_eq!(codes, vec!["EUR", "USD"]);
    }
}
