//! Implements a SQLite backed user store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, named_params};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{CurrencyCode, User, UserID},
    stores::UserStore,
};

/// Stores users in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteUserStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteUserStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl UserStore for SQLiteUserStore {
    fn create(&mut self, email: &str, preferred_currency: CurrencyCode) -> Result<User, Error> {
        let connection = self.connection.lock().unwrap();

        connection.execute(
            "INSERT INTO user (email, preferred_currency) VALUES (:email, :preferred_currency)",
            named_params! {
                ":email": email,
                ":preferred_currency": preferred_currency.as_str(),
            },
        )?;

        let id = connection.last_insert_rowid();

        Ok(User::new(
            UserID::new(id),
            email.to_owned(),
            preferred_currency,
        ))
    }

    fn get(&self, id: UserID) -> Result<User, Error> {
        let user = self
            .connection
            .lock()
            .unwrap()
            .prepare("SELECT id, email, preferred_currency FROM user WHERE id = :id")?
            .query_row(&[(":id", &id.as_i64())], Self::map_row)?;

        Ok(user)
    }

    fn set_preferred_currency(
        &mut self,
        id: UserID,
        currency: &CurrencyCode,
    ) -> Result<(), Error> {
        let rows_changed = self.connection.lock().unwrap().execute(
            "UPDATE user SET preferred_currency = :currency WHERE id = :id",
            named_params! {
                ":currency": currency.as_str(),
                ":id": id.as_i64(),
            },
        )?;

        if rows_changed == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}

impl CreateTable for SQLiteUserStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS user (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    email TEXT NOT NULL UNIQUE,
                    preferred_currency TEXT NOT NULL
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteUserStore {
    type ReturnType = User;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(User::new(
            UserID::new(row.get(offset)?),
            row.get(offset + 1)?,
            CurrencyCode::new_unchecked(row.get(offset + 2)?),
        ))
    }
}

#[cfg(test)]
mod sqlite_user_store_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        models::{CurrencyCode, UserID},
        stores::{UserStore, sqlite::create_stores},
    };

    fn get_store() -> super::SQLiteUserStore {
        let conn = Connection::open_in_memory().unwrap();
        create_stores(conn).unwrap().users
    }

    #[test]
    fn create_and_get_round_trip() {
        let mut store = get_store();

        let user = store
            .create("foo@bar.baz", CurrencyCode::new("EUR").unwrap())
            .unwrap();

        assert_eq!(store.get(user.id()), Ok(user));
    }

    #[test]
    fn get_fails_on_invalid_id() {
        let store = get_store();

        assert_eq!(store.get(UserID::new(42)), Err(Error::NotFound));
    }

    #[test]
    fn set_preferred_currency_persists() {
        let mut store = get_store();

        let user = store
            .create("foo@bar.baz", CurrencyCode::new("EUR").unwrap())
            .unwrap();

        store
            .set_preferred_currency(user.id(), &CurrencyCode::new("USD").unwrap())
            .unwrap();

        let updated = store.get(user.id()).unwrap();
        assert_eq!(updated.preferred_currency().as_str(), "USD");
    }

    #[test]
    fn set_preferred_currency_fails_on_missing_user() {
        let mut store = get_store();

        let result =
            store.set_preferred_currency(UserID::new(42), &CurrencyCode::new("USD").unwrap());

        assert_eq!(result, Err(Error::NotFound));
    }
}
