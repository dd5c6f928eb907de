//! Implements a SQLite backed subcategory store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, named_params};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{DatabaseID, ExpenseCategory, NewSubCategory, SubCategory, UserID},
    stores::SubCategoryStore,
};

/// Stores expense subcategories in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteSubCategoryStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteSubCategoryStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl SubCategoryStore for SQLiteSubCategoryStore {
    fn create(&mut self, new_sub_category: NewSubCategory) -> Result<SubCategory, Error> {
        let connection = self.connection.lock().unwrap();

        connection.execute(
            "INSERT INTO sub_category (user_id, category, name)
             VALUES (:user_id, :category, :name)",
            named_params! {
                ":user_id": new_sub_category.user_id.as_i64(),
                ":category": new_sub_category.category.as_code(),
                ":name": new_sub_category.name,
            },
        )?;

        let id = connection.last_insert_rowid();

        Ok(SubCategory::new(
            id,
            new_sub_category.user_id,
            new_sub_category.category,
            new_sub_category.name,
        ))
    }

    fn get(&self, id: DatabaseID) -> Result<SubCategory, Error> {
        let sub_category = self
            .connection
            .lock()
            .unwrap()
            .prepare("SELECT id, user_id, category, name FROM sub_category WHERE id = :id")?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(sub_category)
    }

    fn get_by_user(&self, user_id: UserID) -> Result<Vec<SubCategory>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, user_id, category, name FROM sub_category
                 WHERE user_id = :user_id ORDER BY id",
            )?
            .query_map(&[(":user_id", &user_id.as_i64())], Self::map_row)?
            .map(|maybe_sub_category| maybe_sub_category.map_err(Error::from))
            .collect()
    }
}

impl CreateTable for SQLiteSubCategoryStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS sub_category (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL,
                    category TEXT NOT NULL,
                    name TEXT NOT NULL,
                    FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteSubCategoryStore {
    type ReturnType = SubCategory;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let code = row.get::<_, String>(offset + 2)?;
        let category = ExpenseCategory::from_code(&code).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                offset + 2,
                rusqlite::types::Type::Text,
                format!("unknown expense category \"{code}\"").into(),
            )
        })?;

        Ok(SubCategory::new(
            row.get(offset)?,
            UserID::new(row.get(offset + 1)?),
            category,
            row.get(offset + 3)?,
        ))
    }
}

#[cfg(test)]
mod sqlite_sub_category_store_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        models::{CurrencyCode, ExpenseCategory, NewSubCategory, User},
        stores::{
            SubCategoryStore, UserStore,
            sqlite::{SqliteStores, create_stores},
        },
    };

    fn get_stores_and_user() -> (SqliteStores, User) {
        let conn = Connection::open_in_memory().unwrap();
        let mut stores = create_stores(conn).unwrap();

        let user = stores
            .users
            .create("foo@bar.baz", CurrencyCode::new("EUR").unwrap())
            .unwrap();

        (stores, user)
    }

    #[test]
    fn create_and_get_round_trip() {
        let (mut stores, user) = get_stores_and_user();

        let sub_category = stores
            .sub_categories
            .create(NewSubCategory {
                user_id: user.id(),
                category: ExpenseCategory::Subscription,
                name: "Streaming".to_owned(),
            })
            .unwrap();

        assert_eq!(stores.sub_categories.get(sub_category.id()), Ok(sub_category));
    }

    #[test]
    fn create_fails_on_missing_user() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stores = create_stores(conn).unwrap();

        let result = stores.sub_categories.create(NewSubCategory {
            user_id: crate::models::UserID::new(42),
            category: ExpenseCategory::Food,
            name: "Groceries".to_owned(),
        });

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_by_user_only_returns_own_rows() {
        let (mut stores, user) = get_stores_and_user();
        let other_user = stores
            .users
            .create("other@bar.baz", CurrencyCode::new("EUR").unwrap())
            .unwrap();

        let own = stores
            .sub_categories
            .create(NewSubCategory {
                user_id: user.id(),
                category: ExpenseCategory::Food,
                name: "Groceries".to_owned(),
            })
            .unwrap();
        stores
            .sub_categories
            .create(NewSubCategory {
                user_id: other_user.id(),
                category: ExpenseCategory::Food,
                name: "Takeaway".to_owned(),
            })
            .unwrap();

        assert_eq!(stores.sub_categories.get_by_user(user.id()), Ok(vec![own]));
    }
}
