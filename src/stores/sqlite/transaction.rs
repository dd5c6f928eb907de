//! Implements a SQLite backed ledger store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, named_params};
use time::{Date, Month, PrimitiveDateTime, Time};

use crate::{
    Error,
    db::{CreateTable, MapRow, decimal_from_column},
    models::{
        CurrencyCode, DatabaseID, NewTransaction, RecurrencePeriod, Transaction,
        TransactionDetails, TransactionType, UserID,
    },
    stores::LedgerStore,
};

const COLUMNS: &str =
    "id, kind, user_id, description, amount, currency, date, recurring, recurrence_period, \
     sub_category_id, source";

/// Stores expenses and incomes in a SQLite database.
///
/// Note that because a transaction references the
/// [User](crate::models::User) and [SubCategory](crate::models::SubCategory)
/// models, their tables must be set up in the database.
#[derive(Debug, Clone)]
pub struct SQLiteLedgerStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteLedgerStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn select_many(
        &self,
        where_clause: &str,
        params: &[(&str, &dyn rusqlite::ToSql)],
    ) -> Result<Vec<Transaction>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {COLUMNS} FROM \"transaction\" {where_clause} ORDER BY id"
            ))?
            .query_map(params, Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
            .collect()
    }

    fn boundary_year(
        &self,
        aggregate: &str,
        transaction_type: TransactionType,
        user_id: UserID,
    ) -> Result<Option<i32>, Error> {
        // The stored date format is zero padded, so the lexicographic
        // MIN/MAX over the text column is also the chronological one.
        let date = self.connection.lock().unwrap().query_row(
            &format!(
                "SELECT {aggregate}(date) FROM \"transaction\"
                 WHERE kind = :kind AND user_id = :user_id"
            ),
            named_params! {
                ":kind": transaction_type.as_str(),
                ":user_id": user_id.as_i64(),
            },
            |row| row.get::<_, Option<PrimitiveDateTime>>(0),
        )?;

        Ok(date.map(|date| date.year()))
    }
}

fn year_start(year: i32) -> PrimitiveDateTime {
    let date =
        Date::from_calendar_date(year, Month::January, 1).expect("January 1 exists in every year");

    PrimitiveDateTime::new(date, Time::MIDNIGHT)
}

/// The half-open range `[start of month, start of next month)`.
fn month_bounds(year: i32, month: u8) -> Result<(PrimitiveDateTime, PrimitiveDateTime), Error> {
    let month = Month::try_from(month).map_err(|_| Error::InvalidMonth(month))?;

    let start = PrimitiveDateTime::new(
        Date::from_calendar_date(year, month, 1).expect("the first exists in every month"),
        Time::MIDNIGHT,
    );

    let end = match month {
        Month::December => year_start(year + 1),
        month => PrimitiveDateTime::new(
            Date::from_calendar_date(year, month.next(), 1)
                .expect("the first exists in every month"),
            Time::MIDNIGHT,
        ),
    };

    Ok((start, end))
}

impl LedgerStore for SQLiteLedgerStore {
    /// Create a new transaction in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if the owner or the referenced subcategory does
    ///   not exist,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(&mut self, new_transaction: NewTransaction) -> Result<Transaction, Error> {
        let (sub_category_id, source) = match &new_transaction.details {
            TransactionDetails::Expense { sub_category_id } => (Some(*sub_category_id), None),
            TransactionDetails::Income { source } => (None, Some(source.as_str())),
        };

        let connection = self.connection.lock().unwrap();

        connection.execute(
            "INSERT INTO \"transaction\"
             (kind, user_id, description, amount, currency, date, recurring, recurrence_period, \
              sub_category_id, source)
             VALUES (:kind, :user_id, :description, :amount, :currency, :date, :recurring, \
                     :recurrence_period, :sub_category_id, :source)",
            named_params! {
                ":kind": new_transaction.details.transaction_type().as_str(),
                ":user_id": new_transaction.user_id.as_i64(),
                ":description": new_transaction.description,
                ":amount": new_transaction.amount.to_string(),
                ":currency": new_transaction.currency.as_str(),
                ":date": new_transaction.date,
                ":recurring": new_transaction.recurring,
                ":recurrence_period": new_transaction.period.map(|period| period.as_code()),
                ":sub_category_id": sub_category_id,
                ":source": source,
            },
        )?;

        let id = connection.last_insert_rowid();

        Ok(Transaction::new_unchecked(
            id,
            new_transaction.user_id,
            new_transaction.description,
            new_transaction.amount,
            new_transaction.currency,
            new_transaction.date,
            new_transaction.recurring,
            new_transaction.period,
            new_transaction.details,
        ))
    }

    /// Overwrite the stored transaction that has `transaction`'s ID.
    ///
    /// The transaction's type and owner are fixed at creation and are not
    /// written here.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no transaction with that ID exists.
    fn update(&mut self, transaction: &Transaction) -> Result<(), Error> {
        let (sub_category_id, source) = match transaction.details() {
            TransactionDetails::Expense { sub_category_id } => (Some(*sub_category_id), None),
            TransactionDetails::Income { source } => (None, Some(source.as_str())),
        };

        let rows_changed = self.connection.lock().unwrap().execute(
            "UPDATE \"transaction\"
             SET description = :description, amount = :amount, currency = :currency, \
                 date = :date, recurring = :recurring, recurrence_period = :recurrence_period, \
                 sub_category_id = :sub_category_id, source = :source
             WHERE id = :id",
            named_params! {
                ":id": transaction.id(),
                ":description": transaction.description(),
                ":amount": transaction.amount().to_string(),
                ":currency": transaction.currency().as_str(),
                ":date": transaction.date(),
                ":recurring": transaction.recurring(),
                ":recurrence_period": transaction.period().map(|period| period.as_code()),
                ":sub_category_id": sub_category_id,
                ":source": source,
            },
        )?;

        if rows_changed == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    /// Delete the transaction with `id`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no transaction with that ID exists.
    fn delete(&mut self, id: DatabaseID) -> Result<(), Error> {
        let rows_changed = self
            .connection
            .lock()
            .unwrap()
            .execute("DELETE FROM \"transaction\" WHERE id = :id", &[(":id", &id)])?;

        if rows_changed == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    /// Retrieve a transaction in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid transaction,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: DatabaseID) -> Result<Transaction, Error> {
        let transaction = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {COLUMNS} FROM \"transaction\" WHERE id = :id"
            ))?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(transaction)
    }

    fn get_all(&self) -> Result<Vec<Transaction>, Error> {
        self.select_many("", &[])
    }

    fn get_by_user(
        &self,
        user_id: UserID,
        transaction_type: TransactionType,
    ) -> Result<Vec<Transaction>, Error> {
        self.select_many(
            "WHERE kind = :kind AND user_id = :user_id",
            named_params! {
                ":kind": transaction_type.as_str(),
                ":user_id": user_id.as_i64(),
            },
        )
    }

    fn get_recurring(&self) -> Result<Vec<Transaction>, Error> {
        self.select_many("WHERE recurring = 1", &[])
    }

    fn get_by_year(
        &self,
        transaction_type: TransactionType,
        user_id: UserID,
        year: i32,
    ) -> Result<Vec<Transaction>, Error> {
        self.select_many(
            "WHERE kind = :kind AND user_id = :user_id AND date >= :start AND date < :end",
            named_params! {
                ":kind": transaction_type.as_str(),
                ":user_id": user_id.as_i64(),
                ":start": year_start(year),
                ":end": year_start(year + 1),
            },
        )
    }

    fn get_by_year_and_month(
        &self,
        transaction_type: TransactionType,
        user_id: UserID,
        year: i32,
        month: u8,
    ) -> Result<Vec<Transaction>, Error> {
        let (start, end) = month_bounds(year, month)?;

        self.select_many(
            "WHERE kind = :kind AND user_id = :user_id AND date >= :start AND date < :end",
            named_params! {
                ":kind": transaction_type.as_str(),
                ":user_id": user_id.as_i64(),
                ":start": start,
                ":end": end,
            },
        )
    }

    fn min_year(
        &self,
        transaction_type: TransactionType,
        user_id: UserID,
    ) -> Result<Option<i32>, Error> {
        self.boundary_year("MIN", transaction_type, user_id)
    }

    fn max_year(
        &self,
        transaction_type: TransactionType,
        user_id: UserID,
    ) -> Result<Option<i32>, Error> {
        self.boundary_year("MAX", transaction_type, user_id)
    }
}

impl CreateTable for SQLiteLedgerStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    kind TEXT NOT NULL,
                    user_id INTEGER NOT NULL,
                    description TEXT NOT NULL,
                    amount TEXT NOT NULL,
                    currency TEXT NOT NULL,
                    date TEXT NOT NULL,
                    recurring INTEGER NOT NULL,
                    recurrence_period TEXT,
                    sub_category_id INTEGER,
                    source TEXT,
                    FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                    FOREIGN KEY(sub_category_id) REFERENCES sub_category(id) ON UPDATE CASCADE ON DELETE CASCADE
                    )",
            (),
        )?;

        // The recurrence engine scans by this flag once a day.
        connection.execute(
            "CREATE INDEX IF NOT EXISTS idx_transaction_recurring ON \"transaction\"(recurring)",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteLedgerStore {
    type ReturnType = Transaction;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let kind = row.get::<_, String>(offset + 1)?;
        let user_id = UserID::new(row.get(offset + 2)?);
        let description = row.get(offset + 3)?;
        let amount = decimal_from_column(row, offset + 4)?;
        let currency = CurrencyCode::new_unchecked(row.get(offset + 5)?);
        let date = row.get(offset + 6)?;
        let recurring = row.get(offset + 7)?;
        // An unrecognized period code maps to `None` so that one corrupt row
        // cannot fail a whole scan; the recurrence engine skips such rows.
        let period = row
            .get::<_, Option<String>>(offset + 8)?
            .as_deref()
            .and_then(RecurrencePeriod::from_code);

        let details = match kind.as_str() {
            "expense" => TransactionDetails::Expense {
                sub_category_id: row.get(offset + 9)?,
            },
            "income" => TransactionDetails::Income {
                source: row.get(offset + 10)?,
            },
            _ => {
                return Err(rusqlite::Error::FromSqlConversionFailure(
                    offset + 1,
                    rusqlite::types::Type::Text,
                    format!("unknown transaction kind \"{kind}\"").into(),
                ));
            }
        };

        Ok(Transaction::new_unchecked(
            id,
            user_id,
            description,
            amount,
            currency,
            date,
            recurring,
            period,
            details,
        ))
    }
}
