//! Defines the store traits the engines are written against, and their
//! SQLite implementations.

mod category;
mod currency;
pub mod sqlite;
mod transaction;
mod user;

pub use category::SubCategoryStore;
pub use currency::CurrencyStore;
pub use sqlite::{
    SQLiteCurrencyStore, SQLiteLedgerStore, SQLiteSubCategoryStore, SQLiteUserStore, SqliteStores,
    create_stores,
};
pub use transaction::LedgerStore;
pub use user::UserStore;
