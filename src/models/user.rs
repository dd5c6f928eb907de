//! A minimal projection of a user account: the engines only need to know who
//! owns a transaction and which currency the user prefers.

use serde::{Deserialize, Serialize};

use crate::models::CurrencyCode;

/// A newtype wrapper for integers that are used as user IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The underlying integer ID.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

/// The owner of transactions and subcategories.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    id: UserID,
    email: String,
    preferred_currency: CurrencyCode,
}

impl User {
    /// Create a user from its parts.
    ///
    /// This function does not persist anything, see
    /// [UserStore](crate::stores::UserStore) for that.
    pub fn new(id: UserID, email: String, preferred_currency: CurrencyCode) -> Self {
        Self {
            id,
            email,
            preferred_currency,
        }
    }

    /// The ID of the user.
    pub fn id(&self) -> UserID {
        self.id
    }

    /// The email address the user signed up with.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The currency the user wants amounts displayed in.
    pub fn preferred_currency(&self) -> &CurrencyCode {
        &self.preferred_currency
    }
}
