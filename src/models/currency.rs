//! Currency codes and the rows of the currency table.

use std::fmt::{self, Display};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::Error;

/// A 3-letter, uppercase ISO-4217 style currency code such as `EUR` or `USD`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Create a currency code from a string.
    ///
    /// The code is uppercased, so `"usd"` and `"USD"` are the same code.
    /// Note that this only checks the shape of the code. Whether the code is
    /// actually known is decided by the currency table.
    ///
    /// # Errors
    /// Returns [Error::UnknownCurrency] if `code` is not three ASCII letters.
    pub fn new(code: &str) -> Result<Self, Error> {
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(Error::UnknownCurrency(code.to_owned()))
        }
    }

    /// Create a currency code without validating it.
    ///
    /// Should only be called on values from a trusted source such as the
    /// application's database.
    pub fn new_unchecked(code: String) -> Self {
        Self(code)
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A row of the currency table: the latest known rate for one currency,
/// relative to the base the rate table was fetched with.
///
/// Rows are upserted whenever fresh rates are fetched and never deleted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    code: CurrencyCode,
    name: String,
    rate: Decimal,
    last_updated: PrimitiveDateTime,
}

impl Currency {
    /// Create a currency row from its parts.
    pub fn new(
        code: CurrencyCode,
        name: String,
        rate: Decimal,
        last_updated: PrimitiveDateTime,
    ) -> Self {
        Self {
            code,
            name,
            rate,
            last_updated,
        }
    }

    /// The currency's 3-letter code.
    pub fn code(&self) -> &CurrencyCode {
        &self.code
    }

    /// The human readable name, e.g. "Euro".
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The latest known rate relative to the fetch base.
    pub fn rate(&self) -> Decimal {
        self.rate
    }

    /// When the rate source last updated this rate.
    pub fn last_updated(&self) -> &PrimitiveDateTime {
        &self.last_updated
    }
}

#[cfg(test)]
mod currency_code_tests {
    use crate::{Error, models::CurrencyCode};

    #[test]
    fn new_uppercases_the_code() {
        let code = CurrencyCode::new("usd").unwrap();

        assert_eq!(code.as_str(), "USD");
    }

    #[test]
    fn new_fails_on_wrong_length() {
        for code in ["", "EU", "EURO"] {
            assert_eq!(
                CurrencyCode::new(code),
                Err(Error::UnknownCurrency(code.to_owned()))
            );
        }
    }

    #[test]
    fn new_fails_on_non_letters() {
        assert_eq!(
            CurrencyCode::new("E1R"),
            Err(Error::UnknownCurrency("E1R".to_owned()))
        );
    }
}
