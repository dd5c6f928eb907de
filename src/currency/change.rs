//! Re-denominates the ledger when a user changes their preferred currency.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::{
    Error,
    currency::{RateCache, RateLimiter, RateSource},
    models::{CurrencyCode, UserID},
    stores::{CurrencyStore, LedgerStore, UserStore},
};

/// Applies a user's currency change: updates their preference, counts it
/// against the daily quota, and optionally rewrites stored amounts at the
/// latest known rate.
pub struct CurrencyConverter<L, U, C, S> {
    ledger: L,
    users: U,
    currencies: C,
    rates: RateCache<S>,
    limiter: Arc<RateLimiter>,
}

impl<L, U, C, S> CurrencyConverter<L, U, C, S>
where
    L: LedgerStore,
    U: UserStore,
    C: CurrencyStore,
    S: RateSource,
{
    /// Create a converter over the given stores.
    ///
    /// The limiter is shared so the external daily trigger can reset it.
    pub fn new(
        ledger: L,
        users: U,
        currencies: C,
        rates: RateCache<S>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            ledger,
            users,
            currencies,
            rates,
            limiter,
        }
    }

    /// Change the user's preferred currency to `new_code`.
    ///
    /// The change counts against the user's daily quota only once the
    /// preference is persisted; a conversion failure afterwards does not
    /// count a second time, and does not undo the preference change.
    ///
    /// # Errors
    /// - [Error::RateLimited] if the user has used up today's quota; the
    ///   stored currency is left untouched.
    /// - [Error::UnknownCurrency] if `new_code` is malformed or not in the
    ///   currency table.
    /// - [Error::RateUnavailable] if amounts should be converted but no
    ///   rate is known for the pair.
    /// - Store errors are passed through; if the amount rewrite fails part
    ///   way, the error is logged and returned and the already converted
    ///   records stay converted.
    pub fn change_currency(
        &mut self,
        user_id: UserID,
        new_code: &str,
        convert_amounts: bool,
    ) -> Result<(), Error> {
        if self.limiter.is_limited(user_id) {
            return Err(Error::RateLimited);
        }

        let new_code = CurrencyCode::new(new_code)?;

        match self.currencies.get(&new_code) {
            Ok(_) => {}
            Err(Error::NotFound) => {
                return Err(Error::UnknownCurrency(new_code.to_string()));
            }
            Err(error) => return Err(error),
        }

        let user = self.users.get(user_id)?;
        let old_code = user.preferred_currency().clone();

        self.users.set_preferred_currency(user_id, &new_code)?;
        self.limiter.record_change(user_id);

        if !convert_amounts {
            return Ok(());
        }

        let rate = self.rates.exchange_rate(&old_code, &new_code)?;

        self.rewrite_amounts(rate, &new_code)
    }

    /// Multiply every amount in the ledger by `rate` and retag it with
    /// `new_code`.
    ///
    /// The rewrite spans the whole ledger, not just the requesting user's
    /// records; this function is the single place that decides that scope.
    fn rewrite_amounts(&mut self, rate: Decimal, new_code: &CurrencyCode) -> Result<(), Error> {
        let transactions = self.ledger.get_all()?;

        for transaction in transactions {
            let mut converted = transaction;
            converted.set_amount(converted.amount() * rate);
            converted.set_currency(new_code.clone());

            if let Err(error) = self.ledger.update(&converted) {
                tracing::error!(
                    "currency conversion stopped at transaction {}; \
                     earlier records are already converted to {new_code}: {error}",
                    converted.id(),
                );
                return Err(error);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod currency_converter_tests {
    use std::{collections::HashMap, sync::Arc};

    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::macros::datetime;

    use crate::{
        Error,
        currency::{
            MAX_DAILY_CHANGES, RateCache, RateLimiter, RateSource, RateTable, refresh_currencies,
        },
        models::{Currency, CurrencyCode, NewTransaction, TransactionDetails, User, UserID},
        stores::{
            CurrencyStore, LedgerStore, UserStore,
            sqlite::{
                SQLiteCurrencyStore, SQLiteLedgerStore, SQLiteUserStore, SqliteStores,
                create_stores,
            },
        },
    };

    use super::CurrencyConverter;

    struct FixedSource {
        rates: HashMap<String, Decimal>,
    }

    impl FixedSource {
        fn eur_based() -> Self {
            Self {
                rates: HashMap::from([
                    ("EUR".to_owned(), Decimal::ONE),
                    ("USD".to_owned(), Decimal::new(2, 0)),
                ]),
            }
        }
    }

    impl RateSource for FixedSource {
        fn fetch_rates(&self, _base: &CurrencyCode) -> Result<RateTable, Error> {
            Ok(RateTable {
                rates: self.rates.clone(),
                last_updated: datetime!(2024-06-01 00:00),
            })
        }
    }

    type TestConverter =
        CurrencyConverter<SQLiteLedgerStore, SQLiteUserStore, SQLiteCurrencyStore, FixedSource>;

    fn get_converter_and_stores() -> (TestConverter, SqliteStores, User) {
        let mut stores = create_stores(Connection::open_in_memory().unwrap()).unwrap();

        refresh_currencies(&FixedSource::eur_based(), &mut stores.currencies).unwrap();

        let user = stores
            .users
            .create("test@test.com", CurrencyCode::new("EUR").unwrap())
            .unwrap();

        let converter = CurrencyConverter::new(
            stores.ledger.clone(),
            stores.users.clone(),
            stores.currencies.clone(),
            RateCache::new(FixedSource::eur_based()),
            Arc::new(RateLimiter::new()),
        );

        (converter, stores, user)
    }

    fn create_income(stores: &mut SqliteStores, user_id: UserID, amount: Decimal) {
        stores
            .ledger
            .create(
                NewTransaction::new(
                    user_id,
                    amount,
                    datetime!(2024-06-01 12:00),
                    CurrencyCode::new("EUR").unwrap(),
                    TransactionDetails::Income {
                        source: "Salary".to_owned(),
                    },
                )
                .unwrap(),
            )
            .unwrap();
    }

    #[test]
    fn change_without_conversion_only_updates_the_preference() {
        let (mut converter, mut stores, user) = get_converter_and_stores();
        create_income(&mut stores, user.id(), Decimal::new(100, 0));

        converter.change_currency(user.id(), "USD", false).unwrap();

        let updated = stores.users.get(user.id()).unwrap();
        assert_eq!(updated.preferred_currency().as_str(), "USD");

        let transactions = stores.ledger.get_all().unwrap();
        assert_eq!(transactions[0].amount(), Decimal::new(100, 0));
        assert_eq!(transactions[0].currency().as_str(), "EUR");
    }

    #[test]
    fn change_with_conversion_rewrites_every_record_in_the_ledger() {
        let (mut converter, mut stores, user) = get_converter_and_stores();
        let bystander = stores
            .users
            .create("bystander@test.com", CurrencyCode::new("EUR").unwrap())
            .unwrap();

        create_income(&mut stores, user.id(), Decimal::new(100, 0));
        create_income(&mut stores, bystander.id(), Decimal::new(40, 0));

        converter.change_currency(user.id(), "USD", true).unwrap();

        // The rewrite covers the whole ledger, including the other user's
        // records.
        let transactions = stores.ledger.get_all().unwrap();
        assert_eq!(transactions.len(), 2);
        for transaction in &transactions {
            assert_eq!(transaction.currency().as_str(), "USD");
        }
        assert_eq!(transactions[0].amount(), Decimal::new(200, 0));
        assert_eq!(transactions[1].amount(), Decimal::new(80, 0));
    }

    #[test]
    fn sixth_change_of_the_day_is_rate_limited() {
        let (mut converter, mut stores, user) = get_converter_and_stores();

        for change in 0..MAX_DAILY_CHANGES {
            let code = if change % 2 == 0 { "USD" } else { "EUR" };
            converter.change_currency(user.id(), code, false).unwrap();
        }

        let result = converter.change_currency(user.id(), "USD", false);

        assert_eq!(result, Err(Error::RateLimited));
        // The fifth change set the preference to USD; the rejected sixth
        // must not have altered it.
        let stored = stores.users.get(user.id()).unwrap();
        assert_eq!(stored.preferred_currency().as_str(), "USD");
    }

    #[test]
    fn unknown_currency_is_rejected_before_any_write() {
        let (mut converter, mut stores, user) = get_converter_and_stores();

        let result = converter.change_currency(user.id(), "XXX", true);

        assert_eq!(result, Err(Error::UnknownCurrency("XXX".to_owned())));
        let stored = stores.users.get(user.id()).unwrap();
        assert_eq!(stored.preferred_currency().as_str(), "EUR");
    }

    #[test]
    fn malformed_code_is_rejected() {
        let (mut converter, _stores, user) = get_converter_and_stores();

        let result = converter.change_currency(user.id(), "dollars", true);

        assert_eq!(
            result,
            Err(Error::UnknownCurrency("dollars".to_owned()))
        );
    }

    #[test]
    fn missing_rate_changes_the_preference_but_not_the_amounts() {
        let (_, mut stores, user) = get_converter_and_stores();
        create_income(&mut stores, user.id(), Decimal::new(100, 0));

        // GBP is in the currency table but the rate source has no EUR->GBP
        // entry, so the conversion itself cannot proceed.
        stores
            .currencies
            .upsert(&Currency::new(
                CurrencyCode::new("GBP").unwrap(),
                "British Pound".to_owned(),
                Decimal::new(85, 2),
                datetime!(2024-06-01 00:00),
            ))
            .unwrap();

        let mut converter = CurrencyConverter::new(
            stores.ledger.clone(),
            stores.users.clone(),
            stores.currencies.clone(),
            RateCache::new(FixedSource::eur_based()),
            Arc::new(RateLimiter::new()),
        );

        let result = converter.change_currency(user.id(), "GBP", true);

        assert_eq!(
            result,
            Err(Error::RateUnavailable {
                from: "EUR".to_owned(),
                to: "GBP".to_owned(),
            })
        );

        // The preference change already happened and sticks; the amounts
        // were never touched.
        let stored = stores.users.get(user.id()).unwrap();
        assert_eq!(stored.preferred_currency().as_str(), "GBP");
        let transactions = stores.ledger.get_all().unwrap();
        assert_eq!(transactions[0].amount(), Decimal::new(100, 0));
        assert_eq!(transactions[0].currency().as_str(), "EUR");
    }

    #[test]
    fn converting_to_the_same_currency_keeps_amounts_identical() {
        let (mut converter, mut stores, user) = get_converter_and_stores();
        create_income(&mut stores, user.id(), Decimal::new(12345, 2));

        converter.change_currency(user.id(), "EUR", true).unwrap();

        let transactions = stores.ledger.get_all().unwrap();
        assert_eq!(transactions[0].amount(), Decimal::new(12345, 2));
        assert_eq!(transactions[0].currency().as_str(), "EUR");
    }
}
