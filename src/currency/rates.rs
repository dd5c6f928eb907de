//! Exchange-rate lookup: a fetchable rate table per base currency, an
//! in-process cache over it, and the daily refresh of the currency table.

use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Mutex,
};

use rust_decimal::Decimal;
use serde::Deserialize;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::{
    Error,
    models::{Currency, CurrencyCode},
    stores::CurrencyStore,
};

/// A rate table expressed relative to one base currency: one unit of the
/// base equals `rates[code]` units of each other currency.
#[derive(Clone, Debug, PartialEq)]
pub struct RateTable {
    /// The rate for each currency code, relative to the base.
    pub rates: HashMap<String, Decimal>,
    /// When the rate source last updated the table.
    pub last_updated: PrimitiveDateTime,
}

/// A source of base-relative exchange-rate tables.
pub trait RateSource {
    /// Fetch the rate table expressed relative to `base`.
    fn fetch_rates(&self, base: &CurrencyCode) -> Result<RateTable, Error>;
}

/// Fetches rate tables from the free `exchangerate-api.com` endpoint.
pub struct ExchangeRateClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: HashMap<String, Decimal>,
    time_last_updated: i64,
}

impl ExchangeRateClient {
    /// Create a client against the public API.
    pub fn new() -> Self {
        Self::with_base_url("https://api.exchangerate-api.com/v4/latest")
    }

    /// Create a client against a different endpoint, e.g. a local stub.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.to_owned(),
        }
    }
}

impl Default for ExchangeRateClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RateSource for ExchangeRateClient {
    fn fetch_rates(&self, base: &CurrencyCode) -> Result<RateTable, Error> {
        let url = format!("{}/{}", self.base_url, base);

        let response = self
            .client
            .get(&url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|error| Error::RateFetchFailed(error.to_string()))?
            .json::<RatesResponse>()
            .map_err(|error| Error::RateFetchFailed(error.to_string()))?;

        let last_updated = OffsetDateTime::from_unix_timestamp(response.time_last_updated)
            .map_err(|error| Error::RateFetchFailed(error.to_string()))?;

        Ok(RateTable {
            rates: response.rates,
            last_updated: PrimitiveDateTime::new(last_updated.date(), last_updated.time()),
        })
    }
}

/// Caches rate tables per base code on top of a [RateSource].
///
/// A cache miss fetches the table and caches it before returning. There is
/// no TTL; the external daily trigger calls [RateCache::invalidate].
pub struct RateCache<S> {
    source: S,
    tables: Mutex<HashMap<String, HashMap<String, Decimal>>>,
}

impl<S: RateSource> RateCache<S> {
    /// Create an empty cache over `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            tables: Mutex::new(HashMap::new()),
        }
    }

    /// The rate for converting one unit of `from` into `to`.
    ///
    /// Converting a currency to itself is always exactly 1, without
    /// consulting the source.
    ///
    /// # Errors
    /// Returns [Error::RateUnavailable] if the base-`from` table has no
    /// entry for `to`, or the source's error if the table cannot be fetched.
    pub fn exchange_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<Decimal, Error> {
        if from == to {
            return Ok(Decimal::ONE);
        }

        let mut tables = self.tables.lock().unwrap();

        let table = match tables.entry(from.as_str().to_owned()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(self.source.fetch_rates(from)?.rates),
        };

        table
            .get(to.as_str())
            .copied()
            .ok_or_else(|| Error::RateUnavailable {
                from: from.to_string(),
                to: to.to_string(),
            })
    }

    /// Drop every cached table. Called by the external daily trigger.
    pub fn invalidate(&self) {
        self.tables.lock().unwrap().clear();
    }
}

/// Fetch the EUR-based rate table and upsert one currency row per code.
///
/// Returns the number of rows written. Codes that are not three letters are
/// skipped with a warning; the free API occasionally carries such entries.
pub fn refresh_currencies<S, C>(source: &S, store: &mut C) -> Result<usize, Error>
where
    S: RateSource,
    C: CurrencyStore,
{
    let base = CurrencyCode::new_unchecked("EUR".to_owned());
    let table = source.fetch_rates(&base)?;

    let mut written = 0;

    for (code, rate) in &table.rates {
        let code = match CurrencyCode::new(code) {
            Ok(code) => code,
            Err(_) => {
                tracing::warn!("skipping malformed currency code \"{code}\" from the rate source");
                continue;
            }
        };

        let name = currency_name(code.as_str()).to_owned();
        store.upsert(&Currency::new(code, name, *rate, table.last_updated))?;
        written += 1;
    }

    Ok(written)
}

/// The display name for a currency code, e.g. "Euro" for `EUR`.
fn currency_name(code: &str) -> &'static str {
    match code {
        "AED" => "United Arab Emirates Dirham",
        "ARS" => "Argentine Peso",
        "AUD" => "Australian Dollar",
        "BGN" => "Bulgarian Lev",
        "BRL" => "Brazilian Real",
        "CAD" => "Canadian Dollar",
        "CHF" => "Swiss Franc",
        "CLP" => "Chilean Peso",
        "CNY" => "Chinese Yuan",
        "COP" => "Colombian Peso",
        "CZK" => "Czech Koruna",
        "DKK" => "Danish Krone",
        "EGP" => "Egyptian Pound",
        "EUR" => "Euro",
        "GBP" => "British Pound",
        "HKD" => "Hong Kong Dollar",
        "HUF" => "Hungarian Forint",
        "IDR" => "Indonesian Rupiah",
        "ILS" => "Israeli New Shekel",
        "INR" => "Indian Rupee",
        "ISK" => "Icelandic Króna",
        "JPY" => "Japanese Yen",
        "KRW" => "South Korean Won",
        "MAD" => "Moroccan Dirham",
        "MXN" => "Mexican Peso",
        "MYR" => "Malaysian Ringgit",
        "NGN" => "Nigerian Naira",
        "NOK" => "Norwegian Krone",
        "NZD" => "New Zealand Dollar",
        "PEN" => "Peruvian Sol",
        "PHP" => "Philippine Peso",
        "PKR" => "Pakistani Rupee",
        "PLN" => "Polish Zloty",
        "QAR" => "Qatari Riyal",
        "RON" => "Romanian Leu",
        "RSD" => "Serbian Dinar",
        "RUB" => "Russian Ruble",
        "SAR" => "Saudi Riyal",
        "SEK" => "Swedish Krona",
        "SGD" => "Singapore Dollar",
        "THB" => "Thai Baht",
        "TRY" => "Turkish Lira",
        "TWD" => "New Taiwan Dollar",
        "UAH" => "Ukrainian Hryvnia",
        "USD" => "United States Dollar",
        "VND" => "Vietnamese Dong",
        "ZAR" => "South African Rand",
        _ => "Unknown Currency",
    }
}

#[cfg(test)]
mod rate_cache_tests {
    use std::{cell::Cell, collections::HashMap};

    use rust_decimal::Decimal;
    use time::macros::datetime;

    use crate::{
        Error,
        currency::{RateCache, RateSource, RateTable},
        models::CurrencyCode,
    };

    /// A rate source that serves a fixed table and counts its fetches.
    struct CountingSource {
        rates: HashMap<String, Decimal>,
        fetches: Cell<u32>,
    }

    impl CountingSource {
        fn new(rates: &[(&str, Decimal)]) -> Self {
            Self {
                rates: rates
                    .iter()
                    .map(|(code, rate)| ((*code).to_owned(), *rate))
                    .collect(),
                fetches: Cell::new(0),
            }
        }
    }

    impl RateSource for CountingSource {
        fn fetch_rates(&self, _base: &CurrencyCode) -> Result<RateTable, Error> {
            self.fetches.set(self.fetches.get() + 1);

            Ok(RateTable {
                rates: self.rates.clone(),
                last_updated: datetime!(2024-06-01 00:00),
            })
        }
    }

    fn code(value: &str) -> CurrencyCode {
        CurrencyCode::new(value).unwrap()
    }

    #[test]
    fn rate_for_same_currency_is_one_without_a_fetch() {
        let source = CountingSource::new(&[]);
        let cache = RateCache::new(source);

        let rate = cache.exchange_rate(&code("EUR"), &code("EUR")).unwrap();

        assert_eq!(rate, Decimal::ONE);
        assert_eq!(cache.source.fetches.get(), 0);
    }

    #[test]
    fn cache_miss_fetches_then_hits_serve_from_memory() {
        let source = CountingSource::new(&[("USD", Decimal::new(108, 2))]);
        let cache = RateCache::new(source);

        for _ in 0..3 {
            let rate = cache.exchange_rate(&code("EUR"), &code("USD")).unwrap();
            assert_eq!(rate, Decimal::new(108, 2));
        }

        assert_eq!(cache.source.fetches.get(), 1);
    }

    #[test]
    fn missing_entry_is_rate_unavailable() {
        let source = CountingSource::new(&[("USD", Decimal::new(108, 2))]);
        let cache = RateCache::new(source);

        let result = cache.exchange_rate(&code("EUR"), &code("JPY"));

        assert_eq!(
            result,
            Err(Error::RateUnavailable {
                from: "EUR".to_owned(),
                to: "JPY".to_owned(),
            })
        );
    }

    #[test]
    fn invalidate_forces_a_refetch() {
        let source = CountingSource::new(&[("USD", Decimal::new(108, 2))]);
        let cache = RateCache::new(source);

        cache.exchange_rate(&code("EUR"), &code("USD")).unwrap();
        cache.invalidate();
        cache.exchange_rate(&code("EUR"), &code("USD")).unwrap();

        assert_eq!(cache.source.fetches.get(), 2);
    }
}
