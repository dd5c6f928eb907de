//! Currency handling: the exchange-rate source and cache, the per-user
//! daily change quota, and the conversion engine that re-denominates the
//! ledger when a user changes their preferred currency.

mod change;
mod rate_limit;
mod rates;

pub use change::CurrencyConverter;
pub use rate_limit::{MAX_DAILY_CHANGES, RateLimiter};
pub use rates::{ExchangeRateClient, RateCache, RateSource, RateTable, refresh_currencies};
