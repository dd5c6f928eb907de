//! Materializes due occurrences of recurring transactions.
//!
//! An external timer runs [RecurrenceEngine::advance_due] once a day. Each
//! run advances every due recurring transaction by exactly one period: it
//! appends a copy dated at the next occurrence and moves the original's date
//! forward to that same timestamp. The advanced date is what marks an
//! occurrence as generated, so a transaction whose date is already past its
//! next occurrence minus one period is never picked up twice for a fixed
//! "now".

use time::{Date, Duration, Month, PrimitiveDateTime, Time, util::is_leap_year};

use crate::{
    Error,
    models::{NewTransaction, RecurrencePeriod, Transaction},
    stores::LedgerStore,
};

/// Generates occurrences of recurring transactions that have come due.
#[derive(Debug)]
pub struct RecurrenceEngine<L> {
    ledger: L,
}

impl<L: LedgerStore> RecurrenceEngine<L> {
    /// Create an engine over the given ledger.
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    /// Advance every recurring transaction whose next occurrence is strictly
    /// before `now`.
    ///
    /// Each invocation advances a transaction by at most one period, even if
    /// several periods have elapsed since the last run; catching up happens
    /// one occurrence per day.
    ///
    /// A persistence failure on one transaction is logged with its owner and
    /// processing continues with the rest; there is no global rollback.
    pub fn advance_due(&mut self, now: PrimitiveDateTime) {
        let recurring = match self.ledger.get_recurring() {
            Ok(recurring) => recurring,
            Err(error) => {
                tracing::error!("could not load recurring transactions: {error}");
                return;
            }
        };

        for transaction in recurring {
            // Rows whose stored period code was unrecognized carry no
            // period; they are skipped, not treated as errors.
            let Some(period) = transaction.period() else {
                continue;
            };

            let next_occurrence = advance(transaction.date(), period);

            if next_occurrence >= now {
                // Not yet due.
                continue;
            }

            if next_occurrence < transaction.date() {
                // A next occurrence earlier than the current date means the
                // stored date or period is corrupt; generating from it would
                // walk backwards through time.
                continue;
            }

            if let Err(error) = self.generate_occurrence(&transaction, period, next_occurrence) {
                tracing::error!(
                    "could not process recurring transaction {} for user {}: {error}",
                    transaction.id(),
                    transaction.user_id().as_i64(),
                );
            }
        }
    }

    /// Append a copy of `original` dated `next_occurrence`, then advance the
    /// original's date to the same timestamp.
    fn generate_occurrence(
        &mut self,
        original: &Transaction,
        period: RecurrencePeriod,
        next_occurrence: PrimitiveDateTime,
    ) -> Result<(), Error> {
        let occurrence = NewTransaction::new(
            original.user_id(),
            original.amount(),
            next_occurrence,
            original.currency().clone(),
            original.details().clone(),
        )?
        .description(original.description())
        .recurring(period);

        self.ledger.create(occurrence)?;

        let mut advanced = original.clone();
        advanced.set_date(next_occurrence);

        if let Err(error) = self.ledger.update(&advanced) {
            // The occurrence row is already committed at this point. Until
            // the original's date is advanced, the ledger holds an extra
            // occurrence that a later run cannot detect or remove.
            tracing::error!(
                "created occurrence of transaction {} but could not advance its date; \
                 the ledger may now hold a duplicate occurrence",
                original.id(),
            );
            return Err(error);
        }

        Ok(())
    }
}

/// The next occurrence of a transaction dated `date` that repeats with
/// `period`: exactly one period later, preserving the time of day.
///
/// Adding a calendar month or year clamps to the last day of the target
/// month, so `2024-01-31` + 1 month = `2024-02-29` and `2024-02-29` + 1 year
/// = `2025-02-28`.
pub fn advance(date: PrimitiveDateTime, period: RecurrencePeriod) -> PrimitiveDateTime {
    match period {
        RecurrencePeriod::Weekly => date + Duration::weeks(1),
        RecurrencePeriod::Monthly => {
            let (year, month) = match date.month() {
                Month::December => (date.year() + 1, Month::January),
                month => (date.year(), month.next()),
            };

            with_clamped_day(year, month, date.day(), date.time())
        }
        RecurrencePeriod::Yearly => {
            with_clamped_day(date.year() + 1, date.month(), date.day(), date.time())
        }
    }
}

fn with_clamped_day(year: i32, month: Month, day: u8, time: Time) -> PrimitiveDateTime {
    let day = day.min(days_in_month(year, month));
    let date =
        Date::from_calendar_date(year, month, day).expect("the day was clamped to the month");

    PrimitiveDateTime::new(date, time)
}

fn days_in_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

#[cfg(test)]
mod advance_tests {
    use time::macros::datetime;

    use crate::{models::RecurrencePeriod, recurrence::advance};

    #[test]
    fn weekly_adds_seven_days() {
        assert_eq!(
            advance(datetime!(2024-06-01 10:00), RecurrencePeriod::Weekly),
            datetime!(2024-06-08 10:00)
        );
    }

    #[test]
    fn weekly_crosses_month_boundary() {
        assert_eq!(
            advance(datetime!(2024-06-28 10:00), RecurrencePeriod::Weekly),
            datetime!(2024-07-05 10:00)
        );
    }

    #[test]
    fn monthly_adds_one_calendar_month() {
        assert_eq!(
            advance(datetime!(2024-06-15 10:00), RecurrencePeriod::Monthly),
            datetime!(2024-07-15 10:00)
        );
    }

    #[test]
    fn monthly_clamps_to_shorter_month() {
        assert_eq!(
            advance(datetime!(2024-01-31 10:00), RecurrencePeriod::Monthly),
            datetime!(2024-02-29 10:00)
        );
        assert_eq!(
            advance(datetime!(2023-01-31 10:00), RecurrencePeriod::Monthly),
            datetime!(2023-02-28 10:00)
        );
        assert_eq!(
            advance(datetime!(2024-03-31 10:00), RecurrencePeriod::Monthly),
            datetime!(2024-04-30 10:00)
        );
    }

    #[test]
    fn monthly_wraps_december_into_next_year() {
        assert_eq!(
            advance(datetime!(2023-12-31 10:00), RecurrencePeriod::Monthly),
            datetime!(2024-01-31 10:00)
        );
    }

    #[test]
    fn yearly_adds_one_calendar_year() {
        assert_eq!(
            advance(datetime!(2023-06-01 08:30), RecurrencePeriod::Yearly),
            datetime!(2024-06-01 08:30)
        );
    }

    #[test]
    fn yearly_clamps_leap_day() {
        assert_eq!(
            advance(datetime!(2024-02-29 10:00), RecurrencePeriod::Yearly),
            datetime!(2025-02-28 10:00)
        );
    }

    #[test]
    fn time_of_day_is_preserved() {
        assert_eq!(
            advance(datetime!(2024-06-01 23:59:59), RecurrencePeriod::Monthly).time(),
            datetime!(2024-06-01 23:59:59).time()
        );
    }
}
