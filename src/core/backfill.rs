//! Merging a fresh observation into a stored series.
//!
//! Two policies share one entry point, [`BackfillStrategy::apply`]:
//!
//! * [`BackfillStrategy::SingleEntry`] stores the observed value under its own
//!   date, once.
//! * [`BackfillStrategy::DailyCompounding`] treats the observation as a daily
//!   rate and extends the series one calendar day at a time up to `today`,
//!   compounding from the last stored value.
//!
//! Both are append-only: no existing date is ever rewritten.

use crate::domain::model::{IndexKind, IndexSeries, RateObservation, UpdateOutcome};
use chrono::{Days, NaiveDate};

/// Origin value of a compounded index with no history.
pub const DEFAULT_BASELINE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackfillStrategy {
    SingleEntry,
    DailyCompounding { baseline: f64 },
}

impl BackfillStrategy {
    pub fn for_index(kind: IndexKind) -> Self {
        match kind {
            IndexKind::Activa => BackfillStrategy::DailyCompounding {
                baseline: DEFAULT_BASELINE,
            },
            IndexKind::Cer => BackfillStrategy::SingleEntry,
        }
    }

    /// Merges `observation` into `series`. `today` is the last date a
    /// compounding backfill may reach.
    pub fn apply(
        &self,
        series: &mut IndexSeries,
        observation: &RateObservation,
        today: NaiveDate,
    ) -> UpdateOutcome {
        match *self {
            BackfillStrategy::SingleEntry => append_single(series, observation),
            BackfillStrategy::DailyCompounding { baseline } => {
                backfill_daily(series, observation, today, baseline)
            }
        }
    }
}

fn append_single(series: &mut IndexSeries, observation: &RateObservation) -> UpdateOutcome {
    if series.insert_if_absent(observation.effective_date, observation.rate) {
        UpdateOutcome::Changed {
            inserted: vec![observation.effective_date],
        }
    } else {
        UpdateOutcome::Unchanged
    }
}

/// First date a compounding backfill should write.
///
/// Resumes the day after the last stored date unless the observation is newer
/// than everything stored, in which case it starts at the effective date.
pub fn start_date(last_date: Option<NaiveDate>, effective_date: NaiveDate) -> Option<NaiveDate> {
    match last_date {
        Some(last) if last >= effective_date => last.checked_add_days(Days::new(1)),
        _ => Some(effective_date),
    }
}

fn backfill_daily(
    series: &mut IndexSeries,
    observation: &RateObservation,
    today: NaiveDate,
    baseline: f64,
) -> UpdateOutcome {
    let last = series.last();

    let Some(start) = start_date(last.map(|(date, _)| date), observation.effective_date) else {
        return UpdateOutcome::Unchanged;
    };
    if start > today {
        tracing::debug!("Nothing to backfill: next date {} is after {}", start, today);
        return UpdateOutcome::Unchanged;
    }

    let seed = last.map(|(_, value)| value).unwrap_or(baseline);
    let inserted = fill_daily(series, start, today, seed, observation.rate);

    if inserted.is_empty() {
        UpdateOutcome::Unchanged
    } else {
        UpdateOutcome::Changed { inserted }
    }
}

/// Writes `start..=end`, each day compounding the previous computed value by
/// `(1 + rate)`, starting from `seed`.
///
/// Dates already present are skipped and the chain keeps compounding from its
/// own last computed value rather than re-seeding from the stored one. Possibly
/// unintended, but published series were built this way; see
/// `test_existing_dates_do_not_reseed_the_chain`.
pub(crate) fn fill_daily(
    series: &mut IndexSeries,
    start: NaiveDate,
    end: NaiveDate,
    seed: f64,
    rate: f64,
) -> Vec<NaiveDate> {
    let mut inserted = Vec::new();
    let mut previous = seed;

    for date in start.iter_days().take_while(|date| *date <= end) {
        if series.contains(&date) {
            continue;
        }
        previous *= 1.0 + rate;
        series.insert_if_absent(date, previous);
        inserted.push(date);
    }

    inserted
}
