//! Learning statistics derived from the catalog and a progress ledger

use std::collections::BTreeSet;

use chrono::{Local, NaiveDate, TimeZone};
use serde::Serialize;

use super::ledger::ProgressLedger;
use super::model::ProgressRecord;
use crate::catalog::{Catalog, Tutorial};

/// Dashboard statistics for one user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Tutorials completed
    pub completed_count: usize,
    /// Tutorials started but not completed
    pub in_progress_count: usize,
    /// Minutes of completed tutorials (unknown durations count as zero)
    pub total_time_spent: u64,
    /// Distinct days with a completion, or zero when the last one is older than yesterday
    pub current_streak: usize,
}

impl Stats {
    /// Derive statistics using the local timezone and today's date
    pub fn derive(catalog: &Catalog, ledger: &ProgressLedger) -> Self {
        Self::derive_at(catalog, ledger, &Local, Local::now().date_naive())
    }

    /// Derive statistics as of `today`, bucketing completion days in `tz`
    pub fn derive_at<Tz: TimeZone>(
        catalog: &Catalog,
        ledger: &ProgressLedger,
        tz: &Tz,
        today: NaiveDate,
    ) -> Self {
        // Tutorials missing from the catalog contribute nothing
        let total_time_spent = catalog
            .tutorials()
            .iter()
            .filter(|t| ledger.get(&t.id).is_some_and(ProgressRecord::is_completed))
            .map(|t| u64::from(t.duration_minutes()))
            .sum();

        Self {
            completed_count: ledger.completed().count(),
            in_progress_count: ledger.in_progress().count(),
            total_time_spent,
            current_streak: current_streak(ledger, tz, today),
        }
    }

    /// Time spent formatted as hours and minutes, e.g. "4h 5m"
    pub fn time_spent_display(&self) -> String {
        format!("{}h {}m", self.total_time_spent / 60, self.total_time_spent % 60)
    }
}

/// Activity-day count used as the "current streak".
///
/// Counts distinct calendar days (in `tz`) with at least one completion, provided
/// today or yesterday is one of them. This is not a consecutive-day count.
pub fn current_streak<Tz: TimeZone>(ledger: &ProgressLedger, tz: &Tz, today: NaiveDate) -> usize {
    let days: BTreeSet<NaiveDate> = ledger
        .completed()
        .filter_map(|r| r.completed_at)
        .map(|at| at.with_timezone(tz).date_naive())
        .collect();

    let yesterday = today.pred_opt();
    let recent = days.contains(&today) || yesterday.is_some_and(|d| days.contains(&d));

    if recent { days.len() } else { 0 }
}

/// In-progress tutorials paired with their records, most recently started first.
///
/// Records pointing at tutorials missing from the catalog are skipped.
pub fn continue_learning<'a>(
    catalog: &'a Catalog,
    ledger: &'a ProgressLedger,
) -> Vec<(&'a Tutorial, &'a ProgressRecord)> {
    let mut entries: Vec<_> = ledger
        .in_progress()
        .filter_map(|record| catalog.tutorial(&record.tutorial_id).map(|t| (t, record)))
        .collect();

    entries.sort_by(|(_, a), (_, b)| b.started_at.cmp(&a.started_at));
    entries
}
