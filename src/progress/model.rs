//! Progress records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a user stands on a tutorial
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    /// No record exists; never stored
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    /// Ordering used when reconciling duplicate records
    fn rank(self) -> u8 {
        match self {
            ProgressStatus::NotStarted => 0,
            ProgressStatus::InProgress => 1,
            ProgressStatus::Completed => 2,
        }
    }
}

/// One user's relationship to one tutorial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Tutorial this record tracks
    pub tutorial_id: String,

    pub status: ProgressStatus,

    /// Percentage, 0-100
    pub progress: u8,

    /// When the user first started the tutorial
    pub started_at: DateTime<Utc>,

    /// Set only once the tutorial is completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProgressRecord {
    /// A freshly started record
    pub fn started(tutorial_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            tutorial_id: tutorial_id.into(),
            status: ProgressStatus::InProgress,
            progress: 0,
            started_at: now,
            completed_at: None,
        }
    }

    /// A completed record, carrying over the start time of `previous` when there is one
    pub fn completed(
        tutorial_id: impl Into<String>,
        previous: Option<&ProgressRecord>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            tutorial_id: tutorial_id.into(),
            status: ProgressStatus::Completed,
            progress: 100,
            started_at: previous.map_or(now, |p| p.started_at),
            completed_at: Some(now),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ProgressStatus::Completed
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == ProgressStatus::InProgress
    }

    /// Whether this record should win over `other` for the same tutorial
    pub(crate) fn supersedes(&self, other: &ProgressRecord) -> bool {
        let mine = (self.status.rank(), self.completed_at, self.started_at);
        let theirs = (other.status.rank(), other.completed_at, other.started_at);
        mine > theirs
    }

    /// Restore the status invariants on a record read from an external store
    pub(crate) fn normalized(mut self) -> Self {
        match self.status {
            ProgressStatus::Completed => {
                self.progress = 100;
                self.completed_at = Some(self.completed_at.unwrap_or(self.started_at));
            }
            _ => {
                self.progress = self.progress.min(100);
                self.completed_at = None;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, hour, 0, 0).unwrap()
    }

    #[test]
    fn started_record_is_in_progress_at_zero() {
        let record = ProgressRecord::started("t1", at(9));
        assert_eq!(record.status, ProgressStatus::InProgress);
        assert_eq!(record.progress, 0);
        assert_eq!(record.started_at, at(9));
        assert!(record.completed_at.is_none());
    }

    #[test]
    fn completing_keeps_original_start() {
        let started = ProgressRecord::started("t1", at(9));
        let completed = ProgressRecord::completed("t1", Some(&started), at(11));

        assert_eq!(completed.status, ProgressStatus::Completed);
        assert_eq!(completed.progress, 100);
        assert_eq!(completed.started_at, at(9));
        assert_eq!(completed.completed_at, Some(at(11)));
    }

    #[test]
    fn completing_without_start_uses_now_for_both() {
        let completed = ProgressRecord::completed("t1", None, at(11));
        assert_eq!(completed.started_at, at(11));
        assert_eq!(completed.completed_at, Some(at(11)));
    }

    #[test]
    fn completed_supersedes_in_progress() {
        let started = ProgressRecord::started("t1", at(12));
        let completed = ProgressRecord::completed("t1", None, at(10));
        assert!(completed.supersedes(&started));
        assert!(!started.supersedes(&completed));
    }

    #[test]
    fn normalization_restores_invariants() {
        let mut record = ProgressRecord::started("t1", at(9));
        record.status = ProgressStatus::Completed;
        record.progress = 40;

        let fixed = record.normalized();
        assert_eq!(fixed.progress, 100);
        assert_eq!(fixed.completed_at, Some(at(9)));

        let mut record = ProgressRecord::completed("t1", None, at(9));
        record.status = ProgressStatus::InProgress;
        let fixed = record.normalized();
        assert!(fixed.completed_at.is_none());
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&ProgressStatus::InProgress).unwrap(), "\"in_progress\"");
    }
}
