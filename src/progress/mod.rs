//! Per-user learning progress
//!
//! Records, the ledger snapshot they live in, and the statistics derived from them.

pub mod ledger;
pub mod model;
pub mod stats;

pub use ledger::ProgressLedger;
pub use model::{ProgressRecord, ProgressStatus};
pub use stats::{Stats, continue_learning, current_streak};
