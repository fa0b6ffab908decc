pub mod differ;
pub mod worker;

pub use differ::{compare, Comparison, ComparisonStats, Mode};
pub use worker::{run_comparison, ComparisonOutcome, ComparisonRequest, ComparisonWorker, PendingComparison, POLL_INTERVAL};
