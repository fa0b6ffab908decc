use crate::accounts::Whitelist;
use crate::compare::differ::{compare, Comparison, ComparisonStats, Mode};
use crate::error::{FollowDiffError, Result};
use crate::extractor::{AccountExtractor, Extraction};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// How often a waiting caller checks for the finished comparison.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct ComparisonRequest {
    pub followers: PathBuf,
    pub following: PathBuf,
    pub mode: Mode,
    pub whitelist: Whitelist,
}

#[derive(Debug)]
pub struct ComparisonOutcome {
    pub followers: Extraction,
    pub following: Extraction,
    pub comparison: Comparison,
    pub elapsed: Duration,
}

impl ComparisonOutcome {
    pub fn stats(&self) -> ComparisonStats {
        self.comparison
            .stats(self.followers.len(), self.following.len())
    }

    /// Per-file failures; the comparison used an empty set for each of these.
    pub fn errors(&self) -> impl Iterator<Item = &FollowDiffError> {
        [&self.followers, &self.following]
            .into_iter()
            .filter_map(Extraction::error)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

/// Extract both files and diff them. A file that fails to extract
/// contributes an empty set.
pub fn run_comparison(request: &ComparisonRequest, extractor: &AccountExtractor) -> ComparisonOutcome {
    let start_time = Instant::now();

    let followers = extractor.extract_file(&request.followers);
    let following = extractor.extract_file(&request.following);

    let empty = Whitelist::new();
    let comparison = compare(
        followers.accounts().unwrap_or(&empty),
        following.accounts().unwrap_or(&empty),
        request.mode,
        &request.whitelist,
    );

    let elapsed = start_time.elapsed();
    info!(
        action = "compared",
        component = "comparison",
        mode = request.mode.name(),
        result_count = comparison.results.len(),
        mutuals = comparison.mutuals,
        elapsed_ms = elapsed.as_millis() as u64,
        "Comparison finished"
    );

    ComparisonOutcome {
        followers,
        following,
        comparison,
        elapsed,
    }
}

/// Runs comparisons on the blocking pool, one at a time.
pub struct ComparisonWorker {
    extractor: Arc<AccountExtractor>,
    in_flight: Arc<AtomicBool>,
}

impl ComparisonWorker {
    pub fn new(extractor: AccountExtractor) -> Self {
        Self {
            extractor: Arc::new(extractor),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn extractor(&self) -> &AccountExtractor {
        &self.extractor
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Dispatch a comparison. Must be called from within a tokio runtime.
    pub fn start(&self, request: ComparisonRequest) -> Result<PendingComparison> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| FollowDiffError::Worker {
            message: format!("No async runtime available: {}", e),
        })?;

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(FollowDiffError::ComparisonInProgress);
        }
        let guard = InFlightGuard {
            flag: self.in_flight.clone(),
        };

        let (sender, receiver) = mpsc::channel();
        let extractor = self.extractor.clone();

        debug!(action = "dispatch", component = "comparison", mode = request.mode.name(), "Starting background comparison");
        runtime.spawn_blocking(move || {
            let outcome = run_comparison(&request, &extractor);
            // The receiver is gone only if the caller stopped waiting.
            let _ = sender.send(outcome);
        });

        Ok(PendingComparison {
            receiver,
            _guard: guard,
        })
    }
}

struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Handle to a comparison running in the background. Dropping it releases
/// the worker for the next request.
pub struct PendingComparison {
    receiver: Receiver<ComparisonOutcome>,
    _guard: InFlightGuard,
}

impl PendingComparison {
    /// Non-blocking check for the outcome.
    pub fn try_take(&self) -> Result<Option<ComparisonOutcome>> {
        match self.receiver.try_recv() {
            Ok(outcome) => Ok(Some(outcome)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(FollowDiffError::Worker {
                message: "comparison stopped before producing a result".to_string(),
            }),
        }
    }

    /// Poll every `interval` until the outcome arrives. `on_tick` runs on
    /// each empty poll; returning an error stops waiting.
    pub async fn wait<F>(self, interval: Duration, mut on_tick: F) -> Result<ComparisonOutcome>
    where
        F: FnMut() -> Result<()>,
    {
        loop {
            if let Some(outcome) = self.try_take()? {
                return Ok(outcome);
            }
            on_tick()?;
            tokio::time::sleep(interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::DEFAULT_PROFILE_HOST;
    use std::fs;
    use tempfile::TempDir;

    fn extractor() -> AccountExtractor {
        AccountExtractor::new(DEFAULT_PROFILE_HOST).unwrap()
    }

    fn fixture(dir: &TempDir) -> ComparisonRequest {
        let followers = dir.path().join("followers_1.json");
        let following = dir.path().join("following.html");
        fs::write(
            &followers,
            r#"[{"string_list_data":[{"value":"a"}]},{"string_list_data":[{"value":"b"}]},{"string_list_data":[{"value":"c"}]}]"#,
        )
        .unwrap();
        fs::write(
            &following,
            r#"<a href="https://www.instagram.com/b/">b</a>
               <a href="https://www.instagram.com/_u/c/">c</a>
               <a href="https://www.instagram.com/d/">d</a>"#,
        )
        .unwrap();

        ComparisonRequest {
            followers,
            following,
            mode: Mode::Unfollowers,
            whitelist: Whitelist::new(),
        }
    }

    #[test]
    fn test_run_comparison_across_formats() {
        let dir = TempDir::new().unwrap();
        let mut request = fixture(&dir);

        let outcome = run_comparison(&request, &extractor());
        assert_eq!(outcome.comparison.results, vec!["d"]);
        assert!(!outcome.has_errors());
        assert_eq!(
            outcome.stats(),
            ComparisonStats {
                mode: Mode::Unfollowers,
                followers: 3,
                following: 3,
                mutuals: 2,
                results: 1,
            }
        );

        request.mode = Mode::Fans;
        request.whitelist = ["d"].into_iter().collect();
        let outcome = run_comparison(&request, &extractor());
        assert_eq!(outcome.comparison.results, vec!["a"]);
    }

    #[test]
    fn test_failed_file_counts_as_empty() {
        let dir = TempDir::new().unwrap();
        let mut request = fixture(&dir);
        fs::write(&request.followers, r#""not a list""#).unwrap();

        let outcome = run_comparison(&request, &extractor());
        assert!(outcome.has_errors());
        assert_eq!(outcome.stats().followers, 0);
        assert_eq!(outcome.comparison.results, vec!["b", "c", "d"]);

        request.followers = dir.path().join("missing.json");
        let outcome = run_comparison(&request, &extractor());
        assert!(matches!(
            outcome.errors().next(),
            Some(FollowDiffError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_background_comparison() {
        let dir = TempDir::new().unwrap();
        let worker = ComparisonWorker::new(extractor());

        let pending = worker.start(fixture(&dir)).unwrap();
        assert!(worker.is_busy());

        let mut ticks = 0;
        let outcome = pending
            .wait(Duration::from_millis(5), || {
                ticks += 1;
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(outcome.comparison.results, vec!["d"]);
        assert!(!worker.is_busy());
    }

    #[tokio::test]
    async fn test_single_comparison_in_flight() {
        let dir = TempDir::new().unwrap();
        let worker = ComparisonWorker::new(extractor());

        let first = worker.start(fixture(&dir)).unwrap();
        assert!(matches!(
            worker.start(fixture(&dir)),
            Err(FollowDiffError::ComparisonInProgress)
        ));

        first.wait(Duration::from_millis(5), || Ok(())).await.unwrap();
        let second = worker.start(fixture(&dir)).unwrap();
        second.wait(Duration::from_millis(5), || Ok(())).await.unwrap();
    }

    #[tokio::test]
    async fn test_tick_error_stops_waiting() {
        let dir = TempDir::new().unwrap();
        let worker = ComparisonWorker::new(extractor());

        let request = fixture(&dir);
        let pending = worker.start(request).unwrap();
        let result = pending
            .wait(Duration::from_millis(5), || Err(FollowDiffError::Cancelled))
            .await;
        // Either the outcome was already there on the first poll, or the tick cancelled.
        assert!(matches!(result, Ok(_) | Err(FollowDiffError::Cancelled)));
        assert!(!worker.is_busy());
    }

    #[test]
    fn test_start_outside_runtime() {
        let dir = TempDir::new().unwrap();
        let worker = ComparisonWorker::new(extractor());
        assert!(matches!(
            worker.start(fixture(&dir)),
            Err(FollowDiffError::Worker { .. })
        ));
        assert!(!worker.is_busy());
    }
}
