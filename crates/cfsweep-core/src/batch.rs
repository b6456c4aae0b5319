//! Bounded-concurrency batch execution.
//!
//! Work items are partitioned into contiguous batches of at most
//! `batch_size` (a collaborator constraint — the API's own per-request
//! limit, not a tunable). Each batch runs as its own concurrent task;
//! items within a batch are processed sequentially, so total concurrency is
//! capped at `ceil(len / batch_size)`. The executor joins every batch before
//! returning — it never reports partial results while work is outstanding.
//!
//! Accumulation is message-passing: each batch task builds its own
//! [`BatchReport`] and the reports are merged after the join. There is no
//! shared mutable state and no lock, so counts cannot race or double-count.
//! Nothing is retried; a failed item records a warning and the run continues
//! with the remaining items in its batch and in sibling batches.

use std::future::Future;

use futures::future::join_all;

use crate::types::Summary;

/// Per-run accumulation of item outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Items that succeeded.
    pub success: usize,
    /// Items that failed.
    pub failure: usize,
    /// One warning per failed item, in completion order within a batch.
    pub warnings: Vec<String>,
}

impl BatchReport {
    /// Record one successful item.
    pub fn record_success(&mut self) {
        self.success += 1;
    }

    /// Record one failed item with its warning.
    pub fn record_failure(&mut self, warning: impl Into<String>) {
        self.failure += 1;
        self.warnings.push(warning.into());
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: Self) {
        self.success += other.success;
        self.failure += other.failure;
        self.warnings.extend(other.warnings);
    }

    /// Total items attempted.
    #[must_use]
    pub const fn attempted(&self) -> usize {
        self.success + self.failure
    }

    /// The success/failure counts without the warnings.
    #[must_use]
    pub const fn summary(&self) -> Summary {
        Summary {
            success: self.success,
            failure: self.failure,
        }
    }
}

/// Split `items` into contiguous chunks of at most `size` elements,
/// preserving order. A `size` of zero is clamped to one.
#[must_use]
pub fn chunked<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut chunks = Vec::with_capacity(items.len().div_ceil(size));
    let mut iter = items.into_iter();
    loop {
        let chunk: Vec<T> = iter.by_ref().take(size).collect();
        if chunk.is_empty() {
            return chunks;
        }
        chunks.push(chunk);
    }
}

/// Run `worker` over every item, one concurrent task per batch of
/// `batch_size` items, and merge the per-batch reports.
///
/// The worker reports a failure by returning `Err` with the warning to
/// record. Batches complete in no particular order relative to each other;
/// the returned report reflects every item exactly once.
pub async fn run_batches<T, F, Fut>(items: Vec<T>, batch_size: usize, worker: F) -> BatchReport
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = std::result::Result<(), String>>,
{
    let worker = &worker;
    let batches = chunked(items, batch_size).into_iter().map(|batch| async move {
        let mut report = BatchReport::default();
        for item in batch {
            match worker(item).await {
                Ok(()) => report.record_success(),
                Err(warning) => report.record_failure(warning),
            }
        }
        report
    });

    join_all(batches)
        .await
        .into_iter()
        .fold(BatchReport::default(), |mut merged, report| {
            merged.merge(report);
            merged
        })
}
