//! The balance aggregation engine and its two scheduling modes

use std::str::FromStr;
use std::sync::Arc;

use common::decimal::Amount;
use common::error::{Error, Result};
use common::model::account::Account;
use serde::Serialize;
use tokio::sync::{mpsc, Semaphore};
use tracing::{error, info, warn};

use crate::batch::sum_batch;
use crate::cursor::PageCursor;
use crate::reader::AccountPageReader;

/// Result of one aggregation run, immutable once constructed.
///
/// `per_batch_sums` is in completion order, not page order; callers must
/// not rely on any ordering. Decimals stay exact here and are converted to
/// a JSON representation only when the result is serialized.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateResult {
    /// One sum per successfully completed batch, in completion order
    pub per_batch_sums: Vec<Amount>,
    /// Sum of all successful batch sums
    pub total: Amount,
    /// Number of successfully completed batches
    pub batch_count: usize,
}

impl AggregateResult {
    fn empty() -> Self {
        Self {
            per_batch_sums: Vec::new(),
            total: Amount::ZERO,
            batch_count: 0,
        }
    }

    fn from_sums(per_batch_sums: Vec<Amount>) -> Result<Self> {
        let mut total = Amount::ZERO;
        for sum in &per_batch_sums {
            total = total
                .checked_add(*sum)
                .ok_or_else(|| Error::BalanceOverflow("grand total overflowed".to_string()))?;
        }
        let batch_count = per_batch_sums.len();
        Ok(Self {
            per_batch_sums,
            total,
            batch_count,
        })
    }
}

/// How summation units are scheduled. Both modes produce the same
/// observable result for the same underlying data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulingMode {
    /// Fetch every page first, then fan out over a fixed pool of
    /// blocking workers
    #[default]
    WorkerPool,
    /// Pipeline fetch and summation as cooperative tasks behind a
    /// semaphore gate
    Cooperative,
}

impl FromStr for SchedulingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pool" | "workers" => Ok(Self::WorkerPool),
            "tasks" | "cooperative" => Ok(Self::Cooperative),
            other => Err(Error::ValidationError(format!(
                "unknown scheduling mode: {} (expected pool or tasks)",
                other
            ))),
        }
    }
}

/// Aggregation tuning knobs
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Accounts per page
    pub page_size: u64,
    /// Hard cap on simultaneously executing summation units
    pub max_workers: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            max_workers: 4,
        }
    }
}

impl AggregatorConfig {
    /// Create a config; both knobs are clamped to at least 1.
    pub fn new(page_size: u64, max_workers: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            max_workers: max_workers.max(1),
        }
    }
}

/// Aggregates account balances across paginated reads.
///
/// The reader is shared read-only across all concurrent units; the only
/// shared mutable state is the result channel. A failed unit of work is
/// logged and excluded from the result rather than aborting the run; only
/// a failure to fetch the very first page fails the whole call.
pub struct BalanceAggregator {
    reader: Arc<dyn AccountPageReader>,
    config: AggregatorConfig,
}

impl BalanceAggregator {
    /// Create an aggregator over the given reader
    pub fn new(reader: Arc<dyn AccountPageReader>, config: AggregatorConfig) -> Self {
        Self { reader, config }
    }

    /// Run one aggregation pass with the given scheduling mode.
    pub async fn aggregate(&self, mode: SchedulingMode) -> Result<AggregateResult> {
        info!(
            "Aggregating balances: mode={:?} page_size={} max_workers={}",
            mode, self.config.page_size, self.config.max_workers
        );

        let result = match mode {
            SchedulingMode::WorkerPool => self.aggregate_worker_pool().await?,
            SchedulingMode::Cooperative => self.aggregate_cooperative().await?,
        };

        info!(
            "Aggregation finished: {} batches, total {}",
            result.batch_count, result.total
        );
        Ok(result)
    }

    /// Fetch every page up front. Pagination is sequential by nature: the
    /// next offset is only known once the previous page's length is.
    ///
    /// A read failure on the first page propagates; a later failure stops
    /// pagination and the pages already fetched are aggregated.
    async fn collect_pages(&self) -> Result<Vec<Vec<Account>>> {
        let mut cursor = PageCursor::new(self.config.page_size);
        let mut pages: Vec<Vec<Account>> = Vec::new();

        loop {
            match cursor.next_page(self.reader.as_ref()).await {
                Ok(Some(page)) => pages.push(page),
                Ok(None) => break,
                Err(e) if pages.is_empty() => return Err(e),
                Err(e) => {
                    warn!(
                        "Page fetch at offset {} failed, aggregating {} fetched pages: {}",
                        cursor.offset(),
                        pages.len(),
                        e
                    );
                    break;
                }
            }
        }

        Ok(pages)
    }

    /// Fetch-all-then-fan-out: the page list is consumed by a fixed pool
    /// of blocking workers; a collector gathers sums as they complete.
    async fn aggregate_worker_pool(&self) -> Result<AggregateResult> {
        let pages = self.collect_pages().await?;
        if pages.is_empty() {
            return Ok(AggregateResult::empty());
        }

        let workers = self.config.max_workers.min(pages.len()).max(1);
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<Vec<Account>>();
        let (sum_tx, sum_rx) = crossbeam_channel::unbounded::<Result<Amount>>();

        for page in pages {
            // Receiver is still in scope, the send cannot fail.
            let _ = job_tx.send(page);
        }
        drop(job_tx);

        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let jobs = job_rx.clone();
            let sums = sum_tx.clone();
            handles.push(tokio::task::spawn_blocking(move || {
                while let Ok(page) = jobs.recv() {
                    if sums.send(sum_batch(&page)).is_err() {
                        break;
                    }
                }
            }));
        }
        drop(sum_tx);

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Summation worker aborted: {}", e);
            }
        }

        // All workers are done; the channel holds every result in
        // completion order.
        let mut sums = Vec::new();
        for result in sum_rx.try_iter() {
            match result {
                Ok(sum) => sums.push(sum),
                Err(e) => warn!("Batch summation failed, excluding batch: {}", e),
            }
        }

        AggregateResult::from_sums(sums)
    }

    /// Pipelined fetch-and-sum: each page's summation is spawned as soon
    /// as the page arrives, while the driver fetches the next page. The
    /// semaphore permit spans the whole fetch+sum pipeline, so at most
    /// `max_workers` pipelines are active at once.
    ///
    /// Fetches themselves never overlap (the cursor is sequential); that
    /// is the throughput bottleneck of this mode, not a correctness
    /// concern.
    async fn aggregate_cooperative(&self) -> Result<AggregateResult> {
        let gate = Arc::new(Semaphore::new(self.config.max_workers.max(1)));
        let (sum_tx, mut sum_rx) = mpsc::unbounded_channel::<Result<Amount>>();
        let mut cursor = PageCursor::new(self.config.page_size);
        let mut dispatched = 0usize;

        loop {
            let permit = gate
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| Error::Internal("concurrency gate closed".to_string()))?;

            let page = match cursor.next_page(self.reader.as_ref()).await {
                Ok(Some(page)) => page,
                Ok(None) => break,
                Err(e) if dispatched == 0 => return Err(e),
                Err(e) => {
                    warn!(
                        "Page fetch at offset {} failed, aggregating {} dispatched batches: {}",
                        cursor.offset(),
                        dispatched,
                        e
                    );
                    break;
                }
            };

            let sums = sum_tx.clone();
            tokio::spawn(async move {
                let result = sum_batch(&page);
                let _ = sums.send(result);
                drop(permit);
            });
            dispatched += 1;
        }
        drop(sum_tx);

        if dispatched == 0 {
            return Ok(AggregateResult::empty());
        }

        let mut sums = Vec::with_capacity(dispatched);
        while let Some(result) = sum_rx.recv().await {
            match result {
                Ok(sum) => sums.push(sum),
                Err(e) => warn!("Batch summation failed, excluding batch: {}", e),
            }
        }

        AggregateResult::from_sums(sums)
    }
}
