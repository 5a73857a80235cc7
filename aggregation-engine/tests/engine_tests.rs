use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::decimal::{dec, Amount};
use common::error::{Error, Result};
use common::model::account::Account;
use rust_decimal::Decimal;

use aggregation_engine::{
    AccountPageReader, AggregatorConfig, BalanceAggregator, SchedulingMode,
};

/// Reader backed by a fixed account list, with optional injected read
/// failure at a specific offset.
struct StubReader {
    accounts: Vec<Account>,
    fail_at_offset: Option<u64>,
    fetch_calls: AtomicUsize,
}

impl StubReader {
    fn new(accounts: Vec<Account>) -> Self {
        Self {
            accounts,
            fail_at_offset: None,
            fetch_calls: AtomicUsize::new(0),
        }
    }

    fn failing_at(accounts: Vec<Account>, offset: u64) -> Self {
        Self {
            fail_at_offset: Some(offset),
            ..Self::new(accounts)
        }
    }

    fn calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountPageReader for StubReader {
    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<Vec<Account>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_at_offset == Some(offset) {
            return Err(Error::Internal("injected read failure".to_string()));
        }
        let start = (offset as usize).min(self.accounts.len());
        let end = (start + limit as usize).min(self.accounts.len());
        Ok(self.accounts[start..end].to_vec())
    }
}

fn account(id: i64, balance: Amount) -> Account {
    Account {
        id,
        name: format!("User{}", id),
        number: format!("U{:03}", id),
        balance,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Accounts with balances 10, 20, ..., n * 10
fn tens(n: i64) -> Vec<Account> {
    (1..=n).map(|i| account(i, Amount::from(i * 10))).collect()
}

fn aggregator(reader: &Arc<StubReader>, page_size: u64, max_workers: usize) -> BalanceAggregator {
    BalanceAggregator::new(
        reader.clone() as Arc<dyn AccountPageReader>,
        AggregatorConfig::new(page_size, max_workers),
    )
}

const BOTH_MODES: [SchedulingMode; 2] = [SchedulingMode::WorkerPool, SchedulingMode::Cooperative];

#[tokio::test]
async fn seven_accounts_page_three() {
    // Balances 10..70, pages of 3 -> batches [3, 3, 1], total 280.
    for mode in BOTH_MODES {
        let reader = Arc::new(StubReader::new(tens(7)));
        let result = aggregator(&reader, 3, 3).aggregate(mode).await.unwrap();

        assert_eq!(result.total, dec!(280));
        assert_eq!(result.batch_count, 3);
        assert_eq!(result.per_batch_sums.len(), 3);

        // Per-batch sums arrive in completion order; compare as a multiset.
        let mut sums = result.per_batch_sums.clone();
        sums.sort();
        assert_eq!(sums, vec![dec!(60), dec!(70), dec!(150)]);
    }
}

#[tokio::test]
async fn five_accounts_page_two_workers_two() {
    for mode in BOTH_MODES {
        let reader = Arc::new(StubReader::new(tens(5)));
        let result = aggregator(&reader, 2, 2).aggregate(mode).await.unwrap();

        assert_eq!(result.total, dec!(150));
        assert_eq!(result.batch_count, 3);
    }
}

#[tokio::test]
async fn total_is_invariant_across_page_size_and_concurrency() {
    let expected: Amount = (1..=23).map(|i| Amount::from(i * 10)).sum();

    for mode in BOTH_MODES {
        for page_size in [1u64, 4, 10, 23, 50] {
            for max_workers in [1usize, 2, 8] {
                let reader = Arc::new(StubReader::new(tens(23)));
                let result = aggregator(&reader, page_size, max_workers)
                    .aggregate(mode)
                    .await
                    .unwrap();

                assert_eq!(result.total, expected, "mode={:?} page_size={} workers={}", mode, page_size, max_workers);
                let pages = (23 + page_size - 1) / page_size;
                assert_eq!(result.batch_count as u64, pages);
            }
        }
    }
}

#[tokio::test]
async fn zero_accounts_yield_empty_result() {
    for mode in BOTH_MODES {
        let reader = Arc::new(StubReader::new(Vec::new()));
        let result = aggregator(&reader, 10, 4).aggregate(mode).await.unwrap();

        assert!(result.per_batch_sums.is_empty());
        assert_eq!(result.total, Amount::ZERO);
        assert_eq!(result.batch_count, 0);
        // One probe fetch, nothing dispatched.
        assert_eq!(reader.calls(), 1);
    }
}

#[tokio::test]
async fn exact_page_multiple_has_no_spurious_batch() {
    for mode in BOTH_MODES {
        let reader = Arc::new(StubReader::new(tens(6)));
        let result = aggregator(&reader, 3, 4).aggregate(mode).await.unwrap();

        assert_eq!(result.batch_count, 2);
        assert_eq!(result.total, dec!(210));
        // Two full pages plus the empty terminating fetch.
        assert_eq!(reader.calls(), 3);
    }
}

#[tokio::test]
async fn repeated_runs_agree_on_total() {
    for mode in BOTH_MODES {
        let reader = Arc::new(StubReader::new(tens(12)));
        let agg = aggregator(&reader, 5, 3);

        let first = agg.aggregate(mode).await.unwrap();
        let second = agg.aggregate(mode).await.unwrap();

        assert_eq!(first.total, second.total);
        assert_eq!(first.batch_count, second.batch_count);
    }
}

#[tokio::test]
async fn overflowing_batch_is_excluded_not_fatal() {
    // Page 2 (ids 4..6) overflows during summation; the run degrades to a
    // partial total over the other batches.
    let balances = [
        dec!(10),
        dec!(20),
        dec!(30),
        Decimal::MAX,
        Decimal::MAX,
        dec!(60),
        dec!(70),
    ];

    for mode in BOTH_MODES {
        let accounts = balances
            .iter()
            .enumerate()
            .map(|(i, b)| account(i as i64 + 1, *b))
            .collect();
        let reader = Arc::new(StubReader::new(accounts));
        let result = aggregator(&reader, 3, 2).aggregate(mode).await.unwrap();

        assert_eq!(result.batch_count, 2);
        assert_eq!(result.total, dec!(130)); // 60 from page 1, 70 from page 3
        let mut sums = result.per_batch_sums.clone();
        sums.sort();
        assert_eq!(sums, vec![dec!(60), dec!(70)]);
    }
}

#[tokio::test]
async fn first_page_read_failure_fails_the_call() {
    for mode in BOTH_MODES {
        let reader = Arc::new(StubReader::failing_at(tens(7), 0));
        let result = aggregator(&reader, 3, 2).aggregate(mode).await;
        assert!(result.is_err());
    }
}

#[tokio::test]
async fn later_read_failure_yields_partial_result() {
    // The fetch at offset 3 fails; only the first page is aggregated.
    for mode in BOTH_MODES {
        let reader = Arc::new(StubReader::failing_at(tens(7), 3));
        let result = aggregator(&reader, 3, 2).aggregate(mode).await.unwrap();

        assert_eq!(result.batch_count, 1);
        assert_eq!(result.total, dec!(60));
    }
}
