//! Concurrent balance aggregation over paginated account reads
//!
//! The engine walks the account table in fixed-size pages, sums each page's
//! balances as an independent unit of work, and reduces the per-batch sums
//! into a grand total. Two scheduling modes share one observable contract:
//! a fixed pool of blocking workers, and cooperative tasks behind a
//! semaphore gate.

mod batch;
mod cursor;
pub mod engine;
pub mod reader;

pub use batch::sum_batch;
pub use engine::{AggregateResult, AggregatorConfig, BalanceAggregator, SchedulingMode};
pub use reader::AccountPageReader;
