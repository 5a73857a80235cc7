//! Paginated account reader port

use async_trait::async_trait;
use common::error::Result;
use common::model::account::Account;

/// Source of account pages for the aggregation engine.
///
/// Implementations must return accounts ordered by `id` ascending,
/// deterministically for a fixed `offset`/`limit` pair absent concurrent
/// mutation. A page shorter than `limit` marks the end of the data; there
/// is no separate end-of-data flag.
///
/// The engine calls `fetch_page` from several tasks at once, so
/// implementations must be safe for concurrent read access (a pooled
/// database connection or a lock-free map both qualify).
#[async_trait]
pub trait AccountPageReader: Send + Sync {
    /// Fetch up to `limit` accounts starting at `offset`, id ascending.
    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<Vec<Account>>;
}
