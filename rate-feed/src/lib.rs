//! Best-effort interest-rate feed
//!
//! Fetches a published rate sheet from a configurable source and falls
//! back to built-in rates whenever the source is missing or unreachable.
//! The feed never fails its callers.

pub mod models;
pub mod service;

pub use models::RateSheet;
pub use service::RateFeedService;
