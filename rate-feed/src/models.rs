//! Rate sheet models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

/// A snapshot of product interest rates and where it came from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct RateSheet {
    /// Source the sheet was fetched from, or "fallback"
    pub source: String,
    /// Product name to display rate (e.g. "savings" -> "0.50%")
    pub rates: BTreeMap<String, String>,
}

impl RateSheet {
    /// Built-in rates used when no source is configured or reachable
    pub fn fallback() -> Self {
        let mut rates = BTreeMap::new();
        rates.insert("savings".to_string(), "0.50%".to_string());
        rates.insert("checking".to_string(), "0.10%".to_string());
        rates.insert("term_deposit".to_string(), "1.25%".to_string());

        Self {
            source: "fallback".to_string(),
            rates,
        }
    }

    /// Sheet fetched from a remote source
    pub fn from_source(source: impl Into<String>, rates: BTreeMap<String, String>) -> Self {
        Self {
            source: source.into(),
            rates,
        }
    }
}
