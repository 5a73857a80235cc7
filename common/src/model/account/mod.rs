//! Account models and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Amount;
#[cfg(feature = "utoipa")]
use crate::utoipa::ToSchema;

/// Account model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct Account {
    /// Unique account ID, monotonically assigned, never reused
    pub id: i64,
    /// Display name of the account holder
    pub name: String,
    /// Globally unique account number
    pub number: String,
    /// Current balance
    pub balance: Amount,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating an account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct NewAccount {
    /// Display name of the account holder
    pub name: String,
    /// Globally unique account number
    pub number: String,
    /// Opening balance
    pub balance: Amount,
}

/// Partial update of an account; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct AccountChanges {
    /// New display name
    pub name: Option<String>,
    /// New account number
    pub number: Option<String>,
    /// New balance
    pub balance: Option<Amount>,
}

impl AccountChanges {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.number.is_none() && self.balance.is_none()
    }
}
