//! Decimal type utilities for precise monetary calculations

use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;

/// Monetary amount with high precision
pub type Amount = Decimal;

/// Precision helpers for common operations
pub mod precision {
    use super::*;

    /// Balance precision at the storage boundary (4 decimal places)
    pub const BALANCE_PRECISION: u32 = 4;

    /// Round a balance to storage precision
    pub fn round_balance(amount: Amount) -> Amount {
        amount.round_dp(BALANCE_PRECISION)
    }
}
