//! Batch summation

use common::decimal::Amount;
use common::error::{Error, Result};
use common::model::account::Account;

/// Sum the balances of one batch of accounts.
///
/// Pure function with exact decimal arithmetic; addition is associative and
/// commutative, so batch sums may be reduced in any order. The only failure
/// mode is decimal overflow, reported as [`Error::BalanceOverflow`].
pub fn sum_batch(accounts: &[Account]) -> Result<Amount> {
    let mut total = Amount::ZERO;
    for account in accounts {
        total = total.checked_add(account.balance).ok_or_else(|| {
            Error::BalanceOverflow(format!(
                "adding balance of account {} overflowed",
                account.id
            ))
        })?;
    }
    Ok(total)
}
