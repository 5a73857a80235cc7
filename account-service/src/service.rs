//! Account service implementation

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::decimal::precision;
use common::error::{Error, Result, ErrorExt};
use common::model::account::{Account, AccountChanges, NewAccount};
use tracing::{debug, info};

use aggregation_engine::AccountPageReader;

use crate::notifier::{AccountNotifier, LogNotifier};
use crate::repository::{AccountRepository, InMemoryAccountRepository, PostgresAccountRepository};

/// Largest page a list call will return
const MAX_LIST_LIMIT: u64 = 1000;

/// Account service providing validated CRUD over a repository
pub struct AccountService {
    /// Repository for account data
    repo: Arc<dyn AccountRepository>,
    /// Notification port, fired after successful creates
    notifier: Arc<dyn AccountNotifier>,
}

/// Repository Type
pub enum RepositoryType {
    /// In-memory repository
    InMemory,
    /// PostgreSQL repository
    Postgres(Option<String>),
}

impl AccountService {
    /// Create a new account service over an in-memory repository
    pub fn new() -> Self {
        Self {
            repo: Arc::new(InMemoryAccountRepository::new()),
            notifier: Arc::new(LogNotifier),
        }
    }

    /// Create a new account service with a specific repository type
    pub async fn with_repository(repo_type: RepositoryType) -> Result<Self> {
        let repo: Arc<dyn AccountRepository> = match repo_type {
            RepositoryType::InMemory => Arc::new(InMemoryAccountRepository::new()),
            RepositoryType::Postgres(database_url) => {
                Arc::new(PostgresAccountRepository::new(database_url).await?)
            }
        };

        Ok(Self {
            repo,
            notifier: Arc::new(LogNotifier),
        })
    }

    /// Create a new account service with a configuration
    pub async fn with_config(config: &crate::config::AccountServiceConfig) -> Result<Self> {
        let repo: Arc<dyn AccountRepository> =
            Arc::new(PostgresAccountRepository::with_config(config).await?);

        Ok(Self {
            repo,
            notifier: Arc::new(LogNotifier),
        })
    }

    /// Replace the notification port
    pub fn with_notifier(mut self, notifier: Arc<dyn AccountNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Create a new account.
    ///
    /// Validates the name and number, enforces number uniqueness, rounds
    /// the opening balance to storage precision, and fires the
    /// account-created notification (fire-and-forget).
    pub async fn create_account(&self, new: NewAccount) -> Result<Account> {
        let name = required_field("name", &new.name)?;
        let number = required_field("number", &new.number)?;

        if self.repo.account_by_number(&number).await?.is_some() {
            return Err(Error::DuplicateAccountNumber(format!(
                "Account with number {} already exists",
                number
            )));
        }

        let account = self
            .repo
            .insert_account(NewAccount {
                name,
                number,
                balance: precision::round_balance(new.balance),
            })
            .await?;

        info!(
            "Created account id={} number={}",
            account.id, account.number
        );

        self.notifier.account_created(&account);

        Ok(account)
    }

    /// Get an account by ID
    pub async fn account(&self, id: i64) -> Result<Account> {
        self.repo
            .account_by_id(id)
            .await?
            .ok_or_else(|| Error::AccountNotFound(format!("Account id={} not found", id)))
    }

    /// Get an account by its unique number
    pub async fn account_by_number(&self, number: &str) -> Result<Account> {
        let number = number.trim();
        self.repo
            .account_by_number(number)
            .await?
            .ok_or_else(|| Error::AccountNotFound(format!("Account number={} not found", number)))
    }

    /// List accounts ordered by id ascending.
    ///
    /// The limit is clamped to 1..=1000; the offset is taken as-is.
    pub async fn list_accounts(&self, limit: u64, offset: u64) -> Result<Vec<Account>> {
        let limit = limit.clamp(1, MAX_LIST_LIMIT);
        let accounts = self.repo.list_accounts(offset, limit).await?;
        debug!(
            "Listed accounts limit={} offset={} returned={}",
            limit,
            offset,
            accounts.len()
        );
        Ok(accounts)
    }

    /// Apply a partial update to an account.
    ///
    /// Re-validates changed fields and re-checks number uniqueness when
    /// the number changes.
    pub async fn update_account(&self, id: i64, changes: AccountChanges) -> Result<Account> {
        if changes.is_empty() {
            return Err(Error::ValidationError("No changes provided".to_string()));
        }

        let mut account = self.account(id).await?;

        if let Some(ref number) = changes.number {
            let number = required_field("number", number)?;
            if number != account.number {
                if self.repo.account_by_number(&number).await?.is_some() {
                    return Err(Error::DuplicateAccountNumber(format!(
                        "Account number {} already in use",
                        number
                    )));
                }
                account.number = number;
            }
        }

        if let Some(ref name) = changes.name {
            account.name = required_field("name", name)?;
        }

        if let Some(balance) = changes.balance {
            account.balance = precision::round_balance(balance);
        }

        account.updated_at = Utc::now();

        let account = self
            .repo
            .update_account(account)
            .await
            .with_context(|| format!("Failed to update account id={}", id))?;

        info!("Updated account id={}", account.id);
        Ok(account)
    }

    /// Delete an account by id
    pub async fn delete_account(&self, id: i64) -> Result<()> {
        if !self.repo.delete_account(id).await? {
            return Err(Error::AccountNotFound(format!(
                "Account id={} not found",
                id
            )));
        }
        info!("Deleted account id={}", id);
        Ok(())
    }
}

impl Default for AccountService {
    fn default() -> Self {
        Self::new()
    }
}

/// The service is the paginated account source for the aggregation
/// engine; page reads go straight to the repository without the list
/// clamp so the engine's configured page size passes through.
#[async_trait]
impl AccountPageReader for AccountService {
    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<Vec<Account>> {
        self.repo.list_accounts(offset, limit).await
    }
}

fn required_field(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::ValidationError(format!(
            "{} must be a non-empty string",
            field
        )));
    }
    Ok(value.to_string())
}
