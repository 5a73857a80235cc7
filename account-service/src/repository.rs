//! Repository for account data

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use common::db::{self, DbPool};
use common::error::{Error, Result};
use common::model::account::{Account, NewAccount};
use dashmap::DashMap;
use sqlx::{postgres::PgPoolOptions, Row};
use tracing::{debug, info};

/// Account repository trait defining the interface for account data storage
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Persist a new account, assigning its id
    async fn insert_account(&self, new: NewAccount) -> Result<Account>;

    /// Get an account by ID
    async fn account_by_id(&self, id: i64) -> Result<Option<Account>>;

    /// Get an account by its unique number
    async fn account_by_number(&self, number: &str) -> Result<Option<Account>>;

    /// List accounts ordered by id ascending, starting at `offset`,
    /// at most `limit` rows
    async fn list_accounts(&self, offset: u64, limit: u64) -> Result<Vec<Account>>;

    /// Store the updated fields of an existing account
    async fn update_account(&self, account: Account) -> Result<Account>;

    /// Delete an account by id; returns whether it existed
    async fn delete_account(&self, id: i64) -> Result<bool>;
}

/// In-memory repository for account data
pub struct InMemoryAccountRepository {
    /// Accounts by ID
    pub accounts: DashMap<i64, Account>,
    /// Monotonic id source; ids are never reused
    next_id: AtomicI64,
}

impl InMemoryAccountRepository {
    /// Create a new in-memory account repository
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            next_id: AtomicI64::new(0),
        }
    }

    fn number_taken(&self, number: &str, excluding_id: Option<i64>) -> bool {
        self.accounts.iter().any(|entry| {
            entry.value().number == number && Some(entry.value().id) != excluding_id
        })
    }
}

impl Default for InMemoryAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn insert_account(&self, new: NewAccount) -> Result<Account> {
        if self.number_taken(&new.number, None) {
            return Err(Error::DuplicateAccountNumber(new.number));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let account = Account {
            id,
            name: new.name,
            number: new.number,
            balance: new.balance,
            created_at: now,
            updated_at: now,
        };

        self.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn account_by_id(&self, id: i64) -> Result<Option<Account>> {
        Ok(self.accounts.get(&id).map(|a| a.clone()))
    }

    async fn account_by_number(&self, number: &str) -> Result<Option<Account>> {
        let account = self
            .accounts
            .iter()
            .find(|entry| entry.value().number == number)
            .map(|entry| entry.value().clone());
        Ok(account)
    }

    async fn list_accounts(&self, offset: u64, limit: u64) -> Result<Vec<Account>> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        accounts.sort_by_key(|a| a.id);

        Ok(accounts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn update_account(&self, account: Account) -> Result<Account> {
        if !self.accounts.contains_key(&account.id) {
            return Err(Error::AccountNotFound(format!(
                "Account id={} not found",
                account.id
            )));
        }
        if self.number_taken(&account.number, Some(account.id)) {
            return Err(Error::DuplicateAccountNumber(account.number));
        }

        self.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn delete_account(&self, id: i64) -> Result<bool> {
        Ok(self.accounts.remove(&id).is_some())
    }
}

/// PostgreSQL repository for account data
pub struct PostgresAccountRepository {
    /// Database connection pool
    pool: DbPool,
}

impl PostgresAccountRepository {
    /// Create a new PostgreSQL account repository.
    ///
    /// Falls back to `DATABASE_URL` when no url is given; migrations run
    /// on startup so a fresh database is usable immediately.
    pub async fn new(database_url: Option<String>) -> Result<Self> {
        let pool = match database_url {
            Some(url) => PgPoolOptions::new()
                .max_connections(5)
                .connect(&url)
                .await
                .map_err(Error::Database)?,
            None => db::init_db_pool().await?,
        };

        info!("Connected to PostgreSQL database");
        db::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL account repository with configuration
    pub async fn with_config(config: &crate::config::AccountServiceConfig) -> Result<Self> {
        info!(
            "Connecting to PostgreSQL database with pool size: {}",
            config.db_pool_size
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.db_pool_size)
            .connect(&config.database_url)
            .await
            .map_err(Error::Database)?;

        info!("Connected to PostgreSQL database");
        db::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    fn map_unique_violation(number: &str, err: sqlx::Error) -> Error {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return Error::DuplicateAccountNumber(number.to_string());
            }
        }
        Error::Database(err)
    }

    fn row_to_account(row: &sqlx::postgres::PgRow) -> Account {
        Account {
            id: row.get("id"),
            name: row.get("name"),
            number: row.get("number"),
            balance: row.get("balance"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn insert_account(&self, new: NewAccount) -> Result<Account> {
        debug!("Creating new account in database: number={}", new.number);

        let row = sqlx::query(
            "INSERT INTO accounts (name, number, balance)
             VALUES ($1, $2, $3)
             RETURNING id, name, number, balance, created_at, updated_at",
        )
        .bind(&new.name)
        .bind(&new.number)
        .bind(new.balance)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_unique_violation(&new.number, e))?;

        Ok(Self::row_to_account(&row))
    }

    async fn account_by_id(&self, id: i64) -> Result<Option<Account>> {
        debug!("Getting account from database: {}", id);

        let row = sqlx::query(
            "SELECT id, name, number, balance, created_at, updated_at
             FROM accounts
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Self::row_to_account(&row)))
    }

    async fn account_by_number(&self, number: &str) -> Result<Option<Account>> {
        debug!("Getting account from database by number: {}", number);

        let row = sqlx::query(
            "SELECT id, name, number, balance, created_at, updated_at
             FROM accounts
             WHERE number = $1",
        )
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Self::row_to_account(&row)))
    }

    async fn list_accounts(&self, offset: u64, limit: u64) -> Result<Vec<Account>> {
        debug!("Listing accounts: offset={} limit={}", offset, limit);

        let rows = sqlx::query(
            "SELECT id, name, number, balance, created_at, updated_at
             FROM accounts
             ORDER BY id ASC
             LIMIT $1 OFFSET $2",
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::row_to_account).collect())
    }

    async fn update_account(&self, account: Account) -> Result<Account> {
        debug!("Updating account in database: {}", account.id);

        let result = sqlx::query(
            "UPDATE accounts
             SET name = $2, number = $3, balance = $4, updated_at = $5
             WHERE id = $1",
        )
        .bind(account.id)
        .bind(&account.name)
        .bind(&account.number)
        .bind(account.balance)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_unique_violation(&account.number, e))?;

        if result.rows_affected() == 0 {
            return Err(Error::AccountNotFound(format!(
                "Account id={} not found",
                account.id
            )));
        }

        Ok(account)
    }

    async fn delete_account(&self, id: i64) -> Result<bool> {
        debug!("Deleting account from database: {}", id);

        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
