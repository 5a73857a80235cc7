//! Account service for managing bank account records

pub mod service;
pub mod repository;
pub mod notifier;
pub mod config;

pub use service::AccountService;
pub use service::RepositoryType;
pub use repository::{AccountRepository, InMemoryAccountRepository, PostgresAccountRepository};
pub use notifier::{AccountNotifier, BackgroundNotifier, LogNotifier, NotificationSender};
pub use config::AccountServiceConfig;
