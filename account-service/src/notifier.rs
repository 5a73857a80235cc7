//! Account lifecycle notification port
//!
//! Notifications are a best-effort side channel: they are dispatched after
//! a successful create and must never block or fail the calling operation.
//! Delivery transports (e.g. SMTP) plug in behind [`NotificationSender`].

use std::sync::Arc;

use async_trait::async_trait;
use common::error::Result;
use common::model::account::Account;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Port invoked by the account service after a successful create.
pub trait AccountNotifier: Send + Sync {
    /// Fire-and-forget; implementations must return immediately.
    fn account_created(&self, account: &Account);
}

/// Notifier that records the event in the service log
pub struct LogNotifier;

impl AccountNotifier for LogNotifier {
    fn account_created(&self, account: &Account) {
        info!(
            "Account created: id={} number={}",
            account.id, account.number
        );
    }
}

/// Delivery seam for out-of-process notification transports
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Deliver an account-created notification
    async fn send_account_created(&self, account: &Account) -> Result<()>;
}

enum Notification {
    AccountCreated(Account),
}

/// Queues events on a channel drained by a background task.
///
/// A closed channel or a failed delivery is logged and dropped; the
/// event producer never observes either.
pub struct BackgroundNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl BackgroundNotifier {
    /// Spawn the drain task and return the producer handle
    pub fn spawn(sender: Arc<dyn NotificationSender>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match event {
                    Notification::AccountCreated(account) => {
                        if let Err(e) = sender.send_account_created(&account).await {
                            warn!(
                                "Failed to deliver account-created notification for id={}: {}",
                                account.id, e
                            );
                        }
                    }
                }
            }
        });

        Self { tx }
    }
}

impl AccountNotifier for BackgroundNotifier {
    fn account_created(&self, account: &Account) {
        if self
            .tx
            .send(Notification::AccountCreated(account.clone()))
            .is_err()
        {
            warn!(
                "Notification channel closed, dropping account-created event for id={}",
                account.id
            );
        }
    }
}
