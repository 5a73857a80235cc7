use std::sync::{Arc, Mutex};

use account_service::{
    AccountNotifier, AccountService, BackgroundNotifier, NotificationSender, RepositoryType,
};
use aggregation_engine::{AggregatorConfig, BalanceAggregator, SchedulingMode};
use async_trait::async_trait;
use common::decimal::dec;
use common::error::Error;
use common::model::account::{Account, AccountChanges, NewAccount};
use tokio::sync::mpsc;

/// Notifier that records which accounts it was fired for
#[derive(Default)]
struct RecordingNotifier {
    created: Mutex<Vec<i64>>,
}

impl AccountNotifier for RecordingNotifier {
    fn account_created(&self, account: &Account) {
        self.created.lock().unwrap().push(account.id);
    }
}

fn new_account(name: &str, number: &str, balance: rust_decimal::Decimal) -> NewAccount {
    NewAccount {
        name: name.to_string(),
        number: number.to_string(),
        balance,
    }
}

#[tokio::test]
async fn crud_lifecycle() {
    let service = AccountService::with_repository(RepositoryType::InMemory)
        .await
        .unwrap();

    // create
    let account = service
        .create_account(new_account("Alice", "A001", dec!(100)))
        .await
        .unwrap();
    assert_eq!(account.name, "Alice");
    assert_eq!(account.number, "A001");
    assert_eq!(account.balance, dec!(100));

    // get by id and by number
    let got = service.account(account.id).await.unwrap();
    assert_eq!(got.number, "A001");
    let got = service.account_by_number("A001").await.unwrap();
    assert_eq!(got.id, account.id);

    // update name and balance
    let updated = service
        .update_account(
            account.id,
            AccountChanges {
                name: Some("Alice B".to_string()),
                balance: Some(dec!(200)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Alice B");
    assert_eq!(updated.balance, dec!(200));

    // second account cannot take the first one's number
    let bob = service
        .create_account(new_account("Bob", "B001", dec!(50)))
        .await
        .unwrap();
    let err = service
        .update_account(
            bob.id,
            AccountChanges {
                number: Some("A001".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateAccountNumber(_)));

    // delete, then lookups fail
    service.delete_account(account.id).await.unwrap();
    let err = service.account(account.id).await.unwrap_err();
    assert!(matches!(err, Error::AccountNotFound(_)));
}

#[tokio::test]
async fn create_validates_inputs() {
    let service = AccountService::new();

    let err = service
        .create_account(new_account("  ", "A001", dec!(0)))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ValidationError(_)));

    let err = service
        .create_account(new_account("Alice", "", dec!(0)))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ValidationError(_)));

    // names and numbers are trimmed before storage
    let account = service
        .create_account(new_account(" Alice ", " A001 ", dec!(1)))
        .await
        .unwrap();
    assert_eq!(account.name, "Alice");
    assert_eq!(account.number, "A001");
}

#[tokio::test]
async fn duplicate_number_rejected_on_create() {
    let service = AccountService::new();
    service
        .create_account(new_account("Alice", "A001", dec!(100)))
        .await
        .unwrap();

    let err = service
        .create_account(new_account("Impostor", "A001", dec!(0)))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateAccountNumber(_)));
}

#[tokio::test]
async fn update_requires_changes() {
    let service = AccountService::new();
    let account = service
        .create_account(new_account("Alice", "A001", dec!(100)))
        .await
        .unwrap();

    let err = service
        .update_account(account.id, AccountChanges::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ValidationError(_)));
}

#[tokio::test]
async fn opening_balance_is_rounded_to_storage_precision() {
    let service = AccountService::new();
    let account = service
        .create_account(new_account("Alice", "A001", dec!(10.00009)))
        .await
        .unwrap();
    assert_eq!(account.balance, dec!(10.0001));
}

#[tokio::test]
async fn notifier_fires_once_per_create() {
    let notifier = Arc::new(RecordingNotifier::default());
    let service = AccountService::new().with_notifier(notifier.clone());

    let alice = service
        .create_account(new_account("Alice", "A001", dec!(100)))
        .await
        .unwrap();
    let bob = service
        .create_account(new_account("Bob", "B001", dec!(50)))
        .await
        .unwrap();

    // a failed create must not notify
    let _ = service
        .create_account(new_account("Impostor", "A001", dec!(0)))
        .await
        .unwrap_err();

    assert_eq!(*notifier.created.lock().unwrap(), vec![alice.id, bob.id]);
}

/// Delivery transport that reports each delivered account id on a channel
struct ChannelSender {
    tx: mpsc::UnboundedSender<i64>,
}

#[async_trait]
impl NotificationSender for ChannelSender {
    async fn send_account_created(&self, account: &Account) -> common::error::Result<()> {
        let _ = self.tx.send(account.id);
        Ok(())
    }
}

#[tokio::test]
async fn background_notifier_delivers_created_events() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let notifier = Arc::new(BackgroundNotifier::spawn(Arc::new(ChannelSender { tx })));
    let service = AccountService::new().with_notifier(notifier);

    let account = service
        .create_account(new_account("Alice", "A001", dec!(100)))
        .await
        .unwrap();

    // Delivery happens on the background task, so wait for the event.
    let delivered = rx.recv().await.unwrap();
    assert_eq!(delivered, account.id);
}

#[tokio::test]
async fn service_feeds_the_aggregation_engine() {
    let service = Arc::new(AccountService::new());
    for i in 1..=7 {
        service
            .create_account(new_account(
                &format!("User{}", i),
                &format!("U{:03}", i),
                rust_decimal::Decimal::from(i * 10),
            ))
            .await
            .unwrap();
    }

    let aggregator = BalanceAggregator::new(service.clone(), AggregatorConfig::new(3, 3));

    for mode in [SchedulingMode::WorkerPool, SchedulingMode::Cooperative] {
        let result = aggregator.aggregate(mode).await.unwrap();
        assert_eq!(result.total, dec!(280));
        assert_eq!(result.batch_count, 3);
    }
}
