use account_service::{AccountRepository, InMemoryAccountRepository};
use common::decimal::dec;
use common::error::Error;
use common::model::account::NewAccount;

fn new_account(name: &str, number: &str, balance: rust_decimal::Decimal) -> NewAccount {
    NewAccount {
        name: name.to_string(),
        number: number.to_string(),
        balance,
    }
}

#[tokio::test]
async fn insert_assigns_monotonic_ids() {
    let repo = InMemoryAccountRepository::new();

    let first = repo
        .insert_account(new_account("Alice", "A001", dec!(100)))
        .await
        .unwrap();
    let second = repo
        .insert_account(new_account("Bob", "B001", dec!(50)))
        .await
        .unwrap();

    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);

    // Ids are never reused, even after a delete.
    assert!(repo.delete_account(second.id).await.unwrap());
    let third = repo
        .insert_account(new_account("Carol", "C001", dec!(25)))
        .await
        .unwrap();
    assert_eq!(third.id, 3);
}

#[tokio::test]
async fn duplicate_number_is_rejected() {
    let repo = InMemoryAccountRepository::new();

    repo.insert_account(new_account("Alice", "A001", dec!(100)))
        .await
        .unwrap();
    let err = repo
        .insert_account(new_account("Impostor", "A001", dec!(0)))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DuplicateAccountNumber(_)));
}

#[tokio::test]
async fn lookup_by_id_and_number() {
    let repo = InMemoryAccountRepository::new();
    let created = repo
        .insert_account(new_account("Alice", "A001", dec!(100)))
        .await
        .unwrap();

    let by_id = repo.account_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(by_id.number, "A001");

    let by_number = repo.account_by_number("A001").await.unwrap().unwrap();
    assert_eq!(by_number.id, created.id);

    assert!(repo.account_by_id(999).await.unwrap().is_none());
    assert!(repo.account_by_number("Z999").await.unwrap().is_none());
}

#[tokio::test]
async fn list_is_ordered_and_windowed() {
    let repo = InMemoryAccountRepository::new();
    for i in 1..=9 {
        repo.insert_account(new_account(
            &format!("User{}", i),
            &format!("U{:03}", i),
            dec!(10),
        ))
        .await
        .unwrap();
    }

    let all = repo.list_accounts(0, 100).await.unwrap();
    assert_eq!(all.len(), 9);
    let ids: Vec<i64> = all.iter().map(|a| a.id).collect();
    assert_eq!(ids, (1..=9).collect::<Vec<i64>>());

    let window = repo.list_accounts(3, 4).await.unwrap();
    let ids: Vec<i64> = window.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![4, 5, 6, 7]);

    let past_end = repo.list_accounts(20, 4).await.unwrap();
    assert!(past_end.is_empty());
}

#[tokio::test]
async fn update_replaces_fields() {
    let repo = InMemoryAccountRepository::new();
    let mut account = repo
        .insert_account(new_account("Alice", "A001", dec!(100)))
        .await
        .unwrap();

    account.name = "Alice B".to_string();
    account.balance = dec!(200);
    let updated = repo.update_account(account).await.unwrap();

    assert_eq!(updated.name, "Alice B");
    assert_eq!(updated.balance, dec!(200));

    let reloaded = repo.account_by_id(updated.id).await.unwrap().unwrap();
    assert_eq!(reloaded.name, "Alice B");
}

#[tokio::test]
async fn update_cannot_steal_a_number() {
    let repo = InMemoryAccountRepository::new();
    repo.insert_account(new_account("Alice", "A001", dec!(100)))
        .await
        .unwrap();
    let mut bob = repo
        .insert_account(new_account("Bob", "B001", dec!(50)))
        .await
        .unwrap();

    bob.number = "A001".to_string();
    let err = repo.update_account(bob).await.unwrap_err();
    assert!(matches!(err, Error::DuplicateAccountNumber(_)));
}

#[tokio::test]
async fn delete_reports_existence() {
    let repo = InMemoryAccountRepository::new();
    let account = repo
        .insert_account(new_account("Alice", "A001", dec!(100)))
        .await
        .unwrap();

    assert!(repo.delete_account(account.id).await.unwrap());
    assert!(!repo.delete_account(account.id).await.unwrap());
    assert!(repo.account_by_id(account.id).await.unwrap().is_none());
}
