//! PostgreSQLアダプターのテスト
//!
//! 実データベースが必要なので既定では実行しない。
//! `DATABASE_URL=... cargo test -- --ignored` で実行する。

mod common;

use chrono::{DateTime, Utc};
use common::date;
use library_loans::adapters::postgres::{PostgresBookCatalog, PostgresLoanRecordStore};
use library_loans::domain::Fine;
use library_loans::domain::loan::{LoanChanges, NewLoan};
use library_loans::domain::value_objects::{BookId, LoanStatus, UserId};
use library_loans::ports::{BookCatalog, LoanRecordStore};
use rust_decimal::Decimal;
use serial_test::serial;
use sqlx::PgPool;

/// データベースのクリーンアップ
///
/// テストの独立性を保つため、各テスト前にすべてのデータを削除する。
async fn cleanup_database(pool: &PgPool) {
    sqlx::query("TRUNCATE TABLE loans, books CASCADE")
        .execute(pool)
        .await
        .expect("Failed to truncate tables");
}

/// テスト用の書籍を登録
async fn insert_book(pool: &PgPool) -> BookId {
    let book_id = BookId::new();
    sqlx::query("INSERT INTO books (id, title, author, isbn, quantity) VALUES ($1, $2, $3, $4, $5)")
        .bind(book_id.value())
        .bind("The Rust Programming Language")
        .bind("Steve Klabnik")
        .bind("9781718503106")
        .bind(1_i32)
        .execute(pool)
        .await
        .expect("Failed to insert book");
    book_id
}

fn new_loan(book_id: BookId, loan_date: DateTime<Utc>, due_date: DateTime<Utc>) -> NewLoan {
    NewLoan {
        user_id: UserId::new(),
        book_id,
        loan_date,
        due_date,
    }
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_book_catalog_exists() {
    let pool = common::create_test_pool().await;
    cleanup_database(&pool).await;
    let catalog = PostgresBookCatalog::new(pool.clone());
    let book_id = insert_book(&pool).await;

    assert!(catalog.exists(book_id).await.unwrap());
    assert!(!catalog.exists(BookId::new()).await.unwrap());
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_insert_and_find_by_id() {
    let pool = common::create_test_pool().await;
    cleanup_database(&pool).await;
    let store = PostgresLoanRecordStore::new(pool.clone());
    let book_id = insert_book(&pool).await;

    let inserted = store
        .insert(new_loan(book_id, date(2026, 1, 1), date(2026, 2, 2)))
        .await
        .expect("Failed to insert loan");

    assert_eq!(inserted.status, LoanStatus::OnLoan);
    assert!(inserted.fine.is_zero());

    let found = store
        .find_by_id(inserted.loan_id)
        .await
        .expect("Failed to find loan")
        .expect("Loan should exist");

    assert_eq!(found.loan_id, inserted.loan_id);
    assert_eq!(found.book_id, book_id);
    assert_eq!(found.loan_date, date(2026, 1, 1));
    assert_eq!(found.due_date, date(2026, 2, 2));
    assert_eq!(found.actual_return_date, None);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_update_partial_writes_only_given_columns() {
    let pool = common::create_test_pool().await;
    cleanup_database(&pool).await;
    let store = PostgresLoanRecordStore::new(pool.clone());
    let book_id = insert_book(&pool).await;
    let loan = store
        .insert(new_loan(book_id, date(2026, 1, 1), date(2026, 2, 2)))
        .await
        .unwrap();

    let returned = store
        .update_partial(
            loan.loan_id,
            LoanChanges {
                status: Some(LoanStatus::Returned),
                actual_return_date: Some(Some(date(2026, 2, 5))),
                fine: Some(Fine::from_cents(100)),
                ..LoanChanges::default()
            },
        )
        .await
        .unwrap()
        .expect("Loan should exist");

    assert_eq!(returned.status, LoanStatus::Returned);
    assert_eq!(returned.actual_return_date, Some(date(2026, 2, 5)));
    assert_eq!(returned.fine.value(), Decimal::new(100, 2));
    assert_eq!(returned.due_date, loan.due_date);
    assert_eq!(returned.user_id, loan.user_id);

    // 返却日の消去
    let reopened = store
        .update_partial(
            loan.loan_id,
            LoanChanges {
                status: Some(LoanStatus::OnLoan),
                actual_return_date: Some(None),
                fine: Some(Fine::zero()),
                ..LoanChanges::default()
            },
        )
        .await
        .unwrap()
        .expect("Loan should exist");

    assert_eq!(reopened.status, LoanStatus::OnLoan);
    assert_eq!(reopened.actual_return_date, None);
    assert!(reopened.fine.is_zero());
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_update_partial_missing_loan_returns_none() {
    let pool = common::create_test_pool().await;
    cleanup_database(&pool).await;
    let store = PostgresLoanRecordStore::new(pool.clone());

    let result = store
        .update_partial(
            library_loans::domain::value_objects::LoanId::new(),
            LoanChanges {
                status: Some(LoanStatus::Lost),
                ..LoanChanges::default()
            },
        )
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_filtered_queries_and_delete() {
    let pool = common::create_test_pool().await;
    cleanup_database(&pool).await;
    let store = PostgresLoanRecordStore::new(pool.clone());
    let book_id = insert_book(&pool).await;

    let older = store
        .insert(new_loan(book_id, date(2026, 1, 1), date(2026, 2, 2)))
        .await
        .unwrap();
    let newer = store
        .insert(NewLoan {
            user_id: older.user_id,
            ..new_loan(book_id, date(2026, 1, 10), date(2026, 2, 9))
        })
        .await
        .unwrap();
    let other = store
        .insert(new_loan(book_id, date(2026, 1, 5), date(2026, 2, 4)))
        .await
        .unwrap();
    store
        .update_partial(
            other.loan_id,
            LoanChanges {
                status: Some(LoanStatus::Lost),
                ..LoanChanges::default()
            },
        )
        .await
        .unwrap();

    let all = store.find_all().await.unwrap();
    assert_eq!(all.len(), 3);

    let by_user = store.find_by_user_id(older.user_id).await.unwrap();
    let ids: Vec<_> = by_user.iter().map(|l| l.loan_id).collect();
    assert_eq!(ids, vec![newer.loan_id, older.loan_id]);

    let lost = store.find_by_status(LoanStatus::Lost).await.unwrap();
    assert_eq!(lost.len(), 1);
    assert_eq!(lost[0].loan_id, other.loan_id);

    assert_eq!(store.delete(other.loan_id).await.unwrap(), 1);
    assert_eq!(store.delete(other.loan_id).await.unwrap(), 0);
    assert!(store.find_by_id(other.loan_id).await.unwrap().is_none());
}
