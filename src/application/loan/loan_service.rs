use crate::domain::{self, commands::*, loan::Loan, value_objects::*};
use crate::ports::*;
use std::sync::Arc;

use super::errors::{LoanApplicationError, Result};

/// サービスの依存関係
///
/// プロセス起動時に一度だけ構築し、トランスポート層へ明示的に渡す。
/// 振る舞いは持たず、各操作関数に引数として渡される。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub loan_store: Arc<dyn LoanRecordStore>,
    pub book_catalog: Arc<dyn BookCatalog>,
}

/// 一覧取得の絞り込み条件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoanFilter {
    pub user_id: Option<UserId>,
    pub status: Option<LoanStatus>,
}

/// ストアから貸出を読み込むヘルパー関数
///
/// # エラー
/// - LoanStoreError: 読み込み失敗
/// - LoanNotFound: 貸出が存在しない
async fn load_loan(store: &Arc<dyn LoanRecordStore>, loan_id: LoanId) -> Result<Loan> {
    store
        .find_by_id(loan_id)
        .await
        .map_err(LoanApplicationError::LoanStoreError)?
        .ok_or(LoanApplicationError::LoanNotFound)
}

async fn ensure_book_exists(catalog: &Arc<dyn BookCatalog>, book_id: BookId) -> Result<()> {
    let exists = catalog
        .exists(book_id)
        .await
        .map_err(LoanApplicationError::BookCatalogError)?;

    if !exists {
        return Err(LoanApplicationError::BookNotFound);
    }
    Ok(())
}

/// 部分更新を書き込み、更新後の貸出を返す
///
/// 読み込みと書き込みの間に削除された場合は LoanNotFound。
async fn persist_changes(
    store: &Arc<dyn LoanRecordStore>,
    loan_id: LoanId,
    changes: domain::loan::LoanChanges,
) -> Result<Loan> {
    store
        .update_partial(loan_id, changes)
        .await
        .map_err(LoanApplicationError::LoanStoreError)?
        .ok_or(LoanApplicationError::LoanNotFound)
}

/// 書籍を貸し出す
///
/// ビジネスルール：
/// - 書籍が存在すること（存在しなければ何も保存しない）
/// - 返却期限は貸出日から計算する
/// - 状態は OnLoan、料金は0で作成
///
/// # 戻り値
/// ストアが採番したIDを持つ貸出
#[tracing::instrument(
    skip(deps),
    fields(user_id = %cmd.user_id.value(), book_id = %cmd.book_id.value())
)]
pub async fn create_loan(deps: &ServiceDependencies, cmd: CreateLoan) -> Result<Loan> {
    // 1. 書籍の存在確認
    ensure_book_exists(&deps.book_catalog, cmd.book_id).await?;

    // 2. ドメイン層の純粋関数を呼び出し
    let new_loan = domain::loan::open_loan(&cmd);

    // 3. 保存
    let loan = deps
        .loan_store
        .insert(new_loan)
        .await
        .map_err(LoanApplicationError::LoanStoreError)?;

    tracing::info!(
        loan_id = %loan.loan_id.value(),
        due_date = %loan.due_date,
        "Loan created"
    );
    Ok(loan)
}

/// 返却する（結果は returned または lost）
///
/// ビジネスルール：
/// - 貸出が存在すること
/// - returned：期限より遅ければ延滞料金を計算（1日の猶予あり）
/// - lost：料金は0
///
/// 読み込み → 計算 → 書き込み。同じ貸出への同時返却は後勝ちになる。
#[tracing::instrument(skip(deps), fields(loan_id = %cmd.loan_id.value(), status = %cmd.status))]
pub async fn return_loan(deps: &ServiceDependencies, cmd: ReturnLoan) -> Result<Loan> {
    // 1. 貸出を読み込み
    let loan = load_loan(&deps.loan_store, cmd.loan_id).await?;

    // 2. ドメイン層の純粋関数を呼び出し
    let changes = domain::loan::return_loan(&loan, cmd.actual_return_date, cmd.status)?;

    // 3. 書き込み
    let updated = persist_changes(&deps.loan_store, cmd.loan_id, changes).await?;

    tracing::info!(fine = %updated.fine, "Loan returned");
    Ok(updated)
}

/// 紛失にする
///
/// 料金と返却日には触れない。冪等。
#[tracing::instrument(skip(deps), fields(loan_id = %cmd.loan_id.value()))]
pub async fn mark_lost(deps: &ServiceDependencies, cmd: MarkLost) -> Result<Loan> {
    load_loan(&deps.loan_store, cmd.loan_id).await?;

    let updated =
        persist_changes(&deps.loan_store, cmd.loan_id, domain::loan::mark_lost()).await?;

    tracing::info!("Loan marked as lost");
    Ok(updated)
}

/// 管理者による訂正
///
/// ビジネスルール：
/// - 貸出が存在すること
/// - 書籍IDを変更する場合、その書籍が存在すること
/// - 終端状態からの遷移も許可する（管理用の訂正経路）
#[tracing::instrument(skip(deps), fields(loan_id = %cmd.loan_id.value()))]
pub async fn update_loan(deps: &ServiceDependencies, cmd: CorrectLoan) -> Result<Loan> {
    // 1. 貸出を読み込み
    let loan = load_loan(&deps.loan_store, cmd.loan_id).await?;

    // 2. 書籍IDが指定されていれば存在確認
    if let Some(book_id) = cmd.book_id {
        ensure_book_exists(&deps.book_catalog, book_id).await?;
    }

    // 3. ドメイン層の純粋関数を呼び出し
    let changes = domain::loan::correct_loan(&loan, &cmd)?;
    if changes.is_empty() {
        return Ok(loan);
    }

    if loan.status.is_terminal() && changes.status.is_some_and(|s| s != loan.status) {
        tracing::warn!(
            from = %loan.status,
            to = ?changes.status,
            "Loan moved out of a terminal status by correction"
        );
    }

    // 4. 書き込み
    let updated = persist_changes(&deps.loan_store, cmd.loan_id, changes).await?;

    tracing::info!("Loan updated");
    Ok(updated)
}

/// IDで貸出を取得する
pub async fn get_loan(deps: &ServiceDependencies, loan_id: LoanId) -> Result<Loan> {
    load_loan(&deps.loan_store, loan_id).await
}

/// 貸出一覧を取得する
///
/// 利用者とステータスの両方が指定された場合は、利用者で取得してから
/// ステータスで絞り込む。
pub async fn list_loans(deps: &ServiceDependencies, filter: LoanFilter) -> Result<Vec<Loan>> {
    let store = &deps.loan_store;
    let loans = match (filter.user_id, filter.status) {
        (Some(user_id), Some(status)) => store
            .find_by_user_id(user_id)
            .await
            .map(|loans| {
                loans
                    .into_iter()
                    .filter(|l| l.status == status)
                    .collect::<Vec<_>>()
            }),
        (Some(user_id), None) => store.find_by_user_id(user_id).await,
        (None, Some(status)) => store.find_by_status(status).await,
        (None, None) => store.find_all().await,
    };

    loans.map_err(LoanApplicationError::LoanStoreError)
}

/// 貸出を削除する
///
/// 削除対象がなければ LoanNotFound。
#[tracing::instrument(skip(deps), fields(loan_id = %loan_id.value()))]
pub async fn delete_loan(deps: &ServiceDependencies, loan_id: LoanId) -> Result<()> {
    let deleted = deps
        .loan_store
        .delete(loan_id)
        .await
        .map_err(LoanApplicationError::LoanStoreError)?;

    if deleted == 0 {
        return Err(LoanApplicationError::LoanNotFound);
    }

    tracing::info!("Loan deleted");
    Ok(())
}
