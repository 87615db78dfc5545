use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    BookId, Fine, LoanDomainError, LoanId, LoanStatus, UserId,
    commands::{CorrectLoan, CreateLoan},
    due_date::{compute_due_date, start_of_day},
    fine::compute_fine,
};

/// 貸出 - 1冊の書籍の1回の貸出
///
/// 不変条件（通常フロー）：
/// - status = OnLoan のとき actual_return_date は None、fine は0
/// - fine は0以上（`Fine`型で保証）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    // 識別子
    pub loan_id: LoanId,

    // 他の集約への参照（IDのみ）
    pub user_id: UserId,
    pub book_id: BookId,

    // 貸出管理の責務
    pub status: LoanStatus,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub actual_return_date: Option<DateTime<Utc>>,
    pub fine: Fine,

    // 監査情報
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 永続化前の新規貸出
///
/// IDはストアが採番する。ステータスは常にOnLoan、料金は0で作成される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoan {
    pub user_id: UserId,
    pub book_id: BookId,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

impl NewLoan {
    /// ストアが採番したIDで貸出を具体化する
    pub fn into_loan(self, loan_id: LoanId, created_at: DateTime<Utc>) -> Loan {
        Loan {
            loan_id,
            user_id: self.user_id,
            book_id: self.book_id,
            status: LoanStatus::OnLoan,
            loan_date: self.loan_date,
            due_date: self.due_date,
            actual_return_date: None,
            fine: Fine::zero(),
            created_at,
            updated_at: created_at,
        }
    }
}

/// 貸出への部分更新
///
/// `None` のフィールドは変更しない。
/// `actual_return_date` の `Some(None)` は返却日の消去を意味する。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanChanges {
    pub status: Option<LoanStatus>,
    pub user_id: Option<UserId>,
    pub book_id: Option<BookId>,
    pub loan_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub actual_return_date: Option<Option<DateTime<Utc>>>,
    pub fine: Option<Fine>,
}

impl LoanChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// 変更を適用した新しい貸出を返す
    pub fn apply_to(&self, loan: &Loan, updated_at: DateTime<Utc>) -> Loan {
        Loan {
            status: self.status.unwrap_or(loan.status),
            user_id: self.user_id.unwrap_or(loan.user_id),
            book_id: self.book_id.unwrap_or(loan.book_id),
            loan_date: self.loan_date.unwrap_or(loan.loan_date),
            due_date: self.due_date.unwrap_or(loan.due_date),
            actual_return_date: self.actual_return_date.unwrap_or(loan.actual_return_date),
            fine: self.fine.unwrap_or(loan.fine),
            updated_at,
            ..loan.clone()
        }
    }
}

/// 純粋関数：書籍を貸し出す
///
/// ビジネスルール：
/// - 貸出日は0時に正規化
/// - 返却期限は貸出日から計算（30日、週末は月曜日へ）
///
/// 書籍の存在確認はアプリケーション層の責務。
pub fn open_loan(cmd: &CreateLoan) -> NewLoan {
    let loan_date = start_of_day(cmd.loan_date);

    NewLoan {
        user_id: cmd.user_id,
        book_id: cmd.book_id,
        loan_date,
        due_date: compute_due_date(loan_date),
    }
}

/// 純粋関数：書籍を返却する（または紛失として返却処理する）
///
/// ビジネスルール：
/// - 結果は Returned か Lost のみ
/// - Returned：期限より遅ければ延滞料金を計算（1日の猶予あり）
/// - Lost：料金は0のまま
pub fn return_loan(
    loan: &Loan,
    actual_return_date: DateTime<Utc>,
    outcome: LoanStatus,
) -> Result<LoanChanges, LoanDomainError> {
    let fine = match outcome {
        LoanStatus::Returned => compute_fine(loan.due_date, actual_return_date),
        LoanStatus::Lost => Fine::zero(),
        LoanStatus::OnLoan => return Err(LoanDomainError::InvalidReturnOutcome(outcome)),
    };

    Ok(LoanChanges {
        status: Some(outcome),
        actual_return_date: Some(Some(actual_return_date)),
        fine: Some(fine),
        ..LoanChanges::default()
    })
}

/// 純粋関数：紛失にする
///
/// 日付や料金には触れない。何度呼んでも結果は同じ。
pub fn mark_lost() -> LoanChanges {
    LoanChanges {
        status: Some(LoanStatus::Lost),
        ..LoanChanges::default()
    }
}

/// 純粋関数：管理者による訂正
///
/// ビジネスルール：
/// - 終端状態からの遷移も許可する
/// - Returned と返却日を同時に指定した場合、料金は現在の返却期限から再計算
/// - それ以外で料金が指定されていればその値で上書き
/// - 訂正後に OnLoan となる場合、返却日は消去され料金は0に戻る
pub fn correct_loan(loan: &Loan, cmd: &CorrectLoan) -> Result<LoanChanges, LoanDomainError> {
    let fine_override = cmd.fine.map(Fine::try_from).transpose()?;

    let mut changes = LoanChanges {
        status: cmd.status,
        user_id: cmd.user_id,
        book_id: cmd.book_id,
        loan_date: cmd.loan_date.map(start_of_day),
        due_date: cmd.due_date.map(start_of_day),
        actual_return_date: cmd.actual_return_date.map(Some),
        fine: fine_override,
    };

    if let (Some(LoanStatus::Returned), Some(returned_at)) = (cmd.status, cmd.actual_return_date) {
        changes.fine = Some(compute_fine(loan.due_date, returned_at));
    }

    if cmd.status.unwrap_or(loan.status) == LoanStatus::OnLoan {
        let carries_fine = fine_override.is_some_and(|fine| !fine.is_zero());
        if cmd.actual_return_date.is_some() || carries_fine {
            return Err(LoanDomainError::OnLoanWithReturnData);
        }
        if loan.actual_return_date.is_some() {
            changes.actual_return_date = Some(None);
        }
        if !loan.fine.is_zero() {
            changes.fine = Some(Fine::zero());
        }
    }

    Ok(changes)
}
