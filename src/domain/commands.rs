use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BookId, LoanId, LoanStatus, UserId};

/// コマンド：書籍を貸し出す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLoan {
    pub user_id: UserId,
    pub book_id: BookId,
    pub loan_date: DateTime<Utc>,
}

/// コマンド：返却する（結果は returned または lost）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnLoan {
    pub loan_id: LoanId,
    pub actual_return_date: DateTime<Utc>,
    pub status: LoanStatus,
}

/// コマンド：紛失にする
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkLost {
    pub loan_id: LoanId,
}

/// コマンド：管理者による訂正（任意のフィールドの部分集合）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectLoan {
    pub loan_id: LoanId,
    pub status: Option<LoanStatus>,
    pub user_id: Option<UserId>,
    pub book_id: Option<BookId>,
    pub loan_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub actual_return_date: Option<DateTime<Utc>>,
    pub fine: Option<Decimal>,
}
