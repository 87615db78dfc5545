use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use std::str::FromStr;
use uuid::Uuid;

use crate::application::loan::{LoanApplicationError, LoanFilter};
use crate::domain::{
    commands::{CorrectLoan, CreateLoan, ReturnLoan},
    due_date::start_of_caller_day,
    loan::Loan,
    value_objects::{BookId, LoanId, LoanStatus, UserId},
};

/// 日時文字列を解釈する
///
/// RFC 3339（呼び出し元のオフセットを保持）、タイムゾーンなしの日時と
/// 日付のみ（どちらもUTCとみなす。日付のみは0時）を受け付ける。
pub fn parse_datetime(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().into());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc().into())
}

/// 呼び出し元の現地時刻をそのまま保持した日時
///
/// 返却期限（呼び出し元の暦日の0時）と同じ基準で遅延日数を数えるために使う。
pub fn caller_wall_clock(at: DateTime<FixedOffset>) -> DateTime<Utc> {
    at.naive_local().and_utc()
}

fn deserialize_with<'de, D>(
    deserializer: D,
    convert: fn(DateTime<FixedOffset>) -> DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|value| {
        parse_datetime(&value)
            .map(convert)
            .ok_or_else(|| D::Error::custom(format!("invalid date: {}", value)))
    })
    .transpose()
}

/// 暦日として扱う項目（貸出日・返却期限）
fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_with(deserializer, start_of_caller_day)
}

/// 時刻まで扱う項目（実返却日）
fn deserialize_optional_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_with(deserializer, caller_wall_clock)
}

/// ステータス文字列のパースとバリデーション
pub fn parse_status(status: &str) -> Result<LoanStatus, LoanApplicationError> {
    Ok(LoanStatus::from_str(status)?)
}

/// 貸出一覧取得のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct ListLoansQuery {
    /// 利用者IDでフィルタリング
    pub user_id: Option<Uuid>,
    /// ステータスでフィルタリング
    pub status: Option<String>,
}

impl ListLoansQuery {
    pub fn to_filter(&self) -> Result<LoanFilter, LoanApplicationError> {
        Ok(LoanFilter {
            user_id: self.user_id.map(UserId::from_uuid),
            status: self.status.as_deref().map(parse_status).transpose()?,
        })
    }
}

/// POST /loans のリクエスト
///
/// IDは必須だが、欠けていれば400を返すためにOptionで受ける。
#[derive(Debug, Default, Deserialize)]
pub struct CreateLoanRequest {
    pub user_id: Option<Uuid>,
    pub book_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub loan_date: Option<DateTime<Utc>>,
}

impl CreateLoanRequest {
    /// 貸出日が省略された場合は `now` を使う
    pub fn to_command(&self, now: DateTime<Utc>) -> Result<CreateLoan, LoanApplicationError> {
        let (Some(user_id), Some(book_id)) = (self.user_id, self.book_id) else {
            return Err(LoanApplicationError::Validation(
                "user_id and book_id are required".to_string(),
            ));
        };

        Ok(CreateLoan {
            user_id: UserId::from_uuid(user_id),
            book_id: BookId::from_uuid(book_id),
            loan_date: self.loan_date.unwrap_or(now),
        })
    }
}

/// PUT /loans/:id/return のリクエスト（本文は省略可能）
#[derive(Debug, Default, Deserialize)]
pub struct ReturnLoanRequest {
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub actual_return_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

impl ReturnLoanRequest {
    /// ステータス省略時は returned、返却日省略時は `now`
    pub fn to_command(
        &self,
        loan_id: LoanId,
        now: DateTime<Utc>,
    ) -> Result<ReturnLoan, LoanApplicationError> {
        let status = match self.status.as_deref() {
            None => LoanStatus::Returned,
            Some(s) => parse_status(s)?,
        };

        Ok(ReturnLoan {
            loan_id,
            actual_return_date: self.actual_return_date.unwrap_or(now),
            status,
        })
    }
}

/// PUT /loans/:id のリクエスト（任意のフィールドの部分集合）
#[derive(Debug, Default, Deserialize)]
pub struct UpdateLoanRequest {
    pub status: Option<String>,
    pub user_id: Option<Uuid>,
    pub book_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub loan_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub actual_return_date: Option<DateTime<Utc>>,
    pub fine: Option<Decimal>,
}

impl UpdateLoanRequest {
    pub fn to_command(&self, loan_id: LoanId) -> Result<CorrectLoan, LoanApplicationError> {
        Ok(CorrectLoan {
            loan_id,
            status: self.status.as_deref().map(parse_status).transpose()?,
            user_id: self.user_id.map(UserId::from_uuid),
            book_id: self.book_id.map(BookId::from_uuid),
            loan_date: self.loan_date,
            due_date: self.due_date,
            actual_return_date: self.actual_return_date,
            fine: self.fine,
        })
    }
}

/// 貸出レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanResponse {
    pub loan_id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub status: LoanStatus,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub actual_return_date: Option<DateTime<Utc>>,
    pub fine: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        Self {
            loan_id: loan.loan_id.value(),
            user_id: loan.user_id.value(),
            book_id: loan.book_id.value(),
            status: loan.status,
            loan_date: loan.loan_date,
            due_date: loan.due_date,
            actual_return_date: loan.actual_return_date,
            fine: loan.fine.value(),
            created_at: loan.created_at,
            updated_at: loan.updated_at,
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
