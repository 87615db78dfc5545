use crate::domain::{
    Fine,
    loan::{Loan, LoanChanges, NewLoan},
    value_objects::{BookId, LoanId, LoanStatus, UserId},
};
use crate::ports::loan_record_store::{LoanRecordStore as LoanRecordStoreTrait, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

const LOAN_COLUMNS: &str = r#"
    id,
    user_id,
    book_id,
    status,
    fine,
    loan_date,
    due_date,
    actual_return_date,
    created_at,
    updated_at
"#;

/// PostgreSQLの行データをLoanに変換する
///
/// ステータス文字列と料金（NUMERIC）の変換でエラーハンドリングを行う。
/// CHECK制約があるので通常は失敗しない。
fn map_row_to_loan(row: &PgRow) -> Result<Loan> {
    let status_str: &str = row.try_get("status")?;
    let status = LoanStatus::from_str(status_str).map_err(|e| {
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        )) as Box<dyn std::error::Error + Send + Sync>
    })?;

    let fine_value: Decimal = row.try_get("fine")?;
    let fine = Fine::try_from(fine_value).map_err(|e| {
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        )) as Box<dyn std::error::Error + Send + Sync>
    })?;

    Ok(Loan {
        loan_id: LoanId::from_uuid(row.try_get("id")?),
        user_id: UserId::from_uuid(row.try_get("user_id")?),
        book_id: BookId::from_uuid(row.try_get("book_id")?),
        status,
        loan_date: row.try_get("loan_date")?,
        due_date: row.try_get("due_date")?,
        actual_return_date: row.try_get("actual_return_date")?,
        fine,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// LoanRecordStoreのPostgreSQL実装
pub struct LoanRecordStore {
    pool: PgPool,
}

impl LoanRecordStore {
    /// PostgreSQLコネクションプールから新しいLoanRecordStoreを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_where(&self, condition: &str, bind: Option<BindValue>) -> Result<Vec<Loan>> {
        let sql = format!(
            "SELECT {} FROM loans {} ORDER BY loan_date DESC, created_at DESC",
            LOAN_COLUMNS, condition
        );
        let query = sqlx::query(&sql);
        let query = match bind {
            Some(BindValue::Uuid(v)) => query.bind(v),
            Some(BindValue::Text(v)) => query.bind(v),
            None => query,
        };

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(map_row_to_loan).collect()
    }
}

enum BindValue {
    Uuid(uuid::Uuid),
    Text(&'static str),
}

#[async_trait]
impl LoanRecordStoreTrait for LoanRecordStore {
    async fn find_by_id(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        let sql = format!("SELECT {} FROM loans WHERE id = $1", LOAN_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(loan_id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_loan).transpose()
    }

    /// 新規貸出を保存（IDはデータベースが採番）
    async fn insert(&self, new_loan: NewLoan) -> Result<Loan> {
        let sql = format!(
            r#"
            INSERT INTO loans (user_id, book_id, status, fine, loan_date, due_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            LOAN_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(new_loan.user_id.value())
            .bind(new_loan.book_id.value())
            .bind(LoanStatus::OnLoan.as_str())
            .bind(Fine::zero().value())
            .bind(new_loan.loan_date)
            .bind(new_loan.due_date)
            .fetch_one(&self.pool)
            .await?;

        map_row_to_loan(&row)
    }

    /// 指定されたカラムだけを更新する
    ///
    /// 各カラムは「値を書くか」のフラグと値の組で渡す。
    /// actual_return_date はフラグ付きでNULLを書けるので消去できる。
    async fn update_partial(
        &self,
        loan_id: LoanId,
        changes: LoanChanges,
    ) -> Result<Option<Loan>> {
        let sql = format!(
            r#"
            UPDATE loans SET
                status = COALESCE($2, status),
                user_id = COALESCE($3, user_id),
                book_id = COALESCE($4, book_id),
                loan_date = COALESCE($5, loan_date),
                due_date = COALESCE($6, due_date),
                actual_return_date = CASE WHEN $7 THEN $8 ELSE actual_return_date END,
                fine = COALESCE($9, fine),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            LOAN_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(loan_id.value())
            .bind(changes.status.map(|s| s.as_str()))
            .bind(changes.user_id.map(|id| id.value()))
            .bind(changes.book_id.map(|id| id.value()))
            .bind(changes.loan_date)
            .bind(changes.due_date)
            .bind(changes.actual_return_date.is_some())
            .bind(changes.actual_return_date.flatten())
            .bind(changes.fine.map(|f| f.value()))
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_loan).transpose()
    }

    async fn delete(&self, loan_id: LoanId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM loans WHERE id = $1")
            .bind(loan_id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn find_all(&self) -> Result<Vec<Loan>> {
        self.fetch_where("", None).await
    }

    /// 利用者の全貸出を検索（idx_loans_user_id を使用）
    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Loan>> {
        self.fetch_where("WHERE user_id = $1", Some(BindValue::Uuid(user_id.value())))
            .await
    }

    /// ステータスで検索（idx_loans_status を使用）
    async fn find_by_status(&self, status: LoanStatus) -> Result<Vec<Loan>> {
        self.fetch_where("WHERE status = $1", Some(BindValue::Text(status.as_str())))
            .await
    }
}
