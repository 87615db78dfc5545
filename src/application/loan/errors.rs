use thiserror::Error;

use crate::domain::LoanDomainError;

/// 貸出管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum LoanApplicationError {
    /// 貸出が見つからない
    #[error("Loan not found")]
    LoanNotFound,

    /// 書籍が存在しない
    #[error("Book not found")]
    BookNotFound,

    /// ステータスが不正（3種類以外、または操作で受け付けない値）
    #[error("Invalid loan status: {0}")]
    InvalidStatus(String),

    /// 入力値の検証エラー
    #[error("Validation error: {0}")]
    Validation(String),

    /// LoanRecordStoreのエラー
    #[error("Loan store error")]
    LoanStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// BookCatalogのエラー
    #[error("Book catalog error")]
    BookCatalogError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<LoanDomainError> for LoanApplicationError {
    fn from(err: LoanDomainError) -> Self {
        match err {
            LoanDomainError::InvalidStatus(status) => LoanApplicationError::InvalidStatus(status),
            LoanDomainError::InvalidReturnOutcome(status) => {
                LoanApplicationError::InvalidStatus(status.to_string())
            }
            LoanDomainError::NegativeFine(_)
            | LoanDomainError::FineTooLarge(_)
            | LoanDomainError::OnLoanWithReturnData => {
                LoanApplicationError::Validation(err.to_string())
            }
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LoanApplicationError>;
