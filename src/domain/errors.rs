use rust_decimal::Decimal;

use super::{Fine, LoanStatus};

/// 貸出ドメインのエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoanDomainError {
    /// 3種類以外のステータス文字列
    InvalidStatus(String),
    /// 返却操作で受け付けない結果（returned / lost 以外）
    InvalidReturnOutcome(LoanStatus),
    /// 延滞料金が負
    NegativeFine(Decimal),
    /// 延滞料金が保存できる上限を超えている
    FineTooLarge(Decimal),
    /// 貸出中のままの訂正に返却日または料金が含まれている
    OnLoanWithReturnData,
}

impl std::fmt::Display for LoanDomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoanDomainError::InvalidStatus(s) => write!(f, "invalid loan status: {}", s),
            LoanDomainError::InvalidReturnOutcome(s) => {
                write!(f, "a loan cannot be returned with status {}", s)
            }
            LoanDomainError::NegativeFine(v) => write!(f, "fine must not be negative: {}", v),
            LoanDomainError::FineTooLarge(v) => {
                write!(f, "fine must not exceed {}: {}", Fine::max(), v)
            }
            LoanDomainError::OnLoanWithReturnData => {
                f.write_str("an on-loan loan cannot carry a return date or a fine")
            }
        }
    }
}

impl std::error::Error for LoanDomainError {}
