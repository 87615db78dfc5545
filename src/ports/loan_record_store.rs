use crate::domain::{
    loan::{Loan, LoanChanges, NewLoan},
    value_objects::{LoanId, LoanStatus, UserId},
};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Loan record store port.
///
/// Persistence of loan rows. The lifecycle reads a row, computes the new
/// fields and writes them back; it does not serialize concurrent writers to
/// the same loan, so last write wins unless the implementation adds its own
/// locking or versioning.
#[async_trait]
pub trait LoanRecordStore: Send + Sync {
    /// Get a single loan by ID.
    async fn find_by_id(&self, loan_id: LoanId) -> Result<Option<Loan>>;

    /// Persist a new loan and return it with its store-assigned ID.
    async fn insert(&self, new_loan: NewLoan) -> Result<Loan>;

    /// Apply a partial update.
    ///
    /// Only the fields present in `changes` are written. Returns `None`
    /// when no row with `loan_id` exists.
    async fn update_partial(
        &self,
        loan_id: LoanId,
        changes: LoanChanges,
    ) -> Result<Option<Loan>>;

    /// Delete a loan, returning the number of rows removed.
    async fn delete(&self, loan_id: LoanId) -> Result<u64>;

    /// All loans, most recent loan date first.
    async fn find_all(&self) -> Result<Vec<Loan>>;

    /// Loans of one user, most recent loan date first.
    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Loan>>;

    /// Loans in the given status, most recent loan date first.
    async fn find_by_status(&self, status: LoanStatus) -> Result<Vec<Loan>>;
}
