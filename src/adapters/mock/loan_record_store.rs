use crate::domain::{
    loan::{Loan, LoanChanges, NewLoan},
    value_objects::{LoanId, LoanStatus, UserId},
};
use crate::ports::loan_record_store::{LoanRecordStore as LoanRecordStoreTrait, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory implementation of LoanRecordStore
///
/// Each operation holds the lock for its whole duration, so a single
/// `update_partial` is atomic per row.
pub struct LoanRecordStore {
    loans: Mutex<HashMap<LoanId, Loan>>,
}

impl LoanRecordStore {
    pub fn new() -> Self {
        Self {
            loans: Mutex::new(HashMap::new()),
        }
    }

    /// Number of stored loans
    pub fn len(&self) -> usize {
        self.loans.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store a loan as-is, bypassing the lifecycle (test fixtures)
    pub fn put(&self, loan: Loan) {
        self.loans.lock().unwrap().insert(loan.loan_id, loan);
    }

    fn select(&self, predicate: impl Fn(&Loan) -> bool) -> Vec<Loan> {
        let mut loans: Vec<Loan> = self
            .loans
            .lock()
            .unwrap()
            .values()
            .filter(|loan| predicate(loan))
            .cloned()
            .collect();
        loans.sort_by(|a, b| b.loan_date.cmp(&a.loan_date));
        loans
    }
}

impl Default for LoanRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LoanRecordStoreTrait for LoanRecordStore {
    async fn find_by_id(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        Ok(self.loans.lock().unwrap().get(&loan_id).cloned())
    }

    async fn insert(&self, new_loan: NewLoan) -> Result<Loan> {
        let loan = new_loan.into_loan(LoanId::new(), Utc::now());
        self.loans
            .lock()
            .unwrap()
            .insert(loan.loan_id, loan.clone());
        Ok(loan)
    }

    async fn update_partial(
        &self,
        loan_id: LoanId,
        changes: LoanChanges,
    ) -> Result<Option<Loan>> {
        let mut loans = self.loans.lock().unwrap();
        let Some(current) = loans.get_mut(&loan_id) else {
            return Ok(None);
        };
        *current = changes.apply_to(current, Utc::now());
        Ok(Some(current.clone()))
    }

    async fn delete(&self, loan_id: LoanId) -> Result<u64> {
        let removed = self.loans.lock().unwrap().remove(&loan_id);
        Ok(u64::from(removed.is_some()))
    }

    async fn find_all(&self) -> Result<Vec<Loan>> {
        Ok(self.select(|_| true))
    }

    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Loan>> {
        Ok(self.select(|loan| loan.user_id == user_id))
    }

    async fn find_by_status(&self, status: LoanStatus) -> Result<Vec<Loan>> {
        Ok(self.select(|loan| loan.status == status))
    }
}
