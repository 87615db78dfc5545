mod errors;
mod loan_service;

pub use errors::{LoanApplicationError, Result};
pub use loan_service::{
    LoanFilter, ServiceDependencies, create_loan, delete_loan, get_loan, list_loans, mark_lost,
    return_loan, update_loan,
};
