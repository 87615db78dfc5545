pub mod book_catalog;
pub mod loan_record_store;

pub use book_catalog::BookCatalog;
pub use loan_record_store::LoanRecordStore;
