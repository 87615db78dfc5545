pub mod book_catalog;
pub mod loan_record_store;

// パブリックに型を再エクスポート
pub use book_catalog::BookCatalog as PostgresBookCatalog;
pub use loan_record_store::LoanRecordStore as PostgresLoanRecordStore;
