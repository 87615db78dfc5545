use axum::{
    Router,
    routing::{get, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_loan, delete_loan, get_loan_by_id, list_loans, list_user_loans, mark_lost,
    return_loan, update_loan,
};

/// Creates the API router with all loan endpoints
///
/// Query endpoints:
/// - GET /loans - List loans, optionally filtered by user_id and status
/// - GET /loans/user/:user_id - Loans of one user
/// - GET /loans/:id - Get loan details
///
/// Command endpoints:
/// - POST /loans - Create a new loan
/// - PUT /loans/:id/return - Return a loan (returned or lost)
/// - PUT /loans/:id/lost - Mark a loan as lost
/// - PUT /loans/:id - Administrative correction
/// - DELETE /loans/:id - Delete a loan
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route("/loans", get(list_loans).post(create_loan))
        .route("/loans/user/:user_id", get(list_user_loans))
        .route(
            "/loans/:id",
            get(get_loan_by_id).put(update_loan).delete(delete_loan),
        )
        .route("/loans/:id/return", put(return_loan))
        .route("/loans/:id/lost", put(mark_lost))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
