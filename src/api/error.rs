use crate::application::loan::LoanApplicationError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(LoanApplicationError);

impl From<LoanApplicationError> for ApiError {
    fn from(err: LoanApplicationError) -> Self {
        ApiError(err)
    }
}

// 抽出時の失敗（不正なID・日付・JSON）は入力の検証エラーとして扱う
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(LoanApplicationError::Validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError(LoanApplicationError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(LoanApplicationError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self.0 {
            // 404 Not Found - 参照された貸出・書籍が存在しない
            LoanApplicationError::LoanNotFound => (
                StatusCode::NOT_FOUND,
                "LOAN_NOT_FOUND",
                "Loan not found".to_string(),
            ),
            LoanApplicationError::BookNotFound => (
                StatusCode::NOT_FOUND,
                "BOOK_NOT_FOUND",
                "Book not found".to_string(),
            ),

            // 400 Bad Request - クライアント側の入力誤り
            LoanApplicationError::InvalidStatus(ref status) => (
                StatusCode::BAD_REQUEST,
                "INVALID_STATUS",
                format!("Invalid loan status: {}", status),
            ),
            LoanApplicationError::Validation(ref msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            LoanApplicationError::LoanStoreError(ref e) => {
                tracing::error!("Loan store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LOAN_STORE_ERROR",
                    "Failed to access loan records".to_string(),
                )
            }
            LoanApplicationError::BookCatalogError(ref e) => {
                tracing::error!("Book catalog error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "BOOK_CATALOG_ERROR",
                    "Book catalog error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
