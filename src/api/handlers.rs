use crate::application::loan::{
    LoanApplicationError, LoanFilter, ServiceDependencies, create_loan as execute_create_loan,
    delete_loan as execute_delete_loan, get_loan, list_loans as execute_list_loans,
    mark_lost as execute_mark_lost, return_loan as execute_return_loan,
    update_loan as execute_update_loan,
};
use crate::domain::{
    commands::MarkLost,
    value_objects::{LoanId, UserId},
};
use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    error::ApiError,
    extract::{AppJson, AppPath, AppQuery},
    types::{CreateLoanRequest, ListLoansQuery, LoanResponse, ReturnLoanRequest, UpdateLoanRequest},
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Command handlers (POST / PUT / DELETE)
// ============================================================================

/// POST /loans - 新しい貸出を作成
///
/// 強制されるビジネスルール:
/// - user_id と book_id が指定されていること（400）
/// - 書籍が存在すること（404）
/// - 返却期限は貸出日から30日後（週末は月曜日へ）
pub async fn create_loan(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateLoanRequest>,
) -> Result<(StatusCode, Json<LoanResponse>), ApiError> {
    let cmd = req.to_command(chrono::Utc::now())?;

    let loan = execute_create_loan(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(LoanResponse::from(loan))))
}

/// PUT /loans/:id/return - 返却（または紛失として処理）
///
/// 本文は省略可能。省略時は status = returned、actual_return_date = 現在時刻。
pub async fn return_loan(
    State(state): State<Arc<AppState>>,
    AppPath(loan_id): AppPath<Uuid>,
    body: Bytes,
) -> Result<Json<LoanResponse>, ApiError> {
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        ReturnLoanRequest::default()
    } else {
        serde_json::from_slice::<ReturnLoanRequest>(&body)
            .map_err(|e| LoanApplicationError::Validation(e.to_string()))?
    };
    let cmd = req.to_command(LoanId::from_uuid(loan_id), chrono::Utc::now())?;

    let loan = execute_return_loan(&state.service_deps, cmd).await?;

    Ok(Json(LoanResponse::from(loan)))
}

/// PUT /loans/:id/lost - 紛失にする
pub async fn mark_lost(
    State(state): State<Arc<AppState>>,
    AppPath(loan_id): AppPath<Uuid>,
) -> Result<Json<LoanResponse>, ApiError> {
    let cmd = MarkLost {
        loan_id: LoanId::from_uuid(loan_id),
    };

    let loan = execute_mark_lost(&state.service_deps, cmd).await?;

    Ok(Json(LoanResponse::from(loan)))
}

/// PUT /loans/:id - 管理者による訂正
///
/// 任意のフィールドの部分集合を受け付ける。終端状態からの遷移も可能。
pub async fn update_loan(
    State(state): State<Arc<AppState>>,
    AppPath(loan_id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateLoanRequest>,
) -> Result<Json<LoanResponse>, ApiError> {
    let cmd = req.to_command(LoanId::from_uuid(loan_id))?;

    let loan = execute_update_loan(&state.service_deps, cmd).await?;

    Ok(Json(LoanResponse::from(loan)))
}

/// DELETE /loans/:id - 貸出を削除
pub async fn delete_loan(
    State(state): State<Arc<AppState>>,
    AppPath(loan_id): AppPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    execute_delete_loan(&state.service_deps, LoanId::from_uuid(loan_id)).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /loans/:id - 貸出詳細をIDで取得
pub async fn get_loan_by_id(
    State(state): State<Arc<AppState>>,
    AppPath(loan_id): AppPath<Uuid>,
) -> Result<Json<LoanResponse>, ApiError> {
    let loan = get_loan(&state.service_deps, LoanId::from_uuid(loan_id)).await?;

    Ok(Json(LoanResponse::from(loan)))
}

/// GET /loans - オプションフィルタ付き貸出一覧取得
///
/// クエリパラメータ:
/// - user_id: 利用者IDでフィルタリング（オプション）
/// - status: ステータスでフィルタリング（on-loan, returned, lost）（オプション）
pub async fn list_loans(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<ListLoansQuery>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let filter = query.to_filter()?;

    let loans = execute_list_loans(&state.service_deps, filter).await?;

    Ok(Json(loans.into_iter().map(LoanResponse::from).collect()))
}

/// GET /loans/user/:user_id - 利用者の貸出一覧
pub async fn list_user_loans(
    State(state): State<Arc<AppState>>,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let filter = LoanFilter {
        user_id: Some(UserId::from_uuid(user_id)),
        status: None,
    };

    let loans = execute_list_loans(&state.service_deps, filter).await?;

    Ok(Json(loans.into_iter().map(LoanResponse::from).collect()))
}
