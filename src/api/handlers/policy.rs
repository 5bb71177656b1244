use std::sync::Arc;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::extract::AdminUser;
use crate::api::handlers::AppState;
use crate::domain::policy::LoanPolicy;

#[derive(Debug, Deserialize)]
pub struct LoanPolicyRequest {
    pub max_books: i32,
    pub loan_period_days: i32,
}

#[derive(Debug, Deserialize)]
pub struct MaxBooksRequest {
    pub max_books: i32,
}

#[derive(Debug, Deserialize)]
pub struct LoanPeriodRequest {
    pub loan_period_days: i32,
}

#[derive(Debug, Serialize)]
pub struct LoanPolicyResponse {
    pub max_books: i32,
    pub loan_period_days: i32,
}

impl From<LoanPolicy> for LoanPolicyResponse {
    fn from(policy: LoanPolicy) -> Self {
        Self {
            max_books: policy.max_books,
            loan_period_days: policy.loan_period_days,
        }
    }
}

/// GET /api/loan-policy - 現在の貸出ポリシー
pub async fn get_policy(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LoanPolicyResponse>, ApiError> {
    let policy = state.policy.current().await?;
    Ok(Json(LoanPolicyResponse::from(policy)))
}

/// PUT /api/admin/loan-policy - ポリシー全体の更新（管理者）
pub async fn update_policy(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Json(req): Json<LoanPolicyRequest>,
) -> Result<Json<LoanPolicyResponse>, ApiError> {
    let policy = state
        .policy
        .update_policy(req.max_books, req.loan_period_days)
        .await?;
    Ok(Json(LoanPolicyResponse::from(policy)))
}

/// PATCH /api/admin/loan-policy/max-books - 上限冊数の更新（管理者）
pub async fn update_max_books(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Json(req): Json<MaxBooksRequest>,
) -> Result<Json<LoanPolicyResponse>, ApiError> {
    let policy = state.policy.update_max_books(req.max_books).await?;
    Ok(Json(LoanPolicyResponse::from(policy)))
}

/// PATCH /api/admin/loan-policy/loan-period - 貸出期間の更新（管理者）
pub async fn update_loan_period(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Json(req): Json<LoanPeriodRequest>,
) -> Result<Json<LoanPolicyResponse>, ApiError> {
    let policy = state.policy.update_loan_period(req.loan_period_days).await?;
    Ok(Json(LoanPolicyResponse::from(policy)))
}
