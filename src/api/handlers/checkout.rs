use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::adapters::postgres::{AdminBorrowSummary, BorrowSummary};
use crate::api::error::ApiError;
use crate::api::extract::{AdminUser, AuthUser};
use crate::api::handlers::AppState;
use crate::api::types::{PageQuery, PageResponse};
use crate::application::checkout::{BorrowReceipt, ReturnReceipt};
use crate::domain::{BookItemId, HistoryId};

// ============================================================================
// DTO
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct BorrowRequest {
    pub book_item_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct ReturnRequest {
    pub history_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct CurrentBorrowQuery {
    pub overdue_only: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub overdue: Option<bool>,
    pub user_name: Option<String>,
    pub company_id: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl HistoryQuery {
    /// 日付範囲をタイムスタンプ範囲へ広げる（終端は当日の終わり）
    fn range(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let from = self
            .start_date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .unwrap_or_else(|| Utc::now() - Duration::days(365));
        let to = self
            .end_date
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);
        (from, to)
    }
}

#[derive(Debug, Serialize)]
pub struct BorrowResponse {
    pub history_id: i32,
    pub book_item_id: i32,
    pub borrowed_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

impl From<BorrowReceipt> for BorrowResponse {
    fn from(receipt: BorrowReceipt) -> Self {
        Self {
            history_id: receipt.history.id.value(),
            book_item_id: receipt.history.book_item_id.value(),
            borrowed_at: receipt.history.borrowed_at,
            due_date: receipt.due_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReturnResponse {
    pub history_id: i32,
    pub book_item_id: i32,
    pub returned_at: DateTime<Utc>,
    pub overdue: bool,
}

impl From<ReturnReceipt> for ReturnResponse {
    fn from(receipt: ReturnReceipt) -> Self {
        Self {
            history_id: receipt.history_id.value(),
            book_item_id: receipt.book_item_id.value(),
            returned_at: receipt.returned_at,
            overdue: receipt.overdue,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BorrowSummaryResponse {
    pub history_id: i32,
    pub book_item_id: i32,
    pub title: String,
    pub author: String,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub overdue: bool,
}

impl From<BorrowSummary> for BorrowSummaryResponse {
    fn from(summary: BorrowSummary) -> Self {
        Self {
            history_id: summary.history.id.value(),
            book_item_id: summary.history.book_item_id.value(),
            title: summary.title,
            author: summary.author,
            borrowed_at: summary.history.borrowed_at,
            returned_at: summary.history.returned_at,
            overdue: summary.history.overdue,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminBorrowSummaryResponse {
    pub history_id: i32,
    pub book_item_id: i32,
    pub title: String,
    pub email: String,
    pub user_name: Option<String>,
    pub company_id: Option<String>,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub overdue: bool,
}

impl From<AdminBorrowSummary> for AdminBorrowSummaryResponse {
    fn from(summary: AdminBorrowSummary) -> Self {
        Self {
            history_id: summary.history.id.value(),
            book_item_id: summary.history.book_item_id.value(),
            title: summary.title,
            email: summary.email,
            user_name: summary.user_name,
            company_id: summary.company_id,
            borrowed_at: summary.history.borrowed_at,
            returned_at: summary.history.returned_at,
            overdue: summary.history.overdue,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub marked_overdue: u64,
}

#[derive(Debug, Serialize)]
pub struct ReminderResponse {
    pub reminded: u64,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/borrow - 蔵書を借りる
///
/// 強制されるビジネスルール:
/// - 蔵書が存在し AVAILABLE であること
/// - オープンな貸出数がポリシー上限未満であること
pub async fn borrow_book(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(req): Json<BorrowRequest>,
) -> Result<(StatusCode, Json<BorrowResponse>), ApiError> {
    let receipt = state
        .checkout
        .borrow(user.id, BookItemId::from_raw(req.book_item_id))
        .await?;

    Ok((StatusCode::CREATED, Json(BorrowResponse::from(receipt))))
}

/// POST /api/return - 履歴IDで返却する
pub async fn return_book(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Json(req): Json<ReturnRequest>,
) -> Result<Json<ReturnResponse>, ApiError> {
    let receipt = state
        .checkout
        .return_by_history(HistoryId::from_raw(req.history_id))
        .await?;

    Ok(Json(ReturnResponse::from(receipt)))
}

/// GET /api/borrow/current - 現在借りている蔵書
pub async fn current_borrows(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(query): Query<CurrentBorrowQuery>,
) -> Result<Json<Vec<BorrowSummaryResponse>>, ApiError> {
    let summaries = state
        .checkout
        .current_borrows(user.id, query.overdue_only.unwrap_or(false))
        .await?;

    Ok(Json(
        summaries
            .into_iter()
            .map(BorrowSummaryResponse::from)
            .collect(),
    ))
}

/// GET /api/borrow/history - 自分の貸出履歴
pub async fn user_history(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<PageResponse<BorrowSummaryResponse>>, ApiError> {
    let (from, to) = query.range();
    let (limit, offset, page, size) = PageQuery {
        page: query.page,
        size: query.size,
    }
    .resolve();

    let (summaries, total) = state
        .checkout
        .user_history(user.id, from, to, query.overdue, limit, offset)
        .await?;

    let content = summaries
        .into_iter()
        .map(BorrowSummaryResponse::from)
        .collect();
    Ok(Json(PageResponse::new(content, page, size, total)))
}

/// GET /api/admin/borrow/history - 全体の貸出履歴（管理者）
pub async fn admin_history(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<PageResponse<AdminBorrowSummaryResponse>>, ApiError> {
    let (from, to) = query.range();
    let (limit, offset, page, size) = PageQuery {
        page: query.page,
        size: query.size,
    }
    .resolve();

    let (summaries, total) = state
        .checkout
        .admin_history(
            from,
            to,
            query.user_name.as_deref(),
            query.company_id.as_deref(),
            query.overdue,
            limit,
            offset,
        )
        .await?;

    let content = summaries
        .into_iter()
        .map(AdminBorrowSummaryResponse::from)
        .collect();
    Ok(Json(PageResponse::new(content, page, size, total)))
}

/// POST /api/admin/overdue/sweep - 延滞スイープの実行（管理者）
pub async fn sweep_overdue(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<SweepResponse>, ApiError> {
    let marked_overdue = state.checkout.sweep_overdue().await?;
    Ok(Json(SweepResponse { marked_overdue }))
}

/// POST /api/admin/reminders/return-deadline - 期限前日リマインドの送信（管理者）
pub async fn remind_return_deadlines(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<ReminderResponse>, ApiError> {
    let reminded = state.checkout.remind_return_deadlines().await?;
    Ok(Json(ReminderResponse { reminded }))
}
