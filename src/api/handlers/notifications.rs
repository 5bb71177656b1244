use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::extract::AuthUser;
use crate::api::handlers::AppState;
use crate::api::types::{PageQuery, PageResponse};
use crate::domain::notification::Notification;

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: i32,
    pub content: String,
    pub kind: String,
    pub resource_id: Option<i32>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id,
            content: notification.content,
            kind: notification.kind.as_str().to_string(),
            resource_id: notification.resource_id,
            status: notification.status.as_str().to_string(),
            created_at: notification.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UnreadResponse {
    pub has_unread: bool,
}

/// GET /api/notifications - 自分の通知一覧
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<PageResponse<NotificationResponse>>, ApiError> {
    let (limit, offset, page_no, size) = page.resolve();

    let (notifications, total) = state.notifications.list(user.id, limit, offset).await?;
    let content = notifications
        .into_iter()
        .map(NotificationResponse::from)
        .collect();

    Ok(Json(PageResponse::new(content, page_no, size, total)))
}

/// GET /api/notifications/unread - 未読の有無
pub async fn has_unread(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<UnreadResponse>, ApiError> {
    let has_unread = state.notifications.has_unread(user.id).await?;
    Ok(Json(UnreadResponse { has_unread }))
}

/// GET /api/notifications/:id - 通知詳細
pub async fn get_notification(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let notification = state.notifications.get(id, &user).await?;
    Ok(Json(NotificationResponse::from(notification)))
}

/// PATCH /api/notifications/:id/read - 既読化
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.notifications.mark_read(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/notifications/:id - 削除（DELETE状態への遷移）
pub async fn delete_notification(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.notifications.mark_deleted(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
