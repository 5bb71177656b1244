use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::adapters::postgres::Notice;
use crate::api::error::ApiError;
use crate::api::extract::AdminUser;
use crate::api::handlers::AppState;
use crate::api::types::{PageQuery, PageResponse};

#[derive(Debug, Deserialize, Validate)]
pub struct NoticeRequest {
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct NoticeSearchQuery {
    pub keyword: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct NoticeResponse {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub view_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Notice> for NoticeResponse {
    fn from(notice: Notice) -> Self {
        Self {
            id: notice.id,
            title: notice.title,
            content: notice.content,
            view_count: notice.view_count,
            created_at: notice.created_at,
            updated_at: notice.updated_at,
        }
    }
}

/// GET /api/notices - お知らせ一覧（検索付き）
pub async fn list_notices(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NoticeSearchQuery>,
) -> Result<Json<PageResponse<NoticeResponse>>, ApiError> {
    let (limit, offset, page, size) = PageQuery {
        page: query.page,
        size: query.size,
    }
    .resolve();

    let (notices, total) = state
        .notices
        .list(query.keyword.as_deref(), limit, offset)
        .await?;

    let content = notices.into_iter().map(NoticeResponse::from).collect();
    Ok(Json(PageResponse::new(content, page, size, total)))
}

/// GET /api/notices/:id - お知らせ詳細（閲覧数を加算）
pub async fn get_notice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<NoticeResponse>, ApiError> {
    let notice = state.notices.read(id).await?;
    Ok(Json(NoticeResponse::from(notice)))
}

/// POST /api/admin/notices - お知らせ作成（管理者）
pub async fn create_notice(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Json(req): Json<NoticeRequest>,
) -> Result<(StatusCode, Json<NoticeResponse>), ApiError> {
    req.validate()?;

    let notice = state.notices.create(&req.title, &req.content).await?;
    Ok((StatusCode::CREATED, Json(NoticeResponse::from(notice))))
}

/// PUT /api/admin/notices/:id - お知らせ更新（管理者）
pub async fn update_notice(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i32>,
    Json(req): Json<NoticeRequest>,
) -> Result<StatusCode, ApiError> {
    req.validate()?;

    state.notices.update(id, &req.title, &req.content).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/admin/notices/:id - お知らせ削除（管理者・ソフトデリート）
pub async fn delete_notice(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.notices.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
