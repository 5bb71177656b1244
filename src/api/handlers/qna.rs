use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::adapters::postgres::{Qna, QnaComment};
use crate::api::error::ApiError;
use crate::api::extract::AuthUser;
use crate::api::handlers::AppState;
use crate::api::types::{PageQuery, PageResponse};
use crate::application::qna::QnaDetail;

#[derive(Debug, Deserialize, Validate)]
pub struct QnaRequest {
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct QnaResponse {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Qna> for QnaResponse {
    fn from(qna: Qna) -> Self {
        Self {
            id: qna.id,
            title: qna.title,
            content: qna.content,
            author_id: qna.author_id,
            created_at: qna.created_at,
            updated_at: qna.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i32,
    pub qna_id: i32,
    pub author_id: i32,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<QnaComment> for CommentResponse {
    fn from(comment: QnaComment) -> Self {
        Self {
            id: comment.id,
            qna_id: comment.qna_id,
            author_id: comment.author_id,
            content: comment.content,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QnaDetailResponse {
    #[serde(flatten)]
    pub qna: QnaResponse,
    /// 回答が付いているかどうか
    pub answered: bool,
    pub comments: Vec<CommentResponse>,
}

impl From<QnaDetail> for QnaDetailResponse {
    fn from(detail: QnaDetail) -> Self {
        Self {
            qna: QnaResponse::from(detail.qna),
            answered: !detail.comments.is_empty(),
            comments: detail
                .comments
                .into_iter()
                .map(CommentResponse::from)
                .collect(),
        }
    }
}

/// POST /api/qna - 質問の投稿
pub async fn create_qna(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(req): Json<QnaRequest>,
) -> Result<(StatusCode, Json<QnaResponse>), ApiError> {
    req.validate()?;

    let qna = state.qna.create(&user, &req.title, &req.content).await?;
    Ok((StatusCode::CREATED, Json(QnaResponse::from(qna))))
}

/// GET /api/qna - 質問一覧（管理者は全件、本人は自分の質問のみ）
pub async fn list_qna(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<PageResponse<QnaResponse>>, ApiError> {
    let (limit, offset, page_no, size) = page.resolve();

    let (qnas, total) = state.qna.list(&user, limit, offset).await?;
    let content = qnas.into_iter().map(QnaResponse::from).collect();

    Ok(Json(PageResponse::new(content, page_no, size, total)))
}

/// GET /api/qna/:id - 質問詳細（コメント付き）
pub async fn get_qna(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<QnaDetailResponse>, ApiError> {
    let detail = state.qna.detail(id, &user).await?;
    Ok(Json(QnaDetailResponse::from(detail)))
}

/// PUT /api/qna/:id - 質問の更新（作成者のみ）
pub async fn update_qna(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
    Json(req): Json<QnaRequest>,
) -> Result<StatusCode, ApiError> {
    req.validate()?;

    state.qna.update(id, &user, &req.title, &req.content).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/qna/:id - 質問の削除（作成者または管理者）
pub async fn delete_qna(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.qna.delete(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/qna/:id/comments - コメント（回答）の追加
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
    Json(req): Json<CommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    req.validate()?;

    let comment = state.qna.add_comment(id, &user, &req.content).await?;
    Ok((StatusCode::CREATED, Json(CommentResponse::from(comment))))
}

/// PUT /api/qna/comments/:id - コメントの更新（作成者のみ）
pub async fn update_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
    Json(req): Json<CommentRequest>,
) -> Result<StatusCode, ApiError> {
    req.validate()?;

    state.qna.update_comment(id, &user, &req.content).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/qna/comments/:id - コメントの削除（作成者または管理者）
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.qna.delete_comment(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
