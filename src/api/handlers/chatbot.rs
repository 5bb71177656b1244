use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::adapters::postgres::ChatbotFeedback;
use crate::api::error::ApiError;
use crate::api::extract::{AdminUser, AuthUser};
use crate::api::handlers::AppState;
use crate::api::types::{PageQuery, PageResponse};
use crate::application::chatbot::ChatAnswer;

#[derive(Debug, Deserialize, Validate)]
pub struct ChatMessageRequest {
    #[validate(length(min = 1, max = 500, message = "must be between 1 and 500 characters"))]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatMessageResponse {
    pub message: String,
    pub intent: Option<String>,
    pub quick_replies: Vec<String>,
    pub fallback: bool,
}

impl From<ChatAnswer> for ChatMessageResponse {
    fn from(answer: ChatAnswer) -> Self {
        Self {
            message: answer.message,
            intent: answer.intent,
            quick_replies: answer.quick_replies,
            fallback: answer.fallback,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct FeedbackRequest {
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub category: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub id: i32,
    pub user_id: i32,
    pub category: String,
    pub content: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<ChatbotFeedback> for FeedbackResponse {
    fn from(feedback: ChatbotFeedback) -> Self {
        Self {
            id: feedback.id,
            user_id: feedback.user_id,
            category: feedback.category,
            content: feedback.content,
            status: feedback.status,
            created_at: feedback.created_at,
        }
    }
}

/// POST /api/chatbot/messages - チャットボットへの問い合わせ
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(req): Json<ChatMessageRequest>,
) -> Result<Json<ChatMessageResponse>, ApiError> {
    req.validate()?;

    let answer = state.chatbot.ask(user.id, &req.message).await?;
    Ok(Json(ChatMessageResponse::from(answer)))
}

/// POST /api/chatbot/feedbacks - フィードバックの投稿
pub async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(req): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackResponse>), ApiError> {
    req.validate()?;

    let feedback = state
        .chatbot
        .submit_feedback(user.id, &req.category, &req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(FeedbackResponse::from(feedback))))
}

/// GET /api/admin/chatbot/feedbacks - フィードバック一覧（管理者）
pub async fn list_feedback(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<PageResponse<FeedbackResponse>>, ApiError> {
    let (limit, offset, page_no, size) = page.resolve();

    let (feedbacks, total) = state.chatbot.list_feedback(limit, offset).await?;
    let content = feedbacks.into_iter().map(FeedbackResponse::from).collect();

    Ok(Json(PageResponse::new(content, page_no, size, total)))
}

/// PATCH /api/admin/chatbot/feedbacks/:id/resolve - フィードバックの解決（管理者）
pub async fn resolve_feedback(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.chatbot.resolve_feedback(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
