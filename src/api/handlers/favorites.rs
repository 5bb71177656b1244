use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::adapters::postgres::FavoriteView;
use crate::api::error::ApiError;
use crate::api::extract::AuthUser;
use crate::api::handlers::AppState;
use crate::api::types::{PageQuery, PageResponse};
use crate::application::favorites::FavoriteToggle;
use crate::domain::BookItemId;

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub book_item_id: i32,
    pub favorited: bool,
}

#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub book_item_id: i32,
    pub title: String,
    pub author: String,
    pub image: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<FavoriteView> for FavoriteResponse {
    fn from(view: FavoriteView) -> Self {
        Self {
            book_item_id: view.book_item_id.value(),
            title: view.title,
            author: view.author,
            image: view.image,
            status: view.status,
            created_at: view.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FavoriteCountResponse {
    pub book_item_id: i32,
    pub count: i64,
    pub favorited: bool,
}

/// POST /api/favorites/:book_item_id - お気に入りのトグル
pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(book_item_id): Path<i32>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let outcome = state
        .favorites
        .toggle(user.id, BookItemId::from_raw(book_item_id))
        .await?;

    Ok(Json(ToggleResponse {
        book_item_id,
        favorited: outcome == FavoriteToggle::Added,
    }))
}

/// GET /api/favorites - 自分のお気に入り一覧
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<PageResponse<FavoriteResponse>>, ApiError> {
    let (limit, offset, page_no, size) = page.resolve();

    let (views, total) = state.favorites.list(user.id, limit, offset).await?;
    let content = views.into_iter().map(FavoriteResponse::from).collect();

    Ok(Json(PageResponse::new(content, page_no, size, total)))
}

/// GET /api/favorites/:book_item_id/count - 蔵書のお気に入り数と自分の状態
pub async fn favorite_count(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(book_item_id): Path<i32>,
) -> Result<Json<FavoriteCountResponse>, ApiError> {
    let item_id = BookItemId::from_raw(book_item_id);

    let count = state.favorites.count_for_item(item_id).await?;
    let favorited = state.favorites.is_favorite(user.id, item_id).await?;

    Ok(Json(FavoriteCountResponse {
        book_item_id,
        count,
        favorited,
    }))
}
