use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::extract::AdminUser;
use crate::api::handlers::AppState;
use crate::domain::ShelfId;
use crate::domain::book::Shelf;

#[derive(Debug, Deserialize)]
pub struct ShelfRequest {
    pub shelf_number: i32,
    pub line_number: i32,
    pub category: Option<i32>,
}

/// GET /api/shelves - 書架一覧
pub async fn list_shelves(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Shelf>>, ApiError> {
    Ok(Json(state.catalog.list_shelves().await?))
}

/// POST /api/admin/shelves - 書架の作成（管理者）
pub async fn create_shelf(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Json(req): Json<ShelfRequest>,
) -> Result<(StatusCode, Json<Shelf>), ApiError> {
    let shelf = state
        .catalog
        .create_shelf(req.shelf_number, req.line_number, req.category)
        .await?;
    Ok((StatusCode::CREATED, Json(shelf)))
}

/// PUT /api/admin/shelves/:id - 書架の更新（管理者）
pub async fn update_shelf(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i32>,
    Json(req): Json<ShelfRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .catalog
        .update_shelf(
            ShelfId::from_raw(id),
            req.shelf_number,
            req.line_number,
            req.category,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/admin/shelves/:id - 書架の削除（管理者）
pub async fn delete_shelf(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete_shelf(ShelfId::from_raw(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
