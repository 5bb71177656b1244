use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::adapters::postgres::RankedBook;
use crate::api::error::ApiError;
use crate::api::handlers::AppState;

const DEFAULT_WINDOW_DAYS: i64 = 30;
const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub days: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RecommendedBookResponse {
    pub book_information_id: i32,
    pub title: String,
    pub author: String,
    pub image: Option<String>,
    pub borrow_count: i64,
}

impl From<RankedBook> for RecommendedBookResponse {
    fn from(ranked: RankedBook) -> Self {
        Self {
            book_information_id: ranked.book_information_id.value(),
            title: ranked.title,
            author: ranked.author,
            image: ranked.image,
            borrow_count: ranked.borrow_count,
        }
    }
}

/// GET /api/recommendations - 人気の書籍（貸出回数ランキング）
pub async fn recommendations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<Vec<RecommendedBookResponse>>, ApiError> {
    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let ranked = state.ranking.top_books(days, limit).await?;

    Ok(Json(
        ranked
            .into_iter()
            .map(RecommendedBookResponse::from)
            .collect(),
    ))
}
