use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::error::ApiError;
use crate::api::extract::{AdminUser, AuthUser};
use crate::api::handlers::AppState;
use crate::api::types::{PageQuery, PageResponse};
use crate::application::BusinessError;
use crate::application::iot::IotMessage;
use crate::adapters::postgres::{BookItemSummary, QrCode};
use crate::domain::book::{BookInformation, BookStatus, Shelf};
use crate::domain::{BookInfoId, BookItemId};

// ============================================================================
// DTO
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct AcquireBookRequest {
    #[validate(length(min = 10, max = 17, message = "must be an ISBN-10 or ISBN-13"))]
    pub isbn: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct BookSearchQuery {
    pub keyword: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct QrScanQuery {
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct BookItemResponse {
    pub id: i32,
    pub book_information_id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub image: Option<String>,
    pub category: Option<i32>,
    pub status: String,
    pub purchase_at: DateTime<Utc>,
}

impl From<BookItemSummary> for BookItemResponse {
    fn from(summary: BookItemSummary) -> Self {
        Self {
            id: summary.item.id.value(),
            book_information_id: summary.item.book_information_id.value(),
            title: summary.title,
            author: summary.author,
            isbn: summary.isbn,
            image: summary.image,
            category: summary.category,
            status: summary.item.status.as_str().to_string(),
            purchase_at: summary.item.purchase_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookInformationResponse {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub isbn: String,
    pub published_at: Option<DateTime<Utc>>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub category: Option<i32>,
}

impl From<BookInformation> for BookInformationResponse {
    fn from(info: BookInformation) -> Self {
        Self {
            id: info.id.value(),
            title: info.title,
            author: info.author,
            publisher: info.publisher,
            isbn: info.isbn,
            published_at: info.published_at,
            image: info.image,
            description: info.description,
            category: info.category,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QrCodeResponse {
    pub id: i32,
    pub book_item_id: i32,
    pub qr_value: String,
}

impl From<QrCode> for QrCodeResponse {
    fn from(qr: QrCode) -> Self {
        Self {
            id: qr.id,
            book_item_id: qr.book_item_id,
            qr_value: qr.qr_value,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub book_item_id: i32,
    pub shelf: Shelf,
    /// 位置表示を受け取ったデバイス数
    pub notified_devices: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/admin/books - 受入（ISBNから蔵書を追加）
pub async fn acquire_book(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Json(req): Json<AcquireBookRequest>,
) -> Result<(StatusCode, Json<BookItemResponse>), ApiError> {
    req.validate()?;

    let (item, info) = state.catalog.create_item(&req.isbn).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookItemResponse {
            id: item.id.value(),
            book_information_id: info.id.value(),
            title: info.title,
            author: info.author,
            isbn: info.isbn,
            image: info.image,
            category: info.category,
            status: item.status.as_str().to_string(),
            purchase_at: item.purchase_at,
        }),
    ))
}

/// GET /api/books - 蔵書一覧（キーワード検索・ページング）
pub async fn search_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookSearchQuery>,
) -> Result<Json<PageResponse<BookItemResponse>>, ApiError> {
    let (limit, offset, page, size) = PageQuery {
        page: query.page,
        size: query.size,
    }
    .resolve();

    let (items, total) = state
        .catalog
        .search_items(query.keyword.as_deref(), limit, offset)
        .await?;

    let content = items.into_iter().map(BookItemResponse::from).collect();
    Ok(Json(PageResponse::new(content, page, size, total)))
}

/// GET /api/books/:id - 蔵書詳細
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<BookItemResponse>, ApiError> {
    let summary = state.catalog.get_item(BookItemId::from_raw(id)).await?;
    Ok(Json(BookItemResponse::from(summary)))
}

/// GET /api/books/info/:id - 書誌情報
pub async fn get_book_information(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<BookInformationResponse>, ApiError> {
    let info = state
        .catalog
        .get_information(BookInfoId::from_raw(id))
        .await?;
    Ok(Json(BookInformationResponse::from(info)))
}

/// PATCH /api/admin/books/:id/status - 管理者によるステータス変更
pub async fn update_book_status(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i32>,
    Json(req): Json<UpdateBookStatusRequest>,
) -> Result<StatusCode, ApiError> {
    let status = BookStatus::from_str(&req.status)
        .map_err(|e| BusinessError::InvalidInput(e))?;

    state
        .catalog
        .update_item_status(BookItemId::from_raw(id), status)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/admin/books/:id - 除籍（ソフトデリート）
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete_item(BookItemId::from_raw(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/admin/books/:id/qrcodes - QRコード発行
pub async fn create_qr_code(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<QrCodeResponse>), ApiError> {
    let qr = state
        .catalog
        .create_qr_code(BookItemId::from_raw(id))
        .await?;
    Ok((StatusCode::CREATED, Json(QrCodeResponse::from(qr))))
}

/// GET /api/books/:id/qrcodes - 蔵書のQRコード
pub async fn get_qr_code(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<QrCodeResponse>, ApiError> {
    let qr = state
        .catalog
        .qr_code_for_item(BookItemId::from_raw(id))
        .await?;
    Ok(Json(QrCodeResponse::from(qr)))
}

/// GET /api/books/qrcodes/scan?value= - QR値から蔵書を逆引き
pub async fn scan_qr_code(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QrScanQuery>,
) -> Result<Json<BookItemResponse>, ApiError> {
    let summary = state.catalog.find_item_by_qr(&query.value).await?;
    Ok(Json(BookItemResponse::from(summary)))
}

/// POST /api/books/:id/location - 書架LEDで位置を表示する
///
/// 所在書架を引き、接続中の全IoTデバイスへ BOOK_LOCATION を
/// ブロードキャストする。
pub async fn show_book_location(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<LocationResponse>, ApiError> {
    let (summary, shelf) = state.catalog.locate_item(BookItemId::from_raw(id)).await?;

    let message = IotMessage::book_location(summary.item.id.value().to_string(), shelf.clone());
    let notified = state.hub.broadcast(&message).await;

    Ok(Json(LocationResponse {
        book_item_id: summary.item.id.value(),
        shelf,
        notified_devices: notified,
    }))
}
