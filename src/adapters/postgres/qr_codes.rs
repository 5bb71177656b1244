use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::domain::BookItemId;

/// QRコード - 蔵書1冊につき1件
#[derive(Debug, Clone, FromRow)]
pub struct QrCode {
    pub id: i32,
    pub book_item_id: i32,
    pub qr_value: String,
    pub created_at: DateTime<Utc>,
}

const QR_COLUMNS: &str = "id, book_item_id, qr_value, created_at";

/// QRコードリポジトリ
#[derive(Clone)]
pub struct QrCodeRepository {
    pool: PgPool,
}

impl QrCodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, book_item_id: BookItemId, qr_value: &str) -> sqlx::Result<QrCode> {
        sqlx::query_as(&format!(
            "INSERT INTO qr_codes (book_item_id, qr_value) VALUES ($1, $2) \
             RETURNING {QR_COLUMNS}"
        ))
        .bind(book_item_id.value())
        .bind(qr_value)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_item(&self, book_item_id: BookItemId) -> sqlx::Result<Option<QrCode>> {
        sqlx::query_as(&format!(
            "SELECT {QR_COLUMNS} FROM qr_codes WHERE book_item_id = $1"
        ))
        .bind(book_item_id.value())
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_by_value(&self, qr_value: &str) -> sqlx::Result<Option<QrCode>> {
        sqlx::query_as(&format!(
            "SELECT {QR_COLUMNS} FROM qr_codes WHERE qr_value = $1"
        ))
        .bind(qr_value)
        .fetch_optional(&self.pool)
        .await
    }
}
