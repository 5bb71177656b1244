use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

/// お知らせ
#[derive(Debug, Clone, FromRow)]
pub struct Notice {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub view_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const NOTICE_COLUMNS: &str = "id, title, content, view_count, created_at, updated_at";

/// お知らせリポジトリ（ソフトデリート）
#[derive(Clone)]
pub struct NoticeRepository {
    pool: PgPool,
}

impl NoticeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, title: &str, content: &str) -> sqlx::Result<Notice> {
        sqlx::query_as(&format!(
            "INSERT INTO notices (title, content) VALUES ($1, $2) RETURNING {NOTICE_COLUMNS}"
        ))
        .bind(title)
        .bind(content)
        .fetch_one(&self.pool)
        .await
    }

    /// キーワード検索付き一覧（タイトル・本文への部分一致）
    pub async fn page(
        &self,
        keyword: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<(Vec<Notice>, i64)> {
        let pattern = keyword.map(|k| format!("%{}%", k));

        let notices: Vec<Notice> = sqlx::query_as(&format!(
            "SELECT {NOTICE_COLUMNS} FROM notices \
             WHERE deleted = FALSE \
               AND ($1::text IS NULL OR title ILIKE $1 OR content ILIKE $1) \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notices WHERE deleted = FALSE \
             AND ($1::text IS NULL OR title ILIKE $1 OR content ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((notices, total))
    }

    pub async fn find_by_id(&self, id: i32) -> sqlx::Result<Option<Notice>> {
        sqlx::query_as(&format!(
            "SELECT {NOTICE_COLUMNS} FROM notices WHERE id = $1 AND deleted = FALSE"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// 閲覧数を加算する
    pub async fn increment_view_count(&self, id: i32) -> sqlx::Result<u64> {
        let result = sqlx::query(
            "UPDATE notices SET view_count = view_count + 1 WHERE id = $1 AND deleted = FALSE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn update(&self, id: i32, title: &str, content: &str) -> sqlx::Result<u64> {
        let result = sqlx::query(
            "UPDATE notices SET title = $2, content = $3, updated_at = NOW() \
             WHERE id = $1 AND deleted = FALSE",
        )
        .bind(id)
        .bind(title)
        .bind(content)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn soft_delete(&self, id: i32) -> sqlx::Result<u64> {
        let result = sqlx::query(
            "UPDATE notices SET deleted = TRUE, updated_at = NOW() \
             WHERE id = $1 AND deleted = FALSE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
