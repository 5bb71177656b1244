use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::domain::UserId;

/// 質問
#[derive(Debug, Clone, FromRow)]
pub struct Qna {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 質問へのコメント（回答）
#[derive(Debug, Clone, FromRow)]
pub struct QnaComment {
    pub id: i32,
    pub qna_id: i32,
    pub author_id: i32,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const QNA_COLUMNS: &str = "id, title, content, author_id, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, qna_id, author_id, content, created_at, updated_at";

/// QnAリポジトリ（質問・コメントともソフトデリート）
#[derive(Clone)]
pub struct QnaRepository {
    pool: PgPool,
}

impl QnaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        author_id: UserId,
        title: &str,
        content: &str,
    ) -> sqlx::Result<Qna> {
        sqlx::query_as(&format!(
            "INSERT INTO qnas (title, content, author_id) VALUES ($1, $2, $3) \
             RETURNING {QNA_COLUMNS}"
        ))
        .bind(title)
        .bind(content)
        .bind(author_id.value())
        .fetch_one(&self.pool)
        .await
    }

    /// 一覧（author_id指定時は本人の質問のみ）
    pub async fn page(
        &self,
        author_id: Option<UserId>,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<(Vec<Qna>, i64)> {
        let author = author_id.map(|id| id.value());

        let qnas: Vec<Qna> = sqlx::query_as(&format!(
            "SELECT {QNA_COLUMNS} FROM qnas \
             WHERE deleted = FALSE AND ($1::int IS NULL OR author_id = $1) \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(author)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM qnas \
             WHERE deleted = FALSE AND ($1::int IS NULL OR author_id = $1)",
        )
        .bind(author)
        .fetch_one(&self.pool)
        .await?;

        Ok((qnas, total))
    }

    pub async fn find_by_id(&self, id: i32) -> sqlx::Result<Option<Qna>> {
        sqlx::query_as(&format!(
            "SELECT {QNA_COLUMNS} FROM qnas WHERE id = $1 AND deleted = FALSE"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn update(&self, id: i32, title: &str, content: &str) -> sqlx::Result<u64> {
        let result = sqlx::query(
            "UPDATE qnas SET title = $2, content = $3, updated_at = NOW() \
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
            "UPDATE qnas SET deleted = TRUE, updated_at = NOW() \
             WHERE id = $1 AND deleted = FALSE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn insert_comment(
        &self,
        qna_id: i32,
        author_id: UserId,
        content: &str,
    ) -> sqlx::Result<QnaComment> {
        sqlx::query_as(&format!(
            "INSERT INTO qna_comments (qna_id, author_id, content) VALUES ($1, $2, $3) \
             RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(qna_id)
        .bind(author_id.value())
        .bind(content)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn list_comments(&self, qna_id: i32) -> sqlx::Result<Vec<QnaComment>> {
        sqlx::query_as(&format!(
            "SELECT {COMMENT_COLUMNS} FROM qna_comments \
             WHERE qna_id = $1 AND deleted = FALSE ORDER BY created_at"
        ))
        .bind(qna_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_comment(&self, id: i32) -> sqlx::Result<Option<QnaComment>> {
        sqlx::query_as(&format!(
            "SELECT {COMMENT_COLUMNS} FROM qna_comments WHERE id = $1 AND deleted = FALSE"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn update_comment(&self, id: i32, content: &str) -> sqlx::Result<u64> {
        let result = sqlx::query(
            "UPDATE qna_comments SET content = $2, updated_at = NOW() \
             WHERE id = $1 AND deleted = FALSE",
        )
        .bind(id)
        .bind(content)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn soft_delete_comment(&self, id: i32) -> sqlx::Result<u64> {
        let result = sqlx::query(
            "UPDATE qna_comments SET deleted = TRUE, updated_at = NOW() \
             WHERE id = $1 AND deleted = FALSE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
