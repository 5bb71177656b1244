use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::domain::UserId;

/// チャットボットへのフィードバック
#[derive(Debug, Clone, FromRow)]
pub struct ChatbotFeedback {
    pub id: i32,
    pub user_id: i32,
    pub category: String,
    pub content: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

const FEEDBACK_COLUMNS: &str = "id, user_id, category, content, status, created_at";

/// チャットボットフィードバックリポジトリ
#[derive(Clone)]
pub struct ChatbotFeedbackRepository {
    pool: PgPool,
}

impl ChatbotFeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        user_id: UserId,
        category: &str,
        content: &str,
    ) -> sqlx::Result<ChatbotFeedback> {
        sqlx::query_as(&format!(
            "INSERT INTO chatbot_feedbacks (user_id, category, content) VALUES ($1, $2, $3) \
             RETURNING {FEEDBACK_COLUMNS}"
        ))
        .bind(user_id.value())
        .bind(category)
        .bind(content)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn page(&self, limit: i64, offset: i64) -> sqlx::Result<(Vec<ChatbotFeedback>, i64)> {
        let feedbacks: Vec<ChatbotFeedback> = sqlx::query_as(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM chatbot_feedbacks \
             ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chatbot_feedbacks")
            .fetch_one(&self.pool)
            .await?;

        Ok((feedbacks, total))
    }

    pub async fn update_status(&self, id: i32, status: &str) -> sqlx::Result<u64> {
        let result = sqlx::query("UPDATE chatbot_feedbacks SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
