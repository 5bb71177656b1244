use sqlx::{PgPool, Row, postgres::PgRow};

use crate::domain::UserId;
use crate::domain::notification::{Notification, NotificationKind, NotificationStatus};

const NOTIFICATION_COLUMNS: &str = "id, user_id, content, kind, resource_id, status, created_at";

fn map_row_to_notification(row: &PgRow) -> sqlx::Result<Notification> {
    let kind: String = row.try_get("kind")?;
    let kind = kind
        .parse::<NotificationKind>()
        .map_err(|e| sqlx::Error::Decode(e.into()))?;

    let status: String = row.try_get("status")?;
    let status = status
        .parse::<NotificationStatus>()
        .map_err(|e| sqlx::Error::Decode(e.into()))?;

    Ok(Notification {
        id: row.try_get("id")?,
        user_id: UserId::from_raw(row.try_get("user_id")?),
        content: row.try_get("content")?,
        kind,
        resource_id: row.try_get("resource_id")?,
        status,
        created_at: row.try_get("created_at")?,
    })
}

/// 通知リポジトリ
///
/// DELETE状態はソフトデリートであり、行は物理削除されない。
#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        user_id: UserId,
        kind: NotificationKind,
        content: &str,
        resource_id: Option<i32>,
    ) -> sqlx::Result<Notification> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO notifications (user_id, content, kind, resource_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(user_id.value())
        .bind(content)
        .bind(kind.as_str())
        .bind(resource_id)
        .fetch_one(&self.pool)
        .await?;

        map_row_to_notification(&row)
    }

    /// 利用者の通知一覧（DELETE状態は除外）
    pub async fn page_by_user(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<(Vec<Notification>, i64)> {
        let rows = sqlx::query(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE user_id = $1 AND status <> 'DELETE' \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(user_id.value())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND status <> 'DELETE'",
        )
        .bind(user_id.value())
        .fetch_one(&self.pool)
        .await?;

        let notifications = rows
            .iter()
            .map(map_row_to_notification)
            .collect::<sqlx::Result<Vec<_>>>()?;

        Ok((notifications, total))
    }

    pub async fn find_by_id(&self, id: i32) -> sqlx::Result<Option<Notification>> {
        let row = sqlx::query(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE id = $1 AND status <> 'DELETE'"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_notification).transpose()
    }

    pub async fn update_status(&self, id: i32, status: NotificationStatus) -> sqlx::Result<u64> {
        let result = sqlx::query("UPDATE notifications SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn has_unread(&self, user_id: UserId) -> sqlx::Result<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM notifications WHERE user_id = $1 AND status = 'UNREAD')",
        )
        .bind(user_id.value())
        .fetch_one(&self.pool)
        .await
    }
}
