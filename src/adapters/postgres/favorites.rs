use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::{BookItemId, UserId};

/// お気に入り一覧の表示用ビュー
#[derive(Debug, Clone)]
pub struct FavoriteView {
    pub book_item_id: BookItemId,
    pub title: String,
    pub author: String,
    pub image: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// お気に入りリポジトリ
///
/// (user_id, book_item_id) は一意。トグル操作のみで増減する。
#[derive(Clone)]
pub struct FavoriteRepository {
    pool: PgPool,
}

impl FavoriteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn exists(&self, user_id: UserId, book_item_id: BookItemId) -> sqlx::Result<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM favorites WHERE user_id = $1 AND book_item_id = $2)",
        )
        .bind(user_id.value())
        .bind(book_item_id.value())
        .fetch_one(&self.pool)
        .await
    }

    pub async fn insert(&self, user_id: UserId, book_item_id: BookItemId) -> sqlx::Result<()> {
        sqlx::query(
            "INSERT INTO favorites (user_id, book_item_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, book_item_id) DO NOTHING",
        )
        .bind(user_id.value())
        .bind(book_item_id.value())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, user_id: UserId, book_item_id: BookItemId) -> sqlx::Result<u64> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND book_item_id = $2")
            .bind(user_id.value())
            .bind(book_item_id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn page_by_user(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<(Vec<FavoriteView>, i64)> {
        let rows = sqlx::query(
            r#"
            SELECT f.book_item_id, i.title, i.author, i.image, b.status, f.created_at
            FROM favorites f
            JOIN book_items b ON b.id = f.book_item_id
            JOIN book_informations i ON i.id = b.book_information_id
            WHERE f.user_id = $1
            ORDER BY f.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id.value())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM favorites WHERE user_id = $1")
            .bind(user_id.value())
            .fetch_one(&self.pool)
            .await?;

        let views = rows
            .iter()
            .map(|row| {
                Ok(FavoriteView {
                    book_item_id: BookItemId::from_raw(row.try_get("book_item_id")?),
                    title: row.try_get("title")?,
                    author: row.try_get("author")?,
                    image: row.try_get("image")?,
                    status: row.try_get("status")?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect::<sqlx::Result<Vec<_>>>()?;

        Ok((views, total))
    }

    pub async fn count_by_item(&self, book_item_id: BookItemId) -> sqlx::Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM favorites WHERE book_item_id = $1")
            .bind(book_item_id.value())
            .fetch_one(&self.pool)
            .await
    }

    /// 蔵書をお気に入りにしている利用者のID一覧
    ///
    /// 返却時の「お気に入りが返却された」通知のファンアウトに使用される。
    pub async fn user_ids_by_item(&self, book_item_id: BookItemId) -> sqlx::Result<Vec<UserId>> {
        let ids: Vec<i32> =
            sqlx::query_scalar("SELECT user_id FROM favorites WHERE book_item_id = $1")
                .bind(book_item_id.value())
                .fetch_all(&self.pool)
                .await?;

        Ok(ids.into_iter().map(UserId::from_raw).collect())
    }
}
