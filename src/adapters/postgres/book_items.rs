use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};

use crate::domain::book::{BookItem, BookStatus};
use crate::domain::{BookInfoId, BookItemId};

const ITEM_COLUMNS: &str = "id, book_information_id, purchase_at, status, updated_at, deleted";

fn map_row_to_item(row: &PgRow) -> sqlx::Result<BookItem> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<BookStatus>()
        .map_err(|e| sqlx::Error::Decode(e.into()))?;

    Ok(BookItem {
        id: BookItemId::from_raw(row.try_get("id")?),
        book_information_id: BookInfoId::from_raw(row.try_get("book_information_id")?),
        purchase_at: row.try_get("purchase_at")?,
        status,
        updated_at: row.try_get("updated_at")?,
        deleted: row.try_get("deleted")?,
    })
}

/// 一覧表示用の蔵書サマリ（書誌情報を結合済み）
#[derive(Debug, Clone)]
pub struct BookItemSummary {
    pub item: BookItem,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub image: Option<String>,
    pub category: Option<i32>,
}

fn map_row_to_summary(row: &PgRow) -> sqlx::Result<BookItemSummary> {
    Ok(BookItemSummary {
        item: map_row_to_item(row)?,
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        isbn: row.try_get("isbn")?,
        image: row.try_get("image")?,
        category: row.try_get("category")?,
    })
}

/// 蔵書リポジトリ
///
/// ソフトデリート済みの蔵書は、返却経路を除く全ての照会から除外する。
#[derive(Clone)]
pub struct BookItemRepository {
    pool: PgPool,
}

impl BookItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: BookItemId) -> sqlx::Result<Option<BookItem>> {
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM book_items WHERE id = $1 AND deleted = FALSE"
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_item).transpose()
    }

    /// 貸出トランザクション内で蔵書行をロック付きで取得する
    ///
    /// `FOR UPDATE` により同一蔵書への同時貸出は片方がここで待たされ、
    /// 勝者のコミット後に敗者は BORROWED を観測して失敗する。
    pub async fn find_for_update(
        &self,
        conn: &mut PgConnection,
        id: BookItemId,
    ) -> sqlx::Result<Option<BookItem>> {
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM book_items \
             WHERE id = $1 AND deleted = FALSE FOR UPDATE"
        ))
        .bind(id.value())
        .fetch_optional(&mut *conn)
        .await?;

        row.as_ref().map(map_row_to_item).transpose()
    }

    /// 貸出中へ遷移させる（条件付き更新）
    ///
    /// AVAILABLEの行にだけ作用する。更新行数0は貸出競合の敗者を意味する。
    pub async fn mark_borrowed(
        &self,
        conn: &mut PgConnection,
        id: BookItemId,
    ) -> sqlx::Result<u64> {
        let result = sqlx::query(
            "UPDATE book_items SET status = 'BORROWED', updated_at = NOW() \
             WHERE id = $1 AND status = 'AVAILABLE' AND deleted = FALSE",
        )
        .bind(id.value())
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// 貸出可能へ戻す
    ///
    /// 返却はソフトデリートの有無に依存しないため、deleted条件を付けない。
    pub async fn mark_available(
        &self,
        conn: &mut PgConnection,
        id: BookItemId,
    ) -> sqlx::Result<u64> {
        let result = sqlx::query(
            "UPDATE book_items SET status = 'AVAILABLE', updated_at = NOW() WHERE id = $1",
        )
        .bind(id.value())
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// 管理者によるステータス変更
    pub async fn update_status(&self, id: BookItemId, status: BookStatus) -> sqlx::Result<u64> {
        let result = sqlx::query(
            "UPDATE book_items SET status = $2, updated_at = NOW() \
             WHERE id = $1 AND deleted = FALSE",
        )
        .bind(id.value())
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn insert(&self, book_information_id: BookInfoId) -> sqlx::Result<BookItem> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO book_items (book_information_id, purchase_at, status)
            VALUES ($1, NOW(), 'AVAILABLE')
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(book_information_id.value())
        .fetch_one(&self.pool)
        .await?;

        map_row_to_item(&row)
    }

    /// ソフトデリート
    ///
    /// 戻り値0の場合、行が存在しないか既に削除済み。
    pub async fn soft_delete(&self, id: BookItemId) -> sqlx::Result<u64> {
        let result = sqlx::query(
            "UPDATE book_items SET deleted = TRUE, updated_at = NOW() \
             WHERE id = $1 AND deleted = FALSE",
        )
        .bind(id.value())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// 削除済みかどうか（AlreadyDeletedとNotFoundの切り分け用）
    pub async fn exists_deleted(&self, id: BookItemId) -> sqlx::Result<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM book_items WHERE id = $1 AND deleted)")
            .bind(id.value())
            .fetch_one(&self.pool)
            .await
    }

    /// キーワード検索付きページング一覧
    ///
    /// キーワードはタイトル・著者への部分一致。
    pub async fn search(
        &self,
        keyword: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<(Vec<BookItemSummary>, i64)> {
        let pattern = keyword.map(|k| format!("%{}%", k));

        let rows = sqlx::query(
            r#"
            SELECT b.id, b.book_information_id, b.purchase_at, b.status, b.updated_at,
                   b.deleted, i.title, i.author, i.isbn, i.image, i.category
            FROM book_items b
            JOIN book_informations i ON i.id = b.book_information_id
            WHERE b.deleted = FALSE
              AND ($1::text IS NULL OR i.title ILIKE $1 OR i.author ILIKE $1)
            ORDER BY b.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM book_items b
            JOIN book_informations i ON i.id = b.book_information_id
            WHERE b.deleted = FALSE
              AND ($1::text IS NULL OR i.title ILIKE $1 OR i.author ILIKE $1)
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let items = rows
            .iter()
            .map(map_row_to_summary)
            .collect::<sqlx::Result<Vec<_>>>()?;

        Ok((items, total))
    }

    /// 蔵書と書誌情報をまとめて取得する
    pub async fn find_summary(&self, id: BookItemId) -> sqlx::Result<Option<BookItemSummary>> {
        let row = sqlx::query(
            r#"
            SELECT b.id, b.book_information_id, b.purchase_at, b.status, b.updated_at,
                   b.deleted, i.title, i.author, i.isbn, i.image, i.category
            FROM book_items b
            JOIN book_informations i ON i.id = b.book_information_id
            WHERE b.id = $1 AND b.deleted = FALSE
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_summary).transpose()
    }
}
