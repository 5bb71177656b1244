use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};

use crate::domain::checkout::{BookHistory, ClosedLoan, NewLoan};
use crate::domain::{BookInfoId, BookItemId, HistoryId, UserId};

const HISTORY_COLUMNS: &str = "id, book_item_id, user_id, borrowed_at, returned_at, overdue";

fn map_row_to_history(row: &PgRow) -> sqlx::Result<BookHistory> {
    Ok(BookHistory {
        id: HistoryId::from_raw(row.try_get("id")?),
        book_item_id: BookItemId::from_raw(row.try_get("book_item_id")?),
        user_id: UserId::from_raw(row.try_get("user_id")?),
        borrowed_at: row.try_get("borrowed_at")?,
        returned_at: row.try_get("returned_at")?,
        overdue: row.try_get("overdue")?,
    })
}

/// 貸出履歴の表示用サマリ（書誌タイトルを結合済み）
#[derive(Debug, Clone)]
pub struct BorrowSummary {
    pub history: BookHistory,
    pub title: String,
    pub author: String,
}

/// 管理者向けサマリ（利用者情報を含む）
#[derive(Debug, Clone)]
pub struct AdminBorrowSummary {
    pub history: BookHistory,
    pub title: String,
    pub email: String,
    pub user_name: Option<String>,
    pub company_id: Option<String>,
}

/// 貸出ランキングの1行
#[derive(Debug, Clone)]
pub struct RankedBook {
    pub book_information_id: BookInfoId,
    pub title: String,
    pub author: String,
    pub image: Option<String>,
    pub borrow_count: i64,
}

fn map_row_to_summary(row: &PgRow) -> sqlx::Result<BorrowSummary> {
    Ok(BorrowSummary {
        history: map_row_to_history(row)?,
        title: row.try_get("title")?,
        author: row.try_get("author")?,
    })
}

/// 貸出履歴リポジトリ
///
/// 中核の不変条件：蔵書1冊につきオープンな履歴は高々1件。
/// 貸出トランザクション＋オープン行の部分一意インデックスで保証する。
#[derive(Clone)]
pub struct BookHistoryRepository {
    pool: PgPool,
}

impl BookHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// オープンな貸出を作成する（貸出トランザクション内）
    pub async fn insert_open(
        &self,
        conn: &mut PgConnection,
        loan: &NewLoan,
    ) -> sqlx::Result<BookHistory> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO book_histories (book_item_id, user_id, borrowed_at)
            VALUES ($1, $2, $3)
            RETURNING {HISTORY_COLUMNS}
            "#
        ))
        .bind(loan.book_item_id.value())
        .bind(loan.user_id.value())
        .bind(loan.borrowed_at)
        .fetch_one(&mut *conn)
        .await?;

        map_row_to_history(&row)
    }

    /// 利用者のオープンな貸出数（貸出上限判定用、トランザクション内）
    pub async fn count_open_by_user(
        &self,
        conn: &mut PgConnection,
        user_id: UserId,
    ) -> sqlx::Result<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_histories WHERE user_id = $1 AND returned_at IS NULL",
        )
        .bind(user_id.value())
        .fetch_one(&mut *conn)
        .await
    }

    /// オープンな履歴をロック付きで取得する（返却トランザクション内）
    ///
    /// 返却済みの履歴はここで見つからず、呼び出し側は NotFound を返す。
    pub async fn find_open_for_update(
        &self,
        conn: &mut PgConnection,
        id: HistoryId,
    ) -> sqlx::Result<Option<BookHistory>> {
        let row = sqlx::query(&format!(
            "SELECT {HISTORY_COLUMNS} FROM book_histories \
             WHERE id = $1 AND returned_at IS NULL FOR UPDATE"
        ))
        .bind(id.value())
        .fetch_optional(&mut *conn)
        .await?;

        row.as_ref().map(map_row_to_history).transpose()
    }

    /// 蔵書IDからオープンな履歴をロック付きで取得する
    ///
    /// IoT経由の返却はこちらを使う。
    pub async fn find_open_by_item_for_update(
        &self,
        conn: &mut PgConnection,
        book_item_id: BookItemId,
    ) -> sqlx::Result<Option<BookHistory>> {
        let row = sqlx::query(&format!(
            "SELECT {HISTORY_COLUMNS} FROM book_histories \
             WHERE book_item_id = $1 AND returned_at IS NULL FOR UPDATE"
        ))
        .bind(book_item_id.value())
        .fetch_optional(&mut *conn)
        .await?;

        row.as_ref().map(map_row_to_history).transpose()
    }

    /// 返却を確定する
    ///
    /// オープンな行のみ更新する。戻り値0は二重返却を意味する。
    pub async fn close(&self, conn: &mut PgConnection, closed: &ClosedLoan) -> sqlx::Result<u64> {
        let result = sqlx::query(
            "UPDATE book_histories SET returned_at = $2, overdue = $3 \
             WHERE id = $1 AND returned_at IS NULL",
        )
        .bind(closed.history_id.value())
        .bind(closed.returned_at)
        .bind(closed.overdue)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// 利用者の現在貸出中一覧
    pub async fn list_current_by_user(
        &self,
        user_id: UserId,
        overdue_only: bool,
    ) -> sqlx::Result<Vec<BorrowSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT h.id, h.book_item_id, h.user_id, h.borrowed_at, h.returned_at, h.overdue,
                   i.title, i.author
            FROM book_histories h
            JOIN book_items b ON b.id = h.book_item_id
            JOIN book_informations i ON i.id = b.book_information_id
            WHERE h.user_id = $1
              AND h.returned_at IS NULL
              AND (NOT $2 OR h.overdue)
            ORDER BY h.borrowed_at DESC
            "#,
        )
        .bind(user_id.value())
        .bind(overdue_only)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_summary).collect()
    }

    /// 利用者の貸出履歴（期間・延滞フィルタ付きページング）
    pub async fn page_for_user(
        &self,
        user_id: UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        overdue: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<(Vec<BorrowSummary>, i64)> {
        let rows = sqlx::query(
            r#"
            SELECT h.id, h.book_item_id, h.user_id, h.borrowed_at, h.returned_at, h.overdue,
                   i.title, i.author
            FROM book_histories h
            JOIN book_items b ON b.id = h.book_item_id
            JOIN book_informations i ON i.id = b.book_information_id
            WHERE h.user_id = $1
              AND h.borrowed_at BETWEEN $2 AND $3
              AND ($4::boolean IS NULL OR h.overdue = $4)
            ORDER BY h.borrowed_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(user_id.value())
        .bind(from)
        .bind(to)
        .bind(overdue)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM book_histories h
            WHERE h.user_id = $1
              AND h.borrowed_at BETWEEN $2 AND $3
              AND ($4::boolean IS NULL OR h.overdue = $4)
            "#,
        )
        .bind(user_id.value())
        .bind(from)
        .bind(to)
        .bind(overdue)
        .fetch_one(&self.pool)
        .await?;

        let summaries = rows
            .iter()
            .map(map_row_to_summary)
            .collect::<sqlx::Result<Vec<_>>>()?;

        Ok((summaries, total))
    }

    /// 管理者向けの全体履歴（利用者名・社員番号で絞り込み可能）
    pub async fn page_for_admin(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        user_name: Option<&str>,
        company_id: Option<&str>,
        overdue: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<(Vec<AdminBorrowSummary>, i64)> {
        let name_pattern = user_name.map(|n| format!("%{}%", n));

        let rows = sqlx::query(
            r#"
            SELECT h.id, h.book_item_id, h.user_id, h.borrowed_at, h.returned_at, h.overdue,
                   i.title, u.email, u.user_name, u.company_id
            FROM book_histories h
            JOIN book_items b ON b.id = h.book_item_id
            JOIN book_informations i ON i.id = b.book_information_id
            JOIN users u ON u.id = h.user_id
            WHERE h.borrowed_at BETWEEN $1 AND $2
              AND ($3::text IS NULL OR u.user_name ILIKE $3)
              AND ($4::text IS NULL OR u.company_id = $4)
              AND ($5::boolean IS NULL OR h.overdue = $5)
            ORDER BY h.borrowed_at DESC
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(&name_pattern)
        .bind(company_id)
        .bind(overdue)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM book_histories h
            JOIN users u ON u.id = h.user_id
            WHERE h.borrowed_at BETWEEN $1 AND $2
              AND ($3::text IS NULL OR u.user_name ILIKE $3)
              AND ($4::text IS NULL OR u.company_id = $4)
              AND ($5::boolean IS NULL OR h.overdue = $5)
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(&name_pattern)
        .bind(company_id)
        .bind(overdue)
        .fetch_one(&self.pool)
        .await?;

        let summaries = rows
            .iter()
            .map(|row| {
                Ok(AdminBorrowSummary {
                    history: map_row_to_history(row)?,
                    title: row.try_get("title")?,
                    email: row.try_get("email")?,
                    user_name: row.try_get("user_name")?,
                    company_id: row.try_get("company_id")?,
                })
            })
            .collect::<sqlx::Result<Vec<_>>>()?;

        Ok((summaries, total))
    }

    /// 延滞スイープ対象：未返却・未延滞で貸出日が基準日より前の履歴
    pub async fn find_open_borrowed_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> sqlx::Result<Vec<BookHistory>> {
        let rows = sqlx::query(&format!(
            "SELECT {HISTORY_COLUMNS} FROM book_histories \
             WHERE returned_at IS NULL AND overdue = FALSE AND borrowed_at < $1 \
             ORDER BY borrowed_at"
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_history).collect()
    }

    /// 指定日に借りられた未返却・未延滞の履歴
    ///
    /// 返却期限前日のリマインド通知に使用される。
    pub async fn find_open_borrowed_on(
        &self,
        borrowed_on: chrono::NaiveDate,
    ) -> sqlx::Result<Vec<BookHistory>> {
        let rows = sqlx::query(&format!(
            "SELECT {HISTORY_COLUMNS} FROM book_histories \
             WHERE returned_at IS NULL AND overdue = FALSE AND borrowed_at::date = $1 \
             ORDER BY borrowed_at"
        ))
        .bind(borrowed_on)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_history).collect()
    }

    /// 延滞フラグを立てる
    pub async fn mark_overdue(&self, id: HistoryId) -> sqlx::Result<u64> {
        let result = sqlx::query(
            "UPDATE book_histories SET overdue = TRUE WHERE id = $1 AND returned_at IS NULL",
        )
        .bind(id.value())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// 期間内の貸出回数ランキング
    ///
    /// おすすめ（人気の書籍）の取得に使用される。
    pub async fn ranking(&self, since: DateTime<Utc>, limit: i64) -> sqlx::Result<Vec<RankedBook>> {
        let rows = sqlx::query(
            r#"
            SELECT i.id AS book_information_id, i.title, i.author, i.image,
                   COUNT(*) AS borrow_count
            FROM book_histories h
            JOIN book_items b ON b.id = h.book_item_id
            JOIN book_informations i ON i.id = b.book_information_id
            WHERE h.borrowed_at >= $1 AND b.deleted = FALSE
            GROUP BY i.id, i.title, i.author, i.image
            ORDER BY borrow_count DESC, i.id
            LIMIT $2
            "#,
        )
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(RankedBook {
                    book_information_id: BookInfoId::from_raw(row.try_get("book_information_id")?),
                    title: row.try_get("title")?,
                    author: row.try_get("author")?,
                    image: row.try_get("image")?,
                    borrow_count: row.try_get("borrow_count")?,
                })
            })
            .collect()
    }
}
