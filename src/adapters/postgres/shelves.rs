use sqlx::{FromRow, PgPool};

use crate::domain::ShelfId;
use crate::domain::book::Shelf;

#[derive(FromRow)]
struct ShelfRow {
    id: i32,
    shelf_number: i32,
    line_number: i32,
    category: Option<i32>,
}

impl From<ShelfRow> for Shelf {
    fn from(row: ShelfRow) -> Self {
        Shelf {
            id: ShelfId::from_raw(row.id),
            shelf_number: row.shelf_number,
            line_number: row.line_number,
            category: row.category,
        }
    }
}

/// 書架リポジトリ
#[derive(Clone)]
pub struct ShelfRepository {
    pool: PgPool,
}

impl ShelfRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> sqlx::Result<Vec<Shelf>> {
        let rows: Vec<ShelfRow> = sqlx::query_as(
            "SELECT id, shelf_number, line_number, category FROM shelves \
             ORDER BY shelf_number, line_number",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Shelf::from).collect())
    }

    pub async fn find_by_id(&self, id: ShelfId) -> sqlx::Result<Option<Shelf>> {
        let row: Option<ShelfRow> =
            sqlx::query_as("SELECT id, shelf_number, line_number, category FROM shelves WHERE id = $1")
                .bind(id.value())
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Shelf::from))
    }

    /// カテゴリが一致する書架を取得する（蔵書の所在表示用）
    pub async fn find_by_category(&self, category: i32) -> sqlx::Result<Option<Shelf>> {
        let row: Option<ShelfRow> = sqlx::query_as(
            "SELECT id, shelf_number, line_number, category FROM shelves \
             WHERE category = $1 ORDER BY id LIMIT 1",
        )
        .bind(category)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Shelf::from))
    }

    pub async fn insert(
        &self,
        shelf_number: i32,
        line_number: i32,
        category: Option<i32>,
    ) -> sqlx::Result<Shelf> {
        let row: ShelfRow = sqlx::query_as(
            "INSERT INTO shelves (shelf_number, line_number, category) VALUES ($1, $2, $3) \
             RETURNING id, shelf_number, line_number, category",
        )
        .bind(shelf_number)
        .bind(line_number)
        .bind(category)
        .fetch_one(&self.pool)
        .await?;

        Ok(Shelf::from(row))
    }

    pub async fn update(
        &self,
        id: ShelfId,
        shelf_number: i32,
        line_number: i32,
        category: Option<i32>,
    ) -> sqlx::Result<u64> {
        let result = sqlx::query(
            "UPDATE shelves SET shelf_number = $2, line_number = $3, category = $4 WHERE id = $1",
        )
        .bind(id.value())
        .bind(shelf_number)
        .bind(line_number)
        .bind(category)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: ShelfId) -> sqlx::Result<u64> {
        let result = sqlx::query("DELETE FROM shelves WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
