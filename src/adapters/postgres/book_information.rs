use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::domain::BookInfoId;
use crate::domain::book::{BookInformation, NewBookInformation};

#[derive(FromRow)]
struct InfoRow {
    id: i32,
    title: String,
    author: String,
    publisher: Option<String>,
    isbn: String,
    published_at: Option<DateTime<Utc>>,
    image: Option<String>,
    description: Option<String>,
    category: Option<i32>,
    created_at: DateTime<Utc>,
}

impl From<InfoRow> for BookInformation {
    fn from(row: InfoRow) -> Self {
        BookInformation {
            id: BookInfoId::from_raw(row.id),
            title: row.title,
            author: row.author,
            publisher: row.publisher,
            isbn: row.isbn,
            published_at: row.published_at,
            image: row.image,
            description: row.description,
            category: row.category,
            created_at: row.created_at,
        }
    }
}

const INFO_COLUMNS: &str = "id, title, author, publisher, isbn, published_at, image, \
                            description, category, created_at";

/// 書誌情報リポジトリ
///
/// 書誌レコードは作成後不変・削除なしのため、挿入と参照のみを提供する。
#[derive(Clone)]
pub struct BookInformationRepository {
    pool: PgPool,
}

impl BookInformationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: BookInfoId) -> sqlx::Result<Option<BookInformation>> {
        let row: Option<InfoRow> = sqlx::query_as(&format!(
            "SELECT {INFO_COLUMNS} FROM book_informations WHERE id = $1"
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(BookInformation::from))
    }

    pub async fn find_by_isbn(&self, isbn: &str) -> sqlx::Result<Option<BookInformation>> {
        let row: Option<InfoRow> = sqlx::query_as(&format!(
            "SELECT {INFO_COLUMNS} FROM book_informations WHERE isbn = $1"
        ))
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(BookInformation::from))
    }

    pub async fn insert(&self, info: &NewBookInformation) -> sqlx::Result<BookInformation> {
        let row: InfoRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO book_informations
                (title, author, publisher, isbn, published_at, image, description, category)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {INFO_COLUMNS}
            "#
        ))
        .bind(&info.title)
        .bind(&info.author)
        .bind(&info.publisher)
        .bind(&info.isbn)
        .bind(info.published_at)
        .bind(&info.image)
        .bind(&info.description)
        .bind(info.category)
        .fetch_one(&self.pool)
        .await?;

        Ok(BookInformation::from(row))
    }
}
