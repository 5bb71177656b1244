use async_trait::async_trait;
use chrono::NaiveDate;

use crate::ports::book_metadata::{BookMetadata, BookMetadataClient, Result};

const API_URL: &str = "https://openapi.naver.com/v1/search/book.json";

/// BookMetadataClientのNaver書籍検索API実装
///
/// ISBNをクエリとして1件だけ検索し、返ってきたISBNが要求と
/// 一致することを確認してから採用する。
pub struct NaverBooksClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
}

impl NaverBooksClient {
    pub fn new(http: reqwest::Client, client_id: String, client_secret: String) -> Self {
        Self {
            http,
            client_id,
            client_secret,
        }
    }
}

/// APIレスポンス中のHTMLタグを除去する
fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// 出版日（yyyyMMdd）をパースする。失敗時はNone
fn parse_pubdate(raw: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    NaiveDate::parse_from_str(raw, "%Y%m%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn non_empty(value: &serde_json::Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl BookMetadataClient for NaverBooksClient {
    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<BookMetadata>> {
        let response = self
            .http
            .get(API_URL)
            .header("X-Naver-Client-Id", &self.client_id)
            .header("X-Naver-Client-Secret", &self.client_secret)
            .query(&[("query", isbn), ("display", "1")])
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = response.json().await?;

        let Some(item) = body
            .get("items")
            .and_then(|items| items.as_array())
            .and_then(|items| items.first())
        else {
            tracing::debug!(isbn, "no metadata found");
            return Ok(None);
        };

        // 検索は前方一致気味に当たるため、返ってきたISBNの照合は必須
        let returned_isbn = item
            .get("isbn")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .replace(' ', "");
        if !returned_isbn.contains(isbn) {
            tracing::warn!(isbn, returned_isbn, "isbn mismatch in metadata response");
            return Ok(None);
        }

        let title = match non_empty(item, "title") {
            Some(title) => strip_tags(&title),
            None => return Ok(None),
        };
        let author = non_empty(item, "author")
            .map(|a| strip_tags(&a))
            .unwrap_or_default();

        Ok(Some(BookMetadata {
            title,
            author,
            publisher: non_empty(item, "publisher"),
            isbn: isbn.to_string(),
            published_at: non_empty(item, "pubdate").and_then(|d| parse_pubdate(&d)),
            image: non_empty(item, "image"),
            description: non_empty(item, "description").map(|d| strip_tags(&d)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<b>Rust</b> in Action"), "Rust in Action");
        assert_eq!(strip_tags("no tags"), "no tags");
        assert_eq!(strip_tags("<i>nested <b>x</b></i>"), "nested x");
    }

    #[test]
    fn test_parse_pubdate() {
        let parsed = parse_pubdate("20240115").unwrap();
        assert_eq!(parsed.date_naive().to_string(), "2024-01-15");
        assert!(parse_pubdate("2024-01-15").is_none());
        assert!(parse_pubdate("").is_none());
    }
}
