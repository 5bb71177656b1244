use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// フィールド単位のバリデーションエラー
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub value: String,
    pub reason: String,
}

/// 統一エラーレスポンス
///
/// 全てのエラーは {timestamp, status, message, errors[]} の形で返す。
/// `errors` はリクエスト検証の失敗時のみ埋まる。
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub message: String,
    pub errors: Vec<FieldError>,
}

impl ErrorResponse {
    pub fn new(status: u16, message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self {
            timestamp: Utc::now(),
            status,
            message: message.into(),
            errors,
        }
    }
}

/// ページングクエリ
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

impl PageQuery {
    /// (limit, offset, page, size) に解決する
    pub fn resolve(&self) -> (i64, i64, u32, u32) {
        let page = self.page.unwrap_or(0);
        let size = self.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let limit = i64::from(size);
        let offset = i64::from(page) * limit;
        (limit, offset, page, size)
    }
}

/// ページングレスポンス
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: i64,
}

impl<T> PageResponse<T> {
    pub fn new(content: Vec<T>, page: u32, size: u32, total_elements: i64) -> Self {
        Self {
            content,
            page,
            size,
            total_elements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults() {
        let query = PageQuery {
            page: None,
            size: None,
        };
        assert_eq!(query.resolve(), (20, 0, 0, 20));
    }

    #[test]
    fn test_page_query_clamps_size() {
        let query = PageQuery {
            page: Some(2),
            size: Some(1000),
        };
        let (limit, offset, page, size) = query.resolve();
        assert_eq!(limit, 100);
        assert_eq!(offset, 200);
        assert_eq!(page, 2);
        assert_eq!(size, 100);
    }
}
