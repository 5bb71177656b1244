use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 外部書誌APIから取得した書誌データ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub isbn: String,
    pub published_at: Option<DateTime<Utc>>,
    pub image: Option<String>,
    pub description: Option<String>,
}

/// 書誌検索ポート
///
/// カタログコンテキストと外部書誌APIの境界を維持する。
/// 検索結果が無い場合は `Ok(None)`、通信・プロトコル異常は `Err`。
#[async_trait]
pub trait BookMetadataClient: Send + Sync {
    /// ISBNで書誌データを検索する
    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<BookMetadata>>;
}
