use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::ports::book_metadata::{BookMetadata, BookMetadataClient, Result};

/// BookMetadataClientのモック実装
///
/// ISBNで引ける書誌データを事前登録してテストに使う。
#[derive(Default)]
pub struct MockBookMetadataClient {
    books: Mutex<HashMap<String, BookMetadata>>,
}

impl MockBookMetadataClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// テスト用に書誌データを登録する
    pub fn add_book(&self, metadata: BookMetadata) {
        self.books
            .lock()
            .unwrap()
            .insert(metadata.isbn.clone(), metadata);
    }
}

#[async_trait]
impl BookMetadataClient for MockBookMetadataClient {
    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<BookMetadata>> {
        Ok(self.books.lock().unwrap().get(isbn).cloned())
    }
}
