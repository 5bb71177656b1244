use std::sync::Arc;

use crate::adapters::postgres::{
    BookInformationRepository, BookItemRepository, BookItemSummary, QrCode, QrCodeRepository,
    ShelfRepository,
};
use crate::application::errors::{BusinessError, Result};
use crate::domain::book::{
    BookInformation, BookItem, BookStatus, NewBookInformation, Shelf, validate_shelf_position,
};
use crate::domain::{BookInfoId, BookItemId, ShelfId};
use crate::ports::BookMetadataClient;

/// カタログサービス
///
/// 書誌情報・蔵書・QRコード・書架を扱う。書誌情報は外部APIからの
/// 初回取得時に作成され、以後は読み取りのみ。
pub struct CatalogService {
    infos: BookInformationRepository,
    items: BookItemRepository,
    qr_codes: QrCodeRepository,
    shelves: ShelfRepository,
    metadata: Arc<dyn BookMetadataClient>,
    qr_base_url: String,
}

impl CatalogService {
    pub fn new(
        infos: BookInformationRepository,
        items: BookItemRepository,
        qr_codes: QrCodeRepository,
        shelves: ShelfRepository,
        metadata: Arc<dyn BookMetadataClient>,
        qr_base_url: String,
    ) -> Self {
        Self {
            infos,
            items,
            qr_codes,
            shelves,
            metadata,
            qr_base_url,
        }
    }

    /// ISBNから書誌情報を取得または作成する
    ///
    /// 既存レコードがあればそれを返し、無ければ外部APIを引いて保存する。
    /// 検索結果なしは BookInfoNotFound、通信異常は ExternalService。
    pub async fn fetch_or_create_information(&self, isbn: &str) -> Result<BookInformation> {
        let isbn = normalize_isbn(isbn)?;

        if let Some(existing) = self.infos.find_by_isbn(&isbn).await? {
            return Ok(existing);
        }

        let metadata = self
            .metadata
            .find_by_isbn(&isbn)
            .await
            .map_err(BusinessError::ExternalService)?
            .ok_or(BusinessError::BookInfoNotFound)?;

        let info = self
            .infos
            .insert(&NewBookInformation {
                title: metadata.title,
                author: metadata.author,
                publisher: metadata.publisher,
                isbn: metadata.isbn,
                published_at: metadata.published_at,
                image: metadata.image,
                description: metadata.description,
                category: None,
            })
            .await?;

        tracing::info!(isbn = %info.isbn, "book information created");
        Ok(info)
    }

    pub async fn get_information(&self, id: BookInfoId) -> Result<BookInformation> {
        self.infos
            .find_by_id(id)
            .await?
            .ok_or(BusinessError::BookInfoNotFound)
    }

    /// 受入：ISBNから蔵書を1冊追加する
    pub async fn create_item(&self, isbn: &str) -> Result<(BookItem, BookInformation)> {
        let info = self.fetch_or_create_information(isbn).await?;
        let item = self.items.insert(info.id).await?;

        tracing::info!(book_item_id = item.id.value(), "book item acquired");
        Ok((item, info))
    }

    pub async fn search_items(
        &self,
        keyword: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<BookItemSummary>, i64)> {
        Ok(self.items.search(keyword, limit, offset).await?)
    }

    pub async fn get_item(&self, id: BookItemId) -> Result<BookItemSummary> {
        self.items
            .find_summary(id)
            .await?
            .ok_or(BusinessError::BookItemNotFound)
    }

    /// 管理者によるステータス変更
    pub async fn update_item_status(&self, id: BookItemId, status: BookStatus) -> Result<()> {
        let updated = self.items.update_status(id, status).await?;
        if updated == 0 {
            return Err(BusinessError::BookItemNotFound);
        }
        Ok(())
    }

    /// 除籍（ソフトデリート）
    pub async fn delete_item(&self, id: BookItemId) -> Result<()> {
        let deleted = self.items.soft_delete(id).await?;
        if deleted == 0 {
            // 既に削除済みか、そもそも存在しないかを切り分ける
            if self.items.exists_deleted(id).await? {
                return Err(BusinessError::BookAlreadyDeleted);
            }
            return Err(BusinessError::BookItemNotFound);
        }

        tracing::info!(book_item_id = id.value(), "book item withdrawn");
        Ok(())
    }

    /// 蔵書のQRコードを発行する（1冊につき1件）
    pub async fn create_qr_code(&self, book_item_id: BookItemId) -> Result<QrCode> {
        let item = self
            .items
            .find_by_id(book_item_id)
            .await?
            .ok_or(BusinessError::BookItemNotFound)?;

        if self.qr_codes.find_by_item(item.id).await?.is_some() {
            return Err(BusinessError::DuplicateQrCode);
        }

        let qr_value = format!("{}/{}", self.qr_base_url, item.id.value());
        Ok(self.qr_codes.insert(item.id, &qr_value).await?)
    }

    pub async fn qr_code_for_item(&self, book_item_id: BookItemId) -> Result<QrCode> {
        self.qr_codes
            .find_by_item(book_item_id)
            .await?
            .ok_or(BusinessError::QrCodeNotFound)
    }

    /// QR値から蔵書を逆引きする
    pub async fn find_item_by_qr(&self, qr_value: &str) -> Result<BookItemSummary> {
        let qr = self
            .qr_codes
            .find_by_value(qr_value)
            .await?
            .ok_or(BusinessError::QrCodeNotFound)?;

        self.items
            .find_summary(BookItemId::from_raw(qr.book_item_id))
            .await?
            .ok_or(BusinessError::BookItemNotFound)
    }

    /// 蔵書の所在書架を引く（書誌カテゴリと書架カテゴリの一致）
    pub async fn locate_item(&self, book_item_id: BookItemId) -> Result<(BookItemSummary, Shelf)> {
        let summary = self.get_item(book_item_id).await?;

        let category = summary.category.ok_or(BusinessError::ShelfNotFound)?;
        let shelf = self
            .shelves
            .find_by_category(category)
            .await?
            .ok_or(BusinessError::ShelfNotFound)?;

        Ok((summary, shelf))
    }

    // ------------------------------------------------------------------
    // 書架管理
    // ------------------------------------------------------------------

    pub async fn list_shelves(&self) -> Result<Vec<Shelf>> {
        Ok(self.shelves.list_all().await?)
    }

    pub async fn create_shelf(
        &self,
        shelf_number: i32,
        line_number: i32,
        category: Option<i32>,
    ) -> Result<Shelf> {
        validate_shelf_position(shelf_number, line_number)?;
        Ok(self
            .shelves
            .insert(shelf_number, line_number, category)
            .await?)
    }

    pub async fn update_shelf(
        &self,
        id: ShelfId,
        shelf_number: i32,
        line_number: i32,
        category: Option<i32>,
    ) -> Result<()> {
        validate_shelf_position(shelf_number, line_number)?;

        let updated = self
            .shelves
            .update(id, shelf_number, line_number, category)
            .await?;
        if updated == 0 {
            return Err(BusinessError::ShelfNotFound);
        }
        Ok(())
    }

    pub async fn delete_shelf(&self, id: ShelfId) -> Result<()> {
        let deleted = self.shelves.delete(id).await?;
        if deleted == 0 {
            return Err(BusinessError::ShelfNotFound);
        }
        Ok(())
    }
}

/// ISBNの正規化と検証
///
/// ハイフンを除去し、10桁または13桁の数字（10桁の末尾Xは許容）で
/// なければ InvalidIsbn。
fn normalize_isbn(raw: &str) -> Result<String> {
    let isbn: String = raw.chars().filter(|c| *c != '-' && *c != ' ').collect();

    let valid = match isbn.len() {
        13 => isbn.chars().all(|c| c.is_ascii_digit()),
        10 => {
            let (head, tail) = isbn.split_at(9);
            head.chars().all(|c| c.is_ascii_digit())
                && tail.chars().all(|c| c.is_ascii_digit() || c == 'X' || c == 'x')
        }
        _ => false,
    };

    if !valid {
        return Err(BusinessError::InvalidIsbn);
    }

    Ok(isbn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_isbn_accepts_13_digits() {
        assert_eq!(normalize_isbn("9784873119786").unwrap(), "9784873119786");
        assert_eq!(normalize_isbn("978-4-87311-978-6").unwrap(), "9784873119786");
    }

    #[test]
    fn test_normalize_isbn_accepts_10_digits_with_check_x() {
        assert_eq!(normalize_isbn("123456789X").unwrap(), "123456789X");
    }

    #[test]
    fn test_normalize_isbn_rejects_garbage() {
        assert!(matches!(
            normalize_isbn("not-an-isbn").unwrap_err(),
            BusinessError::InvalidIsbn
        ));
        assert!(matches!(
            normalize_isbn("12345").unwrap_err(),
            BusinessError::InvalidIsbn
        ));
    }
}
