use crate::adapters::postgres::{BookItemRepository, FavoriteRepository, FavoriteView};
use crate::application::errors::{BusinessError, Result};
use crate::domain::{BookItemId, UserId};

/// トグル操作の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteToggle {
    Added,
    Removed,
}

/// お気に入りサービス
///
/// (利用者, 蔵書) の一意なペアをトグルで作成・削除する。
/// 2回トグルすれば行は残らない。
pub struct FavoriteService {
    favorites: FavoriteRepository,
    items: BookItemRepository,
}

impl FavoriteService {
    pub fn new(favorites: FavoriteRepository, items: BookItemRepository) -> Self {
        Self { favorites, items }
    }

    pub async fn toggle(&self, user_id: UserId, book_item_id: BookItemId) -> Result<FavoriteToggle> {
        // ソフトデリート済みの蔵書はお気に入りにできない
        self.items
            .find_by_id(book_item_id)
            .await?
            .ok_or(BusinessError::BookItemNotFound)?;

        if self.favorites.exists(user_id, book_item_id).await? {
            self.favorites.delete(user_id, book_item_id).await?;
            Ok(FavoriteToggle::Removed)
        } else {
            self.favorites.insert(user_id, book_item_id).await?;
            Ok(FavoriteToggle::Added)
        }
    }

    pub async fn list(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<FavoriteView>, i64)> {
        Ok(self.favorites.page_by_user(user_id, limit, offset).await?)
    }

    pub async fn count_for_item(&self, book_item_id: BookItemId) -> Result<i64> {
        Ok(self.favorites.count_by_item(book_item_id).await?)
    }

    pub async fn is_favorite(&self, user_id: UserId, book_item_id: BookItemId) -> Result<bool> {
        Ok(self.favorites.exists(user_id, book_item_id).await?)
    }
}
