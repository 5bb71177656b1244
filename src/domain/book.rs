use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookInfoId, BookItemId, ShelfId};

/// 書誌情報 - ISBNで一意な書誌レコード
///
/// 外部書誌APIの初回検索成功時に作成され、以後は不変。削除されない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInformation {
    pub id: BookInfoId,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub isbn: String,
    pub published_at: Option<DateTime<Utc>>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub category: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// 書誌レコードの作成データ（ID採番前）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBookInformation {
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub isbn: String,
    pub published_at: Option<DateTime<Utc>>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub category: Option<i32>,
}

/// 蔵書ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookStatus {
    /// 貸出可能
    Available,
    /// 貸出中
    Borrowed,
}

impl BookStatus {
    /// 永続化用の文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "AVAILABLE",
            BookStatus::Borrowed => "BORROWED",
        }
    }
}

impl std::str::FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(BookStatus::Available),
            "BORROWED" => Ok(BookStatus::Borrowed),
            _ => Err(format!("Invalid book status: {}", s)),
        }
    }
}

/// 蔵書 - 物理的に追跡される1冊
///
/// ライフサイクル：受入で作成、貸出・返却でステータスが遷移し、
/// 除籍では物理削除せずソフトデリートされる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookItem {
    pub id: BookItemId,
    pub book_information_id: BookInfoId,
    pub purchase_at: DateTime<Utc>,
    pub status: BookStatus,
    pub updated_at: DateTime<Utc>,
    pub deleted: bool,
}

impl BookItem {
    /// 貸出可能かどうか
    ///
    /// ソフトデリート済みの蔵書は全ての照会から除外されるため、
    /// ここでもあわせて弾く。
    pub fn is_available(&self) -> bool {
        self.status == BookStatus::Available && !self.deleted
    }
}

/// 書架 - 位置（段・列）とカテゴリを持つ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelf {
    pub id: ShelfId,
    pub shelf_number: i32,
    pub line_number: i32,
    pub category: Option<i32>,
}

/// 書架位置のバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShelfError {
    /// 書架番号が不正（1以上であること）
    InvalidShelfNumber,
    /// 行番号が不正（1以上であること）
    InvalidLineNumber,
}

/// 書架位置の検証
pub fn validate_shelf_position(shelf_number: i32, line_number: i32) -> Result<(), ShelfError> {
    if shelf_number < 1 {
        return Err(ShelfError::InvalidShelfNumber);
    }
    if line_number < 1 {
        return Err(ShelfError::InvalidLineNumber);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_book_status_round_trip() {
        assert_eq!(BookStatus::from_str("AVAILABLE"), Ok(BookStatus::Available));
        assert_eq!(BookStatus::from_str("BORROWED"), Ok(BookStatus::Borrowed));
        assert_eq!(BookStatus::Available.as_str(), "AVAILABLE");
        assert!(BookStatus::from_str("LOST").is_err());
    }

    #[test]
    fn test_deleted_item_is_not_available() {
        let item = BookItem {
            id: BookItemId::from_raw(1),
            book_information_id: BookInfoId::from_raw(1),
            purchase_at: Utc::now(),
            status: BookStatus::Available,
            updated_at: Utc::now(),
            deleted: true,
        };
        assert!(!item.is_available());
    }

    #[test]
    fn test_validate_shelf_position() {
        assert_eq!(validate_shelf_position(1, 1), Ok(()));
        assert_eq!(
            validate_shelf_position(0, 1),
            Err(ShelfError::InvalidShelfNumber)
        );
        assert_eq!(
            validate_shelf_position(3, 0),
            Err(ShelfError::InvalidLineNumber)
        );
    }
}
