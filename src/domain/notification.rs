use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// 通知ステータス
///
/// DELETE はソフトデリート状態であり、行の物理削除ではない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationStatus {
    Unread,
    Read,
    Delete,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Unread => "UNREAD",
            NotificationStatus::Read => "READ",
            NotificationStatus::Delete => "DELETE",
        }
    }
}

impl std::str::FromStr for NotificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNREAD" => Ok(NotificationStatus::Unread),
            "READ" => Ok(NotificationStatus::Read),
            "DELETE" => Ok(NotificationStatus::Delete),
            _ => Err(format!("Invalid notification status: {}", s)),
        }
    }
}

/// 通知種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    /// 延滞発生（利用者向け）
    Overdue,
    /// 返却期限前日（利用者向け）
    ReturnDeadline,
    /// お気に入りの蔵書が返却された
    FavoriteBookAvailable,
    /// 質問への回答があった
    QnaAnswered,
    /// 新しい質問が投稿された（管理者向け）
    QnaCreated,
    /// IoTデバイス異常（管理者向け）
    DeviceError,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Overdue => "OVERDUE",
            NotificationKind::ReturnDeadline => "RETURN_DEADLINE",
            NotificationKind::FavoriteBookAvailable => "FAVORITE_BOOK_AVAILABLE",
            NotificationKind::QnaAnswered => "QNA_ANSWERED",
            NotificationKind::QnaCreated => "QNA_CREATED",
            NotificationKind::DeviceError => "DEVICE_ERROR",
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OVERDUE" => Ok(NotificationKind::Overdue),
            "RETURN_DEADLINE" => Ok(NotificationKind::ReturnDeadline),
            "FAVORITE_BOOK_AVAILABLE" => Ok(NotificationKind::FavoriteBookAvailable),
            "QNA_ANSWERED" => Ok(NotificationKind::QnaAnswered),
            "QNA_CREATED" => Ok(NotificationKind::QnaCreated),
            "DEVICE_ERROR" => Ok(NotificationKind::DeviceError),
            _ => Err(format!("Invalid notification kind: {}", s)),
        }
    }
}

/// 通知 - 利用者ごとのメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: i32,
    pub user_id: UserId,
    pub content: String,
    pub kind: NotificationKind,
    /// 通知対象リソースのID（蔵書・QnAなど、種別に依存）
    pub resource_id: Option<i32>,
    pub status: NotificationStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_round_trip() {
        for status in [
            NotificationStatus::Unread,
            NotificationStatus::Read,
            NotificationStatus::Delete,
        ] {
            assert_eq!(NotificationStatus::from_str(status.as_str()), Ok(status));
        }
        assert!(NotificationStatus::from_str("ARCHIVED").is_err());
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            NotificationKind::Overdue,
            NotificationKind::ReturnDeadline,
            NotificationKind::FavoriteBookAvailable,
            NotificationKind::QnaAnswered,
            NotificationKind::QnaCreated,
            NotificationKind::DeviceError,
        ] {
            assert_eq!(NotificationKind::from_str(kind.as_str()), Ok(kind));
        }
    }
}
