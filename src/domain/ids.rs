use serde::{Deserialize, Serialize};

/// ユーザーID - 利用者管理コンテキストの識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(i32);

impl UserId {
    pub fn from_raw(id: i32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

/// 書誌情報ID - カタログの書誌レコードへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookInfoId(i32);

impl BookInfoId {
    pub fn from_raw(id: i32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

/// 蔵書ID - 1冊の物理的な蔵書への参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookItemId(i32);

impl BookItemId {
    pub fn from_raw(id: i32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

/// 貸出履歴ID - 1回の貸出イベントへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryId(i32);

impl HistoryId {
    pub fn from_raw(id: i32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

/// 書架ID - 書架レコードへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShelfId(i32);

impl ShelfId {
    pub fn from_raw(id: i32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_preserve_raw_value() {
        assert_eq!(UserId::from_raw(7).value(), 7);
        assert_eq!(BookItemId::from_raw(42).value(), 42);
        assert_eq!(HistoryId::from_raw(-1).value(), -1);
    }

    #[test]
    fn test_ids_are_comparable() {
        assert_eq!(BookInfoId::from_raw(1), BookInfoId::from_raw(1));
        assert_ne!(UserId::from_raw(1), UserId::from_raw(2));
    }
}
