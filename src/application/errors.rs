use thiserror::Error;

use crate::domain::{BorrowError, PolicyError, ReturnError, SessionError, book::ShelfError};

/// ビジネスエラーの閉じた集合
///
/// 各種別はHTTPステータスと利用者向けメッセージに対応する。
/// 想定外の失敗（DB・外部API）は詳細をログに残し、クライアント
/// には一般的なメッセージのみを返す。
#[derive(Debug, Error)]
pub enum BusinessError {
    // 404 - 見つからない（ソフトデリート済みも同じ扱い）
    #[error("User not found")]
    UserNotFound,
    #[error("Book information not found")]
    BookInfoNotFound,
    #[error("Book item not found")]
    BookItemNotFound,
    #[error("Borrow history not found")]
    HistoryNotFound,
    #[error("Loan policy not found")]
    LoanPolicyNotFound,
    #[error("Notification not found")]
    NotificationNotFound,
    #[error("Notice not found")]
    NoticeNotFound,
    #[error("Question not found")]
    QnaNotFound,
    #[error("Comment not found")]
    CommentNotFound,
    #[error("Shelf not found")]
    ShelfNotFound,
    #[error("QR code not found")]
    QrCodeNotFound,
    #[error("Feedback not found")]
    FeedbackNotFound,
    #[error("Shelf snapshot not found")]
    SnapshotNotFound,

    // 400 - 入力・状態の競合
    #[error("Book is already borrowed")]
    BookAlreadyBorrowed,
    #[error("Book is already returned")]
    BookAlreadyReturned,
    #[error("Book is already deleted")]
    BookAlreadyDeleted,
    #[error("Borrow limit exceeded")]
    BorrowLimitExceeded,
    #[error("Email is already registered")]
    DuplicateEmail,
    #[error("Company id is already registered")]
    DuplicateCompanyId,
    #[error("QR code is already issued")]
    DuplicateQrCode,
    #[error("Invalid ISBN")]
    InvalidIsbn,
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // 401 / 403
    #[error("Invalid email or password")]
    BadCredentials,
    #[error("Authentication required")]
    Unauthorized,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Expired token")]
    ExpiredToken,
    #[error("Refresh token not found")]
    RefreshTokenNotFound,
    #[error("Forbidden")]
    Forbidden,

    // 500 - 内部障害
    #[error("External service error")]
    ExternalService(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Database error")]
    Database(#[from] sqlx::Error),
    #[error("Cache error")]
    Cache(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, BusinessError>;

impl From<BorrowError> for BusinessError {
    fn from(err: BorrowError) -> Self {
        match err {
            BorrowError::AlreadyBorrowed => BusinessError::BookAlreadyBorrowed,
            BorrowError::LimitExceeded => BusinessError::BorrowLimitExceeded,
        }
    }
}

impl From<ReturnError> for BusinessError {
    fn from(err: ReturnError) -> Self {
        match err {
            ReturnError::AlreadyReturned => BusinessError::BookAlreadyReturned,
        }
    }
}

impl From<SessionError> for BusinessError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::BadCredentials => BusinessError::BadCredentials,
        }
    }
}

impl From<PolicyError> for BusinessError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::InvalidMaxBooks => {
                BusinessError::InvalidInput("max_books must be at least 1".into())
            }
            PolicyError::InvalidLoanPeriod => {
                BusinessError::InvalidInput("loan_period_days must be at least 1".into())
            }
        }
    }
}

impl From<ShelfError> for BusinessError {
    fn from(err: ShelfError) -> Self {
        match err {
            ShelfError::InvalidShelfNumber => {
                BusinessError::InvalidInput("shelf_number must be at least 1".into())
            }
            ShelfError::InvalidLineNumber => {
                BusinessError::InvalidInput("line_number must be at least 1".into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_business_kinds() {
        assert!(matches!(
            BusinessError::from(BorrowError::AlreadyBorrowed),
            BusinessError::BookAlreadyBorrowed
        ));
        assert!(matches!(
            BusinessError::from(BorrowError::LimitExceeded),
            BusinessError::BorrowLimitExceeded
        ));
        assert!(matches!(
            BusinessError::from(SessionError::BadCredentials),
            BusinessError::BadCredentials
        ));
    }
}
