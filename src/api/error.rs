use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::{ErrorResponse, FieldError};
use crate::application::BusinessError;

/// API層のエラー型
///
/// ビジネスエラーをHTTPステータスと統一エラーボディにマッピングする。
#[derive(Debug)]
pub enum ApiError {
    Business(BusinessError),
    /// リクエスト検証の失敗（フィールド単位で収集済み）
    Validation(Vec<FieldError>),
}

impl From<BusinessError> for ApiError {
    fn from(err: BusinessError) -> Self {
        ApiError::Business(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, violations)| {
                violations.iter().map(move |violation| FieldError {
                    field: field.to_string(),
                    value: violation
                        .params
                        .get("value")
                        .map(|v| v.to_string())
                        .unwrap_or_default(),
                    reason: violation
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| violation.code.to_string()),
                })
            })
            .collect();

        ApiError::Validation(fields)
    }
}

fn status_for(err: &BusinessError) -> StatusCode {
    use BusinessError::*;

    match err {
        UserNotFound | BookInfoNotFound | BookItemNotFound | HistoryNotFound
        | LoanPolicyNotFound | NotificationNotFound | NoticeNotFound | QnaNotFound
        | CommentNotFound | ShelfNotFound | QrCodeNotFound | FeedbackNotFound
        | SnapshotNotFound => StatusCode::NOT_FOUND,

        BookAlreadyBorrowed | BookAlreadyReturned | BookAlreadyDeleted | BorrowLimitExceeded
        | DuplicateEmail | DuplicateCompanyId | DuplicateQrCode | InvalidIsbn
        | InvalidInput(_) => StatusCode::BAD_REQUEST,

        BadCredentials | Unauthorized | InvalidToken | ExpiredToken | RefreshTokenNotFound => {
            StatusCode::UNAUTHORIZED
        }
        Forbidden => StatusCode::FORBIDDEN,

        ExternalService(_) | Database(_) | Cache(_) | Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            ApiError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                "Invalid input value".to_string(),
                fields,
            ),
            ApiError::Business(err) => {
                let status = status_for(&err);

                // 内部障害の詳細はログに残し、クライアントには出さない
                let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!(error = ?err, "internal error");
                    "An unexpected error occurred".to_string()
                } else {
                    err.to_string()
                };

                (status, message, Vec::new())
            }
        };

        let body = Json(ErrorResponse::new(status.as_u16(), message, errors));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_kinds_map_to_404() {
        assert_eq!(
            status_for(&BusinessError::BookItemNotFound),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&BusinessError::HistoryNotFound),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_conflicts_map_to_400() {
        assert_eq!(
            status_for(&BusinessError::BookAlreadyBorrowed),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&BusinessError::BorrowLimitExceeded),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_credential_failures_map_to_401() {
        assert_eq!(
            status_for(&BusinessError::BadCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&BusinessError::ExpiredToken),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_internal_failures_map_to_500() {
        assert_eq!(
            status_for(&BusinessError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&BusinessError::Database(sqlx::Error::RowNotFound)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
