use axum::Json;

use super::auth::UserResponse;
use crate::api::error::ApiError;
use crate::api::extract::AuthUser;

/// GET /api/users/me - 自分のプロフィール
pub async fn me(AuthUser(user): AuthUser) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(UserResponse::from(&user)))
}
