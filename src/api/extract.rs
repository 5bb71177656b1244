use std::sync::Arc;

use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;

use super::error::ApiError;
use super::handlers::AppState;
use crate::application::BusinessError;
use crate::application::auth::TokenError;
use crate::domain::user::User;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// 認証済み利用者エクストラクタ
///
/// アクセストークンをCookieまたはAuthorizationヘッダから取り出し、
/// 署名・有効期限を検証した上で、主体が実在する利用者であることを
/// DBで照合する。どれか欠ければ401。
pub struct AuthUser(pub User);

/// 管理者エクストラクタ（AuthUser + ロール確認）
pub struct AdminUser(pub User);

fn token_from_parts(parts: &Parts) -> Option<String> {
    // Authorization: Bearer を優先し、無ければCookieを見る
    if let Some(value) = parts.headers.get(header::AUTHORIZATION) {
        if let Ok(value) = value.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    CookieJar::from_headers(&parts.headers)
        .get(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts).ok_or(BusinessError::Unauthorized)?;

        let claims = state.auth.jwt().verify_access(&token).map_err(|e| match e {
            TokenError::Expired => BusinessError::ExpiredToken,
            TokenError::Invalid => BusinessError::InvalidToken,
        })?;

        // トークンの主体が現在も有効な利用者であることの照合
        let user = state.auth.current_user(&claims.sub).await?;

        Ok(AuthUser(user))
    }
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(BusinessError::Forbidden.into());
        }

        Ok(AdminUser(user))
    }
}
