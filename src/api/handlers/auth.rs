use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::error::ApiError;
use crate::api::extract::{ACCESS_TOKEN_COOKIE, AuthUser, REFRESH_TOKEN_COOKIE};
use crate::api::handlers::AppState;
use crate::application::BusinessError;
use crate::application::auth::{
    CompleteSignUpCommand, LoginResult, OAuth2LoginResult, SessionTokens, SignUpCommand,
};
use crate::domain::user::{Provider, User};

// ============================================================================
// DTO
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub user_name: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub company_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OAuth2LoginRequest {
    /// プロバイダが発行したアクセストークン
    #[validate(length(min = 1, message = "must not be empty"))]
    pub access_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CompleteSignUpRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub temporary_token: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub user_name: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub company_id: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub user_name: Option<String>,
    pub company_id: Option<String>,
    pub role: String,
    pub provider: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.value(),
            email: user.email.clone(),
            user_name: user.user_name.clone(),
            company_id: user.company_id.clone(),
            role: user.role.as_str().to_string(),
            provider: user.provider.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct PendingSignUpResponse {
    pub pending_signup: bool,
    pub temporary_token: String,
}

// ============================================================================
// Cookie helpers
// ============================================================================

fn session_cookie(name: &'static str, value: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(time::Duration::seconds(max_age_secs));
    cookie
}

fn expired_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, "");
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::ZERO);
    cookie
}

/// セッショントークンをCookieに載せる
fn with_session_cookies(
    jar: CookieJar,
    state: &AppState,
    tokens: &SessionTokens,
) -> CookieJar {
    let jwt = state.auth.jwt();
    jar.add(session_cookie(
        ACCESS_TOKEN_COOKIE,
        tokens.access_token.clone(),
        jwt.access_ttl_secs(),
        state.cookie_secure,
    ))
    .add(session_cookie(
        REFRESH_TOKEN_COOKIE,
        tokens.refresh_token.clone(),
        jwt.refresh_ttl_secs(),
        state.cookie_secure,
    ))
}

fn without_session_cookies(jar: CookieJar) -> CookieJar {
    jar.add(expired_cookie(ACCESS_TOKEN_COOKIE))
        .add(expired_cookie(REFRESH_TOKEN_COOKIE))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/signup - ローカル利用者の登録
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    req.validate()?;

    let user = state
        .auth
        .sign_up(SignUpCommand {
            email: req.email,
            password: req.password,
            user_name: req.user_name,
            company_id: req.company_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// POST /api/auth/login - ローカルログイン
///
/// 成功時はアクセス・リフレッシュ両トークンをCookieで返す。
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    req.validate()?;

    let LoginResult { user, tokens } = state.auth.login(&req.email, &req.password).await?;
    let jar = with_session_cookies(jar, &state, &tokens);

    Ok((
        jar,
        Json(LoginResponse {
            user: UserResponse::from(&user),
        }),
    ))
}

/// POST /api/auth/oauth2/:provider - OAuth2ログイン
///
/// 既知の利用者にはセッションを発行し、初回の利用者には
/// 登録完了用の一時トークンだけを返す（Cookieは発行しない）。
pub async fn oauth2_login(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    jar: CookieJar,
    Json(req): Json<OAuth2LoginRequest>,
) -> Result<Response, ApiError> {
    req.validate()?;
    let provider = parse_provider_slug(&provider)?;

    match state.auth.oauth2_login(provider, &req.access_token).await? {
        OAuth2LoginResult::Session(LoginResult { user, tokens }) => {
            let jar = with_session_cookies(jar, &state, &tokens);
            Ok((
                jar,
                Json(LoginResponse {
                    user: UserResponse::from(&user),
                }),
            )
                .into_response())
        }
        OAuth2LoginResult::PendingSignup { temporary_token } => Ok(Json(PendingSignUpResponse {
            pending_signup: true,
            temporary_token,
        })
        .into_response()),
    }
}

/// POST /api/auth/oauth2/complete - OAuth2登録の完了
pub async fn complete_oauth2_signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<CompleteSignUpRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    req.validate()?;

    let LoginResult { user, tokens } = state
        .auth
        .complete_signup(CompleteSignUpCommand {
            temporary_token: req.temporary_token,
            user_name: req.user_name,
            company_id: req.company_id,
        })
        .await?;

    let jar = with_session_cookies(jar, &state, &tokens);
    Ok((
        jar,
        Json(LoginResponse {
            user: UserResponse::from(&user),
        }),
    ))
}

/// POST /api/auth/reissue - トークン再発行（ローテーション付き）
pub async fn reissue(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let access_token = jar
        .get(ACCESS_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(BusinessError::Unauthorized)?;
    let refresh_token = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(BusinessError::RefreshTokenNotFound)?;

    let LoginResult { user, tokens } = state.auth.reissue(&access_token, &refresh_token).await?;
    let jar = with_session_cookies(jar, &state, &tokens);

    Ok((
        jar,
        Json(LoginResponse {
            user: UserResponse::from(&user),
        }),
    ))
}

/// POST /api/auth/logout - ログアウト
///
/// サーバー側のリフレッシュトークンを失効させ、Cookieを消す。
pub async fn logout(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ApiError> {
    state.auth.logout(&user.email).await?;
    Ok((without_session_cookies(jar), StatusCode::NO_CONTENT))
}

fn parse_provider_slug(slug: &str) -> Result<Provider, ApiError> {
    match slug {
        "google" => Ok(Provider::Google),
        "naver" => Ok(Provider::Naver),
        _ => Err(BusinessError::InvalidInput(format!("unsupported provider: {}", slug)).into()),
    }
}
