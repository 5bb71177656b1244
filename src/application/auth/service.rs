use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};

use super::jwt::{JwtSigner, TokenError};
use crate::adapters::postgres::UserRepository;
use crate::application::errors::{BusinessError, Result};
use crate::domain::session::{self, LoginOutcome};
use crate::domain::user::{NewUser, Provider, Role, User};
use crate::ports::TokenStore;
use crate::ports::ProfileClient;

/// 不透明リフレッシュトークンの長さ
const REFRESH_TOKEN_LEN: usize = 64;

/// 発行済みセッショントークンの組
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// ログイン成功の結果
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: User,
    pub tokens: SessionTokens,
}

/// OAuth2ログインの結果
///
/// 既知の利用者には完全なセッション、初回ログインには
/// 登録完了専用の一時トークンだけを返す。
#[derive(Debug, Clone)]
pub enum OAuth2LoginResult {
    Session(LoginResult),
    PendingSignup { temporary_token: String },
}

/// ローカル登録コマンド
#[derive(Debug, Clone)]
pub struct SignUpCommand {
    pub email: String,
    pub password: String,
    pub user_name: String,
    pub company_id: String,
}

/// OAuth2登録完了コマンド
#[derive(Debug, Clone)]
pub struct CompleteSignUpCommand {
    pub temporary_token: String,
    pub user_name: String,
    pub company_id: String,
}

/// 認証・セッション発行サービス
///
/// 資格情報の判定はドメイン層の純粋関数に委ね、ここでは
/// 永続化・トークン発行・リフレッシュトークンの保管を組み立てる。
pub struct AuthService {
    users: UserRepository,
    jwt: JwtSigner,
    tokens: Arc<dyn TokenStore>,
    profiles: Arc<dyn ProfileClient>,
}

impl AuthService {
    pub fn new(
        users: UserRepository,
        jwt: JwtSigner,
        tokens: Arc<dyn TokenStore>,
        profiles: Arc<dyn ProfileClient>,
    ) -> Self {
        Self {
            users,
            jwt,
            tokens,
            profiles,
        }
    }

    pub fn jwt(&self) -> &JwtSigner {
        &self.jwt
    }

    /// ローカル利用者の登録
    pub async fn sign_up(&self, cmd: SignUpCommand) -> Result<User> {
        if self.users.exists_by_email(&cmd.email).await? {
            return Err(BusinessError::DuplicateEmail);
        }
        if self.users.exists_by_company_id(&cmd.company_id).await? {
            return Err(BusinessError::DuplicateCompanyId);
        }

        let password_hash = bcrypt::hash(&cmd.password, bcrypt::DEFAULT_COST)
            .map_err(|e| BusinessError::Internal(format!("password hashing failed: {}", e)))?;

        let user = self
            .users
            .insert(&NewUser {
                email: cmd.email,
                password_hash: Some(password_hash),
                user_name: Some(cmd.user_name),
                company_id: Some(cmd.company_id),
                role: Role::User,
                provider: Provider::Local,
            })
            .await?;

        tracing::info!(user_id = user.id.value(), "user signed up");
        Ok(user)
    }

    /// ローカルログイン
    ///
    /// 未知の利用者・削除済み・パスワード不一致は全て同じ
    /// BadCredentialsになる（理由は外部に区別させない）。
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult> {
        let user = self.users.find_by_email(email).await?;

        let user = session::authenticate_local(user, |hash| {
            bcrypt::verify(password, hash).unwrap_or(false)
        })?;

        let tokens = self.issue_session(&user).await?;
        tracing::info!(user_id = user.id.value(), "login succeeded");

        Ok(LoginResult { user, tokens })
    }

    /// OAuth2ログイン
    ///
    /// プロバイダ発行のアクセストークンでプロフィールを取得し、
    /// (email, provider) の照合結果でセッションか登録保留かを決める。
    pub async fn oauth2_login(
        &self,
        provider: Provider,
        provider_access_token: &str,
    ) -> Result<OAuth2LoginResult> {
        let profile = self
            .profiles
            .fetch_profile(provider, provider_access_token)
            .await
            .map_err(BusinessError::ExternalService)?;

        let user = self
            .users
            .find_by_email_and_provider(&profile.email, provider)
            .await?;

        match session::resolve_oauth2(user, &profile.email, provider)? {
            LoginOutcome::Authenticated(user) => {
                let tokens = self.issue_session(&user).await?;
                Ok(OAuth2LoginResult::Session(LoginResult { user, tokens }))
            }
            LoginOutcome::PendingSignup { email, provider } => {
                let temporary_token = self
                    .jwt
                    .issue_temporary(&email, provider, Utc::now())
                    .map_err(|_| BusinessError::Internal("token issuance failed".into()))?;
                tracing::info!(email, "oauth2 signup pending");
                Ok(OAuth2LoginResult::PendingSignup { temporary_token })
            }
        }
    }

    /// OAuth2登録の完了
    ///
    /// 一時トークンで保留状態を引き換え、欠けているプロフィール
    /// （氏名・社員番号）を埋めて完全なセッションを発行する。
    pub async fn complete_signup(&self, cmd: CompleteSignUpCommand) -> Result<LoginResult> {
        let claims = self
            .jwt
            .verify_temporary(&cmd.temporary_token)
            .map_err(map_token_error)?;

        let provider = Provider::from_str(&claims.provider)
            .map_err(|_| BusinessError::InvalidToken)?;

        if self.users.exists_by_email(&claims.sub).await? {
            return Err(BusinessError::DuplicateEmail);
        }
        if self.users.exists_by_company_id(&cmd.company_id).await? {
            return Err(BusinessError::DuplicateCompanyId);
        }

        let user = self
            .users
            .insert(&NewUser {
                email: claims.sub,
                password_hash: None,
                user_name: Some(cmd.user_name),
                company_id: Some(cmd.company_id),
                role: Role::User,
                provider,
            })
            .await?;

        let tokens = self.issue_session(&user).await?;
        tracing::info!(user_id = user.id.value(), "oauth2 signup completed");

        Ok(LoginResult { user, tokens })
    }

    /// トークン再発行（リフレッシュトークンのローテーション付き）
    ///
    /// 期限切れアクセストークンから主体を取り出し、保存済みの
    /// リフレッシュトークンと提示値の一致を確認してから新しい組を発行する。
    pub async fn reissue(&self, access_token: &str, refresh_token: &str) -> Result<LoginResult> {
        let claims = self
            .jwt
            .decode_access_allow_expired(access_token)
            .map_err(map_token_error)?;

        let stored = self
            .tokens
            .find(&claims.sub)
            .await
            .map_err(BusinessError::Cache)?
            .ok_or(BusinessError::RefreshTokenNotFound)?;

        if stored != refresh_token {
            return Err(BusinessError::InvalidToken);
        }

        let user = self
            .users
            .find_active_by_email(&claims.sub)
            .await?
            .ok_or(BusinessError::InvalidToken)?;

        let tokens = self.issue_session(&user).await?;
        tracing::debug!(user_id = user.id.value(), "tokens reissued");

        Ok(LoginResult { user, tokens })
    }

    /// ログアウト（サーバー側のリフレッシュトークンを失効させる）
    pub async fn logout(&self, email: &str) -> Result<()> {
        self.tokens
            .delete(email)
            .await
            .map_err(BusinessError::Cache)?;
        tracing::info!(email, "logged out");
        Ok(())
    }

    /// アクセストークンの主体から利用者を解決する
    ///
    /// 主体が実在する（削除されていない）利用者でなければ
    /// トークンは無効として扱う。
    pub async fn current_user(&self, email: &str) -> Result<User> {
        self.users
            .find_active_by_email(email)
            .await?
            .ok_or(BusinessError::InvalidToken)
    }

    async fn issue_session(&self, user: &User) -> Result<SessionTokens> {
        let access_token = self
            .jwt
            .issue_access(&user.email, user.role, Utc::now())
            .map_err(|_| BusinessError::Internal("token issuance failed".into()))?;

        let refresh_token = generate_refresh_token();
        self.tokens
            .save(
                &user.email,
                &refresh_token,
                self.jwt.refresh_ttl_secs() as u64,
            )
            .await
            .map_err(BusinessError::Cache)?;

        Ok(SessionTokens {
            access_token,
            refresh_token,
        })
    }
}

fn map_token_error(err: TokenError) -> BusinessError {
    match err {
        TokenError::Expired => BusinessError::ExpiredToken,
        TokenError::Invalid => BusinessError::InvalidToken,
    }
}

/// 不透明なリフレッシュトークンを生成する
fn generate_refresh_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_refresh_token_is_opaque_and_unique() {
        let a = generate_refresh_token();
        let b = generate_refresh_token();

        assert_eq!(a.len(), REFRESH_TOKEN_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }
}
