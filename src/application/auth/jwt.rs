use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::domain::user::{Provider, Role};

/// 一時トークンの用途クレーム値
///
/// アクセストークンと混同されないよう、一時トークンは専用の
/// `purpose` クレームを必須とする。
const SIGNUP_PURPOSE: &str = "signup";

/// JWT設定
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    /// アクセストークンの有効期間（秒）
    pub access_ttl_secs: i64,
    /// リフレッシュトークンの有効期間（秒）
    pub refresh_ttl_secs: i64,
    /// 登録完了用一時トークンの有効期間（秒）
    pub temporary_ttl_secs: i64,
}

/// アクセストークンのクレーム
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// 利用者のメールアドレス
    pub sub: String,
    pub role: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// 登録完了用一時トークンのクレーム
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporaryClaims {
    pub sub: String,
    pub provider: String,
    /// 常に "signup"。アクセストークンとの取り違えを防ぐ
    pub purpose: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// トークン検証エラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Invalid,
}

/// JWTの発行・検証
///
/// アクセストークンは署名付きステートレストークン。
/// リフレッシュトークンは不透明なランダム値であり、このモジュール
/// では扱わない（TokenStore側で保持・失効される）。
pub struct JwtSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl_secs: i64,
    temporary_ttl: Duration,
}

impl JwtSigner {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            access_ttl: Duration::seconds(config.access_ttl_secs),
            refresh_ttl_secs: config.refresh_ttl_secs,
            temporary_ttl: Duration::seconds(config.temporary_ttl_secs),
        }
    }

    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl_secs
    }

    /// アクセストークンを発行する
    pub fn issue_access(
        &self,
        email: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = AccessClaims {
            sub: email.to_string(),
            role: role.as_str().to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|_| TokenError::Invalid)
    }

    /// 登録完了用の一時トークンを発行する
    ///
    /// アクセストークンより短命で、登録完了の呼び出しにしか使えない。
    pub fn issue_temporary(
        &self,
        email: &str,
        provider: Provider,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = TemporaryClaims {
            sub: email.to_string(),
            provider: provider.as_str().to_string(),
            purpose: SIGNUP_PURPOSE.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + self.temporary_ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|_| TokenError::Invalid)
    }

    /// アクセストークンを検証する
    ///
    /// 署名・発行者・有効期限を確認する。主体が実在する利用者かどうかは
    /// 呼び出し側（リクエスト処理）が照合する。
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        decode::<AccessClaims>(token, &self.decoding, &self.validation(true))
            .map(|data| data.claims)
            .map_err(map_jwt_error)
    }

    /// 有効期限の検証を省いてアクセストークンを読む
    ///
    /// 再発行時に期限切れトークンから主体を取り出すために使う。
    /// 署名と発行者は通常どおり検証される。
    pub fn decode_access_allow_expired(&self, token: &str) -> Result<AccessClaims, TokenError> {
        decode::<AccessClaims>(token, &self.decoding, &self.validation(false))
            .map(|data| data.claims)
            .map_err(map_jwt_error)
    }

    /// 一時トークンを検証する
    ///
    /// purposeクレームが登録完了用であることも確認する。
    pub fn verify_temporary(&self, token: &str) -> Result<TemporaryClaims, TokenError> {
        let claims = decode::<TemporaryClaims>(token, &self.decoding, &self.validation(true))
            .map(|data| data.claims)
            .map_err(map_jwt_error)?;

        if claims.purpose != SIGNUP_PURPOSE {
            return Err(TokenError::Invalid);
        }

        Ok(claims)
    }

    fn validation(&self, validate_exp: bool) -> Validation {
        let mut validation = Validation::default();
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.validate_exp = validate_exp;
        validation.leeway = 0;
        validation
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> JwtSigner {
        JwtSigner::new(&JwtConfig {
            secret: "test-secret-key-of-reasonable-length".to_string(),
            issuer: "smart-library".to_string(),
            access_ttl_secs: 1800,
            refresh_ttl_secs: 1_209_600,
            temporary_ttl_secs: 300,
        })
    }

    #[test]
    fn test_access_token_round_trip() {
        let signer = signer();
        let now = Utc::now();

        let token = signer.issue_access("user@corp.example", Role::Admin, now).unwrap();
        let claims = signer.verify_access(&token).unwrap();

        assert_eq!(claims.sub, "user@corp.example");
        assert_eq!(claims.role, "ADMIN");
        assert_eq!(claims.iss, "smart-library");
        assert_eq!(claims.exp - claims.iat, 1800);
    }

    #[test]
    fn test_expired_access_token_is_rejected() {
        let signer = signer();
        let issued_at = Utc::now() - Duration::hours(2);

        let token = signer.issue_access("user@corp.example", Role::User, issued_at).unwrap();

        assert_eq!(signer.verify_access(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_expired_token_readable_for_reissue() {
        let signer = signer();
        let issued_at = Utc::now() - Duration::hours(2);

        let token = signer.issue_access("user@corp.example", Role::User, issued_at).unwrap();
        let claims = signer.decode_access_allow_expired(&token).unwrap();

        assert_eq!(claims.sub, "user@corp.example");
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let signer = signer();
        let token = signer
            .issue_access("user@corp.example", Role::User, Utc::now())
            .unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        tampered.push('x');

        assert_eq!(signer.verify_access(&tampered).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn test_temporary_token_round_trip() {
        let signer = signer();
        let now = Utc::now();

        let token = signer
            .issue_temporary("new@corp.example", Provider::Google, now)
            .unwrap();
        let claims = signer.verify_temporary(&token).unwrap();

        assert_eq!(claims.sub, "new@corp.example");
        assert_eq!(claims.provider, "GOOGLE");
        assert_eq!(claims.purpose, "signup");
    }

    #[test]
    fn test_access_token_is_not_a_temporary_token() {
        // purposeクレームを持たないためデシリアライズに失敗する
        let signer = signer();
        let token = signer
            .issue_access("user@corp.example", Role::User, Utc::now())
            .unwrap();

        assert_eq!(signer.verify_temporary(&token).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn test_temporary_token_cannot_be_used_as_access_token() {
        // role / purpose のクレーム形状が異なるため検証に失敗する
        let signer = signer();
        let token = signer
            .issue_temporary("new@corp.example", Provider::Naver, Utc::now())
            .unwrap();

        assert_eq!(signer.verify_access(&token).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn test_wrong_issuer_is_invalid() {
        let signer = signer();
        let other = JwtSigner::new(&JwtConfig {
            secret: "test-secret-key-of-reasonable-length".to_string(),
            issuer: "another-service".to_string(),
            access_ttl_secs: 1800,
            refresh_ttl_secs: 1_209_600,
            temporary_ttl_secs: 300,
        });

        let token = other
            .issue_access("user@corp.example", Role::User, Utc::now())
            .unwrap();

        assert_eq!(signer.verify_access(&token).unwrap_err(), TokenError::Invalid);
    }
}
