use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// 利用者ロール
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// 認証プロバイダ
///
/// 文字列キーによる分岐ではなくタグ付きバリアントで表現し、
/// プロバイダの追加はバリアントの追加で行う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    Local,
    Google,
    Naver,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Local => "LOCAL",
            Provider::Google => "GOOGLE",
            Provider::Naver => "NAVER",
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOCAL" => Ok(Provider::Local),
            "GOOGLE" => Ok(Provider::Google),
            "NAVER" => Ok(Provider::Naver),
            _ => Err(format!("Invalid provider: {}", s)),
        }
    }
}

/// 利用者 - 認証・認可の主体
///
/// - メールアドレスは一意
/// - 社員番号はOAuth2登録完了まで未設定のことがある（設定後は一意）
/// - パスワードハッシュはLOCALプロバイダのみ保持する
/// - 退会はソフトデリート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: Option<String>,
    pub user_name: Option<String>,
    pub company_id: Option<String>,
    pub role: Role,
    pub provider: Provider,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted: bool,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// 利用者の作成データ（ID採番前）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: Option<String>,
    pub user_name: Option<String>,
    pub company_id: Option<String>,
    pub role: Role,
    pub provider: Provider,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_round_trip() {
        assert_eq!(Role::from_str("USER"), Ok(Role::User));
        assert_eq!(Role::from_str("ADMIN"), Ok(Role::Admin));
        assert_eq!(Role::Admin.as_str(), "ADMIN");
        assert!(Role::from_str("ROOT").is_err());
    }

    #[test]
    fn test_provider_round_trip() {
        for provider in [Provider::Local, Provider::Google, Provider::Naver] {
            assert_eq!(Provider::from_str(provider.as_str()), Ok(provider));
        }
        assert!(Provider::from_str("kakao").is_err());
    }
}
