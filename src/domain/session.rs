use super::{
    SessionError,
    user::{Provider, User},
};

/// プロバイダから取得した正規化済みプロフィール
///
/// 各プロバイダ固有のレスポンス形状は adapters 層で
/// この1つの形に正規化される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuth2Profile {
    pub email: String,
    pub name: Option<String>,
}

/// ログイン試行の帰結
///
/// 状態機械：Unauthenticated → (資格情報の検証) →
/// Authenticated | PendingSignup | Rejected(エラー)。
/// PendingSignup は登録完了の明示的な呼び出しによってのみ
/// Authenticated に遷移する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// 既知の利用者。完全なセッションを発行してよい
    Authenticated(User),
    /// 初回OAuth2ログイン。登録完了専用の一時トークンのみ発行する
    PendingSignup { email: String, provider: Provider },
}

/// 純粋関数：ローカル認証の判定
///
/// 利用者が存在しない・ソフトデリート済み・パスワード不一致は
/// いずれも同一の `BadCredentials` に落とす。呼び出し側が
/// 「未知の利用者」と「誤ったパスワード」を区別できる情報を
/// 返してはならない。
pub fn authenticate_local<F>(user: Option<User>, verify_password: F) -> Result<User, SessionError>
where
    F: FnOnce(&str) -> bool,
{
    let user = user.ok_or(SessionError::BadCredentials)?;

    if user.deleted {
        return Err(SessionError::BadCredentials);
    }

    let hash = user
        .password_hash
        .as_deref()
        .ok_or(SessionError::BadCredentials)?;

    if !verify_password(hash) {
        return Err(SessionError::BadCredentials);
    }

    Ok(user)
}

/// 純粋関数：OAuth2ログインの帰結を決める
///
/// (email, provider) で既知なら Authenticated、未知なら
/// PendingSignup。ソフトデリート済みの利用者は拒否する。
pub fn resolve_oauth2(
    user: Option<User>,
    email: &str,
    provider: Provider,
) -> Result<LoginOutcome, SessionError> {
    match user {
        Some(user) if user.deleted => Err(SessionError::BadCredentials),
        Some(user) => Ok(LoginOutcome::Authenticated(user)),
        None => Ok(LoginOutcome::PendingSignup {
            email: email.to_string(),
            provider,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use crate::domain::user::Role;
    use chrono::Utc;

    fn local_user(deleted: bool) -> User {
        User {
            id: UserId::from_raw(1),
            email: "user@corp.example".into(),
            password_hash: Some("$2b$12$hash".into()),
            user_name: Some("User".into()),
            company_id: Some("EMP-0001".into()),
            role: Role::User,
            provider: Provider::Local,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted,
        }
    }

    #[test]
    fn test_authenticate_local_success() {
        let user = authenticate_local(Some(local_user(false)), |_| true).unwrap();
        assert_eq!(user.email, "user@corp.example");
    }

    #[test]
    fn test_authenticate_local_failures_are_indistinguishable() {
        // 未知の利用者・削除済み・パスワード不一致が全て同じエラー種になる
        let unknown = authenticate_local(None, |_| true).unwrap_err();
        let deleted = authenticate_local(Some(local_user(true)), |_| true).unwrap_err();
        let wrong = authenticate_local(Some(local_user(false)), |_| false).unwrap_err();

        assert_eq!(unknown, SessionError::BadCredentials);
        assert_eq!(deleted, unknown);
        assert_eq!(wrong, unknown);
    }

    #[test]
    fn test_authenticate_local_rejects_user_without_password() {
        let mut user = local_user(false);
        user.password_hash = None;
        user.provider = Provider::Google;

        let result = authenticate_local(Some(user), |_| true);
        assert_eq!(result.unwrap_err(), SessionError::BadCredentials);
    }

    #[test]
    fn test_resolve_oauth2_known_user() {
        let mut user = local_user(false);
        user.provider = Provider::Google;

        let outcome = resolve_oauth2(Some(user.clone()), &user.email, Provider::Google).unwrap();
        assert_eq!(outcome, LoginOutcome::Authenticated(user));
    }

    #[test]
    fn test_resolve_oauth2_unknown_user_pends_signup() {
        let outcome = resolve_oauth2(None, "new@corp.example", Provider::Naver).unwrap();
        assert_eq!(
            outcome,
            LoginOutcome::PendingSignup {
                email: "new@corp.example".into(),
                provider: Provider::Naver,
            }
        );
    }

    #[test]
    fn test_resolve_oauth2_rejects_deleted_user() {
        let mut user = local_user(true);
        user.provider = Provider::Google;

        let result = resolve_oauth2(Some(user), "user@corp.example", Provider::Google);
        assert_eq!(result.unwrap_err(), SessionError::BadCredentials);
    }
}
