use async_trait::async_trait;

use crate::domain::session::OAuth2Profile;
use crate::domain::user::Provider;
use crate::ports::profile_client::{ProfileClient, Result};

const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const NAVER_USERINFO_URL: &str = "https://openapi.naver.com/v1/nid/me";

/// ProfileClientのHTTP実装
///
/// プロバイダごとのユーザー情報エンドポイントを呼び、レスポンスを
/// バリアントごとの正規化関数で (email, name) に落とす。
pub struct HttpProfileClient {
    http: reqwest::Client,
}

impl HttpProfileClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

/// Googleのユーザー情報レスポンスを正規化する
fn normalize_google(body: &serde_json::Value) -> Option<OAuth2Profile> {
    Some(OAuth2Profile {
        email: body.get("email")?.as_str()?.to_string(),
        name: body
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::to_string),
    })
}

/// Naverのユーザー情報レスポンスを正規化する（`response` 配下に入る）
fn normalize_naver(body: &serde_json::Value) -> Option<OAuth2Profile> {
    let response = body.get("response")?;
    Some(OAuth2Profile {
        email: response.get("email")?.as_str()?.to_string(),
        name: response
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::to_string),
    })
}

#[async_trait]
impl ProfileClient for HttpProfileClient {
    async fn fetch_profile(&self, provider: Provider, access_token: &str) -> Result<OAuth2Profile> {
        let url = match provider {
            Provider::Google => GOOGLE_USERINFO_URL,
            Provider::Naver => NAVER_USERINFO_URL,
            Provider::Local => return Err("local provider has no profile endpoint".into()),
        };

        let body: serde_json::Value = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let profile = match provider {
            Provider::Google => normalize_google(&body),
            Provider::Naver => normalize_naver(&body),
            Provider::Local => unreachable!(),
        };

        profile.ok_or_else(|| "profile response missing email".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_google() {
        let body = json!({"email": "a@example.com", "name": "A"});
        let profile = normalize_google(&body).unwrap();
        assert_eq!(profile.email, "a@example.com");
        assert_eq!(profile.name.as_deref(), Some("A"));
    }

    #[test]
    fn test_normalize_naver_nested_response() {
        let body = json!({"resultcode": "00", "response": {"email": "b@example.com"}});
        let profile = normalize_naver(&body).unwrap();
        assert_eq!(profile.email, "b@example.com");
        assert_eq!(profile.name, None);
    }

    #[test]
    fn test_normalize_requires_email() {
        assert!(normalize_google(&json!({"name": "A"})).is_none());
        assert!(normalize_naver(&json!({"response": {}})).is_none());
    }
}
