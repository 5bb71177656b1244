use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::session::OAuth2Profile;
use crate::domain::user::Provider;
use crate::ports::profile_client::{ProfileClient, Result};

/// ProfileClientのモック実装
///
/// (provider, access_token) に対応するプロフィールを事前登録する。
/// 未登録のトークンはプロバイダ側の拒否として扱う。
#[derive(Default)]
pub struct MockProfileClient {
    profiles: Mutex<HashMap<(Provider, String), OAuth2Profile>>,
}

impl MockProfileClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, provider: Provider, access_token: &str, profile: OAuth2Profile) {
        self.profiles
            .lock()
            .unwrap()
            .insert((provider, access_token.to_string()), profile);
    }
}

#[async_trait]
impl ProfileClient for MockProfileClient {
    async fn fetch_profile(&self, provider: Provider, access_token: &str) -> Result<OAuth2Profile> {
        self.profiles
            .lock()
            .unwrap()
            .get(&(provider, access_token.to_string()))
            .cloned()
            .ok_or_else(|| "provider rejected the access token".into())
    }
}
