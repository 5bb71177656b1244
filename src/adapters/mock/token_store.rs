use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::ports::token_store::{Result, TokenStore};

/// TokenStoreのモック実装
///
/// インメモリのマップで保持する。TTLは検証対象外のため保存のみ行う。
#[derive(Default)]
pub struct MockTokenStore {
    tokens: Mutex<HashMap<String, String>>,
}

impl MockTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// テスト用：保存されている件数
    pub fn len(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TokenStore for MockTokenStore {
    async fn save(&self, email: &str, token: &str, _ttl_secs: u64) -> Result<()> {
        self.tokens
            .lock()
            .unwrap()
            .insert(email.to_string(), token.to_string());
        Ok(())
    }

    async fn find(&self, email: &str) -> Result<Option<String>> {
        Ok(self.tokens.lock().unwrap().get(email).cloned())
    }

    async fn delete(&self, email: &str) -> Result<()> {
        self.tokens.lock().unwrap().remove(email);
        Ok(())
    }
}
