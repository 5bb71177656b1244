use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};

use crate::ports::token_store::{Result, TokenStore};

const KEY_PREFIX: &str = "RT:";

/// TokenStoreのRedis実装
///
/// キーは `RT:<email>`、値はリフレッシュトークン文字列。
/// TTLはリフレッシュトークンの有効期間と一致させ、期限切れは
/// Redis側の失効に任せる。
#[derive(Clone)]
pub struct RedisTokenStore {
    conn: ConnectionManager,
}

impl RedisTokenStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn key(email: &str) -> String {
        format!("{}{}", KEY_PREFIX, email)
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn save(&self, email: &str, token: &str, ttl_secs: u64) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(Self::key(email), token, ttl_secs).await?;
        tracing::debug!(email, "refresh token saved");
        Ok(())
    }

    async fn find(&self, email: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let token: Option<String> = conn.get(Self::key(email)).await?;
        Ok(token)
    }

    async fn delete(&self, email: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(Self::key(email)).await?;
        tracing::debug!(email, "refresh token deleted");
        Ok(())
    }
}
