use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};

use crate::ports::snapshot_store::{Result, SnapshotStore};

const KEY_PREFIX: &str = "SHELF:";

/// SnapshotStoreのRedis実装
///
/// デバイスごとの最新書架スナップショットを `SHELF:<device>` に保持する。
#[derive(Clone)]
pub struct RedisSnapshotStore {
    conn: ConnectionManager,
}

impl RedisSnapshotStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn key(device_id: &str) -> String {
        format!("{}{}", KEY_PREFIX, device_id)
    }
}

#[async_trait]
impl SnapshotStore for RedisSnapshotStore {
    async fn save_latest(&self, device_id: &str, payload: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(Self::key(device_id), payload).await?;
        Ok(())
    }

    async fn latest(&self, device_id: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn.get(Self::key(device_id)).await?;
        Ok(payload)
    }
}
