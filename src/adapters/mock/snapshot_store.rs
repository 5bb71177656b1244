use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::ports::snapshot_store::{Result, SnapshotStore};

/// SnapshotStoreのモック実装
#[derive(Default)]
pub struct MockSnapshotStore {
    snapshots: Mutex<HashMap<String, String>>,
}

impl MockSnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MockSnapshotStore {
    async fn save_latest(&self, device_id: &str, payload: &str) -> Result<()> {
        self.snapshots
            .lock()
            .unwrap()
            .insert(device_id.to_string(), payload.to_string());
        Ok(())
    }

    async fn latest(&self, device_id: &str) -> Result<Option<String>> {
        Ok(self.snapshots.lock().unwrap().get(device_id).cloned())
    }
}
