use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 書架スナップショットストアポート
///
/// IoTデバイスが送る最新の書架状態をデバイスIDキーで保持する。
/// プロセス内のグローバル変数ではなく、明示的なキー付きレコード
/// として永続層に置く。
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// 最新スナップショットを保存する（デバイスごとに上書き）
    async fn save_latest(&self, device_id: &str, payload: &str) -> Result<()>;

    /// 最新スナップショットを取得する
    async fn latest(&self, device_id: &str) -> Result<Option<String>>;
}
