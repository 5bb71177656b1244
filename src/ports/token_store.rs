use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// リフレッシュトークンストアポート
///
/// リフレッシュトークンはリレーショナルな行ではなく、
/// メールアドレスをキーとした短命KVレコードとして保持される。
/// サーバー側で一方的に失効（削除）できることが要件。
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// トークンを保存する
    ///
    /// TTLはリフレッシュトークンの有効期間（秒）。既存の値は上書きされる。
    async fn save(&self, email: &str, token: &str, ttl_secs: u64) -> Result<()>;

    /// 保存済みトークンを取得する
    async fn find(&self, email: &str) -> Result<Option<String>>;

    /// トークンを削除する（ログアウト・失効）
    async fn delete(&self, email: &str) -> Result<()>;
}
