use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// チャットボットへの問い合わせ
#[derive(Debug, Clone, PartialEq)]
pub struct ChatQuery {
    /// 利用者ごとの会話コンテキストを識別するセッションID
    pub session_id: String,
    pub message: String,
    pub language: String,
}

/// チャットボットの応答
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub message: String,
    pub intent: Option<String>,
    /// インテント検出の信頼度（0.0〜1.0）
    pub confidence: f32,
    pub quick_replies: Vec<String>,
}

/// チャットボットポート
#[async_trait]
pub trait ChatbotClient: Send + Sync {
    /// メッセージを送信してインテント検出結果を受け取る
    async fn detect_intent(&self, query: ChatQuery) -> Result<ChatReply>;
}
