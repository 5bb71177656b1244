use async_trait::async_trait;
use std::sync::Mutex;

use crate::ports::chatbot::{ChatQuery, ChatReply, ChatbotClient, Result};

/// ChatbotClientのモック実装
///
/// 固定の応答を返す。信頼度を差し替えてフォールバック経路を試せる。
pub struct MockChatbotClient {
    reply: Mutex<ChatReply>,
}

impl MockChatbotClient {
    pub fn new() -> Self {
        Self {
            reply: Mutex::new(ChatReply {
                message: "Mock reply".to_string(),
                intent: Some("mock.intent".to_string()),
                confidence: 0.9,
                quick_replies: Vec::new(),
            }),
        }
    }

    pub fn set_reply(&self, reply: ChatReply) {
        *self.reply.lock().unwrap() = reply;
    }
}

impl Default for MockChatbotClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatbotClient for MockChatbotClient {
    async fn detect_intent(&self, _query: ChatQuery) -> Result<ChatReply> {
        Ok(self.reply.lock().unwrap().clone())
    }
}
