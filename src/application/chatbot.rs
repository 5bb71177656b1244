use std::sync::Arc;

use crate::adapters::postgres::{ChatbotFeedback, ChatbotFeedbackRepository};
use crate::application::errors::{BusinessError, Result};
use crate::domain::UserId;
use crate::ports::{ChatQuery, ChatbotClient};

/// フィードバックの処理状態
pub const FEEDBACK_PENDING: &str = "PENDING";
pub const FEEDBACK_RESOLVED: &str = "RESOLVED";

/// チャットボットの回答
#[derive(Debug, Clone, PartialEq)]
pub struct ChatAnswer {
    pub message: String,
    pub intent: Option<String>,
    pub quick_replies: Vec<String>,
    /// 信頼度不足のフォールバック応答かどうか
    pub fallback: bool,
}

/// チャットボットサービス
///
/// インテント検出の信頼度がしきい値を下回ったら、聞き返しの
/// フォールバック応答に差し替える。
pub struct ChatbotService {
    client: Arc<dyn ChatbotClient>,
    feedbacks: ChatbotFeedbackRepository,
    language: String,
    confidence_threshold: f32,
}

impl ChatbotService {
    pub fn new(
        client: Arc<dyn ChatbotClient>,
        feedbacks: ChatbotFeedbackRepository,
        language: String,
        confidence_threshold: f32,
    ) -> Self {
        Self {
            client,
            feedbacks,
            language,
            confidence_threshold,
        }
    }

    pub async fn ask(&self, user_id: UserId, message: &str) -> Result<ChatAnswer> {
        let reply = self
            .client
            .detect_intent(ChatQuery {
                // 利用者ごとに会話コンテキストを分ける
                session_id: user_id.value().to_string(),
                message: message.to_string(),
                language: self.language.clone(),
            })
            .await
            .map_err(BusinessError::ExternalService)?;

        if reply.confidence < self.confidence_threshold {
            tracing::debug!(
                confidence = reply.confidence,
                "intent confidence below threshold"
            );
            return Ok(ChatAnswer {
                message: "すみません、質問をもう少し詳しく教えていただけますか？".to_string(),
                intent: None,
                quick_replies: default_quick_replies(),
                fallback: true,
            });
        }

        Ok(ChatAnswer {
            message: reply.message,
            intent: reply.intent,
            quick_replies: reply.quick_replies,
            fallback: false,
        })
    }

    pub async fn submit_feedback(
        &self,
        user_id: UserId,
        category: &str,
        content: &str,
    ) -> Result<ChatbotFeedback> {
        Ok(self.feedbacks.insert(user_id, category, content).await?)
    }

    pub async fn list_feedback(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ChatbotFeedback>, i64)> {
        Ok(self.feedbacks.page(limit, offset).await?)
    }

    pub async fn resolve_feedback(&self, id: i32) -> Result<()> {
        let updated = self.feedbacks.update_status(id, FEEDBACK_RESOLVED).await?;
        if updated == 0 {
            return Err(BusinessError::FeedbackNotFound);
        }
        Ok(())
    }
}

fn default_quick_replies() -> Vec<String> {
    vec![
        "貸出方法を知りたい".to_string(),
        "返却期限を確認したい".to_string(),
        "本の場所を探したい".to_string(),
    ]
}
