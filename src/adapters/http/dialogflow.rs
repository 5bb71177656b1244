use async_trait::async_trait;
use serde_json::json;

use crate::ports::chatbot::{ChatQuery, ChatReply, ChatbotClient, Result};

/// ChatbotClientのDialogflow v2 REST実装
///
/// セッションIDは利用者ごとに固定し、会話コンテキストを
/// Dialogflow側に引き継がせる。
pub struct DialogflowClient {
    http: reqwest::Client,
    project_id: String,
    access_token: String,
}

impl DialogflowClient {
    pub fn new(http: reqwest::Client, project_id: String, access_token: String) -> Self {
        Self {
            http,
            project_id,
            access_token,
        }
    }

    fn detect_intent_url(&self, session_id: &str) -> String {
        format!(
            "https://dialogflow.googleapis.com/v2/projects/{}/agent/sessions/{}:detectIntent",
            self.project_id, session_id
        )
    }
}

#[async_trait]
impl ChatbotClient for DialogflowClient {
    async fn detect_intent(&self, query: ChatQuery) -> Result<ChatReply> {
        let body = json!({
            "queryInput": {
                "text": {
                    "text": query.message,
                    "languageCode": query.language,
                }
            }
        });

        let response: serde_json::Value = self
            .http
            .post(self.detect_intent_url(&query.session_id))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let result = response
            .get("queryResult")
            .ok_or("detectIntent response missing queryResult")?;

        let message = result
            .get("fulfillmentText")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let intent = result
            .get("intent")
            .and_then(|i| i.get("displayName"))
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let confidence = result
            .get("intentDetectionConfidence")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0) as f32;

        Ok(ChatReply {
            message,
            intent,
            confidence,
            quick_replies: Vec::new(),
        })
    }
}
