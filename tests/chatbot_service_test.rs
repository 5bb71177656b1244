use std::sync::Arc;

use smart_library::adapters::mock::{MockChatbotClient, MockSnapshotStore};
use smart_library::adapters::postgres::ChatbotFeedbackRepository;
use smart_library::application::chatbot::ChatbotService;
use smart_library::domain::UserId;
use smart_library::ports::{ChatReply, SnapshotStore};

// ============================================================================
// チャットボット応答・スナップショットストアのテスト（DB不要）
// ============================================================================

/// 問い合わせ経路はDBに触れないため、遅延接続プールで十分
fn chatbot_service(client: Arc<MockChatbotClient>) -> ChatbotService {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://localhost/unused")
        .expect("lazy pool");

    ChatbotService::new(
        client,
        ChatbotFeedbackRepository::new(pool),
        "ja".to_string(),
        0.5,
    )
}

#[tokio::test]
async fn test_confident_reply_is_passed_through() {
    let client = Arc::new(MockChatbotClient::new());
    client.set_reply(ChatReply {
        message: "貸出は1人5冊までです".to_string(),
        intent: Some("faq.loan_limit".to_string()),
        confidence: 0.92,
        quick_replies: vec!["ほかの質問".to_string()],
    });

    let service = chatbot_service(client);
    let answer = service.ask(UserId::from_raw(1), "何冊まで借りられますか").await.unwrap();

    assert!(!answer.fallback);
    assert_eq!(answer.message, "貸出は1人5冊までです");
    assert_eq!(answer.intent.as_deref(), Some("faq.loan_limit"));
}

#[tokio::test]
async fn test_low_confidence_falls_back_to_reprompt() {
    let client = Arc::new(MockChatbotClient::new());
    client.set_reply(ChatReply {
        message: "たぶんこれ？".to_string(),
        intent: Some("faq.unknown".to_string()),
        confidence: 0.2,
        quick_replies: Vec::new(),
    });

    let service = chatbot_service(client);
    let answer = service.ask(UserId::from_raw(1), "あれ").await.unwrap();

    // しきい値未満はインテントを捨てて聞き返す
    assert!(answer.fallback);
    assert_eq!(answer.intent, None);
    assert!(!answer.quick_replies.is_empty());
}

#[tokio::test]
async fn test_snapshot_store_keeps_latest_per_device() {
    let store = MockSnapshotStore::new();

    store.save_latest("device-a", r#"{"shelf":1}"#).await.unwrap();
    store.save_latest("device-a", r#"{"shelf":2}"#).await.unwrap();
    store.save_latest("device-b", r#"{"shelf":9}"#).await.unwrap();

    // デバイスごとに最後の書き込みだけが残る
    assert_eq!(
        store.latest("device-a").await.unwrap().as_deref(),
        Some(r#"{"shelf":2}"#)
    );
    assert_eq!(
        store.latest("device-b").await.unwrap().as_deref(),
        Some(r#"{"shelf":9}"#)
    );
    assert_eq!(store.latest("device-c").await.unwrap(), None);
}
