use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, mpsc::UnboundedSender};
use uuid::Uuid;

use crate::domain::book::Shelf;

/// IoTメッセージ種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IotMessageType {
    /// デバイス → サーバー：蔵書の返却
    BookReturn,
    /// デバイス → サーバー：書架状態の更新
    LocationUpdate,
    /// サーバー → デバイス：LEDで位置を示す
    BookLocation,
    /// サーバー → デバイス：接続確立
    ConnectSuccess,
    /// サーバー → デバイス：処理エラー
    Error,
}

/// IoTチャネルのJSONメッセージ
///
/// 全接続デバイスへブロードキャストされる。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IotMessage {
    #[serde(rename = "type")]
    pub message_type: IotMessageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shelf: Option<Shelf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl IotMessage {
    pub fn book_location(book_id: String, shelf: Shelf) -> Self {
        Self {
            message_type: IotMessageType::BookLocation,
            book_id: Some(book_id),
            shelf: Some(shelf),
            message: None,
            timestamp: Utc::now(),
        }
    }

    pub fn connect_success() -> Self {
        Self {
            message_type: IotMessageType::ConnectSuccess,
            book_id: None,
            shelf: None,
            message: Some("connection established".to_string()),
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            message_type: IotMessageType::Error,
            book_id: None,
            shelf: None,
            message: Some(message),
            timestamp: Utc::now(),
        }
    }
}

/// 接続中IoTデバイスのハブ
///
/// セッションIDごとに送信チャネルを持ち、ブロードキャストに使う。
/// 切断済みのチャネルは送信失敗時に取り除く。
#[derive(Default)]
pub struct DeviceHub {
    sessions: RwLock<HashMap<Uuid, UnboundedSender<String>>>,
}

impl DeviceHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, sender: UnboundedSender<String>) -> Uuid {
        let session_id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;
        sessions.insert(session_id, sender);
        tracing::info!(%session_id, connected = sessions.len(), "iot device connected");
        session_id
    }

    pub async fn unregister(&self, session_id: Uuid) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(&session_id);
        tracing::info!(%session_id, connected = sessions.len(), "iot device disconnected");
    }

    pub async fn connected_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// 全接続デバイスへ送信する。戻り値は送信できた数
    pub async fn broadcast(&self, message: &IotMessage) -> usize {
        let payload = match serde_json::to_string(message) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "iot message serialization failed");
                return 0;
            }
        };

        let mut stale = Vec::new();
        let mut delivered = 0;

        {
            let sessions = self.sessions.read().await;
            for (session_id, sender) in sessions.iter() {
                if sender.send(payload.clone()).is_ok() {
                    delivered += 1;
                } else {
                    stale.push(*session_id);
                }
            }
        }

        if !stale.is_empty() {
            let mut sessions = self.sessions.write().await;
            for session_id in stale {
                sessions.remove(&session_id);
            }
        }

        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ShelfId;
    use tokio::sync::mpsc;

    fn shelf() -> Shelf {
        Shelf {
            id: ShelfId::from_raw(1),
            shelf_number: 3,
            line_number: 2,
            category: Some(5),
        }
    }

    #[test]
    fn test_iot_message_wire_format() {
        let message = IotMessage::book_location("42".to_string(), shelf());
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&message).unwrap()).unwrap();

        assert_eq!(json["type"], "BOOK_LOCATION");
        assert_eq!(json["bookId"], "42");
        assert_eq!(json["shelf"]["shelf_number"], 3);
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_inbound_message_parses() {
        let raw = r#"{"type":"BOOK_RETURN","bookId":"7","timestamp":"2026-01-01T00:00:00Z"}"#;
        let message: IotMessage = serde_json::from_str(raw).unwrap();

        assert_eq!(message.message_type, IotMessageType::BookReturn);
        assert_eq!(message.book_id.as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_connected_devices() {
        let hub = DeviceHub::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();

        hub.register(tx1).await;
        hub.register(tx2).await;

        let delivered = hub.broadcast(&IotMessage::connect_success()).await;
        assert_eq!(delivered, 2);
        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_broadcast_drops_stale_sessions() {
        let hub = DeviceHub::new();
        let (tx1, rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2_keep) = mpsc::unbounded_channel();

        hub.register(tx1).await;
        hub.register(tx2).await;
        drop(rx1);

        let delivered = hub.broadcast(&IotMessage::connect_success()).await;
        assert_eq!(delivered, 1);
        assert_eq!(hub.connected_count().await, 1);
    }

    #[tokio::test]
    async fn test_unregister_removes_session() {
        let hub = DeviceHub::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        let session_id = hub.register(tx).await;
        assert_eq!(hub.connected_count().await, 1);

        hub.unregister(session_id).await;
        assert_eq!(hub.connected_count().await, 0);
    }
}
