use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::extract::AdminUser;
use crate::api::handlers::AppState;
use crate::application::BusinessError;
use crate::application::iot::{IotMessage, IotMessageType};
use crate::domain::BookItemId;
use crate::domain::notification::NotificationKind;

#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub device_id: String,
    pub payload: String,
}

/// GET /api/admin/iot/snapshots/:device_id - デバイスの最新書架スナップショット
pub async fn latest_snapshot(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(device_id): Path<String>,
) -> Result<Json<SnapshotResponse>, ApiError> {
    let payload = state
        .snapshots
        .latest(&device_id)
        .await
        .map_err(BusinessError::Cache)?
        .ok_or(BusinessError::SnapshotNotFound)?;

    Ok(Json(SnapshotResponse { device_id, payload }))
}

/// GET /ws/iot - IoTデバイスのWebSocket接続
pub async fn iot_socket(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_device(state, socket))
}

/// 1台のデバイス接続を処理する
///
/// 送信はハブ経由のチャネルに一本化し、受信ループはこのタスクで回す。
/// どちらかが終わったら接続を畳む。
async fn handle_device(state: Arc<AppState>, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let session_id = state.hub.register(tx.clone()).await;

    // 接続確認メッセージ
    if let Ok(payload) = serde_json::to_string(&IotMessage::connect_success()) {
        let _ = tx.send(payload);
    }

    let send_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sink.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => {
                handle_device_message(&state, &tx, session_id, &text).await;
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    send_task.abort();
    state.hub.unregister(session_id).await;
}

/// デバイスからの1メッセージを処理する
async fn handle_device_message(
    state: &Arc<AppState>,
    tx: &mpsc::UnboundedSender<String>,
    session_id: Uuid,
    raw: &str,
) {
    let message: IotMessage = match serde_json::from_str(raw) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(%session_id, error = %e, "unparsable iot message");
            send_error(tx, "unparsable message".to_string());
            return;
        }
    };

    match message.message_type {
        // 返却機からの返却イベント
        IotMessageType::BookReturn => {
            let Some(book_item_id) = message.book_id.as_deref().and_then(|id| id.parse().ok())
            else {
                send_error(tx, "bookId must be a numeric id".to_string());
                return;
            };

            match state
                .checkout
                .return_by_item(BookItemId::from_raw(book_item_id))
                .await
            {
                Ok(receipt) => {
                    tracing::info!(
                        %session_id,
                        book_item_id,
                        overdue = receipt.overdue,
                        "book returned via device"
                    );
                }
                Err(e) => {
                    tracing::warn!(%session_id, book_item_id, error = %e, "device return failed");
                    send_error(tx, format!("return failed for book {}", book_item_id));

                    // 返却機の誤作動の可能性があるため管理者へ知らせる
                    let content =
                        format!("返却デバイスからの返却処理に失敗しました（蔵書ID: {}）", book_item_id);
                    if let Err(e) = state
                        .notifications
                        .notify_admins(NotificationKind::DeviceError, &content, Some(book_item_id))
                        .await
                    {
                        tracing::warn!(error = %e, "device error notification failed");
                    }
                }
            }
        }

        // 書架状態の更新はデバイスごとの最新スナップショットとして保存する
        IotMessageType::LocationUpdate => {
            if let Err(e) = state
                .snapshots
                .save_latest(&session_id.to_string(), raw)
                .await
            {
                tracing::warn!(%session_id, error = %e, "snapshot save failed");
            }
        }

        other => {
            tracing::warn!(%session_id, message_type = ?other, "unexpected message from device");
            send_error(tx, "unexpected message type".to_string());
        }
    }
}

fn send_error(tx: &mpsc::UnboundedSender<String>, reason: String) {
    if let Ok(payload) = serde_json::to_string(&IotMessage::error(reason)) {
        let _ = tx.send(payload);
    }
}
