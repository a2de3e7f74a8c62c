//! 线协议帧定义
//!
//! 双工通道上的每一帧都是带 `type` 判别字段的 JSON 对象，
//! 字段名统一 camelCase 以兼容既有客户端。

use chrono::{DateTime, Utc};
use domain::{Message, Notification, NotificationKind, UserProfile};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// 客户端发来的帧
///
/// 字段全部声明为 Option：缺字段属于协议违规，应回 error 帧
/// 而不是当作无法解析的帧处理。
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientFrame {
    /// 认证帧，携带用户ID（数字或数字字符串）
    Auth {
        #[serde(default)]
        user_id: Option<JsonValue>,
    },
    /// 发送私信
    Message {
        #[serde(default)]
        receiver_id: Option<i64>,
        #[serde(default)]
        content: Option<String>,
    },
    /// 确认单条通知已读
    MarkNotificationRead {
        #[serde(default)]
        notification_id: Option<i64>,
    },
    /// 将某个发送者发来的所有私信标记为已读
    MarkMessagesRead {
        #[serde(default)]
        sender_id: Option<i64>,
    },
}

/// 服务端发出的帧
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerFrame {
    /// 认证成功回执
    Auth { success: bool },
    /// 私信（对发送者是回显，对接收者是在线推送）
    Message { message: MessagePayload },
    /// 在线推送的通知
    Notification { notification: NotificationPayload },
    /// 通知已读回执
    NotificationMarkedRead { notification_id: i64 },
    /// 私信批量已读回执
    MessagesMarkedRead { sender_id: i64 },
    /// 协议错误
    Error { message: String },
}

/// 出站私信载荷，附带发送者档案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub id: i64,
    pub content: String,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub created_at: DateTime<Utc>,
    pub sender: SenderProfile,
}

impl MessagePayload {
    /// 由落库记录和发送者档案组装出站载荷
    pub fn new(message: &Message, sender: &UserProfile) -> Self {
        Self {
            id: message.id,
            content: message.content.clone(),
            sender_id: message.sender_id.get(),
            receiver_id: message.receiver_id.get(),
            created_at: message.created_at,
            sender: SenderProfile {
                id: sender.id.get(),
                username: sender.username.clone(),
                profile_image: sender.profile_image.clone(),
            },
        }
    }
}

/// 出站载荷中的发送者档案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderProfile {
    pub id: i64,
    pub username: String,
    pub profile_image: Option<String>,
}

/// 出站通知载荷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub actor_id: i64,
    pub post_id: Option<i64>,
    pub message_id: Option<i64>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Notification> for NotificationPayload {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id,
            user_id: notification.user_id.get(),
            kind: notification.kind,
            actor_id: notification.actor_id.get(),
            post_id: notification.post_id,
            message_id: notification.message_id,
            read: notification.read,
            created_at: notification.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_frame_tags_match_wire_protocol() {
        let auth: ClientFrame = serde_json::from_value(json!({"type": "auth", "userId": 7}))
            .expect("auth frame");
        assert!(matches!(auth, ClientFrame::Auth { .. }));

        let message: ClientFrame =
            serde_json::from_value(json!({"type": "message", "receiverId": 2, "content": "hi"}))
                .expect("message frame");
        match message {
            ClientFrame::Message {
                receiver_id,
                content,
            } => {
                assert_eq!(receiver_id, Some(2));
                assert_eq!(content.as_deref(), Some("hi"));
            }
            other => panic!("unexpected frame {other:?}"),
        }

        let mark: ClientFrame =
            serde_json::from_value(json!({"type": "markNotificationRead", "notificationId": 3}))
                .expect("mark frame");
        assert!(matches!(
            mark,
            ClientFrame::MarkNotificationRead {
                notification_id: Some(3)
            }
        ));
    }

    #[test]
    fn test_missing_fields_still_parse_as_protocol_frames() {
        // 缺少 receiverId 属于协议违规而不是格式错误
        let frame: ClientFrame =
            serde_json::from_value(json!({"type": "message", "content": "hi"})).expect("frame");
        assert!(matches!(
            frame,
            ClientFrame::Message {
                receiver_id: None,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result = serde_json::from_value::<ClientFrame>(json!({"type": "subscribe"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_server_frame_serializes_with_camel_case_tags() {
        let frame = ServerFrame::NotificationMarkedRead { notification_id: 9 };
        let value = serde_json::to_value(&frame).expect("serialize");
        assert_eq!(value["type"], "notificationMarkedRead");
        assert_eq!(value["notificationId"], 9);

        let auth = serde_json::to_value(ServerFrame::Auth { success: true }).expect("serialize");
        assert_eq!(auth, json!({"type": "auth", "success": true}));
    }
}
