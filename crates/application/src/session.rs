//! 协议处理器
//!
//! 每条连接一个会话状态机：未认证 -> 已认证，恰好转移一次，
//! 不允许回退。同一连接上的帧按到达顺序串行处理；只有等待
//! 持久化协作方时才让出，其他连接的事件可在此间隙交错执行。

use std::sync::Arc;

use domain::{
    MessageRepository, NewNotification, NotificationRepository, UserId, UserRepository,
};
use serde_json::Value as JsonValue;

use crate::dispatcher::DeliveryDispatcher;
use crate::error::ProtocolError;
use crate::protocol::{ClientFrame, MessagePayload, ServerFrame};
use crate::registry::{ConnectionHandle, ConnectionRegistry};

/// 聚合的持久化端口
///
/// 核心消费的协作方接口，PostgreSQL 实现见 infrastructure。
#[derive(Clone)]
pub struct Persistence {
    pub messages: Arc<dyn MessageRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub users: Arc<dyn UserRepository>,
}

/// 单条连接的协议会话
pub struct Session {
    handle: ConnectionHandle,
    registry: Arc<ConnectionRegistry>,
    dispatcher: DeliveryDispatcher,
    persistence: Persistence,
    user_id: Option<UserId>,
}

impl Session {
    pub fn new(
        handle: ConnectionHandle,
        registry: Arc<ConnectionRegistry>,
        dispatcher: DeliveryDispatcher,
        persistence: Persistence,
    ) -> Self {
        Self {
            handle,
            registry,
            dispatcher,
            persistence,
            user_id: None,
        }
    }

    /// 会话当前绑定的用户（认证前为 None）
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// 处理一个入站文本帧
    ///
    /// 所有错误都折叠成发回原连接的 error 帧，连接保持打开。
    pub async fn handle_text(&mut self, text: &str) {
        let frame = match serde_json::from_str::<ClientFrame>(text) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!(connection = %self.handle.id(), error = %err, "无法解析入站帧");
                self.reply_error(&ProtocolError::Malformed);
                return;
            }
        };

        if let Err(err) = self.handle_frame(frame).await {
            tracing::warn!(
                connection = %self.handle.id(),
                user_id = ?self.user_id,
                error = %err,
                "帧处理失败"
            );
            self.reply_error(&err);
        }
    }

    /// 连接关闭路径：比较删除注册表条目，丢弃会话状态
    pub async fn close(&self) {
        self.registry.unregister(&self.handle).await;
        if let Some(user_id) = self.user_id {
            tracing::info!(user_id = %user_id, connection = %self.handle.id(), "连接关闭");
        }
    }

    async fn handle_frame(&mut self, frame: ClientFrame) -> Result<(), ProtocolError> {
        match frame {
            ClientFrame::Auth { user_id } => self.handle_auth(user_id).await,
            ClientFrame::Message {
                receiver_id,
                content,
            } => {
                let sender = self.require_auth()?;
                self.handle_message(sender, receiver_id, content).await
            }
            ClientFrame::MarkNotificationRead { notification_id } => {
                self.require_auth()?;
                self.handle_mark_notification_read(notification_id).await
            }
            ClientFrame::MarkMessagesRead { sender_id } => {
                let receiver = self.require_auth()?;
                self.handle_mark_messages_read(receiver, sender_id).await
            }
        }
    }

    /// 认证帧：校验正整数用户ID并注册连接
    async fn handle_auth(&mut self, raw: Option<JsonValue>) -> Result<(), ProtocolError> {
        if self.user_id.is_some() {
            return Err(ProtocolError::AlreadyAuthenticated);
        }

        let user_id = coerce_user_id(raw).ok_or(ProtocolError::InvalidUserId)?;

        self.user_id = Some(user_id);
        self.registry.register(user_id, self.handle.clone()).await;
        tracing::info!(user_id = %user_id, connection = %self.handle.id(), "连接完成认证");

        self.reply(ServerFrame::Auth { success: true });
        Ok(())
    }

    /// message 帧：落库、创建伴随通知、回显给发送者、推送给接收者
    async fn handle_message(
        &self,
        sender: UserId,
        receiver_id: Option<i64>,
        content: Option<String>,
    ) -> Result<(), ProtocolError> {
        let receiver = receiver_id
            .and_then(|id| UserId::new(id).ok())
            .ok_or(ProtocolError::InvalidMessageData)?;
        let content = content
            .filter(|content| !content.is_empty())
            .ok_or(ProtocolError::InvalidMessageData)?;

        // 持久化写入先行且独立于推送结果；写入失败直接回错误帧，
        // 依赖它的回显和推送全部跳过
        let message = self
            .persistence
            .messages
            .create(sender, receiver, content)
            .await?;

        self.persistence
            .notifications
            .create(NewNotification::for_message(receiver, sender, message.id))
            .await?;

        let profile = self
            .persistence
            .users
            .find_profile(sender)
            .await?
            .ok_or(ProtocolError::SenderNotFound)?;

        let payload = MessagePayload::new(&message, &profile);

        // 回显给发送者作为确认
        self.reply(ServerFrame::Message {
            message: payload.clone(),
        });

        // 接收者在线则推送，不在线则静默跳过
        self.dispatcher.dispatch_message(receiver, payload).await;

        tracing::debug!(
            message_id = message.id,
            sender = %sender,
            receiver = %receiver,
            "私信已入库并分发"
        );
        Ok(())
    }

    async fn handle_mark_notification_read(
        &self,
        notification_id: Option<i64>,
    ) -> Result<(), ProtocolError> {
        // 0 和负数与缺失同样算协议违规，不能拿去撞数据库
        let notification_id = notification_id
            .filter(|id| *id > 0)
            .ok_or(ProtocolError::InvalidNotificationData)?;

        self.persistence
            .notifications
            .mark_as_read(notification_id)
            .await?;

        self.reply(ServerFrame::NotificationMarkedRead { notification_id });
        Ok(())
    }

    async fn handle_mark_messages_read(
        &self,
        receiver: UserId,
        sender_id: Option<i64>,
    ) -> Result<(), ProtocolError> {
        let sender = sender_id
            .and_then(|id| UserId::new(id).ok())
            .ok_or(ProtocolError::InvalidMarkReadData)?;

        self.persistence
            .messages
            .mark_read_between(sender, receiver)
            .await?;

        self.reply(ServerFrame::MessagesMarkedRead {
            sender_id: sender.get(),
        });
        Ok(())
    }

    /// 认证前置检查：未认证的业务帧一律拒绝
    fn require_auth(&self) -> Result<UserId, ProtocolError> {
        self.user_id.ok_or(ProtocolError::AuthenticationRequired)
    }

    /// 所有回复只发回原连接
    fn reply(&self, frame: ServerFrame) {
        if !self.handle.send(frame) {
            tracing::debug!(connection = %self.handle.id(), "回复时连接已关闭");
        }
    }

    fn reply_error(&self, error: &ProtocolError) {
        self.reply(ServerFrame::Error {
            message: error.client_message(),
        });
    }
}

/// 把认证帧里的用户ID解析成合法的 UserId
///
/// 原始客户端可能把ID作为数字或数字字符串发送，两种都接受。
fn coerce_user_id(raw: Option<JsonValue>) -> Option<UserId> {
    let value = raw?;
    let id = match value {
        JsonValue::Number(number) => number.as_i64()?,
        JsonValue::String(text) => text.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    UserId::new(id).ok()
}
