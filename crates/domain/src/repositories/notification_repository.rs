//! 通知Repository接口定义

use async_trait::async_trait;

use crate::entities::notification::{Notification, NotificationKind};
use crate::errors::RepositoryResult;
use crate::value_objects::UserId;

/// 待创建的通知
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    /// 接收通知的用户ID
    pub user_id: UserId,
    /// 通知类型
    pub kind: NotificationKind,
    /// 触发通知的用户ID
    pub actor_id: UserId,
    /// 关联帖子ID
    pub post_id: Option<i64>,
    /// 关联消息ID
    pub message_id: Option<i64>,
}

impl NewNotification {
    /// 私信入库后为接收者创建的伴随通知
    pub fn for_message(receiver_id: UserId, sender_id: UserId, message_id: i64) -> Self {
        Self {
            user_id: receiver_id,
            kind: NotificationKind::Message,
            actor_id: sender_id,
            post_id: None,
            message_id: Some(message_id),
        }
    }
}

/// 通知Repository接口
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// 创建新通知，返回落库后的完整记录
    async fn create(&self, notification: NewNotification) -> RepositoryResult<Notification>;

    /// 将指定通知标记为已读
    async fn mark_as_read(&self, notification_id: i64) -> RepositoryResult<()>;
}
