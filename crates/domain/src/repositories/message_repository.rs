//! 私信Repository接口定义

use async_trait::async_trait;

use crate::entities::message::Message;
use crate::errors::RepositoryResult;
use crate::value_objects::UserId;

/// 私信Repository接口
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// 创建新消息，返回落库后的完整记录
    async fn create(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        content: String,
    ) -> RepositoryResult<Message>;

    /// 将 sender -> receiver 方向所有未读消息标记为已读
    ///
    /// 反方向的消息不受影响。
    async fn mark_read_between(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
    ) -> RepositoryResult<()>;
}
