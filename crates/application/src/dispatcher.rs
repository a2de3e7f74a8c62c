//! 投递分发器
//!
//! 在持久化写入之上叠加"至多一次"的在线推送：查注册表，
//! 连接在线就写帧，不在线就静默放弃——不重试也不在内存排队，
//! 落库记录才是事实来源，离线方下次拉取时自然补齐。

use std::sync::Arc;

use domain::UserId;

use crate::protocol::{MessagePayload, NotificationPayload, ServerFrame};
use crate::registry::ConnectionRegistry;

/// 投递分发器
#[derive(Clone)]
pub struct DeliveryDispatcher {
    registry: Arc<ConnectionRegistry>,
}

impl DeliveryDispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 尽力把私信帧推给目标用户的在线连接
    ///
    /// 返回是否真正写入了帧，调用方不依赖该结果做任何补偿。
    pub async fn dispatch_message(&self, user_id: UserId, payload: MessagePayload) -> bool {
        self.dispatch(user_id, ServerFrame::Message { message: payload })
            .await
    }

    /// 尽力把通知帧推给目标用户的在线连接
    ///
    /// 帖子交互等外部协作方在自行落库通知后也经由这里做在线推送。
    pub async fn dispatch_notification(
        &self,
        user_id: UserId,
        payload: NotificationPayload,
    ) -> bool {
        self.dispatch(
            user_id,
            ServerFrame::Notification {
                notification: payload,
            },
        )
        .await
    }

    async fn dispatch(&self, user_id: UserId, frame: ServerFrame) -> bool {
        let Some(handle) = self.registry.lookup(user_id).await else {
            tracing::debug!(user_id = %user_id, "目标用户不在线，跳过推送");
            return false;
        };

        if !handle.is_open() {
            tracing::debug!(user_id = %user_id, "目标连接已关闭，跳过推送");
            return false;
        }

        handle.send(frame)
    }
}
