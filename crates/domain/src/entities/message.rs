//! 私信实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::UserId;

/// 私信实体
///
/// 对应 `messages` 表的一行。核心只负责创建和触发"标记已读"，
/// 其余字段不被修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// 消息ID
    pub id: i64,
    /// 发送者ID
    pub sender_id: UserId,
    /// 接收者ID
    pub receiver_id: UserId,
    /// 消息内容
    pub content: String,
    /// 是否已读
    pub read: bool,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}
