//! 通知实体定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::UserId;

/// 通知类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
    Comment,
    Message,
    Share,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::Like => write!(f, "like"),
            NotificationKind::Comment => write!(f, "comment"),
            NotificationKind::Message => write!(f, "message"),
            NotificationKind::Share => write!(f, "share"),
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(NotificationKind::Like),
            "comment" => Ok(NotificationKind::Comment),
            "message" => Ok(NotificationKind::Message),
            "share" => Ok(NotificationKind::Share),
            other => Err(format!("unknown notification kind: {other}")),
        }
    }
}

/// 通知实体
///
/// 对应 `notifications` 表的一行。点赞/评论类通知由帖子交互处理器创建，
/// 私信类通知由协议处理器在消息入库后创建。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// 通知ID
    pub id: i64,
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
    /// 是否已读
    pub read: bool,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [
            NotificationKind::Like,
            NotificationKind::Comment,
            NotificationKind::Message,
            NotificationKind::Share,
        ] {
            assert_eq!(kind.to_string().parse::<NotificationKind>(), Ok(kind));
        }
        assert!("poke".parse::<NotificationKind>().is_err());
    }
}
