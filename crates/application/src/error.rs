//! 协议层错误定义
//!
//! (a) 格式错误 (b) 协议违规 (c) 未认证访问 都是可恢复的：
//! 回一个 error 帧，连接保持原状态。(d) 持久化失败同样只回
//! error 帧并跳过后续推送，不重试、不断开连接。

use domain::RepositoryError;
use thiserror::Error;

/// 协议处理错误
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// 认证帧携带的用户ID不是正整数
    #[error("Invalid user ID")]
    InvalidUserId,

    /// 同一连接上的第二次认证
    #[error("Already authenticated")]
    AlreadyAuthenticated,

    /// 认证前发送了业务帧
    #[error("Authentication required")]
    AuthenticationRequired,

    /// message 帧缺少接收者或内容为空
    #[error("Invalid message data")]
    InvalidMessageData,

    /// markNotificationRead 帧缺少通知ID
    #[error("Invalid notification data")]
    InvalidNotificationData,

    /// markMessagesRead 帧缺少发送者ID
    #[error("Invalid message read data")]
    InvalidMarkReadData,

    /// 消息入库后查不到发送者档案
    #[error("Sender not found")]
    SenderNotFound,

    /// 帧无法解析为 JSON 或类型未知
    #[error("Invalid message format")]
    Malformed,

    /// 持久化协作方失败
    #[error("storage failure: {0}")]
    Persistence(#[from] RepositoryError),
}

impl ProtocolError {
    /// 发给客户端的错误文案
    ///
    /// 持久化失败的内部细节不外泄到线上。
    pub fn client_message(&self) -> String {
        match self {
            ProtocolError::Persistence(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}
