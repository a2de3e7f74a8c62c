//! 用户档案投影

use serde::{Deserialize, Serialize};

use crate::value_objects::UserId;

/// 用户档案投影
///
/// 核心只读取 `users` 表中用于装饰出站消息帧的三个字段，
/// 注册、登录等完整的用户管理由外部协作方负责。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// 用户ID
    pub id: UserId,
    /// 用户名
    pub username: String,
    /// 头像地址
    pub profile_image: Option<String>,
}
