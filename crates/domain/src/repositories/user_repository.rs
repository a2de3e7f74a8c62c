//! 用户Repository接口定义

use async_trait::async_trait;

use crate::entities::user::UserProfile;
use crate::errors::RepositoryResult;
use crate::value_objects::UserId;

/// 用户Repository接口
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 查询用户档案投影，不存在时返回 None
    async fn find_profile(&self, id: UserId) -> RepositoryResult<Option<UserProfile>>;
}
