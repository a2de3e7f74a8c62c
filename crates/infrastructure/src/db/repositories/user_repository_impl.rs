//! 用户Repository实现

use std::sync::Arc;

use async_trait::async_trait;
use domain::{RepositoryError, RepositoryResult, UserId, UserProfile, UserRepository};
use sqlx::{query_as, FromRow};

use crate::db::DbPool;

/// 数据库用户档案模型
///
/// 协议层只需要随消息附带的公开档案字段，不加载凭证列。
#[derive(Debug, Clone, FromRow)]
struct DbUserProfile {
    pub id: i64,
    pub username: String,
    pub profile_image: Option<String>,
}

impl TryFrom<DbUserProfile> for UserProfile {
    type Error = RepositoryError;

    fn try_from(row: DbUserProfile) -> Result<Self, Self::Error> {
        Ok(UserProfile {
            id: UserId::new(row.id)
                .map_err(|e| RepositoryError::storage(format!("无效的用户ID: {e}")))?,
            username: row.username,
            profile_image: row.profile_image,
        })
    }
}

/// 用户Repository实现
pub struct PostgresUserRepository {
    pool: Arc<DbPool>,
}

impl PostgresUserRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_profile(&self, id: UserId) -> RepositoryResult<Option<UserProfile>> {
        let row = query_as::<_, DbUserProfile>(
            "SELECT id, username, profile_image FROM users WHERE id = $1",
        )
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| RepositoryError::storage_with_source("用户档案查询失败", e))?;

        row.map(TryInto::try_into).transpose()
    }
}
