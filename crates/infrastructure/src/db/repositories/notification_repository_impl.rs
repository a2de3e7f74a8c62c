//! 通知Repository实现

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    NewNotification, Notification, NotificationKind, NotificationRepository, RepositoryError,
    RepositoryResult, UserId,
};
use sqlx::{query, query_as, FromRow};

use crate::db::DbPool;

/// 数据库通知模型
#[derive(Debug, Clone, FromRow)]
struct DbNotification {
    pub id: i64,
    pub user_id: i64,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub actor_id: i64,
    pub post_id: Option<i64>,
    pub message_id: Option<i64>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbNotification> for Notification {
    type Error = RepositoryError;

    fn try_from(row: DbNotification) -> Result<Self, Self::Error> {
        let kind = row
            .kind
            .parse::<NotificationKind>()
            .map_err(RepositoryError::storage)?;
        Ok(Notification {
            id: row.id,
            user_id: UserId::new(row.user_id)
                .map_err(|e| RepositoryError::storage(format!("无效的用户ID: {e}")))?,
            kind,
            actor_id: UserId::new(row.actor_id)
                .map_err(|e| RepositoryError::storage(format!("无效的触发者ID: {e}")))?,
            post_id: row.post_id,
            message_id: row.message_id,
            read: row.read,
            created_at: row.created_at,
        })
    }
}

/// 通知Repository实现
pub struct PostgresNotificationRepository {
    pool: Arc<DbPool>,
}

impl PostgresNotificationRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    async fn create(&self, new: NewNotification) -> RepositoryResult<Notification> {
        let row = query_as::<_, DbNotification>(
            r#"
            INSERT INTO notifications (user_id, type, actor_id, post_id, message_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, type, actor_id, post_id, message_id, read, created_at
            "#,
        )
        .bind(new.user_id.get())
        .bind(new.kind.to_string())
        .bind(new.actor_id.get())
        .bind(new.post_id)
        .bind(new.message_id)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| RepositoryError::storage_with_source("通知写入失败", e))?;

        row.try_into()
    }

    async fn mark_as_read(&self, notification_id: i64) -> RepositoryResult<()> {
        // 通知不存在时不报错，与客户端重复点击的语义兼容
        query("UPDATE notifications SET read = TRUE WHERE id = $1")
            .bind(notification_id)
            .execute(&*self.pool)
            .await
            .map_err(|e| RepositoryError::storage_with_source("通知已读标记失败", e))?;

        Ok(())
    }
}
