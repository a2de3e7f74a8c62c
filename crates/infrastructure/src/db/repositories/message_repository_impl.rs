//! 消息Repository实现

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    Message, MessageRepository, RepositoryError, RepositoryResult, UserId,
};
use sqlx::{query, query_as, FromRow};

use crate::db::DbPool;

/// 数据库消息模型
#[derive(Debug, Clone, FromRow)]
struct DbMessage {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbMessage> for Message {
    type Error = RepositoryError;

    fn try_from(row: DbMessage) -> Result<Self, Self::Error> {
        Ok(Message {
            id: row.id,
            sender_id: UserId::new(row.sender_id)
                .map_err(|e| RepositoryError::storage(format!("无效的发送者ID: {e}")))?,
            receiver_id: UserId::new(row.receiver_id)
                .map_err(|e| RepositoryError::storage(format!("无效的接收者ID: {e}")))?,
            content: row.content,
            read: row.read,
            created_at: row.created_at,
        })
    }
}

/// 消息Repository实现
pub struct PostgresMessageRepository {
    pool: Arc<DbPool>,
}

impl PostgresMessageRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn create(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        content: String,
    ) -> RepositoryResult<Message> {
        let row = query_as::<_, DbMessage>(
            r#"
            INSERT INTO messages (sender_id, receiver_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, sender_id, receiver_id, content, read, created_at
            "#,
        )
        .bind(sender_id.get())
        .bind(receiver_id.get())
        .bind(&content)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| RepositoryError::storage_with_source("消息写入失败", e))?;

        row.try_into()
    }

    async fn mark_read_between(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
    ) -> RepositoryResult<()> {
        // 只翻转 sender -> receiver 方向的未读行，反方向保持不变
        let result = query(
            r#"
            UPDATE messages
            SET read = TRUE
            WHERE sender_id = $1 AND receiver_id = $2 AND read = FALSE
            "#,
        )
        .bind(sender_id.get())
        .bind(receiver_id.get())
        .execute(&*self.pool)
        .await
        .map_err(|e| RepositoryError::storage_with_source("消息已读标记失败", e))?;

        tracing::debug!(
            sender = %sender_id,
            receiver = %receiver_id,
            rows = result.rows_affected(),
            "消息已读标记完成"
        );
        Ok(())
    }
}
