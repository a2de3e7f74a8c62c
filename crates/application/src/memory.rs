//! 内存实现的持久化协作方（用于测试和本地开发）

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use domain::{
    Message, MessageRepository, NewNotification, Notification, NotificationRepository,
    RepositoryResult, UserId, UserProfile, UserRepository,
};

/// 内存社交存储
///
/// 行为对齐 PostgreSQL 实现：自增主键、已读标记只从 false 翻到 true。
pub struct InMemorySocialStore {
    users: RwLock<HashMap<UserId, UserProfile>>,
    messages: RwLock<Vec<Message>>,
    notifications: RwLock<Vec<Notification>>,
    next_message_id: AtomicI64,
    next_notification_id: AtomicI64,
}

impl Default for InMemorySocialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySocialStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            messages: RwLock::new(Vec::new()),
            notifications: RwLock::new(Vec::new()),
            next_message_id: AtomicI64::new(1),
            next_notification_id: AtomicI64::new(1),
        }
    }

    /// 预置一个用户档案
    pub async fn add_user(&self, profile: UserProfile) {
        let mut users = self.users.write().await;
        users.insert(profile.id, profile);
    }

    /// 当前所有消息的快照
    pub async fn messages(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }

    /// 当前所有通知的快照
    pub async fn notifications(&self) -> Vec<Notification> {
        self.notifications.read().await.clone()
    }
}

#[async_trait]
impl MessageRepository for InMemorySocialStore {
    async fn create(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        content: String,
    ) -> RepositoryResult<Message> {
        let message = Message {
            id: self.next_message_id.fetch_add(1, Ordering::Relaxed),
            sender_id,
            receiver_id,
            content,
            read: false,
            created_at: Utc::now(),
        };
        let mut messages = self.messages.write().await;
        messages.push(message.clone());
        Ok(message)
    }

    async fn mark_read_between(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
    ) -> RepositoryResult<()> {
        let mut messages = self.messages.write().await;
        for message in messages.iter_mut() {
            if message.sender_id == sender_id && message.receiver_id == receiver_id && !message.read
            {
                message.read = true;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationRepository for InMemorySocialStore {
    async fn create(&self, new: NewNotification) -> RepositoryResult<Notification> {
        let notification = Notification {
            id: self.next_notification_id.fetch_add(1, Ordering::Relaxed),
            user_id: new.user_id,
            kind: new.kind,
            actor_id: new.actor_id,
            post_id: new.post_id,
            message_id: new.message_id,
            read: false,
            created_at: Utc::now(),
        };
        let mut notifications = self.notifications.write().await;
        notifications.push(notification.clone());
        Ok(notification)
    }

    async fn mark_as_read(&self, notification_id: i64) -> RepositoryResult<()> {
        let mut notifications = self.notifications.write().await;
        if let Some(notification) = notifications
            .iter_mut()
            .find(|notification| notification.id == notification_id)
        {
            notification.read = true;
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemorySocialStore {
    async fn find_profile(&self, id: UserId) -> RepositoryResult<Option<UserProfile>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }
}
