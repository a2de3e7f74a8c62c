//! 持久化协作方的 Repository 接口
//!
//! 核心不关心持久化细节，只依赖这里声明的端口；
//! PostgreSQL 实现位于 infrastructure，内存实现位于 application。

pub mod message_repository;
pub mod notification_repository;
pub mod user_repository;

pub use message_repository::MessageRepository;
pub use notification_repository::{NewNotification, NotificationRepository};
pub use user_repository::UserRepository;

#[cfg(feature = "testing")]
pub use message_repository::MockMessageRepository;
#[cfg(feature = "testing")]
pub use notification_repository::MockNotificationRepository;
#[cfg(feature = "testing")]
pub use user_repository::MockUserRepository;
