//! Repository 实现模块

pub mod message_repository_impl;
pub mod notification_repository_impl;
pub mod user_repository_impl;

pub use message_repository_impl::PostgresMessageRepository;
pub use notification_repository_impl::PostgresNotificationRepository;
pub use user_repository_impl::PostgresUserRepository;
