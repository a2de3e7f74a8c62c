//! 领域实体定义

pub mod message;
pub mod notification;
pub mod user;

pub use message::Message;
pub use notification::{Notification, NotificationKind};
pub use user::UserProfile;
