//! 实时投递核心
//!
//! 在持久化协作方之上实现连接注册表、心跳监控、协议处理和
//! 尽力而为的在线推送。HTTP CRUD 路由不经过这里，
//! 它们直接查询已落库的消息和通知记录。

pub mod dispatcher;
pub mod error;
pub mod heartbeat;
pub mod memory;
pub mod protocol;
pub mod registry;
pub mod session;


pub use dispatcher::DeliveryDispatcher;
pub use error::ProtocolError;
pub use heartbeat::HeartbeatMonitor;
pub use memory::InMemorySocialStore;
pub use protocol::{ClientFrame, MessagePayload, NotificationPayload, SenderProfile, ServerFrame};
pub use registry::{ConnectionHandle, ConnectionRegistry, SocketCommand};
pub use session::{Persistence, Session};
