//! Web API 层。
//!
//! 提供 Axum 路由，将 WebSocket 连接接入应用层的协议会话。

mod routes;
mod state;
mod websocket;

pub use routes::router;
pub use state::AppState;
