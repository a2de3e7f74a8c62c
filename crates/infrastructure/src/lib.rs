//! 基础设施层
//!
//! domain 中定义的持久化端口的 PostgreSQL 实现。

pub mod db;

pub use db::repositories::{
    PostgresMessageRepository, PostgresNotificationRepository, PostgresUserRepository,
};
pub use db::{create_pg_pool, DbPool};
