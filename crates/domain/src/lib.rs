//! 社交网络实时投递核心的领域模型
//!
//! 包含用户、私信、通知等核心实体，持久化协作方的 Repository 接口，
//! 以及相关的错误类型。

pub mod entities;
pub mod errors;
pub mod repositories;
pub mod value_objects;

// 重新导出常用类型
pub use entities::*;
pub use errors::*;
pub use repositories::*;
pub use value_objects::*;
