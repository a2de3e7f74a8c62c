use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// 用户唯一标识。
///
/// 数据库中为自增整数主键，协议层要求必须是正整数；
/// 非法值在构造时就被拒绝，后续代码不再重复校验。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// 校验并构造用户标识，非正数返回验证错误
    pub fn new(id: i64) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::validation_error(
                "user_id",
                format!("must be a positive integer, got {id}"),
            ));
        }
        Ok(Self(id))
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for UserId {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for i64 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_id_is_accepted() {
        let id = UserId::new(42).unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_zero_and_negative_ids_are_rejected() {
        assert!(UserId::new(0).is_err());
        assert!(UserId::new(-5).is_err());
    }
}
