//! Room Context - Value Objects

use serde::{Deserialize, Serialize};

use super::RoomError;

const MAX_ROOM_ID_LEN: usize = 128;

/// 房间唯一标识（不透明字符串）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Result<Self, RoomError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(RoomError::EmptyId);
        }
        if trimmed.len() > MAX_ROOM_ID_LEN {
            return Err(RoomError::IdTooLong(trimmed.len()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 是否可以直接用作目录名
    ///
    /// 只允许 `[A-Za-z0-9_-]`
    pub fn is_path_safe(&self) -> bool {
        self.0
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

impl TryFrom<String> for RoomId {
    type Error = RoomError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoomId> for String {
    fn from(id: RoomId) -> Self {
        id.0
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_room_id_rejected() {
        assert_eq!(RoomId::new(""), Err(RoomError::EmptyId));
        assert_eq!(RoomId::new("   "), Err(RoomError::EmptyId));
    }

    #[test]
    fn test_room_id_is_trimmed() {
        let id = RoomId::new(" r1 ").unwrap();
        assert_eq!(id.as_str(), "r1");
    }

    #[test]
    fn test_path_safety() {
        assert!(RoomId::new("0b9c-room_1").unwrap().is_path_safe());
        assert!(!RoomId::new("../etc").unwrap().is_path_safe());
        assert!(!RoomId::new("a b").unwrap().is_path_safe());
    }

    #[test]
    fn test_too_long_room_id_rejected() {
        let long = "x".repeat(MAX_ROOM_ID_LEN + 1);
        assert!(matches!(RoomId::new(long), Err(RoomError::IdTooLong(_))));
    }
}
