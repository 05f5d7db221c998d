//! Caller roles recognized by the permission matrix.

use serde::{Deserialize, Serialize};

/// Role of the caller submitting an operation.
///
/// Authentication happens in the surrounding platform; by the time a call
/// reaches the engine the role is already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Vehicle owner; may create requests and read, never transition
    Customer,
    /// Office staff handling intake, approval, parts, and billing
    Office,
    /// Dispatcher placing work on technician calendars
    Dispatch,
    /// Field technician executing scheduled work
    Tech,
    /// Unrestricted operator
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Office => "office",
            Self::Dispatch => "dispatch",
            Self::Tech => "tech",
            Self::Admin => "admin",
        }
    }

    /// Parse a role name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Some(Self::Customer),
            "office" => Some(Self::Office),
            "dispatch" => Some(Self::Dispatch),
            "tech" => Some(Self::Tech),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Every defined role.
    pub fn all() -> &'static [Role] {
        &[
            Self::Customer,
            Self::Office,
            Self::Dispatch,
            Self::Tech,
            Self::Admin,
        ]
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
