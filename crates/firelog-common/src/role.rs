use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role of a profile within its fire department.
///
/// Ordering follows privilege: `Member < Commander < Admin`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Member,
    Commander,
    Admin,
}

impl Role {
    pub const ALL: [Self; 3] = [Self::Member, Self::Commander, Self::Admin];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Commander => "commander",
            Self::Admin => "admin",
        }
    }

    /// Admins and commanders may edit any incident of their department.
    pub const fn can_manage_incidents(self) -> bool {
        matches!(self, Self::Commander | Self::Admin)
    }

    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the known role names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {:?}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Self::Member),
            "commander" => Ok(Self::Commander),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_role_name() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn rejects_unknown_role() {
        let err = "chief".parse::<Role>().unwrap_err();
        assert_eq!(err, UnknownRole("chief".to_string()));
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Role::Commander).unwrap(),
            "\"commander\""
        );
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn default_role_is_member() {
        assert_eq!(Role::default(), Role::Member);
    }

    #[test]
    fn privilege_helpers() {
        assert!(!Role::Member.can_manage_incidents());
        assert!(Role::Commander.can_manage_incidents());
        assert!(Role::Admin.can_manage_incidents());
        assert!(!Role::Commander.is_admin());
        assert!(Role::Admin.is_admin());
        assert!(Role::Member < Role::Admin);
    }
}
