use std::fmt;

use serde::{Deserialize, Serialize};

/// Machine-readable error codes carried in the `error.code` field of the
/// response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    InvalidJson,
    Unauthorized,
    InvalidCredentials,
    EmailNotConfirmed,
    EmailAlreadyExists,
    InvalidRefreshToken,
    FireDepartmentNotFound,
    InvalidVerificationCode,
    ProfileNotFound,
    MeldunekNotFound,
    UserNotFound,
    NotFound,
    Forbidden,
    CannotModifySelf,
    RateLimitExceeded,
    InternalError,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidJson => "INVALID_JSON",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::EmailNotConfirmed => "EMAIL_NOT_CONFIRMED",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::FireDepartmentNotFound => "FIRE_DEPARTMENT_NOT_FOUND",
            Self::InvalidVerificationCode => "INVALID_VERIFICATION_CODE",
            Self::ProfileNotFound => "PROFILE_NOT_FOUND",
            Self::MeldunekNotFound => "MELDUNEK_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::CannotModifySelf => "CANNOT_MODIFY_SELF",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
