//! Single-field checks. Each returns a boolean or the message to report.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use regex::Regex;

pub const MAX_EMAIL_LEN: usize = 255;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_NAME_LEN: usize = 2;
pub const MAX_NAME_LEN: usize = 50;
/// Incidents older than this many days cannot be reported.
pub const MAX_INCIDENT_AGE_DAYS: i64 = 365;

// The patterns are literals; compilation cannot fail at runtime.
#[allow(clippy::expect_used)]
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

#[allow(clippy::expect_used)]
static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("uuid regex")
});

#[allow(clippy::expect_used)]
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{L}[\p{L} '\-]*$").expect("name regex"));

#[allow(clippy::expect_used)]
static VERIFICATION_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{4,32}$").expect("verification code regex"));

pub fn is_valid_email(email: &str) -> bool {
    email.chars().count() <= MAX_EMAIL_LEN && EMAIL_RE.is_match(email)
}

/// RFC 4122 UUID (versions 1-5), any letter case.
pub fn is_valid_uuid(value: &str) -> bool {
    UUID_RE.is_match(value)
}

/// First or last name: letters (Polish diacritics included), spaces,
/// hyphens and apostrophes; 2 to 50 characters.
pub fn is_valid_name(name: &str) -> bool {
    let len = name.chars().count();
    (MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) && NAME_RE.is_match(name)
}

pub fn is_valid_verification_code(code: &str) -> bool {
    VERIFICATION_CODE_RE.is_match(code)
}

/// A single unmet password requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordIssue {
    TooShort,
    MissingUppercase,
    MissingLowercase,
    MissingDigit,
    MissingSpecial,
}

impl PasswordIssue {
    pub const fn message(self) -> &'static str {
        match self {
            Self::TooShort => "Hasło musi mieć co najmniej 8 znaków",
            Self::MissingUppercase => "Hasło musi zawierać wielką literę",
            Self::MissingLowercase => "Hasło musi zawierać małą literę",
            Self::MissingDigit => "Hasło musi zawierać cyfrę",
            Self::MissingSpecial => "Hasło musi zawierać znak specjalny",
        }
    }
}

/// Every requirement the password fails, in a stable order. Empty means strong.
pub fn check_password(password: &str) -> Vec<PasswordIssue> {
    let mut issues = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LEN {
        issues.push(PasswordIssue::TooShort);
    }
    if !password.chars().any(char::is_uppercase) {
        issues.push(PasswordIssue::MissingUppercase);
    }
    if !password.chars().any(char::is_lowercase) {
        issues.push(PasswordIssue::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        issues.push(PasswordIssue::MissingDigit);
    }
    if !password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
    {
        issues.push(PasswordIssue::MissingSpecial);
    }
    issues
}

/// Length check on the trimmed value, counted in characters.
pub fn length_error(value: &str, min: usize, max: usize) -> Option<String> {
    let len = value.trim().chars().count();
    if len < min {
        Some(format!("Wymagane co najmniej {min} znaków"))
    } else if len > max {
        Some(format!("Dopuszczalne maksymalnie {max} znaków"))
    } else {
        None
    }
}

/// The incident date may be neither in the future nor older than a year.
pub fn incident_date_error(date: NaiveDate, today: NaiveDate) -> Option<&'static str> {
    if date > today {
        return Some("Data zdarzenia nie może być z przyszłości");
    }
    if date < today - Duration::days(MAX_INCIDENT_AGE_DAYS) {
        return Some("Data zdarzenia nie może być starsza niż rok");
    }
    None
}

/// Start must not be in the future; end, when given, must not precede start.
pub fn time_range_error(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<(&'static str, &'static str)> {
    if start > now {
        return Some((
            "start_time",
            "Czas rozpoczęcia nie może być z przyszłości",
        ));
    }
    if let Some(end) = end
        && end < start
    {
        return Some((
            "end_time",
            "Czas zakończenia nie może być wcześniejszy niż czas rozpoczęcia",
        ));
    }
    None
}
