//! Request payload validation.
//!
//! Every validator is a pure function that returns a [`ValidationResult`]:
//! a validity flag plus one message per offending field. Only the first
//! problem found for a field is reported, except for passwords, where every
//! unmet requirement is listed.

pub mod rules;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dto::admin::ChangeRoleRequest;
use crate::dto::auth::{LoginRequest, RefreshRequest, RegisterRequest};
use crate::dto::meldunki::{CreateMeldunekRequest, ListMeldunkiQuery, UpdateMeldunekRequest};
use crate::dto::profile::UpdateProfileRequest;
use crate::envelope::FieldErrors;
use crate::role::Role;

pub use rules::{
    PasswordIssue, check_password, is_valid_email, is_valid_name, is_valid_uuid,
    is_valid_verification_code,
};

pub const MAX_PAGE_LIMIT: u32 = 100;
pub const MAX_SEARCH_LEN: usize = 200;

/// Field length bounds for incident reports: `(min, max)`.
pub mod limits {
    pub const INCIDENT_NAME: (usize, usize) = (3, 255);
    pub const LOCATION_ADDRESS: (usize, usize) = (3, 500);
    pub const DESCRIPTION: (usize, usize) = (10, 5000);
    pub const FORCES_AND_RESOURCES: (usize, usize) = (0, 2000);
    pub const COMMANDER: (usize, usize) = (0, 100);
    pub const DRIVER: (usize, usize) = (0, 100);
}

const REQUIRED: &str = "Pole jest wymagane";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: FieldErrors,
}

impl ValidationResult {
    fn from_errors(errors: FieldErrors) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// `Ok(())` when valid, otherwise the field errors.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.valid { Ok(()) } else { Err(self.errors) }
    }
}

/// Collects field errors, keeping the first message per field.
#[derive(Default)]
struct Collector(FieldErrors);

impl Collector {
    fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    fn required(&mut self, field: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.add(field, REQUIRED);
            false
        } else {
            true
        }
    }

    fn length(&mut self, field: &str, value: &str, (min, max): (usize, usize)) {
        if let Some(msg) = rules::length_error(value, min, max) {
            self.add(field, msg);
        }
    }

    fn email(&mut self, value: &str) {
        if self.required("email", value) && !is_valid_email(value.trim()) {
            self.add("email", "Nieprawidłowy format adresu e-mail");
        }
    }

    fn name(&mut self, field: &str, value: &str) {
        if self.required(field, value) && !is_valid_name(value.trim()) {
            self.add(
                field,
                "Dozwolone są litery, spacje, myślniki i apostrofy (2-50 znaków)",
            );
        }
    }

    fn finish(self) -> ValidationResult {
        ValidationResult::from_errors(self.0)
    }
}

pub fn validate_register(req: &RegisterRequest) -> ValidationResult {
    let mut c = Collector::default();
    c.email(&req.email);

    let issues = check_password(&req.password);
    if !issues.is_empty() {
        let joined = issues
            .iter()
            .map(|i| i.message())
            .collect::<Vec<_>>()
            .join("; ");
        c.add("password", joined);
    }

    c.name("first_name", &req.first_name);
    c.name("last_name", &req.last_name);

    if c.required("fire_department_id", &req.fire_department_id)
        && !is_valid_uuid(req.fire_department_id.trim())
    {
        c.add("fire_department_id", "Nieprawidłowy identyfikator jednostki");
    }

    if c.required("verification_code", &req.verification_code)
        && !is_valid_verification_code(req.verification_code.trim())
    {
        c.add(
            "verification_code",
            "Kod weryfikacyjny musi mieć 4-32 znaki alfanumeryczne",
        );
    }
    c.finish()
}

/// Presence and e-mail format only. Strength rules apply at registration.
pub fn validate_login(req: &LoginRequest) -> ValidationResult {
    let mut c = Collector::default();
    c.email(&req.email);
    if req.password.is_empty() {
        c.add("password", REQUIRED);
    }
    c.finish()
}

pub fn validate_refresh(req: &RefreshRequest) -> ValidationResult {
    let mut c = Collector::default();
    c.required("refresh_token", &req.refresh_token);
    c.finish()
}

fn validate_optional_texts(
    c: &mut Collector,
    forces: Option<&str>,
    commander: Option<&str>,
    driver: Option<&str>,
) {
    if let Some(v) = forces {
        c.length("forces_and_resources", v, limits::FORCES_AND_RESOURCES);
    }
    if let Some(v) = commander {
        c.length("commander", v, limits::COMMANDER);
    }
    if let Some(v) = driver {
        c.length("driver", v, limits::DRIVER);
    }
}

pub fn validate_create_meldunek(req: &CreateMeldunekRequest, now: DateTime<Utc>) -> ValidationResult {
    let mut c = Collector::default();
    if c.required("incident_name", &req.incident_name) {
        c.length("incident_name", &req.incident_name, limits::INCIDENT_NAME);
    }
    if c.required("location_address", &req.location_address) {
        c.length(
            "location_address",
            &req.location_address,
            limits::LOCATION_ADDRESS,
        );
    }
    if c.required("description", &req.description) {
        c.length("description", &req.description, limits::DESCRIPTION);
    }
    validate_optional_texts(
        &mut c,
        req.forces_and_resources.as_deref(),
        req.commander.as_deref(),
        req.driver.as_deref(),
    );
    if let Some(msg) = rules::incident_date_error(req.incident_date, now.date_naive()) {
        c.add("incident_date", msg);
    }
    if let Some((field, msg)) = rules::time_range_error(req.start_time, req.end_time, now) {
        c.add(field, msg);
    }
    c.finish()
}

/// Validates the fields present in a partial update.
///
/// The time range is checked against the merged values, so the caller passes
/// the stored `start_time`/`end_time` of the incident being edited.
pub fn validate_update_meldunek(
    req: &UpdateMeldunekRequest,
    current_start: DateTime<Utc>,
    current_end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ValidationResult {
    let mut c = Collector::default();
    if req.is_empty() {
        c.add("body", "Brak pól do aktualizacji");
        return c.finish();
    }
    if let Some(v) = &req.incident_name {
        c.length("incident_name", v, limits::INCIDENT_NAME);
    }
    if let Some(v) = &req.location_address {
        c.length("location_address", v, limits::LOCATION_ADDRESS);
    }
    if let Some(v) = &req.description {
        c.length("description", v, limits::DESCRIPTION);
    }
    validate_optional_texts(
        &mut c,
        req.forces_and_resources.as_deref(),
        req.commander.as_deref(),
        req.driver.as_deref(),
    );
    if let Some(date) = req.incident_date
        && let Some(msg) = rules::incident_date_error(date, now.date_naive())
    {
        c.add("incident_date", msg);
    }
    if req.start_time.is_some() || req.end_time.is_some() {
        let start = req.start_time.unwrap_or(current_start);
        let end = req.end_time.or(current_end);
        if let Some((field, msg)) = rules::time_range_error(start, end, now) {
            c.add(field, msg);
        }
    }
    c.finish()
}

pub fn validate_update_profile(req: &UpdateProfileRequest) -> ValidationResult {
    let mut c = Collector::default();
    if req.first_name.is_none() && req.last_name.is_none() {
        c.add("body", "Brak pól do aktualizacji");
        return c.finish();
    }
    if let Some(v) = &req.first_name {
        c.name("first_name", v);
    }
    if let Some(v) = &req.last_name {
        c.name("last_name", v);
    }
    c.finish()
}

/// Validates the role name and returns the parsed role alongside the result.
pub fn validate_role_change(req: &ChangeRoleRequest) -> (ValidationResult, Option<Role>) {
    let mut c = Collector::default();
    let mut parsed = None;
    if c.required("role", &req.role) {
        match req.role.trim().parse::<Role>() {
            Ok(role) => parsed = Some(role),
            Err(_) => c.add("role", "Dozwolone role: member, commander, admin"),
        }
    }
    (c.finish(), parsed)
}

pub fn validate_list_query(q: &ListMeldunkiQuery) -> ValidationResult {
    let mut c = Collector::default();
    if q.page == Some(0) {
        c.add("page", "Numer strony musi być większy od zera");
    }
    if let Some(limit) = q.limit
        && !(1..=MAX_PAGE_LIMIT).contains(&limit)
    {
        c.add("limit", format!("Limit musi mieścić się w zakresie 1-{MAX_PAGE_LIMIT}"));
    }
    if let Some(search) = &q.search
        && search.chars().count() > MAX_SEARCH_LEN
    {
        c.add(
            "search",
            format!("Dopuszczalne maksymalnie {MAX_SEARCH_LEN} znaków"),
        );
    }
    if let (Some(from), Some(to)) = (q.date_from, q.date_to)
        && from > to
    {
        c.add("date_from", "Data początkowa nie może być późniejsza niż końcowa");
    }
    c.finish()
}
