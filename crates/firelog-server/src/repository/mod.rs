pub mod memory;
pub mod postgres;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use firelog_common::dto::dictionary::{CountyDto, FireDepartmentDto, ProvinceDto};
use firelog_common::dto::meldunki::{
    CreateMeldunekRequest, MeldunekDto, SortField, SortOrder, UpdateMeldunekRequest,
};
use firelog_common::dto::profile::{FireDepartmentRef, ProfileDto};
use firelog_common::role::Role;

pub use memory::InMemoryRepository;
pub use postgres::PgRepository;

// ── Records ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Province {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct County {
    pub id: Uuid,
    pub province_id: Uuid,
    pub name: String,
}

#[derive(Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FireDepartment {
    pub id: Uuid,
    pub county_id: Uuid,
    pub name: String,
    pub verification_code: String,
}

impl std::fmt::Debug for FireDepartment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FireDepartment")
            .field("id", &self.id)
            .field("county_id", &self.county_id)
            .field("name", &self.name)
            .field("verification_code", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub fire_department_id: Option<Uuid>,
    /// Joined from `fire_departments` for display.
    pub fire_department_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile row written at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub fire_department_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Meldunek {
    pub id: Uuid,
    pub user_id: Uuid,
    pub fire_department_id: Uuid,
    pub incident_name: String,
    pub incident_date: NaiveDate,
    pub location_address: String,
    pub description: String,
    pub forces_and_resources: Option<String>,
    pub commander: Option<String>,
    pub driver: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Incident insert: the validated payload plus its owner and department.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMeldunek {
    pub user_id: Uuid,
    pub fire_department_id: Uuid,
    pub data: CreateMeldunekRequest,
}

/// Department-scoped listing parameters, already validated and defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeldunekFilter {
    pub fire_department_id: Uuid,
    /// Case-insensitive substring of name, address or description.
    pub search: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub sort_by: SortField,
    pub order: SortOrder,
    pub limit: u32,
    pub offset: u64,
}

// ── DTO conversions ─────────────────────────────────────────────────────────

impl From<Province> for ProvinceDto {
    fn from(p: Province) -> Self {
        Self {
            id: p.id,
            name: p.name,
        }
    }
}

impl From<County> for CountyDto {
    fn from(c: County) -> Self {
        Self {
            id: c.id,
            province_id: c.province_id,
            name: c.name,
        }
    }
}

impl From<FireDepartment> for FireDepartmentDto {
    fn from(d: FireDepartment) -> Self {
        Self {
            id: d.id,
            county_id: d.county_id,
            name: d.name,
        }
    }
}

impl From<Profile> for ProfileDto {
    fn from(p: Profile) -> Self {
        let fire_department = p.fire_department_id.map(|id| FireDepartmentRef {
            id,
            name: p.fire_department_name.unwrap_or_default(),
        });
        Self {
            id: p.id,
            email: p.email,
            first_name: p.first_name,
            last_name: p.last_name,
            role: p.role,
            fire_department,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<Meldunek> for MeldunekDto {
    fn from(m: Meldunek) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            fire_department_id: m.fire_department_id,
            incident_name: m.incident_name,
            incident_date: m.incident_date,
            location_address: m.location_address,
            description: m.description,
            forces_and_resources: m.forces_and_resources,
            commander: m.commander,
            driver: m.driver,
            start_time: m.start_time,
            end_time: m.end_time,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

// ── Trait ───────────────────────────────────────────────────────────────────

/// Table access for the hosted database.
///
/// Every lookup returns `Ok(None)` (or `false` for deletes) when the row does
/// not exist; `Err` is reserved for infrastructure failures.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    /// Cheap round-trip used by the readiness probe.
    async fn ping(&self) -> anyhow::Result<()>;

    async fn list_provinces(&self) -> anyhow::Result<Vec<Province>>;

    async fn list_counties(&self, province_id: Uuid) -> anyhow::Result<Vec<County>>;

    async fn list_fire_departments(&self, county_id: Uuid) -> anyhow::Result<Vec<FireDepartment>>;

    async fn get_fire_department(&self, id: Uuid) -> anyhow::Result<Option<FireDepartment>>;

    async fn get_profile(&self, id: Uuid) -> anyhow::Result<Option<Profile>>;

    /// Insert or overwrite the profile row for `profile.id`.
    async fn upsert_profile(&self, profile: &NewProfile) -> anyhow::Result<Profile>;

    async fn update_profile_names(
        &self,
        id: Uuid,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> anyhow::Result<Option<Profile>>;

    async fn update_profile_role(&self, id: Uuid, role: Role) -> anyhow::Result<Option<Profile>>;

    /// Profiles of one department, ordered by last then first name.
    async fn list_department_profiles(&self, fire_department_id: Uuid) -> anyhow::Result<Vec<Profile>>;

    async fn delete_profile(&self, id: Uuid) -> anyhow::Result<bool>;

    async fn insert_meldunek(&self, meldunek: &NewMeldunek) -> anyhow::Result<Meldunek>;

    async fn get_meldunek(&self, id: Uuid) -> anyhow::Result<Option<Meldunek>>;

    /// Apply the present fields of `changes`; absent fields are kept.
    async fn update_meldunek(
        &self,
        id: Uuid,
        changes: &UpdateMeldunekRequest,
    ) -> anyhow::Result<Option<Meldunek>>;

    async fn delete_meldunek(&self, id: Uuid) -> anyhow::Result<bool>;

    /// One page of matching incidents plus the total match count.
    async fn list_meldunki(&self, filter: &MeldunekFilter) -> anyhow::Result<(Vec<Meldunek>, u64)>;
}
