use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use firelog_common::dto::meldunki::{SortField, SortOrder, UpdateMeldunekRequest};
use firelog_common::role::Role;

use super::{
    County, FireDepartment, Meldunek, MeldunekFilter, NewMeldunek, NewProfile, Profile, Province,
    Repository,
};

const PROFILE_SELECT: &str = "SELECT p.id, p.email, p.first_name, p.last_name, p.role::text AS role,
        p.fire_department_id, d.name AS fire_department_name, p.created_at, p.updated_at
     FROM profiles p
     LEFT JOIN fire_departments d ON d.id = p.fire_department_id";

const MELDUNEK_COLUMNS: &str = "id, user_id, fire_department_id, incident_name, incident_date,
     location_address, description, forces_and_resources, commander, driver,
     start_time, end_time, created_at, updated_at";

const MELDUNEK_FILTER: &str = "WHERE fire_department_id = $1
       AND ($2::text IS NULL
            OR incident_name ILIKE $2
            OR location_address ILIKE $2
            OR description ILIKE $2)
       AND ($3::date IS NULL OR incident_date >= $3)
       AND ($4::date IS NULL OR incident_date <= $4)";

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    role: String,
    fire_department_id: Option<Uuid>,
    fire_department_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = anyhow::Error;

    fn try_from(row: ProfileRow) -> anyhow::Result<Self> {
        let role = row
            .role
            .parse::<Role>()
            .with_context(|| format!("profile {} has unknown role", row.id))?;
        Ok(Self {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            role,
            fire_department_id: row.fire_department_id,
            fire_department_name: row.fire_department_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn search_pattern(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", escape_like(s)))
}

const fn order_clause(sort_by: SortField, order: SortOrder) -> &'static str {
    match (sort_by, order) {
        (SortField::IncidentDate, SortOrder::Asc) => {
            "ORDER BY incident_date ASC, start_time ASC, id ASC"
        }
        (SortField::IncidentDate, SortOrder::Desc) => {
            "ORDER BY incident_date DESC, start_time DESC, id DESC"
        }
        (SortField::CreatedAt, SortOrder::Asc) => "ORDER BY created_at ASC, id ASC",
        (SortField::CreatedAt, SortOrder::Desc) => "ORDER BY created_at DESC, id DESC",
    }
}

/// Tables of the hosted Postgres database, reached directly through sqlx.
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Repository for PgRepository {
    async fn ping(&self) -> anyhow::Result<()> {
        crate::db::ping(&self.pool).await
    }

    async fn list_provinces(&self) -> anyhow::Result<Vec<Province>> {
        Ok(
            sqlx::query_as::<_, Province>("SELECT id, name FROM provinces ORDER BY name")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn list_counties(&self, province_id: Uuid) -> anyhow::Result<Vec<County>> {
        Ok(sqlx::query_as::<_, County>(
            "SELECT id, province_id, name FROM counties WHERE province_id = $1 ORDER BY name",
        )
        .bind(province_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_fire_departments(&self, county_id: Uuid) -> anyhow::Result<Vec<FireDepartment>> {
        Ok(sqlx::query_as::<_, FireDepartment>(
            "SELECT id, county_id, name, verification_code
             FROM fire_departments WHERE county_id = $1 ORDER BY name",
        )
        .bind(county_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_fire_department(&self, id: Uuid) -> anyhow::Result<Option<FireDepartment>> {
        Ok(sqlx::query_as::<_, FireDepartment>(
            "SELECT id, county_id, name, verification_code FROM fire_departments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn get_profile(&self, id: Uuid) -> anyhow::Result<Option<Profile>> {
        sqlx::query_as::<_, ProfileRow>(&format!("{PROFILE_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Profile::try_from)
            .transpose()
    }

    async fn upsert_profile(&self, profile: &NewProfile) -> anyhow::Result<Profile> {
        // The signup trigger may already have created the row.
        sqlx::query(
            "INSERT INTO profiles (id, email, first_name, last_name, role, fire_department_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (id) DO UPDATE SET
                 email = EXCLUDED.email,
                 first_name = EXCLUDED.first_name,
                 last_name = EXCLUDED.last_name,
                 role = EXCLUDED.role,
                 fire_department_id = EXCLUDED.fire_department_id,
                 updated_at = NOW()",
        )
        .bind(profile.id)
        .bind(&profile.email)
        .bind(profile.first_name.trim())
        .bind(profile.last_name.trim())
        .bind(profile.role.as_str())
        .bind(profile.fire_department_id)
        .execute(&self.pool)
        .await
        .context("failed to upsert profile")?;
        self.get_profile(profile.id)
            .await?
            .context("profile missing after upsert")
    }

    async fn update_profile_names(
        &self,
        id: Uuid,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> anyhow::Result<Option<Profile>> {
        let updated = sqlx::query(
            "UPDATE profiles SET
                 first_name = COALESCE($2, first_name),
                 last_name = COALESCE($3, last_name),
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(first_name.map(str::trim))
        .bind(last_name.map(str::trim))
        .execute(&self.pool)
        .await?
        .rows_affected();
        if updated == 0 {
            return Ok(None);
        }
        self.get_profile(id).await
    }

    async fn update_profile_role(&self, id: Uuid, role: Role) -> anyhow::Result<Option<Profile>> {
        let updated = sqlx::query("UPDATE profiles SET role = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(role.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();
        if updated == 0 {
            return Ok(None);
        }
        self.get_profile(id).await
    }

    async fn list_department_profiles(&self, fire_department_id: Uuid) -> anyhow::Result<Vec<Profile>> {
        sqlx::query_as::<_, ProfileRow>(&format!(
            "{PROFILE_SELECT} WHERE p.fire_department_id = $1 ORDER BY p.last_name, p.first_name"
        ))
        .bind(fire_department_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Profile::try_from)
        .collect()
    }

    async fn delete_profile(&self, id: Uuid) -> anyhow::Result<bool> {
        let deleted = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }

    async fn insert_meldunek(&self, meldunek: &NewMeldunek) -> anyhow::Result<Meldunek> {
        let data = &meldunek.data;
        sqlx::query_as::<_, Meldunek>(&format!(
            "INSERT INTO meldunki (user_id, fire_department_id, incident_name, incident_date,
                 location_address, description, forces_and_resources, commander, driver,
                 start_time, end_time)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {MELDUNEK_COLUMNS}"
        ))
        .bind(meldunek.user_id)
        .bind(meldunek.fire_department_id)
        .bind(data.incident_name.trim())
        .bind(data.incident_date)
        .bind(data.location_address.trim())
        .bind(data.description.trim())
        .bind(data.forces_and_resources.as_deref())
        .bind(data.commander.as_deref())
        .bind(data.driver.as_deref())
        .bind(data.start_time)
        .bind(data.end_time)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert meldunek")
    }

    async fn get_meldunek(&self, id: Uuid) -> anyhow::Result<Option<Meldunek>> {
        Ok(sqlx::query_as::<_, Meldunek>(&format!(
            "SELECT {MELDUNEK_COLUMNS} FROM meldunki WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn update_meldunek(
        &self,
        id: Uuid,
        changes: &UpdateMeldunekRequest,
    ) -> anyhow::Result<Option<Meldunek>> {
        Ok(sqlx::query_as::<_, Meldunek>(&format!(
            "UPDATE meldunki SET
                 incident_name = COALESCE($2, incident_name),
                 incident_date = COALESCE($3, incident_date),
                 location_address = COALESCE($4, location_address),
                 description = COALESCE($5, description),
                 forces_and_resources = COALESCE($6, forces_and_resources),
                 commander = COALESCE($7, commander),
                 driver = COALESCE($8, driver),
                 start_time = COALESCE($9, start_time),
                 end_time = COALESCE($10, end_time),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {MELDUNEK_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.incident_name.as_deref().map(str::trim))
        .bind(changes.incident_date)
        .bind(changes.location_address.as_deref().map(str::trim))
        .bind(changes.description.as_deref().map(str::trim))
        .bind(changes.forces_and_resources.as_deref())
        .bind(changes.commander.as_deref())
        .bind(changes.driver.as_deref())
        .bind(changes.start_time)
        .bind(changes.end_time)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_meldunek(&self, id: Uuid) -> anyhow::Result<bool> {
        let deleted = sqlx::query("DELETE FROM meldunki WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }

    async fn list_meldunki(&self, filter: &MeldunekFilter) -> anyhow::Result<(Vec<Meldunek>, u64)> {
        let pattern = search_pattern(filter.search.as_deref());

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM meldunki {MELDUNEK_FILTER}"))
                .bind(filter.fire_department_id)
                .bind(pattern.as_deref())
                .bind(filter.date_from)
                .bind(filter.date_to)
                .fetch_one(&self.pool)
                .await
                .context("failed to count meldunki")?;

        let items = sqlx::query_as::<_, Meldunek>(&format!(
            "SELECT {MELDUNEK_COLUMNS} FROM meldunki {MELDUNEK_FILTER} {} LIMIT $5 OFFSET $6",
            order_clause(filter.sort_by, filter.order)
        ))
        .bind(filter.fire_department_id)
        .bind(pattern.as_deref())
        .bind(filter.date_from)
        .bind(filter.date_to)
        .bind(i64::from(filter.limit))
        .bind(i64::try_from(filter.offset).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .context("failed to list meldunki")?;

        Ok((items, u64::try_from(total).unwrap_or_default()))
    }
}
