use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use firelog_common::dto::meldunki::{SortField, SortOrder, UpdateMeldunekRequest};
use firelog_common::role::Role;

use super::{
    County, FireDepartment, Meldunek, MeldunekFilter, NewMeldunek, NewProfile, Profile, Province,
    Repository,
};

/// Verification code of the department created by [`InMemoryRepository::seed_demo`].
pub const DEMO_VERIFICATION_CODE: &str = "DEMO2026";

#[derive(Debug, Default)]
struct Tables {
    provinces: Vec<Province>,
    counties: Vec<County>,
    fire_departments: Vec<FireDepartment>,
    /// Stored without the joined department name.
    profiles: HashMap<Uuid, Profile>,
    meldunki: HashMap<Uuid, Meldunek>,
}

impl Tables {
    fn with_department_name(&self, mut profile: Profile) -> Profile {
        profile.fire_department_name = profile.fire_department_id.and_then(|id| {
            self.fire_departments
                .iter()
                .find(|d| d.id == id)
                .map(|d| d.name.clone())
        });
        profile
    }
}

/// Process-local tables with the same contract as [`super::PgRepository`].
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    tables: Mutex<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn add_province(&self, name: &str) -> Province {
        let province = Province {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.lock().provinces.push(province.clone());
        province
    }

    pub fn add_county(&self, province_id: Uuid, name: &str) -> County {
        let county = County {
            id: Uuid::new_v4(),
            province_id,
            name: name.to_string(),
        };
        self.lock().counties.push(county.clone());
        county
    }

    pub fn add_fire_department(
        &self,
        county_id: Uuid,
        name: &str,
        verification_code: &str,
    ) -> FireDepartment {
        let dept = FireDepartment {
            id: Uuid::new_v4(),
            county_id,
            name: name.to_string(),
            verification_code: verification_code.to_string(),
        };
        self.lock().fire_departments.push(dept.clone());
        dept
    }

    /// One province, county and department for local experiments.
    pub fn seed_demo(&self) -> FireDepartment {
        let province = self.add_province("mazowieckie");
        let county = self.add_county(province.id, "powiat warszawski zachodni");
        self.add_fire_department(county.id, "OSP Demo", DEMO_VERIFICATION_CODE)
    }

    pub fn meldunki_count(&self) -> usize {
        self.lock().meldunki.len()
    }
}

fn matches_filter(m: &Meldunek, filter: &MeldunekFilter, needle: Option<&str>) -> bool {
    if m.fire_department_id != filter.fire_department_id {
        return false;
    }
    if filter.date_from.is_some_and(|from| m.incident_date < from)
        || filter.date_to.is_some_and(|to| m.incident_date > to)
    {
        return false;
    }
    needle.is_none_or(|n| {
        [&m.incident_name, &m.location_address, &m.description]
            .iter()
            .any(|field| field.to_lowercase().contains(n))
    })
}

fn compare(a: &Meldunek, b: &Meldunek, sort_by: SortField) -> Ordering {
    match sort_by {
        SortField::IncidentDate => a
            .incident_date
            .cmp(&b.incident_date)
            .then(a.start_time.cmp(&b.start_time)),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    }
    .then(a.id.cmp(&b.id))
}

#[async_trait::async_trait]
impl Repository for InMemoryRepository {
    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn list_provinces(&self) -> anyhow::Result<Vec<Province>> {
        let mut out = self.lock().provinces.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn list_counties(&self, province_id: Uuid) -> anyhow::Result<Vec<County>> {
        let mut out: Vec<County> = self
            .lock()
            .counties
            .iter()
            .filter(|c| c.province_id == province_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn list_fire_departments(&self, county_id: Uuid) -> anyhow::Result<Vec<FireDepartment>> {
        let mut out: Vec<FireDepartment> = self
            .lock()
            .fire_departments
            .iter()
            .filter(|d| d.county_id == county_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn get_fire_department(&self, id: Uuid) -> anyhow::Result<Option<FireDepartment>> {
        Ok(self
            .lock()
            .fire_departments
            .iter()
            .find(|d| d.id == id)
            .cloned())
    }

    async fn get_profile(&self, id: Uuid) -> anyhow::Result<Option<Profile>> {
        let tables = self.lock();
        Ok(tables
            .profiles
            .get(&id)
            .cloned()
            .map(|p| tables.with_department_name(p)))
    }

    async fn upsert_profile(&self, profile: &NewProfile) -> anyhow::Result<Profile> {
        let mut tables = self.lock();
        let now = Utc::now();
        let created_at = tables.profiles.get(&profile.id).map_or(now, |p| p.created_at);
        let row = Profile {
            id: profile.id,
            email: profile.email.clone(),
            first_name: profile.first_name.trim().to_string(),
            last_name: profile.last_name.trim().to_string(),
            role: profile.role,
            fire_department_id: Some(profile.fire_department_id),
            fire_department_name: None,
            created_at,
            updated_at: now,
        };
        tables.profiles.insert(row.id, row.clone());
        Ok(tables.with_department_name(row))
    }

    async fn update_profile_names(
        &self,
        id: Uuid,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> anyhow::Result<Option<Profile>> {
        let mut tables = self.lock();
        let Some(row) = tables.profiles.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = first_name {
            row.first_name = v.trim().to_string();
        }
        if let Some(v) = last_name {
            row.last_name = v.trim().to_string();
        }
        row.updated_at = Utc::now();
        let row = row.clone();
        Ok(Some(tables.with_department_name(row)))
    }

    async fn update_profile_role(&self, id: Uuid, role: Role) -> anyhow::Result<Option<Profile>> {
        let mut tables = self.lock();
        let Some(row) = tables.profiles.get_mut(&id) else {
            return Ok(None);
        };
        row.role = role;
        row.updated_at = Utc::now();
        let row = row.clone();
        Ok(Some(tables.with_department_name(row)))
    }

    async fn list_department_profiles(&self, fire_department_id: Uuid) -> anyhow::Result<Vec<Profile>> {
        let tables = self.lock();
        let mut out: Vec<Profile> = tables
            .profiles
            .values()
            .filter(|p| p.fire_department_id == Some(fire_department_id))
            .cloned()
            .map(|p| tables.with_department_name(p))
            .collect();
        out.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
        });
        Ok(out)
    }

    async fn delete_profile(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.lock().profiles.remove(&id).is_some())
    }

    async fn insert_meldunek(&self, meldunek: &NewMeldunek) -> anyhow::Result<Meldunek> {
        let now = Utc::now();
        let data = &meldunek.data;
        let row = Meldunek {
            id: Uuid::new_v4(),
            user_id: meldunek.user_id,
            fire_department_id: meldunek.fire_department_id,
            incident_name: data.incident_name.trim().to_string(),
            incident_date: data.incident_date,
            location_address: data.location_address.trim().to_string(),
            description: data.description.trim().to_string(),
            forces_and_resources: data.forces_and_resources.clone(),
            commander: data.commander.clone(),
            driver: data.driver.clone(),
            start_time: data.start_time,
            end_time: data.end_time,
            created_at: now,
            updated_at: now,
        };
        self.lock().meldunki.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_meldunek(&self, id: Uuid) -> anyhow::Result<Option<Meldunek>> {
        Ok(self.lock().meldunki.get(&id).cloned())
    }

    async fn update_meldunek(
        &self,
        id: Uuid,
        changes: &UpdateMeldunekRequest,
    ) -> anyhow::Result<Option<Meldunek>> {
        let mut tables = self.lock();
        let Some(row) = tables.meldunki.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = &changes.incident_name {
            row.incident_name = v.trim().to_string();
        }
        if let Some(v) = changes.incident_date {
            row.incident_date = v;
        }
        if let Some(v) = &changes.location_address {
            row.location_address = v.trim().to_string();
        }
        if let Some(v) = &changes.description {
            row.description = v.trim().to_string();
        }
        if let Some(v) = &changes.forces_and_resources {
            row.forces_and_resources = Some(v.clone());
        }
        if let Some(v) = &changes.commander {
            row.commander = Some(v.clone());
        }
        if let Some(v) = &changes.driver {
            row.driver = Some(v.clone());
        }
        if let Some(v) = changes.start_time {
            row.start_time = v;
        }
        if let Some(v) = changes.end_time {
            row.end_time = Some(v);
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete_meldunek(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.lock().meldunki.remove(&id).is_some())
    }

    async fn list_meldunki(&self, filter: &MeldunekFilter) -> anyhow::Result<(Vec<Meldunek>, u64)> {
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let mut matching: Vec<Meldunek> = self
            .lock()
            .meldunki
            .values()
            .filter(|m| matches_filter(m, filter, needle.as_deref()))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            let ord = compare(a, b, filter.sort_by);
            match filter.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
        let total = matching.len() as u64;
        let offset = usize::try_from(filter.offset).unwrap_or(usize::MAX);
        let page = matching
            .into_iter()
            .skip(offset)
            .take(filter.limit as usize)
            .collect();
        Ok((page, total))
    }
}
