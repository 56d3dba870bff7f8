use uuid::Uuid;

use firelog_common::dto::dictionary::{CountyDto, FireDepartmentDto, ProvinceDto};

use crate::error::AppError;
use crate::repository::Repository;

/// Read-only lookups behind the registration form's cascade.
pub struct DictionaryService<'a> {
    repo: &'a dyn Repository,
}

impl<'a> DictionaryService<'a> {
    pub fn new(repo: &'a dyn Repository) -> Self {
        Self { repo }
    }

    pub async fn provinces(&self) -> Result<Vec<ProvinceDto>, AppError> {
        let rows = self.repo.list_provinces().await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// An unknown province yields an empty list.
    pub async fn counties(&self, province_id: Uuid) -> Result<Vec<CountyDto>, AppError> {
        let rows = self.repo.list_counties(province_id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn fire_departments(
        &self,
        county_id: Uuid,
    ) -> Result<Vec<FireDepartmentDto>, AppError> {
        let rows = self.repo.list_fire_departments(county_id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::services::test_support::Fixture;

    #[tokio::test]
    async fn cascade_reaches_seeded_department() {
        let fx = Fixture::new();
        let other = fx.other_department();

        let provinces = fx.dictionary().provinces().await.unwrap();
        assert_eq!(provinces.len(), 1);
        let counties = fx.dictionary().counties(provinces[0].id).await.unwrap();
        assert_eq!(counties.len(), 1);
        assert_eq!(counties[0].id, fx.department.county_id);

        let departments = fx
            .dictionary()
            .fire_departments(counties[0].id)
            .await
            .unwrap();
        let names: Vec<&str> = departments.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["OSP Demo", "OSP Sąsiednia"]);
        assert_eq!(departments[1].id, other.id);
    }

    #[tokio::test]
    async fn unknown_parent_is_empty() {
        let fx = Fixture::new();
        assert!(fx.dictionary().counties(Uuid::new_v4()).await.unwrap().is_empty());
        assert!(
            fx.dictionary()
                .fire_departments(Uuid::new_v4())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn department_dto_has_no_code() {
        let fx = Fixture::new();
        let json = serde_json::to_string(
            &fx.dictionary()
                .fire_departments(fx.department.county_id)
                .await
                .unwrap(),
        )
        .unwrap();
        assert!(!json.contains("verification_code"));
        assert!(!json.contains(crate::repository::memory::DEMO_VERIFICATION_CODE));
    }
}
