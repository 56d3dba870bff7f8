use chrono::Utc;
use uuid::Uuid;

use firelog_common::dto::meldunki::{
    CreateMeldunekRequest, ListMeldunkiQuery, MeldunekDto, Paginated, PaginationMeta,
    UpdateMeldunekRequest,
};
use firelog_common::error_code::ErrorCode;
use firelog_common::validation::{
    validate_create_meldunek, validate_list_query, validate_update_meldunek,
};

use crate::authz;
use crate::error::AppError;
use crate::repository::{Meldunek, MeldunekFilter, NewMeldunek, Profile, Repository};

pub struct MeldunkiService<'a> {
    repo: &'a dyn Repository,
}

fn not_found() -> AppError {
    AppError::not_found(ErrorCode::MeldunekNotFound, "Meldunek nie istnieje")
}

impl<'a> MeldunkiService<'a> {
    pub fn new(repo: &'a dyn Repository) -> Self {
        Self { repo }
    }

    /// File a report in the actor's department.
    ///
    /// # Errors
    ///
    /// `VALIDATION_ERROR`, or `FORBIDDEN` when the actor has no department.
    pub async fn create(
        &self,
        actor: &Profile,
        req: CreateMeldunekRequest,
    ) -> Result<MeldunekDto, AppError> {
        validate_create_meldunek(&req, Utc::now())
            .into_result()
            .map_err(AppError::Validation)?;
        let department = authz::require_department(actor)?;
        let row = self
            .repo
            .insert_meldunek(&NewMeldunek {
                user_id: actor.id,
                fire_department_id: department,
                data: req,
            })
            .await?;
        tracing::info!(meldunek_id = %row.id, user_id = %actor.id, "meldunek created");
        Ok(row.into())
    }

    async fn load_visible(&self, actor: &Profile, id: Uuid) -> Result<Meldunek, AppError> {
        let row = self.repo.get_meldunek(id).await?.ok_or_else(not_found)?;
        if !authz::can_view_meldunek(actor, &row) {
            tracing::debug!(meldunek_id = %id, user_id = %actor.id, "meldunek outside actor's department");
            return Err(AppError::forbidden("Brak dostępu do tego meldunku"));
        }
        Ok(row)
    }

    async fn load_modifiable(&self, actor: &Profile, id: Uuid) -> Result<Meldunek, AppError> {
        let row = self.load_visible(actor, id).await?;
        if !authz::can_modify_meldunek(actor, &row) {
            tracing::debug!(meldunek_id = %id, user_id = %actor.id, "meldunek modification refused");
            return Err(AppError::forbidden(
                "Tylko autor, dowódca lub administrator jednostki może zmienić meldunek",
            ));
        }
        Ok(row)
    }

    /// # Errors
    ///
    /// `MELDUNEK_NOT_FOUND` or `FORBIDDEN`.
    pub async fn get(&self, actor: &Profile, id: Uuid) -> Result<MeldunekDto, AppError> {
        Ok(self.load_visible(actor, id).await?.into())
    }

    /// One page of the actor's department register.
    ///
    /// # Errors
    ///
    /// `VALIDATION_ERROR`, or `FORBIDDEN` when the actor has no department.
    pub async fn list(
        &self,
        actor: &Profile,
        query: &ListMeldunkiQuery,
    ) -> Result<Paginated<MeldunekDto>, AppError> {
        validate_list_query(query)
            .into_result()
            .map_err(AppError::Validation)?;
        let department = authz::require_department(actor)?;

        let page = query.page();
        let limit = query.limit();
        let filter = MeldunekFilter {
            fire_department_id: department,
            search: query
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            date_from: query.date_from,
            date_to: query.date_to,
            sort_by: query.sort_by.unwrap_or_default(),
            order: query.order.unwrap_or_default(),
            limit,
            offset: u64::from(page.saturating_sub(1)) * u64::from(limit),
        };
        let (rows, total) = self.repo.list_meldunki(&filter).await?;
        Ok(Paginated {
            items: rows.into_iter().map(Into::into).collect(),
            pagination: PaginationMeta::new(page, limit, total),
        })
    }

    /// # Errors
    ///
    /// `MELDUNEK_NOT_FOUND`, `FORBIDDEN` or `VALIDATION_ERROR`.
    pub async fn update(
        &self,
        actor: &Profile,
        id: Uuid,
        changes: &UpdateMeldunekRequest,
    ) -> Result<MeldunekDto, AppError> {
        let current = self.load_modifiable(actor, id).await?;
        validate_update_meldunek(changes, current.start_time, current.end_time, Utc::now())
            .into_result()
            .map_err(AppError::Validation)?;
        let row = self
            .repo
            .update_meldunek(id, changes)
            .await?
            .ok_or_else(not_found)?;
        tracing::info!(meldunek_id = %id, user_id = %actor.id, "meldunek updated");
        Ok(row.into())
    }

    /// # Errors
    ///
    /// `MELDUNEK_NOT_FOUND` or `FORBIDDEN`.
    pub async fn delete(&self, actor: &Profile, id: Uuid) -> Result<(), AppError> {
        self.load_modifiable(actor, id).await?;
        if !self.repo.delete_meldunek(id).await? {
            return Err(not_found());
        }
        tracing::info!(meldunek_id = %id, user_id = %actor.id, "meldunek deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use firelog_common::role::Role;

    use super::*;
    use crate::services::test_support::{Fixture, create_request};

    #[tokio::test]
    async fn create_and_get_within_department() {
        let fx = Fixture::new();
        let author = fx.user("autor@osp.pl", Role::Member).await;
        let colleague = fx.user("kolega@osp.pl", Role::Member).await;

        let created = fx
            .meldunki()
            .create(&author, create_request("Pożar sadzy w kominie"))
            .await
            .unwrap();
        assert_eq!(created.user_id, author.id);
        assert_eq!(created.fire_department_id, fx.department.id);

        let seen = fx.meldunki().get(&colleague, created.id).await.unwrap();
        assert_eq!(seen, created);
    }

    #[tokio::test]
    async fn other_department_cannot_see() {
        let fx = Fixture::new();
        let author = fx.user("autor@osp.pl", Role::Member).await;
        let other = fx.other_department();
        let outsider = fx.user_in(&other, "obcy@osp.pl", Role::Admin).await;

        let created = fx
            .meldunki()
            .create(&author, create_request("Plama oleju"))
            .await
            .unwrap();
        let err = fx.meldunki().get(&outsider, created.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);

        let err = fx.meldunki().get(&outsider, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::MeldunekNotFound);
    }

    #[tokio::test]
    async fn invalid_create_is_rejected() {
        let fx = Fixture::new();
        let author = fx.user("autor@osp.pl", Role::Member).await;
        let mut req = create_request("ab");
        req.start_time = Utc::now() + chrono::Duration::hours(2);
        let AppError::Validation(errors) = fx.meldunki().create(&author, req).await.unwrap_err()
        else {
            unreachable!("expected validation error");
        };
        assert!(errors.contains_key("incident_name"));
        assert!(errors.contains_key("start_time"));
        assert_eq!(fx.repo.meldunki_count(), 0);
    }

    #[tokio::test]
    async fn update_rules_by_role() {
        let fx = Fixture::new();
        let author = fx.user("autor@osp.pl", Role::Member).await;
        let member = fx.user("czlonek@osp.pl", Role::Member).await;
        let commander = fx.user("dowodca@osp.pl", Role::Commander).await;

        let created = fx
            .meldunki()
            .create(&author, create_request("Wypadek"))
            .await
            .unwrap();
        let changes = UpdateMeldunekRequest {
            commander: Some("dh. Zieliński".to_string()),
            ..Default::default()
        };

        let err = fx
            .meldunki()
            .update(&member, created.id, &changes)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);

        let updated = fx
            .meldunki()
            .update(&commander, created.id, &changes)
            .await
            .unwrap();
        assert_eq!(updated.commander.as_deref(), Some("dh. Zieliński"));

        let own = fx
            .meldunki()
            .update(&author, created.id, &changes)
            .await
            .unwrap();
        assert_eq!(own.incident_name, "Wypadek");
    }

    #[tokio::test]
    async fn update_validates_merged_times() {
        let fx = Fixture::new();
        let author = fx.user("autor@osp.pl", Role::Member).await;
        let created = fx
            .meldunki()
            .create(&author, create_request("Wypadek"))
            .await
            .unwrap();
        let changes = UpdateMeldunekRequest {
            end_time: Some(created.start_time - chrono::Duration::minutes(5)),
            ..Default::default()
        };
        let err = fx
            .meldunki()
            .update(&author, created.id, &changes)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn delete_by_admin_and_missing() {
        let fx = Fixture::new();
        let author = fx.user("autor@osp.pl", Role::Member).await;
        let admin = fx.user("admin@osp.pl", Role::Admin).await;
        let created = fx
            .meldunki()
            .create(&author, create_request("Pożar"))
            .await
            .unwrap();
        fx.meldunki().delete(&admin, created.id).await.unwrap();
        let err = fx.meldunki().delete(&admin, created.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::MeldunekNotFound);
    }

    #[tokio::test]
    async fn list_paginates_department_register() {
        let fx = Fixture::new();
        let author = fx.user("autor@osp.pl", Role::Member).await;
        for i in 0..5 {
            fx.meldunki()
                .create(&author, create_request(&format!("Zdarzenie {i}")))
                .await
                .unwrap();
        }
        let other = fx.other_department();
        let outsider = fx.user_in(&other, "obcy@osp.pl", Role::Member).await;
        fx.meldunki()
            .create(&outsider, create_request("Cudze zdarzenie"))
            .await
            .unwrap();

        let query = ListMeldunkiQuery {
            page: Some(2),
            limit: Some(2),
            ..Default::default()
        };
        let page = fx.meldunki().list(&author, &query).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pagination.total, 5);
        assert_eq!(page.pagination.total_pages, 3);
        assert!(
            page.items
                .iter()
                .all(|m| m.fire_department_id == fx.department.id)
        );

        let bad = ListMeldunkiQuery {
            limit: Some(500),
            ..Default::default()
        };
        assert_eq!(
            fx.meldunki().list(&author, &bad).await.unwrap_err().code(),
            ErrorCode::ValidationError
        );
    }
}
