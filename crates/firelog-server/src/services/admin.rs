use uuid::Uuid;

use firelog_common::dto::admin::ChangeRoleRequest;
use firelog_common::dto::profile::ProfileDto;
use firelog_common::error_code::ErrorCode;
use firelog_common::validation::validate_role_change;

use crate::auth::provider::{AuthProvider, ProviderError};
use crate::authz;
use crate::error::AppError;
use crate::repository::{Profile, Repository};

use super::auth::map_provider_error;

pub struct AdminService<'a> {
    provider: &'a dyn AuthProvider,
    repo: &'a dyn Repository,
}

fn user_not_found() -> AppError {
    AppError::not_found(ErrorCode::UserNotFound, "Użytkownik nie istnieje")
}

impl<'a> AdminService<'a> {
    pub fn new(provider: &'a dyn AuthProvider, repo: &'a dyn Repository) -> Self {
        Self { provider, repo }
    }

    /// Everyone registered in the admin's department.
    ///
    /// # Errors
    ///
    /// `FORBIDDEN` for non-admins.
    pub async fn list_department_users(&self, actor: &Profile) -> Result<Vec<ProfileDto>, AppError> {
        let department = authz::require_admin(actor)?;
        let rows = self.repo.list_department_profiles(department).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn load_target(&self, actor: &Profile, target_id: Uuid) -> Result<Profile, AppError> {
        let department = authz::require_user_management(actor, target_id)?;
        let target = self
            .repo
            .get_profile(target_id)
            .await?
            .ok_or_else(user_not_found)?;
        authz::require_same_department(department, &target)?;
        Ok(target)
    }

    /// # Errors
    ///
    /// `FORBIDDEN`, `CANNOT_MODIFY_SELF`, `VALIDATION_ERROR` or `USER_NOT_FOUND`.
    pub async fn change_role(
        &self,
        actor: &Profile,
        target_id: Uuid,
        req: &ChangeRoleRequest,
    ) -> Result<ProfileDto, AppError> {
        authz::require_user_management(actor, target_id)?;
        let (result, role) = validate_role_change(req);
        result.into_result().map_err(AppError::Validation)?;
        let Some(role) = role else {
            return Err(AppError::invalid_field("role", "Nieprawidłowa rola"));
        };

        let target = self.load_target(actor, target_id).await?;
        let updated = self
            .repo
            .update_profile_role(target.id, role)
            .await?
            .ok_or_else(user_not_found)?;
        tracing::info!(
            admin_id = %actor.id,
            user_id = %target.id,
            from = %target.role,
            to = %role,
            "role changed"
        );
        Ok(updated.into())
    }

    /// Remove the account from the identity provider, then its profile.
    ///
    /// # Errors
    ///
    /// `FORBIDDEN`, `CANNOT_MODIFY_SELF` or `USER_NOT_FOUND`.
    pub async fn delete_user(&self, actor: &Profile, target_id: Uuid) -> Result<(), AppError> {
        let target = self.load_target(actor, target_id).await?;
        match self.provider.admin_delete_user(target.id).await {
            Ok(()) => {}
            Err(ProviderError::Rejected { status: 404, .. }) => {
                tracing::warn!(user_id = %target.id, "account already gone at provider");
            }
            Err(e) => return Err(map_provider_error(e)),
        }
        self.repo.delete_profile(target.id).await?;
        tracing::info!(admin_id = %actor.id, user_id = %target.id, "user deleted");
        Ok(())
    }
}
