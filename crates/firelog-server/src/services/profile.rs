use firelog_common::dto::profile::{ProfileDto, UpdateProfileRequest};
use firelog_common::error_code::ErrorCode;
use firelog_common::validation::validate_update_profile;

use crate::error::AppError;
use crate::repository::{Profile, Repository};

pub struct ProfileService<'a> {
    repo: &'a dyn Repository,
}

impl<'a> ProfileService<'a> {
    pub fn new(repo: &'a dyn Repository) -> Self {
        Self { repo }
    }

    pub fn get_own(&self, actor: &Profile) -> ProfileDto {
        actor.clone().into()
    }

    /// Rename the caller. Role and department are not editable here.
    ///
    /// # Errors
    ///
    /// `VALIDATION_ERROR` or `PROFILE_NOT_FOUND`.
    pub async fn update_own(
        &self,
        actor: &Profile,
        req: &UpdateProfileRequest,
    ) -> Result<ProfileDto, AppError> {
        validate_update_profile(req)
            .into_result()
            .map_err(AppError::Validation)?;
        let updated = self
            .repo
            .update_profile_names(actor.id, req.first_name.as_deref(), req.last_name.as_deref())
            .await?
            .ok_or_else(|| {
                AppError::not_found(ErrorCode::ProfileNotFound, "Nie znaleziono profilu użytkownika")
            })?;
        Ok(updated.into())
    }
}
