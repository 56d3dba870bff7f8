use uuid::Uuid;

use firelog_common::dto::auth::{
    AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, SessionDto,
};
use firelog_common::error_code::ErrorCode;
use firelog_common::role::Role;
use firelog_common::validation::{validate_login, validate_refresh, validate_register};

use crate::auth::provider::{AuthProvider, ProviderError, SignUpMetadata, SignUpRequest};
use crate::error::AppError;
use crate::repository::{NewProfile, Profile, Repository};

/// Caller resolved from a bearer token.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub access_token: String,
    pub profile: Profile,
}

/// Translate a provider refusal into the API's error codes.
pub fn map_provider_error(err: ProviderError) -> AppError {
    let ProviderError::Rejected { code, message, .. } = &err else {
        return AppError::Internal(err.to_string());
    };
    let code = code.as_deref().unwrap_or_default();
    let lower = message.to_lowercase();

    if matches!(code, "user_already_exists" | "email_exists")
        || lower.contains("user already registered")
    {
        AppError::Conflict(
            ErrorCode::EmailAlreadyExists,
            "Konto z tym adresem e-mail już istnieje".to_string(),
        )
    } else if code == "invalid_credentials" || lower.contains("invalid login credentials") {
        AppError::Unauthorized(
            ErrorCode::InvalidCredentials,
            "Nieprawidłowy e-mail lub hasło".to_string(),
        )
    } else if code == "email_not_confirmed" || lower.contains("email not confirmed") {
        AppError::Forbidden(
            ErrorCode::EmailNotConfirmed,
            "Adres e-mail nie został potwierdzony".to_string(),
        )
    } else if matches!(
        code,
        "refresh_token_not_found" | "refresh_token_already_used"
    ) || lower.contains("invalid refresh token")
    {
        AppError::Unauthorized(
            ErrorCode::InvalidRefreshToken,
            "Nieprawidłowy lub wygasły token odświeżania".to_string(),
        )
    } else {
        AppError::Internal(err.to_string())
    }
}

pub struct AuthService<'a> {
    provider: &'a dyn AuthProvider,
    repo: &'a dyn Repository,
}

impl<'a> AuthService<'a> {
    pub fn new(provider: &'a dyn AuthProvider, repo: &'a dyn Repository) -> Self {
        Self { provider, repo }
    }

    /// Create the account and its `member` profile.
    ///
    /// # Errors
    ///
    /// `VALIDATION_ERROR`, `FIRE_DEPARTMENT_NOT_FOUND`, `INVALID_VERIFICATION_CODE`,
    /// or a mapped provider error.
    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, AppError> {
        validate_register(req)
            .into_result()
            .map_err(AppError::Validation)?;

        let department_id: Uuid = req
            .fire_department_id
            .trim()
            .parse()
            .map_err(|_| AppError::invalid_field("fire_department_id", "Nieprawidłowy identyfikator jednostki"))?;
        let department = self
            .repo
            .get_fire_department(department_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(
                    ErrorCode::FireDepartmentNotFound,
                    "Wybrana jednostka OSP nie istnieje",
                )
            })?;
        if department.verification_code != req.verification_code.trim() {
            tracing::debug!(%department_id, "verification code mismatch");
            return Err(AppError::BadRequest(
                ErrorCode::InvalidVerificationCode,
                "Nieprawidłowy kod weryfikacyjny jednostki".to_string(),
            ));
        }

        let email = req.email.trim().to_lowercase();
        let first_name = req.first_name.trim().to_string();
        let last_name = req.last_name.trim().to_string();
        let outcome = self
            .provider
            .sign_up(&SignUpRequest {
                email: email.clone(),
                password: req.password.clone(),
                metadata: SignUpMetadata {
                    first_name: first_name.clone(),
                    last_name: last_name.clone(),
                    fire_department_id: department_id,
                },
            })
            .await
            .map_err(map_provider_error)?;

        let profile = self
            .repo
            .upsert_profile(&NewProfile {
                id: outcome.user.id,
                email,
                first_name,
                last_name,
                role: Role::Member,
                fire_department_id: department_id,
            })
            .await?;
        tracing::info!(user_id = %profile.id, %department_id, "user registered");

        Ok(AuthResponse {
            user: outcome.user.into(),
            profile: profile.into(),
            session: outcome.session.map(Into::into),
        })
    }

    /// # Errors
    ///
    /// `VALIDATION_ERROR`, `INVALID_CREDENTIALS`, `EMAIL_NOT_CONFIRMED` or
    /// `PROFILE_NOT_FOUND`.
    pub async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, AppError> {
        validate_login(req)
            .into_result()
            .map_err(AppError::Validation)?;

        let session = self
            .provider
            .sign_in_with_password(&req.email.trim().to_lowercase(), &req.password)
            .await
            .map_err(|e| {
                tracing::debug!("sign-in refused: {e}");
                map_provider_error(e)
            })?;
        let profile = self
            .repo
            .get_profile(session.user.id)
            .await?
            .ok_or_else(profile_not_found)?;

        Ok(AuthResponse {
            user: session.user.clone().into(),
            profile: profile.into(),
            session: Some(session.into()),
        })
    }

    /// # Errors
    ///
    /// `VALIDATION_ERROR` or `INVALID_REFRESH_TOKEN`.
    pub async fn refresh(&self, req: &RefreshRequest) -> Result<SessionDto, AppError> {
        validate_refresh(req)
            .into_result()
            .map_err(AppError::Validation)?;
        let session = self
            .provider
            .refresh_session(req.refresh_token.trim())
            .await
            .map_err(map_provider_error)?;
        Ok(session.into())
    }

    /// Revoke the caller's session. A token the provider already considers
    /// dead (401/403/404) counts as signed out.
    ///
    /// # Errors
    ///
    /// `INTERNAL_ERROR` when the provider is unreachable or fails.
    pub async fn logout(&self, access_token: &str) -> Result<(), AppError> {
        match self.provider.sign_out(access_token).await {
            Ok(()) => Ok(()),
            Err(ProviderError::Rejected {
                status: status @ (401 | 403 | 404),
                message,
                ..
            }) => {
                tracing::debug!(status, "sign-out rejected, session already gone: {message}");
                Ok(())
            }
            Err(e) => Err(map_provider_error(e)),
        }
    }

    /// Resolve a bearer token to the caller and their profile.
    ///
    /// # Errors
    ///
    /// `UNAUTHORIZED` for unknown or expired tokens, `PROFILE_NOT_FOUND`
    /// when the account has no profile row.
    pub async fn authenticate(&self, access_token: &str) -> Result<Authenticated, AppError> {
        let user = self
            .provider
            .get_user(access_token)
            .await
            .map_err(|e| match e {
                ProviderError::Rejected { .. } => {
                    tracing::debug!("bearer token rejected: {e}");
                    AppError::unauthorized()
                }
                ProviderError::Transport(_) => AppError::Internal(e.to_string()),
            })?;
        let profile = self
            .repo
            .get_profile(user.id)
            .await?
            .ok_or_else(profile_not_found)?;
        Ok(Authenticated {
            access_token: access_token.to_string(),
            profile,
        })
    }
}

fn profile_not_found() -> AppError {
    AppError::not_found(ErrorCode::ProfileNotFound, "Nie znaleziono profilu użytkownika")
}
