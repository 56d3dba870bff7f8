//! Who may do what. Pure checks over the acting profile and the target row.

use uuid::Uuid;

use firelog_common::error_code::ErrorCode;

use crate::error::AppError;
use crate::repository::{Meldunek, Profile};

/// The department the actor belongs to; profiles without one cannot work
/// with incidents.
pub fn require_department(actor: &Profile) -> Result<Uuid, AppError> {
    actor.fire_department_id.ok_or_else(|| {
        tracing::debug!(user_id = %actor.id, "profile has no fire department");
        AppError::forbidden("Profil nie jest przypisany do jednostki OSP")
    })
}

/// Members see incidents of their own department, plus any they authored.
pub fn can_view_meldunek(actor: &Profile, meldunek: &Meldunek) -> bool {
    meldunek.user_id == actor.id || actor.fire_department_id == Some(meldunek.fire_department_id)
}

/// Authors edit their own incidents; commanders and admins edit any incident
/// of their department.
pub fn can_modify_meldunek(actor: &Profile, meldunek: &Meldunek) -> bool {
    meldunek.user_id == actor.id
        || (actor.role.can_manage_incidents()
            && actor.fire_department_id == Some(meldunek.fire_department_id))
}

/// Admin of a department. Returns that department.
pub fn require_admin(actor: &Profile) -> Result<Uuid, AppError> {
    if !actor.role.is_admin() {
        tracing::debug!(user_id = %actor.id, role = %actor.role, "admin endpoint refused");
        return Err(AppError::forbidden("Wymagane uprawnienia administratora"));
    }
    require_department(actor)
}

/// An admin acting on another account of the same department.
pub fn require_user_management(actor: &Profile, target_id: Uuid) -> Result<Uuid, AppError> {
    let department = require_admin(actor)?;
    if target_id == actor.id {
        return Err(AppError::BadRequest(
            ErrorCode::CannotModifySelf,
            "Nie można zmienić roli ani usunąć własnego konta".to_string(),
        ));
    }
    Ok(department)
}

pub fn require_same_department(department: Uuid, target: &Profile) -> Result<(), AppError> {
    if target.fire_department_id == Some(department) {
        Ok(())
    } else {
        Err(AppError::forbidden(
            "Użytkownik należy do innej jednostki OSP",
        ))
    }
}
