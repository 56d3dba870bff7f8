use serde::{Deserialize, Serialize};

/// `PATCH /api/admin/users/{id}/role`
///
/// The role is parsed during validation so an unknown name becomes a field
/// error rather than a body parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRoleRequest {
    #[serde(default)]
    pub role: String,
}
