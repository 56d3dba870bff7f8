use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvinceDto {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountyDto {
    pub id: Uuid,
    pub province_id: Uuid,
    pub name: String,
}

/// Public view of a fire department. The verification code is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireDepartmentDto {
    pub id: Uuid,
    pub county_id: Uuid,
    pub name: String,
}
