use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{empty_as_none, flexible_id, flexible_id_opt};
use crate::auth::Role;

/// An account as listed by the admin endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "fullName")]
    pub full_name: String,
    #[serde(default, alias = "isActive")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub role_id: Option<String>,
    #[serde(default, alias = "role_name")]
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub deleted_at: Option<String>,
}

/// A role row from `GET /roles`; role assignment addresses roles by this id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoleRecord {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    pub name: Role,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
pub struct UserCreate {
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    pub username: String,
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "full name is required"))]
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lecturer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_study: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub academic_year: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "full name must not be empty"))]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "email is invalid"))]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignRole {
    pub role_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserList {
    #[serde(default)]
    pub users: Vec<User>,
}
