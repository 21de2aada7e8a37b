use serde::{Deserialize, Serialize};

use super::{empty_as_none, flexible_id, flexible_id_opt};

/// The user fields the backend embeds in student and lecturer rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserRef {
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub id: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "fullName")]
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Lecturer {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default, alias = "nip")]
    pub lecturer_id: String,
    #[serde(default)]
    pub department: String,
}

impl Lecturer {
    pub fn display_name(&self) -> &str {
        self.user
            .as_ref()
            .map(|user| user.full_name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.lecturer_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Student {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub student_id: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub program_study: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub academic_year: Option<String>,
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub advisor_id: Option<String>,
    #[serde(default)]
    pub advisor: Option<Lecturer>,
}

impl Student {
    pub fn display_name(&self) -> &str {
        self.user
            .as_ref()
            .map(|user| user.full_name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.student_id)
    }

    pub fn has_advisor(&self) -> bool {
        self.advisor_id.is_some() || self.advisor.is_some()
    }

    /// Id used by the report endpoints, which key students by their user account.
    pub fn report_id(&self) -> &str {
        self.user_id.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignAdvisor {
    pub advisor_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StudentList {
    #[serde(default)]
    pub students: Vec<Student>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LecturerList {
    #[serde(default)]
    pub lecturers: Vec<Lecturer>,
}
