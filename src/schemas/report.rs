use std::collections::BTreeMap;

use serde::Deserialize;

use super::{empty_as_none, flexible_id_opt};
use crate::workflow::AchievementStatus;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Statistics {
    /// Achievement counts keyed by status wire value.
    #[serde(default)]
    pub achievements: BTreeMap<String, u64>,
    #[serde(default)]
    pub achievement_types: BTreeMap<String, u64>,
    #[serde(default)]
    pub students: u64,
    #[serde(default)]
    pub lecturers: u64,
}

impl Statistics {
    pub fn total_achievements(&self) -> u64 {
        self.achievements.values().sum()
    }

    pub fn count(&self, status: AchievementStatus) -> u64 {
        let mut total = self.achievements.get(status.as_str()).copied().unwrap_or(0);
        if status == AchievementStatus::Submitted {
            total += self.achievements.get("pending_verification").copied().unwrap_or(0);
        }
        total
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReportStudent {
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub student_id: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub program_study: Option<String>,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ReportSummary {
    #[serde(default)]
    pub total_achievements: u64,
    #[serde(default)]
    pub verified_achievements: u64,
    #[serde(default)]
    pub pending_achievements: u64,
    #[serde(default)]
    pub rejected_achievements: u64,
    #[serde(default)]
    pub draft_achievements: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StudentReport {
    #[serde(default)]
    pub student: ReportStudent,
    #[serde(default)]
    pub summary: ReportSummary,
    #[serde(default)]
    pub achievements_by_type: BTreeMap<String, u64>,
    #[serde(default)]
    pub achievements_by_level: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopStudent {
    pub rank: u32,
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub student_id: Option<String>,
    #[serde(default)]
    pub student_number: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub program_study: Option<String>,
    #[serde(default)]
    pub achievement_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TopStudents {
    #[serde(default)]
    pub top_students: Vec<TopStudent>,
    #[serde(default)]
    pub total: u64,
}
