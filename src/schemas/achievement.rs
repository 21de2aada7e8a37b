use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use time::Date;
use validator::{Validate, ValidationErrors};

use super::{empty_as_none, flexible_id, flexible_id_opt};
use crate::core::time::{calendar_date, format_calendar_date};
use crate::workflow::AchievementStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementType {
    Academic,
    Competition,
    Organization,
    Publication,
    Certification,
    ResearchGrant,
    Other,
}

impl AchievementType {
    pub const ALL: [AchievementType; 7] = [
        Self::Academic,
        Self::Competition,
        Self::Organization,
        Self::Publication,
        Self::Certification,
        Self::ResearchGrant,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Academic => "academic",
            Self::Competition => "competition",
            Self::Organization => "organization",
            Self::Publication => "publication",
            Self::Certification => "certification",
            Self::ResearchGrant => "research_grant",
            Self::Other => "other",
        }
    }

    /// Unrecognised names map to `Other`; the backend stores the type as free text.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        Self::ALL.into_iter().find(|kind| kind.as_str().eq_ignore_ascii_case(name)).unwrap_or(Self::Other)
    }
}

fn lenient_type<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<AchievementType>, D::Error> {
    Ok(empty_as_none(deserializer)?.map(|name| AchievementType::from_name(&name)))
}

impl fmt::Display for AchievementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionLevel {
    International,
    National,
    Regional,
    Local,
    University,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct CompetitionDetails {
    #[validate(length(min = 1, message = "competition name is required"))]
    #[serde(default)]
    pub competition_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competition_level: Option<CompetitionLevel>,
    #[validate(range(min = 1, message = "rank must be positive"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medal_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct PublicationDetails {
    #[validate(length(min = 1, message = "publication type is required"))]
    #[serde(default)]
    pub publication_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_title: Option<String>,
    #[validate(length(min = 1, message = "journal name is required"))]
    #[serde(default)]
    pub journal_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ResearchGrantDetails {
    #[validate(length(min = 1, message = "grant name is required"))]
    #[serde(default)]
    pub grant_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funder: Option<String>,
    #[validate(range(min = 0.0, message = "grant amount must be non-negative"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct CertificationDetails {
    #[validate(length(min = 1, message = "certification name is required"))]
    #[serde(default)]
    pub certification_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certification_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct OrganizationDetails {
    #[validate(length(min = 1, message = "organization name is required"))]
    #[serde(default)]
    pub organization_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_end: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcademicDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achievement_details: Option<String>,
}

/// Type-specific payload of an achievement. The variant decides `achievement_type`
/// on the wire; the fields travel as the free-form `data` object.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDetails {
    Competition(CompetitionDetails),
    Publication(PublicationDetails),
    ResearchGrant(ResearchGrantDetails),
    Certification(CertificationDetails),
    Academic(AcademicDetails),
    Organization(OrganizationDetails),
    Other(Map<String, Value>),
}

impl TypeDetails {
    pub fn achievement_type(&self) -> AchievementType {
        match self {
            Self::Competition(_) => AchievementType::Competition,
            Self::Publication(_) => AchievementType::Publication,
            Self::ResearchGrant(_) => AchievementType::ResearchGrant,
            Self::Certification(_) => AchievementType::Certification,
            Self::Academic(_) => AchievementType::Academic,
            Self::Organization(_) => AchievementType::Organization,
            Self::Other(_) => AchievementType::Other,
        }
    }

    /// Rebuilds typed details from the wire pair. Fields that do not fit the declared
    /// type are dropped rather than failing the whole record.
    pub fn from_wire(kind: AchievementType, data: &Map<String, Value>) -> Self {
        fn typed<T: serde::de::DeserializeOwned + Default>(data: &Map<String, Value>) -> T {
            serde_json::from_value(Value::Object(data.clone())).unwrap_or_default()
        }

        match kind {
            AchievementType::Competition => Self::Competition(typed(data)),
            AchievementType::Publication => Self::Publication(typed(data)),
            AchievementType::ResearchGrant => Self::ResearchGrant(typed(data)),
            AchievementType::Certification => Self::Certification(typed(data)),
            AchievementType::Academic => Self::Academic(typed(data)),
            AchievementType::Organization => Self::Organization(typed(data)),
            AchievementType::Other => Self::Other(data.clone()),
        }
    }

    pub fn to_data(&self) -> Map<String, Value> {
        let value = match self {
            Self::Competition(details) => serde_json::to_value(details),
            Self::Publication(details) => serde_json::to_value(details),
            Self::ResearchGrant(details) => serde_json::to_value(details),
            Self::Certification(details) => serde_json::to_value(details),
            Self::Academic(details) => serde_json::to_value(details),
            Self::Organization(details) => serde_json::to_value(details),
            Self::Other(data) => return data.clone(),
        };

        match value {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

impl Validate for TypeDetails {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            Self::Competition(details) => details.validate(),
            Self::Publication(details) => details.validate(),
            Self::ResearchGrant(details) => details.validate(),
            Self::Certification(details) => details.validate(),
            Self::Organization(details) => details.validate(),
            Self::Academic(_) | Self::Other(_) => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(alias = "fileName")]
    pub file_name: String,
    #[serde(alias = "fileUrl")]
    pub file_url: String,
    #[serde(default, alias = "fileType")]
    pub file_type: String,
    #[serde(default, alias = "uploadedAt", skip_serializing)]
    pub uploaded_at: Option<String>,
}

/// Create/update payload. Creation always yields a Draft record on the backend.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct AchievementDraft {
    #[validate(length(min = 1, max = 255, message = "title is required"))]
    pub title: String,
    pub description: String,
    pub achieved_date: Date,
    #[validate(nested)]
    pub details: TypeDetails,
    pub attachments: Vec<Attachment>,
    pub tags: Vec<String>,
}

impl AchievementDraft {
    pub fn new(title: impl Into<String>, achieved_date: Date, details: TypeDetails) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            achieved_date,
            details,
            attachments: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Serialize)]
struct DraftWire<'a> {
    achievement_type: AchievementType,
    title: &'a str,
    description: &'a str,
    achieved_date: String,
    data: Map<String, Value>,
    #[serde(skip_serializing_if = "<[Attachment]>::is_empty")]
    attachments: &'a [Attachment],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    tags: &'a [String],
}

impl Serialize for AchievementDraft {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DraftWire {
            achievement_type: self.details.achievement_type(),
            title: &self.title,
            description: &self.description,
            achieved_date: format_calendar_date(self.achieved_date),
            data: self.details.to_data(),
            attachments: &self.attachments,
            tags: &self.tags,
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerifyRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comments: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectRequest {
    pub reason: String,
}

impl RejectRequest {
    /// A rejection needs a reason with visible content; the trimmed text is what is sent.
    pub fn new(reason: &str) -> Option<Self> {
        let trimmed = reason.trim();
        (!trimmed.is_empty()).then(|| Self { reason: trimmed.to_string() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StudentSummary {
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub id: Option<String>,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default, alias = "full_name")]
    pub name: Option<String>,
    #[serde(default, alias = "program_study")]
    pub program: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Verification {
    #[serde(default)]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Rejection {
    #[serde(default)]
    pub reason: Option<String>,
}

/// An achievement as listed by the backend: the relational reference joined with the
/// document holding title, details and attachments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Achievement {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub mongo_achievement_id: Option<String>,
    #[serde(default, alias = "studentId", deserialize_with = "flexible_id_opt")]
    pub student_id: Option<String>,
    #[serde(default)]
    pub student: Option<StudentSummary>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "achievementType", deserialize_with = "lenient_type")]
    pub achievement_type: Option<AchievementType>,
    #[serde(default, alias = "achievement_date", with = "calendar_date::option")]
    pub achieved_date: Option<Date>,
    pub status: AchievementStatus,
    #[serde(default, alias = "data")]
    pub details: Map<String, Value>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub points: i64,
    #[serde(default, alias = "reviewer_id", deserialize_with = "flexible_id_opt")]
    pub verified_by: Option<String>,
    #[serde(default, alias = "rejection_reason", deserialize_with = "empty_as_none")]
    pub rejection_note: Option<String>,
    #[serde(default)]
    pub verification: Option<Verification>,
    #[serde(default)]
    pub rejection: Option<Rejection>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub submitted_at: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub verified_at: Option<String>,
    #[serde(default, alias = "createdAt", deserialize_with = "empty_as_none")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updatedAt", deserialize_with = "empty_as_none")]
    pub updated_at: Option<String>,
}

impl Achievement {
    /// Id the achievement endpoints address: the document id when the backend exposes
    /// one, the record id otherwise.
    pub fn api_id(&self) -> &str {
        self.mongo_achievement_id.as_deref().unwrap_or(&self.id)
    }

    pub fn matches_id(&self, id: &str) -> bool {
        self.id == id || self.mongo_achievement_id.as_deref() == Some(id)
    }

    pub fn type_details(&self) -> TypeDetails {
        TypeDetails::from_wire(self.achievement_type.unwrap_or(AchievementType::Other), &self.details)
    }

    pub fn review_note(&self) -> Option<&str> {
        self.rejection_note
            .as_deref()
            .or_else(|| self.rejection.as_ref().and_then(|rejection| rejection.reason.as_deref()))
            .or_else(|| {
                self.verification
                    .as_ref()
                    .and_then(|verification| verification.comments.as_deref())
            })
    }

    pub fn student_name(&self) -> Option<&str> {
        self.student.as_ref().and_then(|student| student.name.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AchievementList {
    #[serde(default)]
    pub achievements: Vec<Achievement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangedBy {
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryEntry {
    #[serde(default, deserialize_with = "flexible_id_opt")]
    pub id: Option<String>,
    #[serde(default)]
    pub old_status: Option<AchievementStatus>,
    pub new_status: AchievementStatus,
    #[serde(default)]
    pub changed_by: Option<ChangedBy>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AchievementHistory {
    #[serde(default)]
    pub achievement_id: String,
    #[serde(default)]
    pub current_status: Option<AchievementStatus>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedFile {
    pub filename: String,
    pub url: String,
}
