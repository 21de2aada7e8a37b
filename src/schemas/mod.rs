pub mod academic;
pub mod achievement;
pub mod auth;
pub mod notification;
pub mod report;
pub mod user;

use serde::{Deserialize, Deserializer};

/// Backend ids are UUID strings for relational records and ObjectId hex strings for
/// achievement documents; older deployments used integers.
pub(crate) fn flexible_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(value) => value,
        RawId::Number(value) => value.to_string(),
    })
}

pub(crate) fn flexible_id_opt<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Text(value)) if !value.is_empty() => Some(value),
        Some(RawId::Number(value)) => Some(value.to_string()),
        _ => None,
    })
}

/// Go's zero values arrive as empty strings; treat them as absent.
pub(crate) fn empty_as_none<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.trim().is_empty()))
}
