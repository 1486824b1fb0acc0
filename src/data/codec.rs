//! Task <-> cache field map encoding.
//!
//! Integers use their decimal form, timestamps RFC 3339 with as many fractional
//! digits as needed, an absent tag the empty string.

use chrono::{DateTime, SecondsFormat, Utc};

use super::FieldMap;
use crate::error::StoreError;
use crate::models::Task;

pub fn encode_task(task: &Task) -> FieldMap {
    let mut fields = FieldMap::with_capacity(8);
    fields.insert("id".to_string(), task.id.to_string());
    fields.insert("name".to_string(), task.name.clone());
    fields.insert("content".to_string(), task.content.clone());
    fields.insert("tag".to_string(), task.tag_str().to_string());
    fields.insert("status".to_string(), task.status.to_string());
    fields.insert("version".to_string(), task.version.to_string());
    fields.insert("created_at".to_string(), encode_time(&task.created_at));
    fields.insert("updated_at".to_string(), encode_time(&task.updated_at));
    fields
}

/// Decodes a cached field map. Any missing or malformed field fails the
/// whole record; values are never zeroed.
pub fn decode_task(fields: &FieldMap) -> Result<Task, StoreError> {
    let tag = field(fields, "tag").unwrap_or("");

    Ok(Task {
        id: parse_number(fields, "id")?,
        name: require(fields, "name")?.to_string(),
        content: require(fields, "content")?.to_string(),
        tag: (!tag.is_empty()).then(|| tag.to_string()),
        status: parse_number(fields, "status")?,
        version: parse_number(fields, "version")?,
        created_at: parse_time(fields, "created_at")?,
        updated_at: parse_time(fields, "updated_at")?,
    })
}

fn encode_time(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn field<'a>(fields: &'a FieldMap, name: &str) -> Option<&'a str> {
    fields.get(name).map(String::as_str)
}

fn require<'a>(fields: &'a FieldMap, name: &str) -> Result<&'a str, StoreError> {
    field(fields, name).ok_or_else(|| StoreError::Decode(format!("missing field '{}'", name)))
}

fn parse_number<T>(fields: &FieldMap, name: &str) -> Result<T, StoreError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = require(fields, name)?;
    raw.parse()
        .map_err(|e| StoreError::Decode(format!("field '{}' = {:?}: {}", name, raw, e)))
}

fn parse_time(fields: &FieldMap, name: &str) -> Result<DateTime<Utc>, StoreError> {
    let raw = require(fields, name)?;
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Decode(format!("field '{}' = {:?}: {}", name, raw, e)))
}
