//! Request DTOs for the task service API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use super::order::OrderSpec;
use super::task::{TaskDraft, DEFAULT_STATUS};

/// Maximum name length in characters
pub const MAX_NAME_LENGTH: usize = 200;
/// Maximum content length in characters
pub const MAX_CONTENT_LENGTH: usize = 500;
/// Maximum tag length in characters
pub const MAX_TAG_LENGTH: usize = 50;

/// Request body for create (POST) and update (PUT)
///
/// Any `version` or `id` the client sends is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskRequest {
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub status: Option<i32>,
}

impl TaskRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("Name cannot be empty".to_string());
        }
        if self.name.chars().count() > MAX_NAME_LENGTH {
            return Some(format!(
                "Name exceeds maximum length of {} characters",
                MAX_NAME_LENGTH
            ));
        }
        if self.content.chars().count() > MAX_CONTENT_LENGTH {
            return Some(format!(
                "Content exceeds maximum length of {} characters",
                MAX_CONTENT_LENGTH
            ));
        }
        if let Some(tag) = &self.tag {
            if tag.chars().count() > MAX_TAG_LENGTH {
                return Some(format!(
                    "Tag exceeds maximum length of {} characters",
                    MAX_TAG_LENGTH
                ));
            }
        }
        None
    }

    pub fn into_draft(self) -> TaskDraft {
        TaskDraft::new(
            self.name,
            self.content,
            self.tag,
            self.status.unwrap_or(DEFAULT_STATUS),
        )
    }
}

/// Raw list query string. Values stay strings so that garbage falls back to
/// defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub order: Option<String>,
}

impl ListParams {
    /// Applies defaults: limit <= 0 or unparsable -> `default_limit`,
    /// negative or unparsable offset -> 0, missing order -> `id desc`.
    pub fn into_query(self, default_limit: usize) -> ListQuery {
        let limit = self
            .limit
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|v| *v > 0)
            .map(|v| v as usize)
            .unwrap_or(default_limit);

        let offset = self
            .offset
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|v| *v >= 0)
            .map(|v| v as usize)
            .unwrap_or(0);

        let order = match self.order.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => OrderSpec::parse(raw),
            _ => OrderSpec::default(),
        };

        ListQuery {
            limit,
            offset,
            order,
        }
    }
}

// == List Query ==
/// Resolved pagination and ordering for a list operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: usize,
    pub offset: usize,
    pub order: OrderSpec,
}

impl ListQuery {
    pub fn new(limit: usize, offset: usize, order: OrderSpec) -> Self {
        Self {
            limit,
            offset,
            order,
        }
    }
}

/// Parses a task id path segment; ids are positive integers.
pub fn parse_task_id(raw: &str) -> Option<u64> {
    raw.parse::<u64>().ok().filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::{Direction, SortField};

    #[test]
    fn test_task_request_deserialize() {
        let json = r#"{"name": "task", "content": "body", "tag": "t1"}"#;
        let req: TaskRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.name, "task");
        assert_eq!(req.tag.as_deref(), Some("t1"));
        assert!(req.status.is_none());
    }

    #[test]
    fn test_task_request_ignores_version() {
        let json = r#"{"name": "task", "version": 99}"#;
        let req: TaskRequest = serde_json::from_str(json).unwrap();
        let draft = req.into_draft();
        assert_eq!(draft.status, DEFAULT_STATUS);
    }

    #[test]
    fn test_validate_empty_name() {
        let req = TaskRequest {
            name: "  ".to_string(),
            content: String::new(),
            tag: None,
            status: None,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_long_tag() {
        let req = TaskRequest {
            name: "ok".to_string(),
            content: String::new(),
            tag: Some("t".repeat(MAX_TAG_LENGTH + 1)),
            status: None,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_list_params_defaults() {
        let query = ListParams::default().into_query(20);
        assert_eq!(query.limit, 20);
        assert_eq!(query.offset, 0);
        assert_eq!(query.order, OrderSpec::default());
    }

    #[test]
    fn test_list_params_invalid_values_fall_back() {
        let params = ListParams {
            limit: Some("0".to_string()),
            offset: Some("-4".to_string()),
            order: Some("".to_string()),
        };
        let query = params.into_query(20);
        assert_eq!(query.limit, 20);
        assert_eq!(query.offset, 0);
        assert_eq!(query.order, OrderSpec::default());
    }

    #[test]
    fn test_list_params_explicit_values() {
        let params = ListParams {
            limit: Some("5".to_string()),
            offset: Some("10".to_string()),
            order: Some("tag asc".to_string()),
        };
        let query = params.into_query(20);
        assert_eq!(query.limit, 5);
        assert_eq!(query.offset, 10);
        assert_eq!(query.order.field, Some(SortField::Tag));
        assert_eq!(query.order.direction, Direction::Asc);
    }

    #[test]
    fn test_parse_task_id() {
        assert_eq!(parse_task_id("12"), Some(12));
        assert_eq!(parse_task_id("0"), None);
        assert_eq!(parse_task_id("-1"), None);
        assert_eq!(parse_task_id("abc"), None);
    }
}
