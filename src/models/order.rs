//! Sort specification for list queries.
//!
//! Parsed from `"<field>[ asc|desc]"`, e.g. `"created_at desc"`.

use std::cmp::Ordering;

// == Sort Field ==
/// Record fields a list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Status,
    Content,
    Tag,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "status" => Some(Self::Status),
            "content" => Some(Self::Content),
            "tag" => Some(Self::Tag),
            "created_at" => Some(Self::CreatedAt),
            "updated_at" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    /// Column name in the primary store.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Status => "status",
            Self::Content => "content",
            Self::Tag => "tag",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

// == Direction ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// Orients an ascending comparison.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

// == Order Spec ==
/// Requested ordering. `field` is `None` when the caller named a field we do
/// not know; such a request leaves in-cache order untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSpec {
    pub field: Option<SortField>,
    pub direction: Direction,
}

impl OrderSpec {
    /// Parses `"<field>[ <direction>]"`. Only a second token equal to `desc`
    /// (any case) sorts descending.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split_whitespace();
        let field = parts.next().and_then(SortField::parse);
        let direction = match parts.next() {
            Some(dir) if dir.eq_ignore_ascii_case("desc") => Direction::Desc,
            _ => Direction::Asc,
        };

        Self { field, direction }
    }
}

impl Default for OrderSpec {
    /// `id desc`, newest first.
    fn default() -> Self {
        Self {
            field: Some(SortField::Id),
            direction: Direction::Desc,
        }
    }
}
