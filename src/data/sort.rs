//! Client-side ordering and page slicing for records listed out of the cache.

use std::cmp::Ordering;

use crate::models::{Direction, OrderSpec, SortField, Task};

/// Sorts in place by the requested field, breaking ties by id in the same
/// direction. Unknown fields leave the order untouched.
///
/// Empty text sorts first ascending and last descending.
pub fn sort_tasks(tasks: &mut [Task], order: &OrderSpec) {
    let Some(field) = order.field else {
        return;
    };
    let direction = order.direction;

    tasks.sort_by(|a, b| {
        let ordering = match field {
            SortField::Id => direction.apply(a.id.cmp(&b.id)),
            SortField::Status => direction.apply(a.status.cmp(&b.status)),
            SortField::CreatedAt => direction.apply(a.created_at.cmp(&b.created_at)),
            SortField::UpdatedAt => direction.apply(a.updated_at.cmp(&b.updated_at)),
            SortField::Name => compare_text(&a.name, &b.name, direction),
            SortField::Content => compare_text(&a.content, &b.content, direction),
            SortField::Tag => compare_text(a.tag_str(), b.tag_str(), direction),
        };
        // Same tie-break as the SQL `ORDER BY <col> <dir>, id <dir>`
        ordering.then_with(|| direction.apply(a.id.cmp(&b.id)))
    });
}

fn compare_text(a: &str, b: &str, direction: Direction) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => direction.apply(Ordering::Less),
        (false, true) => direction.apply(Ordering::Greater),
        (false, false) => direction.apply(a.cmp(b)),
    }
}

/// Applies `offset`/`limit` with clamping: an offset past the end yields an
/// empty page, a limit past the end is narrowed to what remains.
pub fn paginate(tasks: Vec<Task>, limit: usize, offset: usize) -> Vec<Task> {
    let offset = offset.min(tasks.len());
    let limit = limit.min(tasks.len() - offset);

    tasks.into_iter().skip(offset).take(limit).collect()
}
