// src/models/pagination.rs
// DOCUMENTATION: Keyset pagination shared by photo and city set listings
// PURPOSE: Cursor type, limit clamping and page assembly

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::PortfolioError;

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Clamp a requested page size into [1, MAX_PAGE_LIMIT], defaulting to 10
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
}

/// Sort key of the last item seen. Listings are ordered by
/// `updated_at DESC, id DESC`, so the next page starts strictly after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    pub id: Uuid,
    pub updated_at: DateTime<Utc>,
}

/// Rows that can produce their own cursor
pub trait CursorKey {
    fn cursor(&self) -> Cursor;
}

/// Query-string input for paginated procedures
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub cursor_id: Option<Uuid>,
    pub cursor_updated_at: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

impl PageQuery {
    /// Both cursor halves or neither
    pub fn cursor(&self) -> Result<Option<Cursor>, PortfolioError> {
        match (self.cursor_id, self.cursor_updated_at) {
            (Some(id), Some(updated_at)) => Ok(Some(Cursor { id, updated_at })),
            (None, None) => Ok(None),
            _ => Err(PortfolioError::BadRequest(
                "cursorId and cursorUpdatedAt must be provided together".to_string(),
            )),
        }
    }

    pub fn limit(&self) -> i64 {
        clamp_limit(self.limit)
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<Cursor>,
}

impl<T: CursorKey> Page<T> {
    /// Build a page from a `limit + 1` fetch: the extra row only signals
    /// that more remain and is dropped.
    pub fn from_rows(mut rows: Vec<T>, limit: i64) -> Self {
        let limit = limit.max(0) as usize;
        let has_more = rows.len() > limit;
        if has_more {
            rows.truncate(limit);
        }

        let next_cursor = if has_more {
            rows.last().map(CursorKey::cursor)
        } else {
            None
        };

        Page {
            items: rows,
            next_cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[derive(Debug, Clone)]
    struct Row(Cursor);

    impl CursorKey for Row {
        fn cursor(&self) -> Cursor {
            self.0
        }
    }

    /// Rows sorted the way the listing queries sort them
    fn rows(n: usize) -> Vec<Row> {
        let base = Utc::now();
        let mut rows: Vec<Row> = (0..n)
            .map(|i| {
                Row(Cursor {
                    id: Uuid::new_v4(),
                    updated_at: base - Duration::seconds((i / 2) as i64),
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            b.0.updated_at
                .cmp(&a.0.updated_at)
                .then_with(|| b.0.id.cmp(&a.0.id))
        });
        rows
    }

    /// In-memory equivalent of the keyset WHERE clause
    fn after(all: &[Row], cursor: Option<Cursor>, limit: i64) -> Vec<Row> {
        all.iter()
            .filter(|r| match cursor {
                None => true,
                Some(c) => {
                    r.0.updated_at < c.updated_at
                        || (r.0.updated_at == c.updated_at && r.0.id < c.id)
                }
            })
            .take(limit as usize + 1)
            .cloned()
            .collect()
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), 10);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(-5)), 1);
        assert_eq!(clamp_limit(Some(25)), 25);
        assert_eq!(clamp_limit(Some(500)), 100);
    }

    #[test]
    fn test_page_with_more() {
        let page = Page::from_rows(rows(4), 3);
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.next_cursor, Some(page.items[2].0));
    }

    #[test]
    fn test_page_exhausted() {
        let page = Page::from_rows(rows(3), 3);
        assert_eq!(page.items.len(), 3);
        assert!(page.next_cursor.is_none());

        let page = Page::from_rows(Vec::<Row>::new(), 10);
        assert!(page.items.is_empty());
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_walking_pages_has_no_gaps_or_duplicates() {
        let all = rows(23);
        let mut seen = Vec::new();
        let mut cursor = None;

        loop {
            let page = Page::from_rows(after(&all, cursor, 5), 5);
            seen.extend(page.items.iter().map(|r| r.0.id));
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        let expected: Vec<Uuid> = all.iter().map(|r| r.0.id).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_page_query_cursor_pairs() {
        let query = PageQuery::default();
        assert!(query.cursor().unwrap().is_none());
        assert_eq!(query.limit(), 10);

        let query = PageQuery {
            cursor_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(matches!(query.cursor(), Err(PortfolioError::BadRequest(_))));

        let query = PageQuery {
            cursor_id: Some(Uuid::new_v4()),
            cursor_updated_at: Some(Utc::now()),
            limit: Some(1000),
        };
        assert!(query.cursor().unwrap().is_some());
        assert_eq!(query.limit(), 100);
    }
}
