use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Resolved page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub page: i64,
    pub limit: i64,
}

impl Window {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl PageParams {
    pub fn window(&self, default_limit: i64) -> Result<Window, AppError> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(AppError::Validation("page must be at least 1".to_string()));
        }

        let limit = self.limit.unwrap_or(default_limit);
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        // Offset and end of the window must fit in i64 for SQL and page links.
        let fits = (page - 1)
            .checked_mul(limit)
            .and_then(|offset| offset.checked_add(limit))
            .is_some();
        if !fits {
            return Err(AppError::Validation("page is out of range".to_string()));
        }

        Ok(Window { page, limit })
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<i64>,
    pub previous: Option<i64>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: i64, window: Window) -> Self {
        let next = (window.offset() + window.limit < count).then_some(window.page + 1);
        let previous = (window.page > 1).then(|| {
            // Point past-the-end requests back at the last real page.
            let last = ((count + window.limit - 1) / window.limit).max(1);
            (window.page - 1).min(last)
        });

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}
