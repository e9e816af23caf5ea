//! Offset pagination shared by list queries.

use serde::{Deserialize, Serialize};

/// One-based page request with a clamped page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Build a request, defaulting missing values and clamping `limit` to
    /// `1..=max_limit`.
    ///
    /// # Examples
    /// ```
    /// use khedma::domain::PageRequest;
    ///
    /// let request = PageRequest::new(Some(3), Some(500), 20, 50);
    /// assert_eq!(request.limit(), 50);
    /// assert_eq!(request.offset(), 100);
    /// ```
    pub fn new(page: Option<u32>, limit: Option<u32>, default_limit: u32, max_limit: u32) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, max_limit.max(1)),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest) -> Self {
        Self {
            items,
            page: request.page(),
            limit: request.limit(),
        }
    }
}
