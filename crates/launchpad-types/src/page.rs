//! Pagination envelope shared by every listing endpoint

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// 1-indexed page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Values below 1 fall back to the defaults
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: if page < 1 { DEFAULT_PAGE } else { page },
            limit: if limit < 1 { DEFAULT_LIMIT } else { limit },
        }
    }

    /// Build from raw query-string values. Missing or unparseable values
    /// are treated like zero and fall back to the defaults.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        let parse = |raw: Option<&str>| {
            raw.and_then(|v| v.trim().parse::<i64>().ok())
                .filter(|v| *v > 0)
                .map(|v| v as u64)
                .unwrap_or(0)
        };
        Self::new(parse(page), parse(limit))
    }

    /// Number of records to skip, capped at `i64::MAX` so it always fits a
    /// signed SQL `OFFSET`
    pub fn offset(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.limit)
            .min(i64::MAX as u64)
    }

    pub fn total_pages(&self, total_count: u64) -> u64 {
        total_count.div_ceil(self.limit)
    }
}

/// Raw `?page=&limit=` query parameters, kept as text so bad values
/// degrade to defaults instead of rejecting the request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl From<PageQuery> for PageRequest {
    fn from(query: PageQuery) -> Self {
        PageRequest::from_query(query.page.as_deref(), query.limit.as_deref())
    }
}

/// One page of records plus the counters clients need to walk the rest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: u64,
    pub limit: u64,
    pub total_count: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total_count: u64) -> Self {
        Self {
            data,
            page: request.page,
            limit: request.limit,
            total_count,
            total_pages: request.total_pages(total_count),
        }
    }
}
