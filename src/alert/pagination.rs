//! Page/limit parameters for alert listings.

use crate::error::ValidationError;

/// Page used when the client does not send one.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when the client does not send one.
pub const DEFAULT_LIMIT: u32 = 20;

/// Largest page size served; larger requests are clamped.
pub const MAX_LIMIT: u32 = 100;

/// A validated, 1-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Build a window, rejecting `page < 1` or `limit < 1` and clamping
    /// `limit` to [`MAX_LIMIT`].
    pub fn new(page: i64, limit: i64) -> Result<Self, ValidationError> {
        if page < 1 {
            return Err(ValidationError::new("page", "must be a positive integer"));
        }
        if limit < 1 {
            return Err(ValidationError::new("limit", "must be a positive integer"));
        }

        let page = u32::try_from(page)
            .map_err(|_| ValidationError::new("page", "is too large"))?;
        let limit = u32::try_from(limit.min(i64::from(MAX_LIMIT))).unwrap_or(MAX_LIMIT);

        Ok(Self { page, limit })
    }

    /// Parse raw query values. Absent or blank values take the defaults.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Result<Self, ValidationError> {
        let page = parse_param("page", page, DEFAULT_PAGE)?;
        let limit = parse_param("limit", limit, DEFAULT_LIMIT)?;
        Self::new(page, limit)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of records to skip: `(page - 1) * limit`.
    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Number of records to return.
    pub fn take(&self) -> u64 {
        u64::from(self.limit)
    }
}

fn parse_param(field: &str, raw: Option<&str>, default: u32) -> Result<i64, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(i64::from(default)),
        Some(value) => value
            .parse::<i64>()
            .map_err(|_| ValidationError::new(field, format!("'{}' is not an integer", value))),
    }
}
