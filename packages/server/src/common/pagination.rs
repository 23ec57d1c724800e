//! Offset pagination for list endpoints.
//!
//! Query parameters are `page` (1-based) and `limit`. Values outside the
//! accepted range are rejected rather than clamped so that a client bug shows
//! up as a 400 instead of silently returning a different page.

use serde::{Deserialize, Serialize};

use super::errors::ApiError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Raw pagination query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationArgs {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PaginationArgs {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    pub fn validate(&self) -> Result<Page, ApiError> {
        let page = self.page.unwrap_or(DEFAULT_PAGE);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);

        if page < 1 {
            return Err(ApiError::bad_request(
                "Le paramètre 'page' doit être supérieur ou égal à 1",
            ));
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(ApiError::bad_request(format!(
                "Le paramètre 'limit' doit être compris entre 1 et {}",
                MAX_LIMIT
            )));
        }

        // OFFSET must stay representable
        if (page - 1).checked_mul(limit).is_none() {
            return Err(ApiError::bad_request("Le paramètre 'page' est trop grand"));
        }

        Ok(Page { page, limit })
    }
}

/// Validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageInfo {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// Paginated response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, page: Page, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + page.limit - 1) / page.limit
        };
        Self {
            data,
            pagination: PageInfo {
                page: page.page,
                limit: page.limit,
                total,
                total_pages,
            },
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let page = PaginationArgs::default().validate().unwrap();
        assert_eq!(page, Page { page: 1, limit: 10 });
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_offset() {
        let page = PaginationArgs::new(3, 20).validate().unwrap();
        assert_eq!(page.offset(), 40);
    }

    #[test]
    fn test_rejects_out_of_range_limit() {
        assert!(PaginationArgs::new(1, 0).validate().is_err());
        assert!(PaginationArgs::new(1, 101).validate().is_err());
        assert!(PaginationArgs::new(1, -5).validate().is_err());
        assert!(PaginationArgs::new(1, 100).validate().is_ok());
    }

    #[test]
    fn test_rejects_page_below_one() {
        assert!(PaginationArgs::new(0, 10).validate().is_err());
        assert!(PaginationArgs::new(-1, 10).validate().is_err());
    }

    #[test]
    fn test_rejects_page_whose_offset_overflows() {
        assert!(matches!(
            PaginationArgs::new(i64::MAX, 100).validate(),
            Err(ApiError::BadRequest(_))
        ));
        let last = i64::MAX / 100 + 1;
        assert_eq!(
            PaginationArgs::new(last, 100).validate().unwrap().offset(),
            (last - 1) * 100
        );
    }

    #[test]
    fn test_total_pages() {
        let page = Page { page: 1, limit: 10 };
        assert_eq!(Paginated::<u8>::new(vec![], page, 0).pagination.total_pages, 0);
        assert_eq!(Paginated::<u8>::new(vec![], page, 10).pagination.total_pages, 1);
        assert_eq!(Paginated::<u8>::new(vec![], page, 11).pagination.total_pages, 2);
    }
}
