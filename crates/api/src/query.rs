//! Shared pagination handling for list endpoints.
//!
//! Handlers declare plain `page`/`page_size` query fields (flattened
//! structs do not survive query-string deserialization) and validate them
//! through [`resolve_page`].

use crate::error::AppError;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// Validate `?page=&page_size=` values, applying defaults.
///
/// `page` starts at 1; `page_size` defaults to 20 and is capped at 100.
pub fn resolve_page(page: Option<i64>, page_size: Option<i64>) -> Result<(i64, i64), AppError> {
    let page = page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::BadRequest("page must be >= 1".into()));
    }
    let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(AppError::BadRequest(format!(
            "page_size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    Ok((page, page_size))
}

/// The SQL offset for a resolved page.
pub fn page_offset(page: i64, page_size: i64) -> i64 {
    (page - 1) * page_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_absent() {
        assert_eq!(resolve_page(None, None).unwrap(), (1, 20));
    }

    #[test]
    fn bounds_are_enforced() {
        assert!(resolve_page(Some(0), None).is_err());
        assert!(resolve_page(None, Some(0)).is_err());
        assert!(resolve_page(None, Some(101)).is_err());
        assert_eq!(resolve_page(Some(3), Some(100)).unwrap(), (3, 100));
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(page_offset(1, 20), 0);
        assert_eq!(page_offset(3, 20), 40);
    }
}
