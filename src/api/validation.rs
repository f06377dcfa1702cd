use super::ApiError;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

pub fn validate_id(kind: &str, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {kind} ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

pub fn validate_page(page: u64) -> Result<u64, ApiError> {
    if page == 0 {
        return Err(ApiError::validation("Page must be 1 or greater"));
    }
    Ok(page)
}

pub fn validate_page_size(page_size: u64) -> Result<u64, ApiError> {
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(ApiError::validation(format!(
            "Invalid page size: {page_size}. Page size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    Ok(page_size)
}

/// Reorder payloads: every id must be positive.
pub fn validate_reorder_ids(ids: &[i32]) -> Result<&[i32], ApiError> {
    if let Some(bad) = ids.iter().find(|&&id| id <= 0) {
        return Err(ApiError::validation(format!(
            "Invalid ID in reorder list: {bad}"
        )));
    }
    Ok(ids)
}

/// Trims the search term; blank means "no filter".
#[must_use]
pub fn normalize_search_query(query: Option<String>) -> Option<String> {
    query
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
}
