//! Business rules every persisted book satisfies.

use thiserror::Error;

use super::models::BookDraft;

/// Why a candidate book was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title is required")]
    TitleRequired,
    #[error("author is required")]
    AuthorRequired,
    #[error("year must be > 0")]
    YearNotPositive,
}

/// Check a candidate book. Rules run in a fixed order and the first failure wins.
pub fn validate(draft: &BookDraft) -> Result<(), ValidationError> {
    if draft.title.trim().is_empty() {
        return Err(ValidationError::TitleRequired);
    }
    if draft.author.trim().is_empty() {
        return Err(ValidationError::AuthorRequired);
    }
    if draft.year <= 0 {
        return Err(ValidationError::YearNotPositive);
    }
    Ok(())
}
