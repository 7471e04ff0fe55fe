use thiserror::Error;

use super::repos::SourceError;

/// Content lookup failures, keeping the not-found / transport distinction
/// explicit. Consumers degrade the affected page slice rather than
/// propagating either variant as a crash.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("requested content not found")]
    NotFound,
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl ContentError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound)
    }
}
