use thiserror::Error;

use crate::model::path::{BlobPath, PathError};

/// Classification every adapter applies to its SDK errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendErrorKind {
    NotFound,
    AccessDenied,
    Unavailable,
    Other,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == BackendErrorKind::NotFound
    }

    pub fn is_access_denied(&self) -> bool {
        self.kind == BackendErrorKind::AccessDenied
    }

    /// Maps an HTTP status code to a kind.
    pub fn kind_for_status(status: u16) -> BackendErrorKind {
        match status {
            404 => BackendErrorKind::NotFound,
            401 | 403 => BackendErrorKind::AccessDenied,
            _ => BackendErrorKind::Other,
        }
    }
}

#[derive(Debug, Error)]
pub enum BlobstoreError {
    #[error("path not found: {0}")]
    PathNotFound(BlobPath),

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("transport failure: {0}")]
    Transport(#[source] BackendError),

    #[error(transparent)]
    InvalidPath(#[from] PathError),

    #[error("failed to decode record: {0}")]
    Decode(String),
}

impl From<BackendError> for BlobstoreError {
    fn from(err: BackendError) -> Self {
        match err.kind {
            BackendErrorKind::AccessDenied => BlobstoreError::AccessDenied(err.message),
            BackendErrorKind::Unavailable => BlobstoreError::BackendUnavailable(err.message),
            BackendErrorKind::NotFound | BackendErrorKind::Other => BlobstoreError::Transport(err),
        }
    }
}
