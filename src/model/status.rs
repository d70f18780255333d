use std::fmt;

/// Outcome of a connectivity probe against the configured container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlobstoreStatus {
    Ok,
    NotFound,
    NoAccess,
    NotOk(String),
}

impl BlobstoreStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, BlobstoreStatus::Ok)
    }
}

impl fmt::Display for BlobstoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobstoreStatus::Ok => f.write_str("ok"),
            BlobstoreStatus::NotFound => f.write_str("container not found"),
            BlobstoreStatus::NoAccess => f.write_str("no access to container"),
            BlobstoreStatus::NotOk(message) => write!(f, "not ok: {}", message),
        }
    }
}
