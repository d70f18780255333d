//! Read-only, listing-capable view over a blob container.
//!
//! Callers address blobs with backend-neutral [`ResourcePath`]s; the backend adapters
//! (Azure Blob Storage, S3, GCS) translate them to native keys and prefixes.

pub mod adapters;
pub mod blobstore;
pub mod model;
pub mod services;
pub mod util;

pub use blobstore::{Blobstore, BlobstoreOptions};
pub use model::{
    config::BlobstoreConfig,
    error::BlobstoreError,
    path::{ResourceName, ResourcePath, ResourcePathType},
    status::BlobstoreStatus,
};
