use std::{future::Future, pin::Pin};

use bytes::Bytes;
use futures::Stream;

use crate::model::{
    error::BackendError,
    listing::{BlobProperties, ListingOptions, ListingSegment},
};

pub mod azure;
pub mod gcs;
#[cfg(test)]
pub mod mock;
pub mod s3;

/// Body of a download, in the backend's own transfer chunking.
pub type ByteChunks = Pin<Box<dyn Stream<Item = Result<Bytes, BackendError>> + Send>>;

pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BackendError>> + Send + 'a>>;

pub trait Downloader: Send + Sync {
    /// Starts a full-object download. Absent objects fail with a `NotFound` kind.
    fn download<'a>(&'a self, key: &'a str) -> BackendFuture<'a, ByteChunks>;
}

pub trait HierarchyLister: Send + Sync {
    /// Fetches the first listing segment for `options.prefix`, or `None` when the
    /// backend returns no segment at all.
    fn list_hierarchy<'a>(
        &'a self,
        options: &'a ListingOptions,
    ) -> BackendFuture<'a, Option<ListingSegment>>;
}

pub trait PropertiesFetcher: Send + Sync {
    fn get_properties<'a>(&'a self, key: &'a str) -> BackendFuture<'a, BlobProperties>;
}

/// Everything the facade needs from a backend.
pub trait BlobBackend: Downloader + HierarchyLister + PropertiesFetcher {}

impl<T> BlobBackend for T where T: Downloader + HierarchyLister + PropertiesFetcher {}
