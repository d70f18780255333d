use azure_core::{error::ErrorKind, request_options::MaxResults};
use azure_storage::{CloudLocation, StorageCredentials};
use azure_storage_blobs::prelude::{ClientBuilder, ContainerClient};
use futures::{stream, Stream, StreamExt, TryStreamExt};

use crate::{
    adapters::{self, BackendFuture, ByteChunks},
    model::{
        config::{BlobstoreConfig, ConfigError},
        error::{BackendError, BackendErrorKind},
        listing::{BlobProperties, ListingOptions, ListingSegment},
    },
};

// Large enough that the first ranged GET covers any blob.
const SINGLE_REQUEST_CHUNK_SIZE: u64 = 1 << 62;

/// Azure Blob Storage container.
pub struct AzureContainer {
    client: ContainerClient,
}

impl AzureContainer {
    pub fn new(client: ContainerClient) -> Self {
        Self { client }
    }

    /// Builds a container client against `storageUrl`, with shared key credentials
    /// when present and anonymous access otherwise.
    pub fn from_config(config: &BlobstoreConfig) -> Result<Self, ConfigError> {
        let location = config.validate()?;

        let credentials = match &config.credentials {
            Some(credentials) => StorageCredentials::access_key(
                credentials.account_name.clone(),
                credentials.account_key.clone(),
            ),
            None => StorageCredentials::anonymous(),
        };

        let cloud_location = CloudLocation::Custom {
            account: location.account,
            uri: location.url.as_str().trim_end_matches('/').to_string(),
        };

        let client = ClientBuilder::with_location(cloud_location, credentials)
            .container_client(config.container.clone());

        Ok(Self::new(client))
    }

    pub fn container_name(&self) -> &str {
        self.client.container_name()
    }
}

fn backend_error(err: &azure_core::Error, message: String) -> BackendError {
    let kind = match err.kind() {
        ErrorKind::HttpResponse { status, .. } => BackendError::kind_for_status(*status as u16),
        ErrorKind::Io => BackendErrorKind::Unavailable,
        _ => BackendErrorKind::Other,
    };

    BackendError::new(kind, format!("{}, {}", message, err))
}

/// Pulls one response off a pager and drops the rest unrequested.
async fn first_page<S, T, E>(mut pages: S) -> Result<Option<T>, E>
where
    S: Stream<Item = Result<T, E>> + Unpin,
{
    pages.next().await.transpose()
}

// Azure answers a prefix with nothing under it with an empty page.
fn to_segment(items: Vec<String>, prefixes: Vec<String>) -> Option<ListingSegment> {
    if items.is_empty() && prefixes.is_empty() {
        return None;
    }

    Some(ListingSegment { items, prefixes })
}

impl adapters::Downloader for AzureContainer {
    fn download<'a>(&'a self, key: &'a str) -> BackendFuture<'a, ByteChunks> {
        Box::pin(async move {
            let pages = self
                .client
                .blob_client(key)
                .get()
                .chunk_size(SINGLE_REQUEST_CHUNK_SIZE)
                .into_stream();

            // The response carries the headers, so a missing blob fails here.
            let response = first_page(pages)
                .await
                .map_err(|err| backend_error(&err, format!("failed to get_blob: {}", key)))?;
            let Some(response) = response else {
                return Ok(stream::empty().boxed());
            };

            let key = key.to_string();
            let chunks = response
                .data
                .map_err(move |err| backend_error(&err, format!("failed to read blob: {}", key)))
                .boxed();

            Ok(chunks)
        })
    }
}

impl adapters::HierarchyLister for AzureContainer {
    fn list_hierarchy<'a>(
        &'a self,
        options: &'a ListingOptions,
    ) -> BackendFuture<'a, Option<ListingSegment>> {
        Box::pin(async move {
            let pages = self
                .client
                .list_blobs()
                .prefix(options.prefix.clone())
                .delimiter(options.delimiter.to_string())
                .max_results(MaxResults::new(options.max_results))
                .include_snapshots(options.details.snapshots)
                .include_metadata(options.details.metadata)
                .into_stream();

            let page = first_page(pages).await.map_err(|err| {
                backend_error(
                    &err,
                    format!("failed to list_blobs at: {}", options.prefix),
                )
            })?;

            Ok(page.and_then(|page| {
                to_segment(
                    page.blobs.blobs().map(|blob| blob.name.clone()).collect(),
                    page.blobs
                        .prefixes()
                        .map(|prefix| prefix.name.clone())
                        .collect(),
                )
            }))
        })
    }
}

impl adapters::PropertiesFetcher for AzureContainer {
    fn get_properties<'a>(&'a self, key: &'a str) -> BackendFuture<'a, BlobProperties> {
        Box::pin(async move {
            let response = self
                .client
                .blob_client(key)
                .get_properties()
                .await
                .map_err(|err| {
                    backend_error(&err, format!("failed to get_properties: {}", key))
                })?;

            let properties = response.blob.properties;
            Ok(BlobProperties {
                content_length: properties.content_length,
                content_type: Some(properties.content_type).filter(|t| !t.is_empty()),
            })
        })
    }
}
