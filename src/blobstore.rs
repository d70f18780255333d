use std::{
    num::{NonZeroU32, NonZeroUsize},
    sync::Arc,
};

use tracing::{error, info, span, Instrument, Level};

use crate::{
    adapters::{azure::AzureContainer, BlobBackend},
    model::{
        config::{BlobstoreConfig, ConfigError, OutputShape, ResourceType, DEFAULT_MAX_QUEUE_SIZE},
        error::BlobstoreError,
        listing::{BlobProperties, ListingDetails, DEFAULT_PAGE_SIZE},
        path::{BlobPath, PrefixPath, ResourcePath},
        status::BlobstoreStatus,
    },
    services::{
        get::{BlobStream, GetService},
        list::{ListService, Listing},
        props::PropsService,
        status::StatusService,
    },
    util::records::{self, RecordStream},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlobstoreOptions {
    pub max_queue_size: NonZeroUsize,
    pub page_size: NonZeroU32,
    pub details: ListingDetails,
    pub resource_type: ResourceType,
    pub output_shape: OutputShape,
}

impl Default for BlobstoreOptions {
    fn default() -> Self {
        Self {
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            details: ListingDetails::default(),
            resource_type: ResourceType::default(),
            output_shape: OutputShape::default(),
        }
    }
}

impl From<&BlobstoreConfig> for BlobstoreOptions {
    fn from(config: &BlobstoreConfig) -> Self {
        Self {
            max_queue_size: config.max_queue_size(),
            resource_type: config.resource_type,
            output_shape: config.output_shape,
            ..Self::default()
        }
    }
}

/// Read-only view of one container. Every call is independent; the client handle
/// is shared by all services.
pub struct Blobstore<C> {
    get: GetService<C>,
    list: ListService<C>,
    props: PropsService<C>,
    status: StatusService<C>,
    options: BlobstoreOptions,
}

impl<C: BlobBackend + 'static> Blobstore<C> {
    pub fn new(client: C, options: BlobstoreOptions) -> Self {
        let client = Arc::new(client);

        Self {
            get: GetService::new(Arc::clone(&client), options.max_queue_size),
            list: ListService::new(Arc::clone(&client), options.page_size, options.details),
            props: PropsService::new(Arc::clone(&client)),
            status: StatusService::new(client),
            options,
        }
    }

    pub fn options(&self) -> &BlobstoreOptions {
        &self.options
    }

    /// Byte stream of the blob at `path`. The root is rejected up front; a missing
    /// blob only fails once the stream is polled.
    pub fn get(&self, path: &ResourcePath) -> Result<BlobStream, BlobstoreError> {
        let span = span!(Level::INFO, "get", context = "get", path = %path);
        let _e = span.enter();
        info!("called");

        let blob = BlobPath::try_from(path.clone()).map_err(|err| {
            error!(error_message=%err, error_group="get");
            BlobstoreError::from(err)
        })?;

        Ok(self.get.get(&blob))
    }

    /// [`Blobstore::get`] decoded into JSON records using the configured resource type.
    pub fn records(&self, path: &ResourcePath) -> Result<RecordStream, BlobstoreError> {
        Ok(records::records(self.get(path)?, self.options.resource_type))
    }

    pub async fn is_resource(&self, path: &ResourcePath) -> Result<bool, BlobstoreError> {
        Ok(self.properties(path).await?.is_some())
    }

    pub async fn properties(
        &self,
        path: &ResourcePath,
    ) -> Result<Option<BlobProperties>, BlobstoreError> {
        let span = span!(Level::INFO, "properties", context = "properties", path = %path);

        async move {
            info!("called");

            let Ok(blob) = BlobPath::try_from(path.clone()) else {
                return Ok(None);
            };

            self.props.properties(&blob).await.inspect_err(|err| {
                error!(error_message=%err, error_group="properties");
            })
        }
        .instrument(span)
        .await
    }

    pub async fn list(&self, path: &ResourcePath) -> Result<Option<Listing>, BlobstoreError> {
        let span = span!(Level::INFO, "list", context = "list", path = %path);

        async move {
            info!("called");

            self.list
                .list(&PrefixPath::from(path.clone()))
                .await
                .inspect_err(|err| {
                    error!(error_message=%err, error_group="list");
                })
        }
        .instrument(span)
        .await
    }

    pub async fn status(&self) -> BlobstoreStatus {
        let span = span!(Level::INFO, "status", context = "status");

        async move {
            info!("called");

            let status = self.status.status().await;
            info!(status = %status, "probed");
            status
        }
        .instrument(span)
        .await
    }
}

impl Blobstore<AzureContainer> {
    /// Builds an Azure backed store and checks it can reach the container, turning
    /// any failure into a [`ConfigError`].
    pub async fn connect(config: &BlobstoreConfig) -> Result<Self, ConfigError> {
        info!(config = ?config.sanitize(), "connecting");

        let client = AzureContainer::from_config(config)?;
        let store = Self::new(client, BlobstoreOptions::from(config));

        check_status(store.status().await, &config.container)?;

        Ok(store)
    }
}

fn check_status(status: BlobstoreStatus, container: &str) -> Result<(), ConfigError> {
    match status {
        BlobstoreStatus::Ok => Ok(()),
        BlobstoreStatus::NotFound => Err(ConfigError::ContainerNotFound(container.to_string())),
        BlobstoreStatus::NoAccess => Err(ConfigError::NoAccess(container.to_string())),
        BlobstoreStatus::NotOk(message) => Err(ConfigError::Unreachable(message)),
    }
}
