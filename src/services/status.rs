use std::{num::NonZeroU32, sync::Arc};

use tracing::warn;

use crate::{
    adapters::HierarchyLister,
    model::{error::BackendErrorKind, path::PrefixPath, status::BlobstoreStatus},
    util::path::to_listing_options,
};

pub struct StatusService<C> {
    client: Arc<C>,
}

impl<C: HierarchyLister> StatusService<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Probes the container with a single-result listing at the root.
    pub async fn status(&self) -> BlobstoreStatus {
        let options = to_listing_options(&PrefixPath::root(), Some(NonZeroU32::MIN), None);

        match self.client.list_hierarchy(&options).await {
            Ok(_) => BlobstoreStatus::Ok,
            Err(err) => {
                warn!(error_message=%err, error_group="status");

                match err.kind {
                    BackendErrorKind::NotFound => BlobstoreStatus::NotFound,
                    BackendErrorKind::AccessDenied => BlobstoreStatus::NoAccess,
                    BackendErrorKind::Unavailable | BackendErrorKind::Other => {
                        if err.message.is_empty() {
                            BlobstoreStatus::NotOk(format!("{:?} backend error", err.kind))
                        } else {
                            BlobstoreStatus::NotOk(err.message)
                        }
                    }
                }
            }
        }
    }
}
