use std::sync::Arc;

use tracing::debug;

use crate::{
    adapters::PropertiesFetcher,
    model::{error::BlobstoreError, listing::BlobProperties, path::BlobPath},
    util::path::to_object_key,
};

pub struct PropsService<C> {
    client: Arc<C>,
}

impl<C: PropertiesFetcher> PropsService<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// `true` when the blob exists and is readable. Absent and denied blobs are
    /// `false`; other backend errors propagate.
    pub async fn props(&self, path: &BlobPath) -> Result<bool, BlobstoreError> {
        Ok(self.properties(path).await?.is_some())
    }

    pub async fn properties(
        &self,
        path: &BlobPath,
    ) -> Result<Option<BlobProperties>, BlobstoreError> {
        let key = to_object_key(path);

        match self.client.get_properties(&key).await {
            Ok(properties) => Ok(Some(properties)),
            Err(err) if err.is_not_found() || err.is_access_denied() => {
                debug!(key = %key, reason = %err, "not a resource");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}
