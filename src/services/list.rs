use std::{num::NonZeroU32, sync::Arc};

use tracing::debug;

use crate::{
    adapters::HierarchyLister,
    model::{
        error::BlobstoreError,
        listing::{ListingDetails, ListingSegment},
        path::{PrefixPath, ResourceName, ResourcePathType},
    },
    util::path::{simple_name, to_listing_options},
};

/// Children of one hierarchy level: leaf resources first, then prefixes.
pub type Listing = Vec<(ResourceName, ResourcePathType)>;

pub struct ListService<C> {
    client: Arc<C>,
    page_size: NonZeroU32,
    details: ListingDetails,
}

impl<C: HierarchyLister> ListService<C> {
    pub fn new(client: Arc<C>, page_size: NonZeroU32, details: ListingDetails) -> Self {
        Self {
            client,
            page_size,
            details,
        }
    }

    /// Lists the first segment under `path`. `None` means the backend returned no
    /// segment, i.e. the path is not listable. Continuation markers are not followed.
    pub async fn list(&self, path: &PrefixPath) -> Result<Option<Listing>, BlobstoreError> {
        let options = to_listing_options(path, Some(self.page_size), Some(self.details));
        let segment = self.client.list_hierarchy(&options).await?;

        match &segment {
            Some(segment) => debug!(
                prefix = %options.prefix,
                items = segment.items.len(),
                prefixes = segment.prefixes.len(),
                "listed segment"
            ),
            None => debug!(prefix = %options.prefix, "no segment"),
        }

        Ok(segment.map(|segment| to_listing(segment, &options.prefix)))
    }
}

// A key equal to the listed prefix is a directory marker, not a child.
fn to_listing(segment: ListingSegment, prefix: &str) -> Listing {
    let items = segment
        .items
        .iter()
        .filter(|key| key.as_str() != prefix)
        .filter_map(|key| Some((simple_name(key)?, ResourcePathType::LeafResource)));
    let prefixes = segment
        .prefixes
        .iter()
        .filter_map(|native| Some((simple_name(native)?, ResourcePathType::Prefix)));

    items.chain(prefixes).collect()
}
