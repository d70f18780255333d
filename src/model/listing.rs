use std::num::NonZeroU32;

use crate::model::path::DELIMITER;

pub const DEFAULT_PAGE_SIZE: NonZeroU32 = match NonZeroU32::new(5000) {
    Some(size) => size,
    None => unreachable!(),
};

/// Extra data a backend may attach to each listed item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListingDetails {
    pub snapshots: bool,
    pub metadata: bool,
}

/// Query parameters for one hierarchy listing call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingOptions {
    pub prefix: String,
    pub delimiter: char,
    pub max_results: NonZeroU32,
    pub details: ListingDetails,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            delimiter: DELIMITER,
            max_results: DEFAULT_PAGE_SIZE,
            details: ListingDetails::default(),
        }
    }
}

/// One page of a hierarchy listing, keys as the backend returned them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListingSegment {
    pub items: Vec<String>,
    pub prefixes: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlobProperties {
    pub content_length: u64,
    pub content_type: Option<String>,
}
